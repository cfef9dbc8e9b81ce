//! This module implements basic `prettier` code formatting.

use crate::error::{AbigenError, Result};
use std::{
    io::Write,
    process::{Command, Stdio},
};

/// Format the raw TypeScript source string and return formatted output.
pub fn format<S>(source: S) -> Result<String>
where
    S: AsRef<str>,
{
    let mut prettier = Command::new("prettier")
        .args(["--parser", "typescript"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| AbigenError::msg(format!("failed to spawn `prettier`: {err}")))?;

    {
        let stdin = prettier
            .stdin
            .as_mut()
            .ok_or_else(|| AbigenError::msg("stdin was not created for `prettier` child process"))?;
        stdin
            .write_all(source.as_ref().as_bytes())
            .map_err(|err| AbigenError::msg(format!("failed to write to `prettier`: {err}")))?;
    }

    let output = prettier
        .wait_with_output()
        .map_err(|err| AbigenError::msg(format!("failed to wait for `prettier`: {err}")))?;

    if !output.status.success() {
        return Err(AbigenError::msg(format!(
            "`prettier` exited with code {}:\n{}",
            output.status,
            String::from_utf8_lossy(&output.stderr),
        )))
    }

    String::from_utf8(output.stdout)
        .map_err(|err| AbigenError::msg(format!("`prettier` emitted invalid utf-8: {err}")))
}

/// Formats the source, falling back to the unformatted source if `prettier` is missing or fails.
pub fn format_or_raw(source: String) -> String {
    match format(&source) {
        Ok(formatted) => formatted,
        Err(err) => {
            tracing::debug!(?err, "skipping prettier formatting");
            source
        }
    }
}
