use crate::error::{AbigenError, Result};
use inflector::Inflector;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
};

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_DASH_LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-([a-z])").unwrap());
static RE_LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+").unwrap());

/// Words that can't be used as parameter names in TypeScript
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "implements", "interface", "let", "package",
    "private", "protected", "public", "static", "yield", "arguments", "eval",
];

/// Turns a file stem into the name of the generated contract type.
///
/// `my-token.v2` becomes `MyTokenV2`, leading digits are dropped.
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = RE_WHITESPACE.replace_all(raw, "-").replace('.', "-");
    let name = RE_DASH_LOWER.replace_all(&name, |caps: &regex::Captures| caps[1].to_uppercase());
    let name = name.replace('-', "");
    let name = RE_LEADING_DIGITS.replace(&name, "");

    let mut chars = name.chars();
    match chars.next() {
        Some(first) => Ok(first.to_uppercase().chain(chars).collect()),
        None => Err(AbigenError::InvalidContractName(raw.to_string())),
    }
}

/// Expands a positional parameter name that may be empty.
///
/// Reserved words get `_` appended to them.
pub(crate) fn expand_input_name(index: usize, name: &str) -> String {
    match name {
        "" => format!("arg{index}"),
        n if RESERVED.contains(&n) => format!("{n}_"),
        n => n.to_string(),
    }
}

/// Identifier of the namespace a nested directory is re-exported as
pub(crate) fn namespace_ident(dir: &str) -> String {
    let ident = dir.to_camel_case();
    if ident.is_empty() || ident.starts_with(char::is_numeric) || RESERVED.contains(&ident.as_str())
    {
        format!("_{ident}")
    } else {
        ident
    }
}

/// Returns a list of all the json files under the root, sorted
pub(crate) fn json_files(root: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or_default())
        .map(|e| e.path().into())
        .collect();
    files.sort();
    files
}

/// Returns the forward slash separated form of the path
pub(crate) fn to_slash(path: &Path) -> String {
    use path_slash::PathExt;
    path.to_slash_lossy().into_owned()
}

/// Canonicalizes the path if it exists, so that symlinks and `..` don't break relative paths
pub(crate) fn canonicalized(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    dunce::canonicalize(&path).unwrap_or(path)
}

/// Returns the deepest directory that contains all of the given files
pub(crate) fn common_ancestor_dir<'a>(files: impl IntoIterator<Item = &'a PathBuf>) -> PathBuf {
    let mut files = files.into_iter();
    let Some(first) = files.next() else { return PathBuf::new() };
    let mut ancestor: Vec<Component> =
        first.parent().map(|p| p.components().collect()).unwrap_or_default();

    for file in files {
        let dir: Vec<Component> =
            file.parent().map(|p| p.components().collect()).unwrap_or_default();
        let shared = ancestor.iter().zip(&dir).take_while(|(a, b)| a == b).count();
        ancestor.truncate(shared);
    }
    ancestor.iter().collect()
}

/// Removes the `Name.sol` directory hardhat nests every artifact in, so that
/// `contracts/Token.sol/Token.json` becomes `contracts/Token.json`.
///
/// A path is left untouched if its shortened form collides with the shortened form of another
/// path.
pub(crate) fn shorten_artifact_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let shortened: Vec<PathBuf> = paths.iter().map(|p| shorten_artifact_path(p)).collect();
    let mut counts: HashMap<&PathBuf, usize> = HashMap::new();
    for path in &shortened {
        *counts.entry(path).or_default() += 1;
    }
    paths
        .iter()
        .zip(&shortened)
        .map(|(full, short)| if counts[short] > 1 { full.clone() } else { short.clone() })
        .collect()
}

fn shorten_artifact_path(path: &Path) -> PathBuf {
    let (Some(dir), Some(file)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf()
    };
    let is_sol_dir =
        dir.file_name().map(|d| d.to_string_lossy().ends_with(".sol")).unwrap_or_default();
    match dir.parent() {
        Some(parent) if is_sol_dir => parent.join(file),
        _ => path.to_path_buf(),
    }
}

/// Returns `path` relative to `base`, or `path` itself if it is not inside `base`
pub(crate) fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf())
}
