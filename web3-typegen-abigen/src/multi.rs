//! Generate bindings for a whole set of artifacts.
//!
//! A run has two phases. In the streaming phase every artifact is turned into its contract module
//! independently of all others, see [`Web3Abigen::transform_file`]. Once every artifact is done,
//! the finalize phase derives the barrel `index.ts` files and the shared `types.ts` from nothing
//! but the paths of the generated modules, see [`Web3Abigen::after_run`].
//!
//! Everything is generated in memory, so a fatal error leaves the output directory untouched.

use crate::{
    contract::{Context, ContractDescriptor},
    error::{AbigenError, Result},
    prettier, rawabi, shared_types,
    ts::{Declaration, ImportClause, Module},
    util,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fs, io,
    path::{Component, Path, PathBuf},
};

/// Where the bindings go if no output directory is configured, relative to the `cwd`
pub const DEFAULT_OUT_DIR: &str = "./types/web3-bignumber/";

/// File name of the barrel of every directory
pub const BARREL_FILE_NAME: &str = "index.ts";

/// The settings of a generator run.
///
/// Keys are camelCase so that an enclosing toolchain can pass its config along as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base directory of all relative paths, empty means the current directory
    #[serde(default)]
    pub cwd: PathBuf,
    /// Root of the generated bindings, defaults to [`DEFAULT_OUT_DIR`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    /// Root the artifact paths are mirrored from, defaults to the deepest directory that
    /// contains every artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,
    /// Every artifact of the run
    #[serde(default)]
    pub all_files: Vec<PathBuf>,
    /// Format the output with a locally installed `prettier`
    #[serde(default)]
    pub prettier: bool,
}

/// A single file of the output set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Where the file is written to
    pub path: PathBuf,
    /// The TypeScript source
    pub contents: String,
}

/// Builder for generating TypeScript bindings for a set of compiled artifacts.
///
/// # Example
///
/// Read all artifacts under `./artifacts` and write their bindings to `./types/web3-bignumber`
///
/// ```no_run
/// # use web3_typegen_abigen::Web3Abigen;
/// # fn t() -> web3_typegen_abigen::Result<()> {
/// Web3Abigen::from_json_files("./artifacts").generate()?.write()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Web3Abigen {
    config: Config,
    /// The relative path of every artifact, computed on first use
    artifact_paths: OnceCell<HashMap<PathBuf, PathBuf>>,
}

impl Web3Abigen {
    /// Creates a new generator for the given configuration
    pub fn new(config: Config) -> Self {
        Self { config, artifact_paths: OnceCell::new() }
    }

    /// Collects every json file under `root`, which also becomes the input dir.
    pub fn from_json_files(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(Config {
            all_files: util::json_files(root),
            input_dir: Some(root.to_path_buf()),
            ..Default::default()
        })
    }

    /// Sets the output directory
    #[must_use]
    pub fn out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.config.out_dir = Some(out_dir.into());
        self.artifact_paths = OnceCell::new();
        self
    }

    /// Sets the directory the artifact paths are taken relative to
    #[must_use]
    pub fn input_dir(mut self, input_dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = Some(input_dir.into());
        self.artifact_paths = OnceCell::new();
        self
    }

    /// Adds another artifact to the run
    #[must_use]
    pub fn add_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.config.all_files.push(file.into());
        self.artifact_paths = OnceCell::new();
        self
    }

    /// Specify whether or not to format the code using a locally installed copy of `prettier`.
    ///
    /// Note that in case `prettier` does not exist or produces an error, the unformatted code
    /// will be used.
    #[must_use]
    pub fn prettier(mut self, prettier: bool) -> Self {
        self.config.prettier = prettier;
        self
    }

    /// The configuration of this run
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The absolute root of the output
    pub fn out_dir_path(&self) -> PathBuf {
        let out_dir = self.config.out_dir.as_deref().unwrap_or_else(|| Path::new(DEFAULT_OUT_DIR));
        self.config.cwd.join(out_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        util::canonicalized(self.config.cwd.join(path))
    }

    fn resolved_files(&self) -> Vec<PathBuf> {
        self.config.all_files.iter().map(|p| self.resolve(p)).collect()
    }

    fn input_root(&self, files: &[PathBuf]) -> PathBuf {
        match &self.config.input_dir {
            Some(dir) => self.resolve(dir),
            None => util::common_ancestor_dir(files),
        }
    }

    /// Maps every artifact to its path relative to the input root, with the hardhat `Name.sol`
    /// directories removed.
    fn artifact_paths(&self) -> &HashMap<PathBuf, PathBuf> {
        self.artifact_paths.get_or_init(|| {
            let files = self.resolved_files();
            let root = self.input_root(&files);
            let shortened = util::shorten_artifact_paths(&files);
            files
                .into_iter()
                .zip(shortened)
                .map(|(file, short)| {
                    let relative = util::relative_to(&short, &root);
                    (file, relative)
                })
                .collect()
        })
    }

    /// Generates the module of a single artifact, `None` if the artifact has no ABI.
    ///
    /// `path` is the location of the artifact, it decides where the module goes.
    pub fn transform_file(&self, path: &Path, contents: &str) -> Result<Option<GeneratedFile>> {
        let resolved = self.resolve(path);
        let relative = match self.artifact_paths().get(&resolved) {
            Some(relative) => relative.clone(),
            None => {
                let root = self.input_root(std::slice::from_ref(&resolved));
                util::relative_to(&resolved, &root)
            }
        };
        self.transform(path, &relative, contents)
    }

    fn transform(
        &self,
        path: &Path,
        relative: &Path,
        contents: &str,
    ) -> Result<Option<GeneratedFile>> {
        let artifact = rawabi::extract(contents).map_err(|err| match err.classify() {
            Category::Data => {
                AbigenError::MalformedArtifact { path: path.to_path_buf(), source: err }
            }
            Category::Io | Category::Syntax | Category::Eof => AbigenError::SerdeJson(err),
        })?;
        let Some(abi) = artifact.non_empty_abi() else {
            tracing::trace!("skipping {}, no ABI", path.display());
            return Ok(None)
        };

        let contract = ContractDescriptor::parse(abi, relative, artifact.documentation.as_ref())?;
        let out = contract
            .path
            .iter()
            .fold(self.out_dir_path(), |dir, segment| dir.join(segment))
            .join(format!("{}.ts", contract.name));
        tracing::trace!(
            "generating {} from {}",
            util::to_slash(&out),
            util::to_slash(relative)
        );

        let contents = Context::new(contract).expand().render();
        Ok(Some(GeneratedFile { path: out, contents }))
    }

    /// Generates the files that depend on the complete output set: the shared `types.ts` at the
    /// output root and one barrel per directory that contains a generated module.
    pub fn after_run(&self, generated: &[GeneratedFile]) -> Vec<GeneratedFile> {
        let out_dir = self.out_dir_path();
        let mut files = vec![GeneratedFile {
            path: out_dir.join(shared_types::FILE_NAME),
            contents: shared_types::source(),
        }];

        let modules = generated.iter().map(|file| util::relative_to(&file.path, &out_dir));
        for (dir, barrel) in barrels(modules) {
            let path = dir.iter().fold(out_dir.clone(), |p, segment| p.join(segment));
            files.push(GeneratedFile { path: path.join(BARREL_FILE_NAME), contents: barrel.render() });
        }
        tracing::debug!("generated {} barrel files", files.len() - 1);
        files
    }

    /// Runs both phases over every configured artifact.
    ///
    /// Nothing is written to disk, see [`Bindings::write`].
    pub fn generate(&self) -> Result<Bindings> {
        let paths = self.artifact_paths();
        tracing::debug!("generating bindings for {} artifacts", self.config.all_files.len());

        let mut read = HashSet::new();
        let mut generated = Vec::new();
        for file in &self.config.all_files {
            let resolved = self.resolve(file);
            let relative = match paths.get(&resolved) {
                Some(relative) if read.insert(resolved.clone()) => relative,
                _ => return Err(AbigenError::DuplicateOutput(resolved)),
            };
            tracing::trace!("reading {}", resolved.display());
            let contents =
                fs::read_to_string(&resolved).map_err(|err| AbigenError::io(err, &resolved))?;
            generated.extend(self.transform(file, relative, &contents)?);
        }
        tracing::debug!("generated {} contract modules", generated.len());

        let finalized = self.after_run(&generated);
        let mut files = generated;
        files.extend(finalized);

        let mut seen = HashSet::new();
        for file in &files {
            if !seen.insert(file.path.as_path()) {
                return Err(AbigenError::DuplicateOutput(file.path.clone()))
            }
        }

        if self.config.prettier {
            for file in &mut files {
                file.contents = prettier::format_or_raw(std::mem::take(&mut file.contents));
            }
        }
        Ok(Bindings { files })
    }
}

/// The directories and modules re-exported by one barrel
#[derive(Debug, Default)]
struct Barrel {
    dirs: BTreeSet<String>,
    modules: BTreeSet<String>,
}

impl Barrel {
    fn render(&self) -> String {
        let namespaces: Vec<(String, &String)> =
            self.dirs.iter().map(|dir| (util::namespace_ident(dir), dir)).collect();

        let imports = namespaces.iter().map(|(ident, dir)| Declaration::Import {
            clause: ImportClause::Namespace(ident.clone()),
            from: format!("./{dir}"),
        });
        let namespace_exports = namespaces
            .iter()
            .map(|(ident, _)| Declaration::ReExport { names: vec![ident.clone()], from: None });
        let module_exports = self.modules.iter().map(|name| Declaration::ReExport {
            names: vec![name.clone()],
            from: Some(format!("./{name}")),
        });

        Module::new(imports.chain(namespace_exports).chain(module_exports).collect()).render()
    }
}

/// Computes the barrel of every directory on the way from the output root to a module, keyed by
/// the directory segments
fn barrels(modules: impl IntoIterator<Item = PathBuf>) -> BTreeMap<Vec<String>, Barrel> {
    let mut barrels: BTreeMap<Vec<String>, Barrel> = BTreeMap::new();
    for module in modules {
        let Some(name) = module.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue
        };
        let dirs: Vec<String> = module
            .parent()
            .into_iter()
            .flat_map(|dir| dir.components())
            .filter_map(|c| match c {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        for depth in 0..dirs.len() {
            barrels.entry(dirs[..depth].to_vec()).or_default().dirs.insert(dirs[depth].clone());
        }
        barrels.entry(dirs).or_default().modules.insert(name);
    }
    barrels
}

/// The complete output set of a run, not yet written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    files: Vec<GeneratedFile>,
}

impl Bindings {
    /// Returns the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns whether there are no files at all
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All files: contract modules first, then `types.ts` and the barrels
    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    /// Returns the file that is written to `path`
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        self.files.iter().find(|file| file.path == path.as_ref())
    }

    /// Writes every file, creating directories as needed
    pub fn write(&self) -> Result<()> {
        for file in &self.files {
            if let Some(parent) = file.path.parent() {
                fs::create_dir_all(parent).map_err(|err| AbigenError::io(err, parent))?;
            }
            fs::write(&file.path, &file.contents).map_err(|err| AbigenError::io(err, &file.path))?;
        }
        tracing::debug!("wrote {} files", self.files.len());
        Ok(())
    }

    /// Ensures that every file exists on disk with exactly the generated contents.
    ///
    /// Useful as a test that fails once the bindings are out of date:
    ///
    /// ```no_run
    /// # use web3_typegen_abigen::Web3Abigen;
    /// #[test]
    /// fn generated_bindings_are_fresh() {
    ///     Web3Abigen::from_json_files("./artifacts")
    ///         .out_dir("./types")
    ///         .generate()
    ///         .unwrap()
    ///         .ensure_consistent()
    ///         .expect("bindings are out of date, regenerate them");
    /// }
    /// ```
    pub fn ensure_consistent(&self) -> Result<()> {
        for file in &self.files {
            match fs::read(&file.path) {
                Ok(contents) if contents == file.contents.as_bytes() => {}
                Ok(_) => return Err(AbigenError::Inconsistent { path: file.path.clone() }),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    return Err(AbigenError::Inconsistent { path: file.path.clone() })
                }
                Err(err) => return Err(AbigenError::io(err, &file.path)),
            }
        }
        Ok(())
    }
}

impl IntoIterator for Bindings {
    type Item = GeneratedFile;
    type IntoIter = std::vec::IntoIter<GeneratedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::HEADER;
    use pretty_assertions::assert_eq;

    const TOKEN: &str = r#"{"abi":[{"type":"function","name":"balanceOf","inputs":[{"name":"who","type":"address"}],"outputs":[{"type":"uint256"}],"stateMutability":"view"}]}"#;

    fn write(root: &Path, path: &str, contents: &str) -> PathBuf {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn module(path: &str) -> GeneratedFile {
        GeneratedFile { path: PathBuf::from(path), contents: String::new() }
    }

    #[test]
    fn skips_artifacts_without_abi() {
        let gen = Web3Abigen::default().out_dir("/out");
        for contents in [
            r#"{"bytecode":"0x00"}"#,
            r#"{"abi":[]}"#,
            "[]",
            r#"{"abi":null}"#,
            "42",
            r#"{"abi":{"not":"an array"}}"#,
        ] {
            assert_eq!(gen.transform_file(Path::new("/in/Empty.json"), contents).unwrap(), None);
        }
    }

    #[test]
    fn mirrors_hardhat_layout() {
        let gen = Web3Abigen::default()
            .out_dir("/out")
            .input_dir("/artifacts/contracts")
            .add_file("/artifacts/contracts/tokens/Token.sol/Token.json")
            .add_file("/artifacts/contracts/Vault.sol/Vault.json");

        let file = gen
            .transform_file(Path::new("/artifacts/contracts/tokens/Token.sol/Token.json"), TOKEN)
            .unwrap()
            .unwrap();
        assert_eq!(file.path, PathBuf::from("/out/tokens/Token.ts"));
        assert!(file.contents.starts_with(HEADER));
        assert!(file.contents.contains(r#"from "../types";"#));
    }

    #[test]
    fn changing_the_inputs_moves_the_modules() {
        let gen = Web3Abigen::default().out_dir("/out").add_file("/artifacts/tokens/Token.json");
        let token = Path::new("/artifacts/tokens/Token.json");
        let file = gen.transform_file(token, TOKEN).unwrap().unwrap();
        assert_eq!(file.path, PathBuf::from("/out/Token.ts"));

        // the common root moves up once a sibling directory joins the run
        let gen = gen.add_file("/artifacts/vaults/Vault.json");
        let file = gen.transform_file(token, TOKEN).unwrap().unwrap();
        assert_eq!(file.path, PathBuf::from("/out/tokens/Token.ts"));

        let gen = gen.input_dir("/");
        let file = gen.transform_file(token, TOKEN).unwrap().unwrap();
        assert_eq!(file.path, PathBuf::from("/out/artifacts/tokens/Token.ts"));
    }

    #[test]
    fn distinguishes_syntax_from_shape_errors() {
        let gen = Web3Abigen::default();
        let err = gen.transform_file(Path::new("Broken.json"), "{").unwrap_err();
        assert!(matches!(err, AbigenError::SerdeJson(_)), "{err:?}");

        let shapeless = r#"[{"type":"function","inputs":[{"name":"a"}]}]"#;
        let err = gen.transform_file(Path::new("Broken.json"), shapeless).unwrap_err();
        assert!(matches!(err, AbigenError::MalformedArtifact { .. }), "{err:?}");
    }

    #[test]
    fn computes_barrels_from_generated_paths() {
        let gen = Web3Abigen::default().out_dir("/out");
        let files = gen.after_run(&[
            module("/out/Token.ts"),
            module("/out/tokens/vaults/Vault.ts"),
            module("/out/tokens/Wrapped.ts"),
            module("/out/tokens/Bridge.ts"),
        ]);
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/out/types.ts"),
                PathBuf::from("/out/index.ts"),
                PathBuf::from("/out/tokens/index.ts"),
                PathBuf::from("/out/tokens/vaults/index.ts"),
            ]
        );

        assert_eq!(
            files[1].contents,
            format!(
                r#"{HEADER}
import type * as tokens from "./tokens";

export type {{ tokens }};
export type {{ Token }} from "./Token";
"#
            )
        );
        assert_eq!(
            files[2].contents,
            format!(
                r#"{HEADER}
import type * as vaults from "./vaults";

export type {{ vaults }};
export type {{ Bridge }} from "./Bridge";
export type {{ Wrapped }} from "./Wrapped";
"#
            )
        );
        assert_eq!(
            files[3].contents,
            format!(
                r#"{HEADER}
export type {{ Vault }} from "./Vault";
"#
            )
        );
    }

    #[test]
    fn only_shared_types_without_modules() {
        let files = Web3Abigen::default().out_dir("/out").after_run(&[]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("/out/types.ts"));
    }

    #[test]
    fn can_generate_write_and_check() {
        let tmp = tempfile::tempdir().unwrap();
        let artifacts = tmp.path().join("artifacts");
        write(&artifacts, "Token.sol/Token.json", TOKEN);
        write(&artifacts, "nested/Pool.json", TOKEN);
        write(&artifacts, "Info.json", r#"{"bytecode":"0x"}"#);

        let out = tmp.path().join("types");
        let bindings = Web3Abigen::from_json_files(&artifacts).out_dir(&out).generate().unwrap();

        let expected: BTreeSet<PathBuf> = [
            out.join("Token.ts"),
            out.join("nested/Pool.ts"),
            out.join("types.ts"),
            out.join("index.ts"),
            out.join("nested/index.ts"),
        ]
        .into_iter()
        .collect();
        let paths: BTreeSet<PathBuf> = bindings.files().iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, expected);

        assert!(bindings.ensure_consistent().is_err());
        bindings.write().unwrap();
        bindings.ensure_consistent().unwrap();

        fs::write(out.join("Token.ts"), "stale").unwrap();
        match bindings.ensure_consistent().unwrap_err() {
            AbigenError::Inconsistent { path } => assert_eq!(path, out.join("Token.ts")),
            err => panic!("unexpected error {err}"),
        }
    }

    #[test]
    fn rejects_duplicate_outputs() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a/my-token.json", TOKEN);
        write(tmp.path(), "a/my token.json", TOKEN);

        let err = Web3Abigen::from_json_files(tmp.path())
            .out_dir(tmp.path().join("out"))
            .generate()
            .unwrap_err();
        assert!(matches!(err, AbigenError::DuplicateOutput(_)), "{err:?}");
    }

    #[test]
    fn fatal_errors_write_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "artifacts/A.json", TOKEN);
        write(tmp.path(), "artifacts/B.json", "{ not json");
        let out = tmp.path().join("out");

        let result =
            Web3Abigen::from_json_files(tmp.path().join("artifacts")).out_dir(&out).generate();
        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn deserializes_config() {
        let config: Config = serde_json::from_str(
            r#"{"cwd":"/project","outDir":"generated","allFiles":["/project/a/A.json"],"prettier":true}"#,
        )
        .unwrap();
        assert_eq!(config.input_dir, None);
        assert!(config.prettier);

        let gen = Web3Abigen::new(config);
        assert_eq!(gen.out_dir_path(), PathBuf::from("/project/generated"));
        assert_eq!(
            Web3Abigen::new(Config { cwd: "/project".into(), ..Default::default() }).out_dir_path(),
            PathBuf::from("/project/types/web3-bignumber/")
        );
    }
}
