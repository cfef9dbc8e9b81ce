use crate::{fixtures, init_tracing};
use pretty_assertions::assert_eq;
use std::{fs, path::Path};
use web3_typegen::{abigen::shared_types, AbigenError, Bindings, Config, Web3Abigen};

fn generate(out: &Path) -> eyre::Result<Bindings> {
    init_tracing();
    Ok(Web3Abigen::from_json_files(fixtures().join("artifacts")).out_dir(out).generate()?)
}

fn contents<'a>(bindings: &'a Bindings, path: &Path) -> &'a str {
    match bindings.get(path) {
        Some(file) => &file.contents,
        None => panic!("{} was not generated", path.display()),
    }
}

#[test]
fn mirrors_artifact_tree() -> eyre::Result<()> {
    let tmp = tempfile::tempdir()?;
    let out = tmp.path().join("types");
    let bindings = generate(&out)?;

    let mut paths: Vec<_> = bindings
        .files()
        .iter()
        .map(|file| file.path.strip_prefix(&out).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "contracts/Token.ts",
            "contracts/index.ts",
            "contracts/vaults/Vault.ts",
            "contracts/vaults/index.ts",
            "index.ts",
            "legacy/Wallet.ts",
            "legacy/index.ts",
            "types.ts",
        ]
    );
    Ok(())
}

#[test]
fn generates_token_module() -> eyre::Result<()> {
    let tmp = tempfile::tempdir()?;
    let out = tmp.path().join("types");
    let bindings = generate(&out)?;

    let expected = fs::read_to_string(fixtures().join("expected/Token.ts"))?;
    assert_eq!(contents(&bindings, &out.join("contracts/Token.ts")), expected);
    Ok(())
}

#[test]
fn generates_vault_module() -> eyre::Result<()> {
    let tmp = tempfile::tempdir()?;
    let out = tmp.path().join("types");
    let bindings = generate(&out)?;
    let vault = contents(&bindings, &out.join("contracts/vaults/Vault.ts"));

    for line in [
        r#"} from "../../types";"#,
        "export type Deposit_address = ContractEventLog<{ who: string; 0: string }>;",
        "export type Deposit_address_uint256 = ContractEventLog<{ who: string; amount: string; 0: string; 1: string }>;",
        "export type Labeled = ContractEventLog<{ label: string; ids: string[]; 0: string; 1: string[] }>;",
        "    deposit(amount: number | string | BigNumber): PayableTransactionObject<void>;",
        "    position(): NonPayableTransactionObject<[string, string]>;",
        "    rate(): NonPayableTransactionObject<any>;",
        "    batch(ids: (number | string | BigNumber)[], callback: string | number[]): NonPayableTransactionObject<void>;",
        r#"    "Deposit(address)"(cb?: Callback<Deposit_address>): ContractEventEmitter<Deposit_address>;"#,
        r#"    "Deposit(address,uint256)"(options?: EventOptions, cb?: Callback<Deposit_address_uint256>): ContractEventEmitter<Deposit_address_uint256>;"#,
        r#"  once(event: "Labeled", cb: Callback<Labeled>): void;"#,
    ] {
        assert!(vault.contains(line), "missing `{line}` in\n{vault}");
    }
    // overloaded events have no once listeners
    assert_eq!(vault.matches("once(").count(), 2);
    assert!(!vault.contains("receive"));
    Ok(())
}

#[test]
fn generates_legacy_module_with_docs() -> eyre::Result<()> {
    let tmp = tempfile::tempdir()?;
    let out = tmp.path().join("types");
    let bindings = generate(&out)?;
    let wallet = contents(&bindings, &out.join("legacy/Wallet.ts"));

    let withdraw = r#"    /**
     * Reverts if the balance is too low
     * Withdraw ether
     * @param to receiver of the funds
     * @param amount amount in wei
     * @returns whether it worked and what is left
     */
    withdraw(to: string, amount: number | string | BigNumber): NonPayableTransactionObject<{ ok: boolean; remaining: string; 0: boolean; 1: string }>;
"#;
    assert!(wallet.contains(withdraw), "{wallet}");
    assert!(wallet.contains("    owner(): NonPayableTransactionObject<string>;\n"));
    assert!(wallet.contains("    deposit(): PayableTransactionObject<void>;\n"));
    assert!(wallet.contains("    Raw(cb?: Callback<Raw>): ContractEventEmitter<Raw>;\n"));
    // anonymous events can't be listened to once
    assert!(!wallet.contains("once("));
    Ok(())
}

#[test]
fn generates_barrels_and_shared_types() -> eyre::Result<()> {
    let tmp = tempfile::tempdir()?;
    let out = tmp.path().join("types");
    let bindings = generate(&out)?;

    assert_eq!(contents(&bindings, &out.join("types.ts")), shared_types::source());
    assert_eq!(
        contents(&bindings, &out.join("index.ts")),
        r#"/* Autogenerated file. Do not edit manually. */
/* tslint:disable */
/* eslint-disable */

import type * as contracts from "./contracts";
import type * as legacy from "./legacy";

export type { contracts };
export type { legacy };
"#
    );
    assert_eq!(
        contents(&bindings, &out.join("contracts/index.ts")),
        r#"/* Autogenerated file. Do not edit manually. */
/* tslint:disable */
/* eslint-disable */

import type * as vaults from "./vaults";

export type { vaults };
export type { Token } from "./Token";
"#
    );
    Ok(())
}

#[test]
fn generation_is_idempotent() -> eyre::Result<()> {
    let tmp = tempfile::tempdir()?;
    let out = tmp.path().join("types");

    let first = generate(&out)?;
    first.write()?;
    let second = generate(&out)?;
    assert_eq!(first, second);
    second.ensure_consistent()?;

    for file in second.files() {
        assert_eq!(fs::read_to_string(&file.path)?, file.contents);
    }
    Ok(())
}

#[test]
fn stale_bindings_are_detected() -> eyre::Result<()> {
    let tmp = tempfile::tempdir()?;
    let out = tmp.path().join("types");
    let bindings = generate(&out)?;
    bindings.write()?;

    fs::remove_file(out.join("legacy/index.ts"))?;
    match bindings.ensure_consistent() {
        Err(AbigenError::Inconsistent { path }) => assert_eq!(path, out.join("legacy/index.ts")),
        other => panic!("expected inconsistency, got {other:?}"),
    }
    Ok(())
}

#[test]
fn artifacts_without_abi_produce_nothing() -> eyre::Result<()> {
    init_tracing();
    let dbg = fixtures().join("artifacts/contracts/Token.sol/Token.dbg.json");
    let gen = Web3Abigen::default().out_dir("/out").add_file(&dbg);

    let generated = gen.transform_file(&dbg, &fs::read_to_string(&dbg)?)?;
    assert_eq!(generated, None);

    // only the shared types remain
    let bindings = gen.generate()?;
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings.files()[0].path, Path::new("/out/types.ts"));
    Ok(())
}

#[test]
fn runs_from_toolchain_config() -> eyre::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let config = serde_json::json!({
        "cwd": fixtures(),
        "outDir": tmp.path().join("generated"),
        "allFiles": [
            "artifacts/contracts/Token.sol/Token.json",
            "artifacts/legacy/Wallet.json",
        ],
    });
    let config: Config = serde_json::from_value(config)?;
    let bindings = Web3Abigen::new(config).generate()?;

    // the common ancestor of all files is the input root
    let out = tmp.path().join("generated");
    assert!(bindings.get(out.join("contracts/Token.ts")).is_some());
    assert!(bindings.get(out.join("legacy/Wallet.ts")).is_some());
    assert!(bindings.get(out.join("index.ts")).is_some());
    Ok(())
}

#[test]
fn malformed_artifacts_abort_the_run() -> eyre::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let artifacts = tmp.path().join("artifacts");
    fs::create_dir_all(&artifacts)?;
    fs::copy(fixtures().join("artifacts/legacy/Wallet.json"), artifacts.join("Wallet.json"))?;
    let shapeless = r#"{"abi": [{"type": "function", "inputs": [{"name": "x"}]}]}"#;
    fs::write(artifacts.join("Broken.json"), shapeless)?;

    let out = tmp.path().join("types");
    let err = Web3Abigen::from_json_files(&artifacts).out_dir(&out).generate().unwrap_err();
    assert!(matches!(err, AbigenError::MalformedArtifact { .. }), "{err}");
    assert!(!out.exists());
    Ok(())
}

#[test]
fn unreadable_artifacts_abort_the_run() -> eyre::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let missing = tmp.path().join("nope.json");
    let out = tmp.path().join("types");

    let err = Web3Abigen::default()
        .add_file(fixtures().join("artifacts/legacy/Wallet.json"))
        .add_file(&missing)
        .out_dir(&out)
        .generate()
        .unwrap_err();
    match err {
        AbigenError::Io(err) => assert!(err.path().ends_with("nope.json"), "{err}"),
        err => panic!("unexpected error {err}"),
    }
    assert!(!out.exists());
    Ok(())
}

#[test]
fn write_fails_if_the_output_root_is_a_file() -> eyre::Result<()> {
    let tmp = tempfile::tempdir()?;
    let out = tmp.path().join("types");
    fs::write(&out, "not a directory")?;

    let bindings = generate(&out)?;
    match bindings.write().unwrap_err() {
        AbigenError::Io(err) => assert!(err.path().starts_with(&out), "{err}"),
        err => panic!("unexpected error {err}"),
    }
    assert_eq!(fs::read_to_string(&out)?, "not a directory");
    Ok(())
}
