#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! # web3-typegen
//!
//! Generates type-safe TypeScript bindings for [web3.js](https://github.com/web3/web3.js)
//! contracts from compiled ABI artifacts, with on-chain integers typed through
//! [bignumber.js](https://github.com/MikeMcl/bignumber.js).
//!
//! # Quickstart
//!
//! Point the generator at the artifacts of a hardhat project and write the bindings next to it:
//!
//! ```no_run
//! use web3_typegen::Web3Abigen;
//!
//! let bindings = Web3Abigen::from_json_files("./artifacts/contracts")
//!     .out_dir("./types/web3-bignumber")
//!     .generate()
//!     .unwrap();
//! bindings.write().unwrap();
//! ```
//!
//! Every artifact with an ABI becomes one `{Name}.ts` module in the same relative directory,
//! each directory gets a type-only `index.ts` barrel and the output root gets the shared
//! `types.ts` all modules import from.
//!
//! Artifacts without ABI are skipped. Malformed JSON, unreadable files and overloads that
//! collide on their signature abort the whole run before anything is written.

/// Code generation, see [`web3_typegen_abigen`] for details
pub mod abigen {
    pub use web3_typegen_abigen::*;
}

pub use web3_typegen_abigen::{
    AbigenError, Bindings, Config, GeneratedFile, Result, Web3Abigen, DEFAULT_OUT_DIR,
};
