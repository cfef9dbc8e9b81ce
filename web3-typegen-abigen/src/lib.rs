#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Generates type-safe TypeScript bindings for web3.js contracts from compiled ABI artifacts.
//!
//! Every artifact becomes one module declaring the contract interface with its `methods` and
//! `events`, where integers are accepted as `number | string | BigNumber` and returned as decimal
//! strings. The modules mirror the layout of the artifacts and are tied together by type-only
//! barrel files and one shared `types.ts`.

#[cfg(test)]
#[allow(missing_docs)]
#[macro_use]
#[path = "test/macros.rs"]
mod test_macros;

/// Contains types to generate TypeScript bindings for a single contract
pub mod contract;
pub use contract::{
    types::{EvmType, Param},
    Context, ContractDescriptor, EventDescriptor, ExpandedContract, FunctionDescriptor,
    Overloads, StateMutability,
};

pub mod error;
pub use error::{AbigenError, AbigenIoError, Result};

pub mod rawabi;
pub use rawabi::RawAbi;

pub mod multi;
pub use multi::{Bindings, Config, GeneratedFile, Web3Abigen, DEFAULT_OUT_DIR};

pub mod shared_types;
pub mod ts;

mod prettier;
mod util;

pub use util::normalize_name;
