mod common;
mod events;
mod methods;
pub mod types;

use crate::{
    error::{AbigenError, Result},
    rawabi::{Documentation, FunctionDoc, Item, RawAbi},
    ts::{Declaration, Module},
    util,
};
use std::{
    collections::HashSet,
    fmt,
    path::{Component, Path},
};
use types::{canonical_signature, signature_symbol, Param};

/// How a function interacts with the chain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateMutability {
    /// Reads nothing from the chain
    Pure,
    /// Only reads the chain
    View,
    /// Modifies the chain, rejects ether
    NonPayable,
    /// Modifies the chain, accepts ether
    Payable,
}

impl StateMutability {
    /// Resolves the mutability of an ABI item, falling back to the pre 0.4.16 `payable` and
    /// `constant` flags if `stateMutability` is missing.
    fn of(item: &Item) -> Self {
        match item.state_mutability.as_deref() {
            Some("pure") => StateMutability::Pure,
            Some("view") => StateMutability::View,
            Some("payable") => StateMutability::Payable,
            Some(_) => StateMutability::NonPayable,
            None if item.payable.unwrap_or_default() => StateMutability::Payable,
            None if item.constant.unwrap_or_default() => StateMutability::View,
            None => StateMutability::NonPayable,
        }
    }
}

/// A single function of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// The ABI name of the function
    pub name: String,
    /// The arguments, in declaration order
    pub inputs: Vec<Param>,
    /// The return values, in declaration order
    pub outputs: Vec<Param>,
    /// The mutability of the function
    pub state_mutability: StateMutability,
    /// NatSpec documentation, if the artifact carried any for this function
    pub documentation: Option<FunctionDoc>,
}

impl FunctionDescriptor {
    fn from_item(item: &Item, documentation: Option<&Documentation>) -> Self {
        let name = item.name.clone().unwrap_or_default();
        let inputs: Vec<Param> = item.inputs.iter().map(Param::from_component).collect();
        let documentation = documentation
            .and_then(|docs| docs.function(&canonical_signature(&name, &inputs)))
            .filter(|doc| !doc.is_empty())
            .cloned();
        Self {
            outputs: item.outputs.iter().map(Param::from_component).collect(),
            state_mutability: StateMutability::of(item),
            name,
            inputs,
            documentation,
        }
    }

    /// The canonical signature, `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }
}

/// A single event of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    /// The ABI name of the event
    pub name: String,
    /// The event parameters, in declaration order
    pub inputs: Vec<Param>,
    /// Anonymous events have no signature topic
    pub is_anonymous: bool,
}

impl EventDescriptor {
    fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone().unwrap_or_default(),
            inputs: item.inputs.iter().map(Param::from_component).collect(),
            is_anonymous: item.anonymous.unwrap_or_default(),
        }
    }

    /// The canonical signature, `Transfer(address,address,uint256)`
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// The signature as an identifier, used to name the value type of an overloaded event
    pub fn signature_symbol(&self) -> String {
        signature_symbol(&self.name, &self.inputs)
    }
}

/// Items grouped by name, in order of first declaration, each group in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overloads<T> {
    groups: Vec<(String, Vec<T>)>,
}

impl<T> Default for Overloads<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<T> Overloads<T> {
    fn push(mut self, name: String, item: T) -> Self {
        match self.groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, group)) => group.push(item),
            None => self.groups.push((name, vec![item])),
        }
        self
    }

    /// Returns all overloads of `name`
    pub fn get(&self, name: &str) -> Option<&[T]> {
        self.groups.iter().find(|(n, _)| n == name).map(|(_, group)| group.as_slice())
    }

    /// Iterates over all `(name, overloads)` groups
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.groups.iter().map(|(name, group)| (name.as_str(), group.as_slice()))
    }

    /// The number of distinct names
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no items at all
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<T> FromIterator<(String, T)> for Overloads<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |acc, (name, item)| acc.push(name, item))
    }
}

/// Everything about one contract that is needed to generate its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    /// The name of the generated contract type
    pub name: String,
    /// The directories of the artifact, relative to the input root
    pub path: Vec<String>,
    /// All functions by name
    pub functions: Overloads<FunctionDescriptor>,
    /// All events by name
    pub events: Overloads<EventDescriptor>,
}

impl ContractDescriptor {
    /// Parses the ABI of the artifact at `path`, which is relative to the input root.
    ///
    /// Constructors, fallbacks and receive functions are ignored.
    pub fn parse(abi: &RawAbi, path: &Path, documentation: Option<&Documentation>) -> Result<Self> {
        let stem = path
            .file_stem()
            .ok_or_else(|| AbigenError::msg(format!("missing file name in {}", path.display())))?;
        let name = util::normalize_name(&stem.to_string_lossy())?;
        let path: Vec<String> = path
            .parent()
            .map(|dir| {
                dir.components()
                    .filter_map(|c| match c {
                        Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let functions: Overloads<FunctionDescriptor> = abi
            .iter()
            .filter(|item| item.type_field == "function")
            .map(|item| {
                let function = FunctionDescriptor::from_item(item, documentation);
                (function.name.clone(), function)
            })
            .collect();
        let events: Overloads<EventDescriptor> = abi
            .iter()
            .filter(|item| item.type_field == "event")
            .map(|item| {
                let event = EventDescriptor::from_item(item);
                (event.name.clone(), event)
            })
            .collect();

        let contract = Self { name, path, functions, events };
        contract.ensure_unique_signatures()?;
        contract.ensure_unique_type_names()?;
        Ok(contract)
    }

    /// Every overload must be addressable by its own signature string.
    fn ensure_unique_signatures(&self) -> Result<()> {
        let functions = self.functions.iter().flat_map(|(_, group)| group).map(|f| f.signature());
        ensure_unique(&self.name, functions)?;
        for (_, group) in self.events.iter() {
            ensure_unique(&self.name, group.iter().map(EventDescriptor::signature))?;
        }
        Ok(())
    }

    /// The contract interface and the event value types share the module scope with the imports.
    fn ensure_unique_type_names(&self) -> Result<()> {
        let events = self.events.iter().flat_map(|(_, group)| {
            group.iter().map(move |event| events::value_type_name(event, group.len() > 1))
        });
        let declared: Vec<String> = std::iter::once(self.name.clone()).chain(events).collect();
        if let Some(name) = declared.iter().find(|name| common::is_imported(name)) {
            return Err(AbigenError::ShadowedImport {
                contract: self.name.clone(),
                name: name.clone(),
            })
        }
        ensure_unique(&self.name, declared.into_iter())
    }

    /// The number of directories between the output root and the generated module
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

fn ensure_unique(contract: &str, signatures: impl Iterator<Item = String>) -> Result<()> {
    let mut seen = HashSet::new();
    for signature in signatures {
        if !seen.insert(signature.clone()) {
            return Err(AbigenError::SignatureCollision { contract: contract.to_string(), signature })
        }
    }
    Ok(())
}

/// Internal shared context for generating the bindings of one contract.
#[derive(Debug, Clone)]
pub struct Context {
    contract: ContractDescriptor,
}

impl Context {
    /// Creates a new context for the given contract
    pub fn new(contract: ContractDescriptor) -> Self {
        Self { contract }
    }

    /// The contract this context expands
    pub fn contract(&self) -> &ContractDescriptor {
        &self.contract
    }

    /// The name of the generated contract type
    pub fn contract_name(&self) -> &str {
        &self.contract.name
    }

    /// Expands the whole contract
    pub fn expand(&self) -> ExpandedContract {
        // 0. Imports
        let imports = common::imports(&common::types_import_path(self.contract.depth()));

        // 1. Declare the decoded value types of all events
        let events = self.events_declaration();

        // 2. Declare the contract interface with its methods and event listeners
        let contract = self.struct_declaration();

        ExpandedContract { imports, events, contract }
    }
}

/// The declarations of one expanded contract module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedContract {
    /// All type-only imports of the module
    pub imports: Vec<Declaration>,
    /// The decoded value type of every event
    pub events: Vec<Declaration>,
    /// The contract interface
    pub contract: Declaration,
}

impl ExpandedContract {
    /// Merges all declarations into a single module
    pub fn into_module(self) -> Module {
        let ExpandedContract { mut imports, events, contract } = self;
        imports.extend(events);
        imports.push(contract);
        Module::new(imports)
    }

    /// Renders the module source
    pub fn render(self) -> String {
        self.into_module().render()
    }
}

impl fmt::Display for ExpandedContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clone().render())
    }
}
