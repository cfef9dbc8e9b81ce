use super::Context;
use crate::ts::{
    Declaration, ImportClause, Member, MethodSignature, Parameter, PropertyKey, TsType,
};

/// The runtime types every contract module imports from the shared `types.ts`
const SHARED_TYPES: &[&str] = &[
    "Callback",
    "PayableTransactionObject",
    "NonPayableTransactionObject",
    "ContractEventLog",
    "ContractEventEmitter",
    "EventOptions",
    "BaseContract",
];

/// The types imported from packages, keyed by their module
const PACKAGE_TYPES: &[(&str, &str)] = &[
    ("ContractOptions", "web3-eth-contract"),
    ("EventLog", "web3-core"),
    ("EventEmitter", "events"),
];

/// Whether a generated declaration named `name` would clash with an import
pub(crate) fn is_imported(name: &str) -> bool {
    name == "BigNumber" ||
        PACKAGE_TYPES.iter().any(|(ty, _)| *ty == name) ||
        SHARED_TYPES.contains(&name)
}

/// Returns the import path of the shared `types.ts` from a module `depth` directories below the
/// output root
pub(crate) fn types_import_path(depth: usize) -> String {
    if depth == 0 {
        "./types".to_string()
    } else {
        format!("{}types", "../".repeat(depth))
    }
}

/// Returns all the type-only imports a contract module needs
pub(crate) fn imports(types_path: &str) -> Vec<Declaration> {
    let named = |names: &[&str], from: &str| Declaration::Import {
        clause: ImportClause::Named(names.iter().map(|n| n.to_string()).collect()),
        from: from.to_string(),
    };
    let mut imports = vec![Declaration::Import {
        clause: ImportClause::Default("BigNumber".to_string()),
        from: "bignumber.js".to_string(),
    }];
    imports.extend(PACKAGE_TYPES.iter().map(|&(ty, from)| named(&[ty], from)));
    imports.push(named(SHARED_TYPES, types_path));
    imports
}

impl Context {
    /// Generates the contract interface: constructor, `methods`, `events` and the `once`
    /// listeners
    pub(crate) fn struct_declaration(&self) -> Declaration {
        let name = self.contract_name().to_string();
        let this = TsType::named(name.clone());

        let mut members = vec![
            Member::Method(MethodSignature::new(
                PropertyKey::ident("constructor"),
                vec![
                    Parameter::new("jsonInterface", TsType::array(TsType::any())),
                    Parameter::optional("address", TsType::string()),
                    Parameter::optional("options", TsType::named("ContractOptions")),
                ],
                this.clone(),
            )),
            Member::Method(MethodSignature::new(PropertyKey::ident("clone"), vec![], this)),
            Member::Namespace { key: "methods".to_string(), members: self.methods() },
            Member::Namespace { key: "events".to_string(), members: self.event_methods() },
        ];

        let once = self.once_methods();
        if !once.is_empty() {
            members.push(Member::Blank);
            members.extend(once);
        }

        Declaration::Interface { name, extends: Some("BaseContract".to_string()), members }
    }
}
