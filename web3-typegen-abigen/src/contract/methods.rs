use super::{
    types::{self, Param},
    Context, FunctionDescriptor, StateMutability,
};
use crate::{
    rawabi::FunctionDoc,
    ts::{DocComment, Member, MethodSignature, Parameter, PropertyKey, TsType},
    util,
};

/// Expands a context into the members of the `methods` namespace of the contract.
impl Context {
    /// Expands all functions, in declaration order
    pub(crate) fn methods(&self) -> Vec<Member> {
        self.contract
            .functions
            .iter()
            .flat_map(|(_, group)| expand_group(group))
            .map(Member::Method)
            .collect()
    }
}

/// A lone function is keyed by its name, overloads are keyed by their full signature so that
/// callers have to pick one explicitly.
fn expand_group(group: &[FunctionDescriptor]) -> Vec<MethodSignature> {
    match group {
        [function] => vec![expand_function(function, PropertyKey::ident(function.name.clone()))],
        overloads => overloads
            .iter()
            .map(|function| expand_function(function, PropertyKey::Quoted(function.signature())))
            .collect(),
    }
}

fn expand_function(function: &FunctionDescriptor, key: PropertyKey) -> MethodSignature {
    let params = expand_inputs(&function.inputs);
    let returns = TsType::generic(transaction_object(function), expand_outputs(&function.outputs));
    let doc = function.documentation.as_ref().and_then(|doc| expand_doc(doc, &function.inputs));
    MethodSignature::new(key, params, returns).with_doc(doc)
}

/// Expands the arguments, unnamed ones are named after their position
pub(crate) fn expand_inputs(inputs: &[Param]) -> Vec<Parameter> {
    inputs
        .iter()
        .enumerate()
        .map(|(idx, param)| {
            Parameter::new(
                util::expand_input_name(idx, param.name_or_empty()),
                types::expand_input(&param.kind),
            )
        })
        .collect()
}

/// Expands the type a call resolves to
pub(crate) fn expand_outputs(outputs: &[Param]) -> TsType {
    match outputs {
        // an empty record would read as a value, there is none
        [] => TsType::void(),
        [output] => types::expand_output(&output.kind),
        outputs => types::expand_output_record(outputs, |p| types::expand_output(&p.kind)),
    }
}

/// Only payable functions accept a `value`, `call` vs `send` is up to the caller
fn transaction_object(function: &FunctionDescriptor) -> &'static str {
    match function.state_mutability {
        StateMutability::Payable => "PayableTransactionObject",
        StateMutability::Pure | StateMutability::View | StateMutability::NonPayable => {
            "NonPayableTransactionObject"
        }
    }
}

fn expand_doc(doc: &FunctionDoc, inputs: &[Param]) -> Option<DocComment> {
    let mut lines = Vec::new();
    lines.extend(doc.details.clone());
    lines.extend(doc.notice.clone());

    // documented params follow the argument order, leftovers come last
    let ordered = inputs.iter().filter_map(|p| p.name.as_deref());
    let leftover = doc.params.keys().map(String::as_str).filter(|name| {
        !inputs.iter().any(|p| p.name.as_deref() == Some(*name))
    });
    for name in ordered.chain(leftover) {
        if let Some(text) = doc.params.get(name) {
            lines.push(format!("@param {name} {text}"));
        }
    }

    lines.extend(doc.returns.iter().map(|text| format!("@returns {text}")));
    DocComment::new(lines)
}
