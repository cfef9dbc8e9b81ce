use super::{types, Context, EventDescriptor};
use crate::ts::{Declaration, Member, MethodSignature, Parameter, PropertyKey, TsType};

/// Expands the events of a contract.
///
/// Every event gets a decoded value type, a pair of subscription signatures in the `events`
/// namespace and, if it can be told apart by its name alone, a pair of `once` listeners on the
/// contract itself.
impl Context {
    /// Declares the decoded value type of every event
    pub(crate) fn events_declaration(&self) -> Vec<Declaration> {
        self.contract
            .events
            .iter()
            .flat_map(|(_, group)| group.iter().map(move |event| (event, group.len() > 1)))
            .map(|(event, overloaded)| Declaration::TypeAlias {
                name: value_type_name(event, overloaded),
                ty: TsType::generic("ContractEventLog", expand_event_values(event)),
            })
            .collect()
    }

    /// The members of the `events` namespace, `allEvents` last
    pub(crate) fn event_methods(&self) -> Vec<Member> {
        let mut members: Vec<Member> = self
            .contract
            .events
            .iter()
            .flat_map(|(_, group)| expand_subscriptions(group))
            .map(Member::Method)
            .collect();
        members.push(Member::Method(MethodSignature::new(
            PropertyKey::ident("allEvents"),
            vec![
                Parameter::optional("options", TsType::named("EventOptions")),
                Parameter::optional("cb", TsType::generic("Callback", TsType::named("EventLog"))),
            ],
            TsType::named("EventEmitter"),
        )));
        members
    }

    /// The `once` listeners of all events that have a unique name and a signature topic
    pub(crate) fn once_methods(&self) -> Vec<Member> {
        self.contract
            .events
            .iter()
            .filter_map(|(_, group)| match group {
                [event] if !event.is_anonymous => Some(event),
                _ => None,
            })
            .flat_map(expand_once)
            .map(Member::Method)
            .collect()
    }
}

/// Overloaded events are named after their signature, since they share the event name
pub(crate) fn value_type_name(event: &EventDescriptor, overloaded: bool) -> String {
    if overloaded {
        event.signature_symbol()
    } else {
        event.name.clone()
    }
}

/// Expands the decoded values of an event, addressable by name and by position
fn expand_event_values(event: &EventDescriptor) -> TsType {
    types::expand_output_record(&event.inputs, |param| {
        // indexed reference types can't be recovered from their topic, only the hash can
        if param.indexed && param.kind.is_reference_type() {
            TsType::string()
        } else {
            types::expand_output(&param.kind)
        }
    })
}

fn expand_subscriptions(group: &[EventDescriptor]) -> Vec<MethodSignature> {
    let overloaded = group.len() > 1;
    group
        .iter()
        .flat_map(|event| {
            let key = if overloaded {
                PropertyKey::Quoted(event.signature())
            } else {
                PropertyKey::ident(event.name.clone())
            };
            let value = TsType::named(value_type_name(event, overloaded));
            let callback = TsType::generic("Callback", value.clone());
            let emitter = TsType::generic("ContractEventEmitter", value);
            [
                MethodSignature::new(
                    key.clone(),
                    vec![Parameter::optional("cb", callback.clone())],
                    emitter.clone(),
                ),
                MethodSignature::new(
                    key,
                    vec![
                        Parameter::optional("options", TsType::named("EventOptions")),
                        Parameter::optional("cb", callback),
                    ],
                    emitter,
                ),
            ]
        })
        .collect()
}

fn expand_once(event: &EventDescriptor) -> [MethodSignature; 2] {
    let name = TsType::StringLiteral(event.name.clone());
    let callback = TsType::generic("Callback", TsType::named(event.name.clone()));
    [
        MethodSignature::new(
            PropertyKey::ident("once"),
            vec![Parameter::new("event", name.clone()), Parameter::new("cb", callback.clone())],
            TsType::void(),
        ),
        MethodSignature::new(
            PropertyKey::ident("once"),
            vec![
                Parameter::new("event", name),
                Parameter::new("options", TsType::named("EventOptions")),
                Parameter::new("cb", callback),
            ],
            TsType::void(),
        ),
    ]
}
