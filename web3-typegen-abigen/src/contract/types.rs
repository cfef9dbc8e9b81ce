//! Types expansion

use crate::{rawabi::Component, ts::TsType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static RE_UINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^uint(\d*)$").unwrap());
static RE_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^int(\d*)$").unwrap());
static RE_FIXED_BYTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^bytes(\d+)$").unwrap());
static RE_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)\[(\d*)\]$").unwrap());

/// A parameter of a function or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// The ABI name, `None` if the parameter is unnamed
    pub name: Option<String>,
    pub kind: EvmType,
    /// Whether this is an indexed event parameter
    pub indexed: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: EvmType) -> Self {
        let name = name.into();
        Self { name: (!name.is_empty()).then_some(name), kind, indexed: false }
    }

    /// Converts a raw ABI component, recursing into its tuple components.
    pub fn from_component(component: &Component) -> Self {
        Self {
            name: (!component.name.is_empty()).then(|| component.name.clone()),
            kind: EvmType::parse(&component.type_field, &component.components),
            indexed: component.indexed.unwrap_or_default(),
        }
    }

    /// The name or `""` if it's unnamed
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// All the ABI types the generator knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvmType {
    Integer { bits: usize },
    UInteger { bits: usize },
    Address,
    Boolean,
    String,
    /// `bytesN`
    Bytes { size: usize },
    /// `bytes`
    DynamicBytes,
    /// `function`, encoded like `bytes24`
    Function,
    /// `T[]` or `T[N]`
    Array { item: Box<EvmType>, size: Option<usize> },
    Tuple(Vec<Param>),
    /// A type tag this generator does not recognize, kept verbatim
    Unknown(String),
}

/// An omitted size is `None`, one that doesn't fit is an error
fn parse_size(digits: &str) -> Result<Option<usize>, std::num::ParseIntError> {
    if digits.is_empty() {
        Ok(None)
    } else {
        digits.parse().map(Some)
    }
}

impl EvmType {
    /// Parses a raw ABI `type` string, `components` are only used for tuples.
    ///
    /// This never fails, unrecognized types degrade to [`EvmType::Unknown`].
    pub fn parse(ty: &str, components: &[Component]) -> Self {
        let ty = ty.trim();
        if let Some(caps) = RE_ARRAY.captures(ty) {
            if let Ok(size) = parse_size(&caps[2]) {
                let item = EvmType::parse(&caps[1], components);
                return EvmType::Array { item: Box::new(item), size }
            }
        }
        if let Some(caps) = RE_UINT.captures(ty) {
            if let Ok(bits) = parse_size(&caps[1]) {
                return EvmType::UInteger { bits: bits.unwrap_or(256) }
            }
        }
        if let Some(caps) = RE_INT.captures(ty) {
            if let Ok(bits) = parse_size(&caps[1]) {
                return EvmType::Integer { bits: bits.unwrap_or(256) }
            }
        }
        if let Some(caps) = RE_FIXED_BYTES.captures(ty) {
            if let Ok(size) = caps[1].parse() {
                return EvmType::Bytes { size }
            }
        }
        match ty {
            "address" => EvmType::Address,
            "bool" => EvmType::Boolean,
            "string" => EvmType::String,
            "bytes" => EvmType::DynamicBytes,
            "function" => EvmType::Function,
            "tuple" => EvmType::Tuple(components.iter().map(Param::from_component).collect()),
            other => {
                tracing::warn!("unsupported ABI type `{other}`, falling back to `any`");
                EvmType::Unknown(other.to_string())
            }
        }
    }

    /// Whether the type is stored as a hash in the topics when used as an indexed event parameter
    pub fn is_reference_type(&self) -> bool {
        matches!(
            self,
            EvmType::String | EvmType::DynamicBytes | EvmType::Array { .. } | EvmType::Tuple(_)
        )
    }
}

/// The canonical ABI form of the type, tuples are expanded to `(a,b)`
impl fmt::Display for EvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvmType::Integer { bits } => write!(f, "int{bits}"),
            EvmType::UInteger { bits } => write!(f, "uint{bits}"),
            EvmType::Address => f.write_str("address"),
            EvmType::Boolean => f.write_str("bool"),
            EvmType::String => f.write_str("string"),
            EvmType::Bytes { size } => write!(f, "bytes{size}"),
            EvmType::DynamicBytes => f.write_str("bytes"),
            EvmType::Function => f.write_str("function"),
            EvmType::Array { item, size: Some(size) } => write!(f, "{item}[{size}]"),
            EvmType::Array { item, size: None } => write!(f, "{item}[]"),
            EvmType::Tuple(components) => {
                f.write_str("(")?;
                f.write_str(&signature_types(components))?;
                f.write_str(")")
            }
            EvmType::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Returns the canonical types of the params joined by a single comma.
pub(crate) fn signature_types(params: &[Param]) -> String {
    params.iter().map(|p| p.kind.to_string()).collect::<Vec<_>>().join(",")
}

/// Returns the canonical signature `name(type1,type2)` that identifies one overload.
pub fn canonical_signature(name: &str, params: &[Param]) -> String {
    format!("{name}({})", signature_types(params))
}

/// Returns an identifier safe form of the signature, `Transfer_address_uint256`.
pub(crate) fn signature_symbol(name: &str, params: &[Param]) -> String {
    let mut symbol = name.to_string();
    for param in params {
        symbol.push('_');
        push_symbol(&mut symbol, &param.kind);
    }
    symbol
}

fn push_symbol(out: &mut String, kind: &EvmType) {
    match kind {
        EvmType::Array { item, size } => {
            push_symbol(out, item);
            out.push_str("_array");
            if let Some(size) = size {
                out.push_str(&size.to_string());
            }
        }
        EvmType::Tuple(components) => {
            out.push_str("tuple");
            for component in components {
                out.push('_');
                push_symbol(out, &component.kind);
            }
            out.push_str("_end");
        }
        EvmType::Unknown(raw) => {
            out.extend(raw.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }))
        }
        other => out.push_str(&other.to_string()),
    }
}

/// Expands an ABI type to the TypeScript type accepted as a call argument.
pub fn expand_input(kind: &EvmType) -> TsType {
    match kind {
        EvmType::Integer { .. } | EvmType::UInteger { .. } => TsType::Union(vec![
            TsType::named("number"),
            TsType::string(),
            TsType::named("BigNumber"),
        ]),
        EvmType::Address | EvmType::String => TsType::string(),
        EvmType::Boolean => TsType::named("boolean"),
        EvmType::Bytes { .. } | EvmType::DynamicBytes | EvmType::Function => {
            TsType::Union(vec![TsType::string(), TsType::array(TsType::named("number"))])
        }
        EvmType::Array { item, .. } => TsType::array(expand_input(item)),
        EvmType::Tuple(components) => {
            TsType::Tuple(components.iter().map(|c| expand_input(&c.kind)).collect())
        }
        EvmType::Unknown(_) => TsType::any(),
    }
}

/// Expands an ABI type to the TypeScript type a decoded value has.
///
/// Integers are decimal strings, bytes are hex strings.
pub fn expand_output(kind: &EvmType) -> TsType {
    match kind {
        EvmType::Integer { .. } |
        EvmType::UInteger { .. } |
        EvmType::Address |
        EvmType::String |
        EvmType::Bytes { .. } |
        EvmType::DynamicBytes |
        EvmType::Function => TsType::string(),
        EvmType::Boolean => TsType::named("boolean"),
        EvmType::Array { item, .. } => TsType::array(expand_output(item)),
        EvmType::Tuple(components) => {
            TsType::Tuple(components.iter().map(|c| expand_output(&c.kind)).collect())
        }
        EvmType::Unknown(_) => TsType::any(),
    }
}

/// Expands a single ABI type to its `(input, output)` pair.
pub fn expand(kind: &EvmType) -> (TsType, TsType) {
    (expand_input(kind), expand_output(kind))
}

/// Expands a list of decoded values to a record that exposes every value by name, if it has one,
/// and by position.
pub(crate) fn expand_output_record(params: &[Param], expand: impl Fn(&Param) -> TsType) -> TsType {
    use crate::ts::PropertyKey;

    let named = params
        .iter()
        .filter_map(|p| p.name.as_ref().map(|name| (PropertyKey::ident(name.clone()), expand(p))));
    let positional =
        params.iter().enumerate().map(|(idx, p)| (PropertyKey::Index(idx), expand(p)));
    TsType::Object(named.chain(positional).collect())
}
