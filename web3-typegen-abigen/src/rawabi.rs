//! This is a basic representation of a compiled artifact that does no post processing but contains
//! the raw content of the ABI and of its NatSpec documentation.

#![allow(missing_docs)]
use serde::{
    de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Contract ABI as a list of items where each item can be a function, constructor or event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAbi(Vec<Item>);

impl RawAbi {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }
}

impl From<Vec<Item>> for RawAbi {
    fn from(items: Vec<Item>) -> Self {
        Self(items)
    }
}

impl IntoIterator for RawAbi {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RawAbi {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub inputs: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    #[serde(rename = "type", default)]
    pub type_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub outputs: Vec<Component>,
    // required to satisfy solidity events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
    // pre 0.4.16 mutability flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
}

/// Either an input/output or a nested component of an input/output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "internalType", default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_field: String,
    #[serde(default)]
    pub components: Vec<Component>,
    /// Indexed flag. for solidity events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
}

/// `devdoc` section of a solc artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub methods: BTreeMap<String, MethodDevDoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDevDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Legacy single return description
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_: Option<String>,
    #[serde(default)]
    pub returns: BTreeMap<String, String>,
}

/// `userdoc` section of a solc artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(default)]
    pub methods: BTreeMap<String, MethodUserDoc>,
}

/// Older compilers emit a bare string for some entries, like the constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodUserDoc {
    Notice {
        #[serde(default)]
        notice: Option<String>,
    },
    Text(String),
}

impl MethodUserDoc {
    pub fn notice(&self) -> Option<&str> {
        match self {
            MethodUserDoc::Notice { notice } => notice.as_deref(),
            MethodUserDoc::Text(text) => Some(text),
        }
    }
}

/// The NatSpec documentation of a single function, with `devdoc` and `userdoc` merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionDoc {
    pub details: Option<String>,
    pub notice: Option<String>,
    pub params: BTreeMap<String, String>,
    pub returns: Vec<String>,
}

impl FunctionDoc {
    pub fn is_empty(&self) -> bool {
        self.details.is_none() &&
            self.notice.is_none() &&
            self.params.is_empty() &&
            self.returns.is_empty()
    }
}

/// The merged documentation of a contract, keyed by canonical function signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    pub notice: Option<String>,
    pub methods: BTreeMap<String, FunctionDoc>,
}

impl Documentation {
    /// Returns the docs of the function with the given canonical signature, if any
    pub fn function(&self, signature: &str) -> Option<&FunctionDoc> {
        self.methods.get(signature)
    }

    fn merge(devdoc: Option<DevDoc>, userdoc: Option<UserDoc>) -> Option<Self> {
        if devdoc.is_none() && userdoc.is_none() {
            return None
        }
        let mut docs = Documentation::default();

        for (signature, method) in devdoc.map(|d| d.methods).unwrap_or_default() {
            let MethodDevDoc { details, params, return_, returns } = method;
            let returns = return_.into_iter().chain(returns.into_values()).collect();
            docs.methods
                .insert(signature, FunctionDoc { details, notice: None, params, returns });
        }

        if let Some(userdoc) = userdoc {
            docs.notice = userdoc.notice;
            for (signature, method) in userdoc.methods {
                let notice = method.notice().map(str::to_string);
                docs.methods.entry(signature).or_default().notice = notice;
            }
        }

        Some(docs)
    }
}

/// Everything the generator needs from one compiled artifact file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawArtifact {
    /// The ABI, `None` if the artifact does not carry one
    pub abi: Option<RawAbi>,
    pub documentation: Option<Documentation>,
}

impl RawArtifact {
    /// Returns the ABI if it exists and is not empty.
    ///
    /// An artifact without ABI is not an error, it is simply skipped.
    pub fn non_empty_abi(&self) -> Option<&RawAbi> {
        self.abi.as_ref().filter(|abi| !abi.is_empty())
    }
}

/// Decodes the items of an `abi` value. Anything but an array means there is no ABI.
fn abi_items<E: de::Error>(value: Value) -> Result<Option<Vec<Item>>, E> {
    match value {
        Value::Array(_) => Vec::<Item>::deserialize(value).map(Some).map_err(E::custom),
        _ => Ok(None),
    }
}

/// `{ "compilerOutput": { "abi": [...] } }` as emitted by some toolchains
fn compiler_output_items<E: de::Error>(value: Value) -> Result<Option<Vec<Item>>, E> {
    match value {
        Value::Object(mut output) => output.remove("abi").map_or(Ok(None), abi_items),
        _ => Ok(None),
    }
}

struct RawArtifactVisitor;

impl<'de> Visitor<'de> for RawArtifactVisitor {
    type Value = RawArtifact;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence or map with `abi` key")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut vec = Vec::new();

        while let Some(element) = seq.next_element()? {
            vec.push(element);
        }

        Ok(RawArtifact { abi: Some(RawAbi(vec)), documentation: None })
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut abi = None;
        let mut compiler_output_abi = None;
        let mut devdoc = None;
        let mut userdoc = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "abi" => abi = abi_items::<A::Error>(map.next_value()?)?,
                "compilerOutput" => {
                    compiler_output_abi = compiler_output_items::<A::Error>(map.next_value()?)?
                }
                "devdoc" => devdoc = map.next_value::<Option<DevDoc>>()?,
                "userdoc" => userdoc = map.next_value::<Option<UserDoc>>()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(RawArtifact {
            abi: abi.or(compiler_output_abi).map(RawAbi),
            documentation: Documentation::merge(devdoc, userdoc),
        })
    }

    // any other json value is a valid document that simply has no abi

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawArtifact::default())
    }

    fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawArtifact::default())
    }

    fn visit_i64<E>(self, _: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawArtifact::default())
    }

    fn visit_u64<E>(self, _: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawArtifact::default())
    }

    fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawArtifact::default())
    }

    fn visit_str<E>(self, _: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawArtifact::default())
    }
}

impl<'de> Deserialize<'de> for RawArtifact {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawArtifactVisitor)
    }
}

/// Extracts the ABI and documentation from the raw contents of an artifact file.
pub fn extract(contents: &str) -> serde_json::Result<RawArtifact> {
    serde_json::from_str(contents)
}

/// Returns the non-empty ABI of the artifact, or `None` if there is nothing to generate.
pub fn extract_abi(contents: &str) -> serde_json::Result<Option<RawAbi>> {
    Ok(extract(contents)?.abi.filter(|abi| !abi.is_empty()))
}
