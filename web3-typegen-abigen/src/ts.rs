//! A small typed representation of the TypeScript declarations the generator emits.
//!
//! Code generation first builds these declarations and only renders them to text in one final
//! pass, so the expansion logic never has to care about formatting.

use std::fmt::{self, Write as _};

/// The banner every generated file starts with.
pub const HEADER: &str = "/* Autogenerated file. Do not edit manually. */\n/* tslint:disable */\n/* eslint-disable */\n";

const INDENT: &str = "  ";

/// A TypeScript type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    /// A plain named type, like `string` or `BigNumber`
    Named(String),
    /// An instantiated generic type, like `Callback<Transfer>`
    Generic(String, Vec<TsType>),
    /// `A | B | C`
    Union(Vec<TsType>),
    /// `T[]`
    Array(Box<TsType>),
    /// A fixed length, positional `[A, B]`
    Tuple(Vec<TsType>),
    /// An inline object type, `{ a: A; 0: A }`
    Object(Vec<(PropertyKey, TsType)>),
    /// A string literal type, `"Transfer"`
    StringLiteral(String),
}

impl TsType {
    /// Shorthand for [`TsType::Named`]
    pub fn named(name: impl Into<String>) -> Self {
        TsType::Named(name.into())
    }

    /// Shorthand for a generic type with a single argument
    pub fn generic(name: impl Into<String>, arg: TsType) -> Self {
        TsType::Generic(name.into(), vec![arg])
    }

    /// `any`
    pub fn any() -> Self {
        TsType::named("any")
    }

    /// `string`
    pub fn string() -> Self {
        TsType::named("string")
    }

    /// `void`
    pub fn void() -> Self {
        TsType::named("void")
    }

    /// `T[]`
    pub fn array(item: TsType) -> Self {
        TsType::Array(Box::new(item))
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TsType::Named(name) => f.write_str(name),
            TsType::Generic(name, args) => {
                write!(f, "{name}<")?;
                write_joined(f, args, ", ")?;
                f.write_str(">")
            }
            TsType::Union(members) => write_joined(f, members, " | "),
            TsType::Array(item) => match **item {
                TsType::Union(_) => write!(f, "({item})[]"),
                _ => write!(f, "{item}[]"),
            },
            TsType::Tuple(items) => {
                f.write_str("[")?;
                write_joined(f, items, ", ")?;
                f.write_str("]")
            }
            TsType::Object(fields) => {
                if fields.is_empty() {
                    return f.write_str("{}")
                }
                f.write_str("{ ")?;
                for (idx, (key, ty)) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{key}: {ty}")?;
                }
                f.write_str(" }")
            }
            TsType::StringLiteral(s) => write_string_literal(f, s),
        }
    }
}

/// The key of an object member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    /// A bare identifier key
    Ident(String),
    /// A numeric key, used for positional access
    Index(usize),
    /// A quoted key, used when the key is not a valid identifier, like a full signature
    Quoted(String),
}

impl PropertyKey {
    /// Shorthand for [`PropertyKey::Ident`]
    pub fn ident(name: impl Into<String>) -> Self {
        PropertyKey::Ident(name.into())
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Ident(name) => f.write_str(name),
            PropertyKey::Index(idx) => write!(f, "{idx}"),
            PropertyKey::Quoted(key) => write_string_literal(f, key),
        }
    }
}

/// A single parameter of a method signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

impl Parameter {
    /// A required parameter
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self { name: name.into(), ty, optional: false }
    }

    /// An optional `name?: ty` parameter
    pub fn optional(name: impl Into<String>, ty: TsType) -> Self {
        Self { name: name.into(), ty, optional: true }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let optional = if self.optional { "?" } else { "" };
        write!(f, "{}{optional}: {}", self.name, self.ty)
    }
}

/// The lines of a `/** ... */` doc comment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment(pub Vec<String>);

impl DocComment {
    /// Returns `None` if there are no lines to document
    pub fn new(lines: Vec<String>) -> Option<Self> {
        (!lines.is_empty()).then_some(Self(lines))
    }

    fn render(&self, out: &mut Renderer) {
        out.line("/**");
        for line in self.0.iter().flat_map(|l| l.lines()) {
            let line = line.trim_end().replace("*/", "*\\/");
            if line.is_empty() {
                out.line(" *");
            } else {
                out.line(&format!(" * {line}"));
            }
        }
        out.line(" */");
    }
}

/// A method signature, `key(params): returns;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub doc: Option<DocComment>,
    pub key: PropertyKey,
    pub params: Vec<Parameter>,
    pub returns: TsType,
}

impl MethodSignature {
    pub fn new(key: PropertyKey, params: Vec<Parameter>, returns: TsType) -> Self {
        Self { doc: None, key, params, returns }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: Option<DocComment>) -> Self {
        self.doc = doc;
        self
    }
}

/// A member of an interface or of a nested namespace object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Method(MethodSignature),
    /// `key: { ...members };`
    Namespace { key: String, members: Vec<Member> },
    /// An empty line between groups of members
    Blank,
}

impl Member {
    fn render(&self, out: &mut Renderer) {
        match self {
            Member::Method(method) => {
                if let Some(doc) = &method.doc {
                    doc.render(out);
                }
                let mut line = format!("{}(", method.key);
                let _ = write_joined(&mut line, &method.params, ", ");
                let _ = write!(line, "): {};", method.returns);
                out.line(&line);
            }
            Member::Namespace { key, members } => {
                out.line(&format!("{key}: {{"));
                out.indented(|out| render_members(members, out));
                out.line("};");
            }
            Member::Blank => out.blank(),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Renderer::default();
        self.render(&mut out);
        f.write_str(out.finish().trim_end())
    }
}

/// What an `import` statement binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportClause {
    /// `import type Name from "..."`
    Default(String),
    /// `import type { A, B } from "..."`
    Named(Vec<String>),
    /// `import type * as name from "..."`
    Namespace(String),
}

/// A top level declaration of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// A type-only import
    Import { clause: ImportClause, from: String },
    /// `export type Name = ty;`
    TypeAlias { name: String, ty: TsType },
    /// `export interface Name extends Base { ... }`
    Interface { name: String, extends: Option<String>, members: Vec<Member> },
    /// A type-only re-export, `export type { A, B }` optionally `from "..."`
    ReExport { names: Vec<String>, from: Option<String> },
}

impl Declaration {
    fn is_import(&self) -> bool {
        matches!(self, Declaration::Import { .. })
    }

    fn render(&self, out: &mut Renderer) {
        match self {
            Declaration::Import { clause, from } => {
                let clause = match clause {
                    ImportClause::Default(name) => name.clone(),
                    ImportClause::Named(names) => format!("{{ {} }}", names.join(", ")),
                    ImportClause::Namespace(name) => format!("* as {name}"),
                };
                out.line(&format!("import type {clause} from {};", quote(from)));
            }
            Declaration::TypeAlias { name, ty } => {
                out.line(&format!("export type {name} = {ty};"));
            }
            Declaration::Interface { name, extends, members } => {
                match extends {
                    Some(base) => out.line(&format!("export interface {name} extends {base} {{")),
                    None => out.line(&format!("export interface {name} {{")),
                }
                out.indented(|out| render_members(members, out));
                out.line("}");
            }
            Declaration::ReExport { names, from } => {
                let names = names.join(", ");
                match from {
                    Some(from) => out.line(&format!("export type {{ {names} }} from {};", quote(from))),
                    None => out.line(&format!("export type {{ {names} }};")),
                }
            }
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Renderer::default();
        self.render(&mut out);
        f.write_str(out.finish().trim_end())
    }
}

/// A whole generated TypeScript module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub declarations: Vec<Declaration>,
}

impl Module {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self { declarations }
    }

    /// Renders the module, header first.
    ///
    /// Consecutive imports and consecutive re-exports are kept together, every other declaration
    /// is separated by an empty line.
    pub fn render(&self) -> String {
        let mut out = Renderer::default();
        out.raw(HEADER);
        let mut prev: Option<&Declaration> = None;
        for decl in &self.declarations {
            let grouped = match (prev, decl) {
                (Some(p), d) if p.is_import() && d.is_import() => true,
                (Some(Declaration::ReExport { .. }), Declaration::ReExport { .. }) => true,
                _ => false,
            };
            if !grouped {
                out.blank();
            }
            decl.render(&mut out);
            prev = Some(decl);
        }
        out.finish()
    }
}

fn render_members(members: &[Member], out: &mut Renderer) {
    for member in members {
        member.render(out);
    }
}

/// Accumulates indented lines.
#[derive(Debug, Default)]
struct Renderer {
    buf: String,
    depth: usize,
}

impl Renderer {
    fn line(&mut self, line: &str) {
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    fn raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn write_joined<W: fmt::Write, T: fmt::Display>(w: &mut W, items: &[T], sep: &str) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            w.write_str(sep)?;
        }
        write!(w, "{item}")?;
    }
    Ok(())
}

fn write_string_literal<W: fmt::Write>(w: &mut W, s: &str) -> fmt::Result {
    w.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => w.write_str("\\\"")?,
            '\\' => w.write_str("\\\\")?,
            c => w.write_char(c)?,
        }
    }
    w.write_char('"')
}

/// Returns `s` as a double quoted string literal
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    let _ = write_string_literal(&mut out, s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big_number() -> TsType {
        TsType::Union(vec![
            TsType::named("number"),
            TsType::string(),
            TsType::named("BigNumber"),
        ])
    }

    #[test]
    fn renders_types() {
        assert_ts!(TsType::array(TsType::string()), "string[]");
        assert_ts!(TsType::array(big_number()), "(number | string | BigNumber)[]");
        assert_ts!(
            TsType::Tuple(vec![TsType::string(), TsType::array(TsType::string())]),
            "[string, string[]]"
        );
        assert_ts!(TsType::Object(vec![]), "{}");
        assert_ts!(
            TsType::Object(vec![
                (PropertyKey::ident("who"), TsType::string()),
                (PropertyKey::Index(0), TsType::string()),
            ]),
            "{ who: string; 0: string }"
        );
        assert_ts!(
            TsType::generic("Callback", TsType::named("Transfer")),
            "Callback<Transfer>"
        );
        assert_ts!(TsType::StringLiteral("a\"b".into()), r#""a\"b""#);
    }

    #[test]
    fn renders_overloaded_key() {
        let method = MethodSignature::new(
            PropertyKey::Quoted("transfer(address,uint256)".into()),
            vec![Parameter::new("to", TsType::string()), Parameter::new("value", big_number())],
            TsType::generic("NonPayableTransactionObject", TsType::named("boolean")),
        );
        assert_ts!(
            Member::Method(method),
            r#""transfer(address,uint256)"(to: string, value: number | string | BigNumber): NonPayableTransactionObject<boolean>;"#
        );
    }

    #[test]
    fn renders_doc_comment() {
        let method = MethodSignature::new(PropertyKey::ident("name"), vec![], TsType::string())
            .with_doc(DocComment::new(vec![
                "first line\nsecond line".to_string(),
                "@returns a */ b".to_string(),
            ]));
        assert_ts!(
            Member::Method(method),
            "/**\n * first line\n * second line\n * @returns a *\\/ b\n */\nname(): string;"
        );
        assert!(DocComment::new(vec![]).is_none());
    }

    #[test]
    fn renders_module() {
        let module = Module::new(vec![
            Declaration::Import {
                clause: ImportClause::Default("BigNumber".into()),
                from: "bignumber.js".into(),
            },
            Declaration::Import {
                clause: ImportClause::Named(vec!["A".into(), "B".into()]),
                from: "./types".into(),
            },
            Declaration::TypeAlias { name: "X".into(), ty: TsType::string() },
            Declaration::Interface {
                name: "Token".into(),
                extends: Some("BaseContract".into()),
                members: vec![Member::Namespace {
                    key: "methods".into(),
                    members: vec![Member::Method(MethodSignature::new(
                        PropertyKey::ident("name"),
                        vec![Parameter::optional("cb", TsType::any())],
                        TsType::string(),
                    ))],
                }],
            },
        ]);

        let expected = format!(
            "{HEADER}
import type BigNumber from \"bignumber.js\";
import type {{ A, B }} from \"./types\";

export type X = string;

export interface Token extends BaseContract {{
  methods: {{
    name(cb?: any): string;
  }};
}}
"
        );
        pretty_assertions::assert_eq!(module.render(), expected);
    }

    #[test]
    fn groups_re_exports() {
        let module = Module::new(vec![
            Declaration::Import {
                clause: ImportClause::Namespace("sub".into()),
                from: "./sub".into(),
            },
            Declaration::ReExport { names: vec!["sub".into()], from: None },
            Declaration::ReExport { names: vec!["Token".into()], from: Some("./Token".into()) },
        ]);
        let expected = format!(
            "{HEADER}
import type * as sub from \"./sub\";

export type {{ sub }};
export type {{ Token }} from \"./Token\";
"
        );
        pretty_assertions::assert_eq!(module.render(), expected);
    }
}
