use crate::directive_kind::DirectiveKind;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stencil_schema::{
    node::{ParamValue, TargetKind},
    types::Access,
};

///
/// ParamType
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ParamType {
    #[display("bool")]
    Bool,

    #[display("access level")]
    Access,

    #[display("identifier")]
    Ident,

    #[display("identifier list")]
    IdentList,

    #[display("text")]
    Text,
}

impl ParamType {
    /// Convert a raw value, or `None` when it has the wrong shape.
    #[must_use]
    pub fn coerce(self, value: &ParamValue) -> Option<Arg> {
        match (self, value) {
            (Self::Bool, ParamValue::Bool(v)) => Some(Arg::Bool(*v)),
            (Self::Access, ParamValue::Text(v)) => Access::parse(v).map(Arg::Access),
            (Self::Ident, ParamValue::Text(v)) if is_ident(v) => Some(Arg::Ident(v.clone())),
            (Self::IdentList, ParamValue::Text(v)) if is_ident(v) => {
                Some(Arg::Idents(vec![v.clone()]))
            }
            (Self::IdentList, ParamValue::List(vs)) if vs.iter().all(|v| is_ident(v)) => {
                Some(Arg::Idents(vs.clone()))
            }
            (Self::Text, ParamValue::Text(v)) => Some(Arg::Text(v.clone())),
            _ => None,
        }
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();

    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.'))
        && s.len() <= stencil_schema::MAX_IDENT_LEN
}

///
/// Arg
///
/// A parameter value after type checking.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Arg {
    Bool(bool),
    Access(Access),
    Ident(String),
    Idents(Vec<String>),
    Text(String),
}

///
/// ParamSchema
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ParamSchema {
    pub name: String,
    pub ty: ParamType,

    #[serde(default)]
    pub default: Option<Arg>,

    /// The default also applies when a field-level invocation layers over
    /// a class-level one.
    #[serde(default)]
    pub sticky: bool,
}

impl ParamSchema {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            sticky: false,
        }
    }

    #[must_use]
    pub fn default(mut self, value: Arg) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub const fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }
}

///
/// DirectiveSchema
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DirectiveSchema {
    pub kind: DirectiveKind,
    pub targets: Vec<TargetKind>,

    #[serde(default)]
    pub params: Vec<ParamSchema>,

    /// Directive names that may not share a target with this one.
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl DirectiveSchema {
    #[must_use]
    pub fn new(kind: DirectiveKind, targets: &[TargetKind]) -> Self {
        Self {
            kind,
            targets: targets.to_vec(),
            params: Vec::new(),
            excludes: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, param: ParamSchema) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn excludes(mut self, names: &[&str]) -> Self {
        self.excludes
            .extend(names.iter().map(ToString::to_string));
        self
    }

    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&ParamSchema> {
        self.params.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn allows(&self, target: TargetKind) -> bool {
        self.targets.contains(&target)
    }
}

///
/// ParamEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
struct ParamEntry {
    value: Arg,
    supplied: bool,
    sticky: bool,
}

///
/// Params
///
/// Resolved parameters of one invocation: supplied values plus schema
/// defaults, remembering which were written out.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(BTreeMap<String, ParamEntry>);

impl Params {
    pub(crate) fn insert(&mut self, name: &str, value: Arg, supplied: bool, sticky: bool) {
        self.0.insert(
            name.to_string(),
            ParamEntry {
                value,
                supplied,
                sticky,
            },
        );
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.0.get(name).map(|e| &e.value)
    }

    #[must_use]
    pub fn supplied(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|e| e.supplied)
    }

    /// Value that takes part in layering: supplied, or a sticky default.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&Arg> {
        self.0
            .get(name)
            .filter(|e| e.supplied || e.sticky)
            .map(|e| &e.value)
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Arg::Bool(true)))
    }

    #[must_use]
    pub fn access(&self, name: &str) -> Option<Access> {
        match self.get(name) {
            Some(Arg::Access(a)) => Some(*a),
            _ => None,
        }
    }

    #[must_use]
    pub fn ident(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Arg::Ident(s) | Arg::Text(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn idents(&self, name: &str) -> &[String] {
        match self.get(name) {
            Some(Arg::Idents(v)) => v,
            _ => &[],
        }
    }
}
