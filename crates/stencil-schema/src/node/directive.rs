use serde::{Deserialize, Serialize};
use std::fmt;

///
/// TargetKind
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Class,
    Field,
    Method,
    Parameter,
    Local,
}

impl TargetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Field => "field",
            Self::Method => "method",
            Self::Parameter => "parameter",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// ParamValue
///
/// Raw parameter value as written on the directive.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::List(_) => "list",
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(v: [&str; N]) -> Self {
        Self::List(v.iter().map(ToString::to_string).collect())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

///
/// DirectiveInvocation
///
/// One directive as attached by the front-end: its name, the kind of target
/// it was written on, and its parameters in source order.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DirectiveInvocation {
    pub name: String,
    pub target: TargetKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<(String, ParamValue)>,
}

impl DirectiveInvocation {
    pub fn new(name: impl Into<String>, target: TargetKind) -> Self {
        Self {
            name: name.into(),
            target,
            params: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Class)
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Field)
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Method)
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Parameter)
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Local)
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}
