mod catalog;
mod schema;

pub use schema::*;

use crate::directive_kind::DirectiveKind;
use std::collections::BTreeMap;
use stencil_schema::{
    diagnostic::{Diagnostic, Severity},
    error::DirectiveError,
    node::{DirectiveInvocation, TargetKind},
    target::{DirectiveRef, Target},
};
use thiserror::Error as ThisError;

///
/// SchemaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum SchemaError {
    #[error("'{directive}' may appear only once per target")]
    DuplicateDirective { directive: String },

    #[error("parameter '{param}' given more than once")]
    DuplicateParameter { param: String },

    #[error("'{directive}' cannot be combined with '{other}' on the same target")]
    Excluded { directive: String, other: String },

    #[error("parameter '{param}' expects {expected}, got {found}")]
    InvalidParameter {
        param: String,
        expected: ParamType,
        found: String,
    },

    #[error("'{directive}' is not allowed on a {target}")]
    TargetMismatch {
        directive: String,
        target: TargetKind,
    },

    #[error("unknown directive '{name}'")]
    UnknownDirective { name: String },

    #[error("unknown parameter '{param}'")]
    UnknownParameter { param: String },
}

///
/// Directive
///
/// A schema-valid invocation bound to its place in the class.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Directive {
    pub id: usize,
    pub name: String,
    pub kind: DirectiveKind,
    pub target: Target,
    pub params: Params,
}

impl Directive {
    #[must_use]
    pub fn source(&self) -> DirectiveRef {
        DirectiveRef {
            id: self.id,
            name: self.name.clone(),
            target: self.target.clone(),
        }
    }

    /// Report a failure of this directive against `class`.
    #[must_use]
    pub fn diagnostic(&self, class: &str, err: &DirectiveError) -> Diagnostic {
        let target = self.target.describe(class);
        let message = err.to_string();

        match err.severity() {
            Severity::Error => Diagnostic::error(err.code(), Some(self.name.as_str()), target, message),
            Severity::Warning => Diagnostic::warning(err.code(), Some(self.name.as_str()), target, message),
        }
    }
}

///
/// Registry
///
/// Directive names to their schema. Aliases are just two names sharing a
/// kind.
///

#[derive(Clone, Debug, Default)]
pub struct Registry {
    schemas: BTreeMap<String, DirectiveSchema>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in directive set.
    #[must_use]
    pub fn catalog() -> Self {
        let mut reg = Self::new();
        catalog::register_all(&mut reg);

        reg
    }

    /// Add or replace a directive schema.
    pub fn register(&mut self, name: impl Into<String>, schema: DirectiveSchema) {
        self.schemas.insert(name.into(), schema);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DirectiveSchema> {
        self.schemas.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Validate one invocation written at `target` and resolve its
    /// parameters against the schema.
    pub fn resolve(
        &self,
        id: usize,
        invocation: &DirectiveInvocation,
        target: Target,
    ) -> Result<Directive, SchemaError> {
        let name = &invocation.name;
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::UnknownDirective { name: name.clone() })?;

        // the invocation must sit where it claims to, and be allowed there
        let kind = target.kind();
        if invocation.target != kind || !schema.allows(kind) {
            return Err(SchemaError::TargetMismatch {
                directive: name.clone(),
                target: invocation.target,
            });
        }

        let mut params = Params::default();
        for (param, value) in &invocation.params {
            let spec = schema
                .get_param(param)
                .ok_or_else(|| SchemaError::UnknownParameter {
                    param: param.clone(),
                })?;
            if params.get(param).is_some() {
                return Err(SchemaError::DuplicateParameter {
                    param: param.clone(),
                });
            }
            let arg = spec
                .ty
                .coerce(value)
                .ok_or_else(|| SchemaError::InvalidParameter {
                    param: param.clone(),
                    expected: spec.ty,
                    found: describe_value(value),
                })?;

            params.insert(param, arg, true, spec.sticky);
        }

        // fill defaults for everything left unset
        for spec in &schema.params {
            if params.get(&spec.name).is_none()
                && let Some(default) = &spec.default
            {
                params.insert(&spec.name, default.clone(), false, spec.sticky);
            }
        }

        Ok(Directive {
            id,
            name: name.clone(),
            kind: schema.kind,
            target,
            params,
        })
    }

    /// Whether two directive names exclude each other. Exclusion is
    /// symmetric: either side may declare it.
    #[must_use]
    pub fn excludes(&self, a: &str, b: &str) -> bool {
        let declares = |x: &str, y: &str| {
            self.get(x)
                .is_some_and(|s| s.excludes.iter().any(|e| e == y))
        };

        declares(a, b) || declares(b, a)
    }
}

fn describe_value(value: &stencil_schema::node::ParamValue) -> String {
    use stencil_schema::node::ParamValue;

    match value {
        ParamValue::Bool(v) => format!("bool {v}"),
        ParamValue::Text(v) => format!("'{v}'"),
        ParamValue::List(_) => value.type_name().to_string(),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_schema::types::Access;

    fn field_target() -> Target {
        Target::Field { field: "x".into() }
    }

    #[test]
    fn resolve_fills_defaults_and_marks_supplied() {
        let reg = Registry::catalog();
        let inv = DirectiveInvocation::field("getter").param("lazy", true);

        let d = reg.resolve(0, &inv, field_target()).unwrap();

        assert_eq!(d.kind, DirectiveKind::Accessor);
        assert!(d.params.bool("lazy"));
        assert!(d.params.supplied("lazy"));
        assert_eq!(d.params.access("read"), Some(Access::Public));
        assert!(!d.params.supplied("read"));
        assert!(d.params.layer("read").is_some());
        assert!(d.params.layer("write").is_none());
    }

    #[test]
    fn unknown_directive_is_rejected() {
        let reg = Registry::catalog();
        let inv = DirectiveInvocation::class("to_string");

        let err = reg.resolve(0, &inv, Target::Class).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownDirective {
                name: "to_string".into()
            }
        );
    }

    #[test]
    fn wrong_target_is_rejected() {
        let reg = Registry::catalog();
        let inv = DirectiveInvocation::field("builder");

        let err = reg.resolve(0, &inv, field_target()).unwrap_err();
        assert!(matches!(err, SchemaError::TargetMismatch { .. }));
    }

    #[test]
    fn invalid_and_unknown_parameters_are_rejected() {
        let reg = Registry::catalog();

        let bad_access = DirectiveInvocation::class("all_args_constructor").param("access", "open");
        let err = reg.resolve(0, &bad_access, Target::Class).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidParameter { .. }));
        assert_eq!(
            err.to_string(),
            "parameter 'access' expects access level, got 'open'"
        );

        let unknown = DirectiveInvocation::class("data").param("static_constructor", "of");
        let err = reg.resolve(0, &unknown, Target::Class).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownParameter { .. }));

        let twice = DirectiveInvocation::class("all_args_constructor")
            .param("access", "public")
            .param("access", "private");
        let err = reg.resolve(0, &twice, Target::Class).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateParameter { .. }));
    }

    #[test]
    fn exclusions_are_symmetric() {
        let reg = Registry::catalog();

        assert!(reg.excludes("value", "data"));
        assert!(reg.excludes("data", "value"));
        assert!(reg.excludes("var", "val"));
        assert!(reg.excludes("locked", "locked_read"));
        assert!(!reg.excludes("getter", "setter"));
    }

    #[test]
    fn register_adds_custom_alias() {
        let mut reg = Registry::catalog();
        reg.register(
            "reader",
            DirectiveSchema::new(DirectiveKind::Accessor, &[TargetKind::Field]).param(
                ParamSchema::new("read", ParamType::Access)
                    .default(Arg::Access(Access::Public))
                    .sticky(),
            ),
        );

        let d = reg
            .resolve(3, &DirectiveInvocation::field("reader"), field_target())
            .unwrap();
        assert_eq!(d.kind, DirectiveKind::Accessor);
        assert_eq!(d.source().id, 3);
    }
}
