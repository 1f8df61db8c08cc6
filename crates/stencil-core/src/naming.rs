//! Names of generated members.

use crate::config::AccessorConfig;
use convert_case::{Case, Casing};
use stencil_schema::types::TypeRef;

/// Upper-case the first character only; `uRL` stays `URL`, not `Url`.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// boolean fields already named `isX` keep the `X` part
fn strip_is<'a>(field: &'a str, ty: &TypeRef) -> Option<&'a str> {
    let rest = field.strip_prefix("is")?;

    (ty.is_boolean() && rest.chars().next().is_some_and(char::is_uppercase)).then_some(rest)
}

#[must_use]
pub fn getter(field: &str, ty: &TypeRef, cfg: &AccessorConfig) -> String {
    if cfg.fluent {
        return field.to_string();
    }
    if ty.is_boolean() && cfg.boolean_prefix {
        return match strip_is(field, ty) {
            Some(_) => field.to_string(),
            None => format!("is{}", capitalize(field)),
        };
    }

    format!("get{}", capitalize(field))
}

#[must_use]
pub fn setter(field: &str, ty: &TypeRef, cfg: &AccessorConfig) -> String {
    if cfg.fluent {
        return field.to_string();
    }

    format!("set{}", capitalize(strip_is(field, ty).unwrap_or(field)))
}

#[must_use]
pub fn wither(field: &str, ty: &TypeRef) -> String {
    format!("with{}", capitalize(strip_is(field, ty).unwrap_or(field)))
}

/// Derive a singular element name from a plural collection name.
#[must_use]
pub fn singularize(plural: &str) -> Option<String> {
    if let Some(stem) = plural.strip_suffix("ies")
        && !stem.is_empty()
    {
        return Some(format!("{stem}y"));
    }
    if plural.ends_with("ss") {
        return None;
    }

    plural
        .strip_suffix('s')
        .filter(|stem| !stem.is_empty())
        .map(ToString::to_string)
}

/// Builder mutator name; the prefix is joined in camel case.
#[must_use]
pub fn prefixed(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        return name.to_string();
    }

    format!("{prefix}_{name}").to_case(Case::Camel)
}

#[must_use]
pub fn builder_class(class: &str, suffix: &str) -> String {
    format!("{}{suffix}", class.to_case(Case::Pascal))
}

/// Field holding the "explicitly set" flag of a defaulted builder field.
#[must_use]
pub fn set_flag(field: &str) -> String {
    format!("{field}$set")
}

/// Synthetic lock fields.
#[must_use]
pub const fn lock_field(read_write: bool, is_static: bool) -> &'static str {
    match (read_write, is_static) {
        (false, false) => "$lock",
        (false, true) => "$LOCK",
        (true, false) => "$readWriteLock",
        (true, true) => "$READ_WRITE_LOCK",
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessor_names_follow_prefix_rules() {
        let cfg = AccessorConfig::default();
        let flag = TypeRef::boolean();

        assert_eq!(getter("name", &TypeRef::string(), &cfg), "getName");
        assert_eq!(getter("active", &flag, &cfg), "isActive");
        assert_eq!(getter("isActive", &flag, &cfg), "isActive");
        assert_eq!(setter("isActive", &flag, &cfg), "setActive");
        assert_eq!(wither("x", &TypeRef::int()), "withX");
    }

    #[test]
    fn fluent_drops_prefixes() {
        let cfg = AccessorConfig {
            fluent: true,
            ..AccessorConfig::default()
        };

        assert_eq!(getter("name", &TypeRef::string(), &cfg), "name");
        assert_eq!(setter("name", &TypeRef::string(), &cfg), "name");
    }

    #[test]
    fn singularize_handles_common_plurals() {
        assert_eq!(singularize("entries").as_deref(), Some("entry"));
        assert_eq!(singularize("items").as_deref(), Some("item"));
        assert_eq!(singularize("address"), None);
        assert_eq!(singularize("data"), None);
        assert_eq!(singularize("s"), None);
    }

    #[test]
    fn prefixed_names_are_camel_case() {
        assert_eq!(prefixed("", "items"), "items");
        assert_eq!(prefixed("with", "items"), "withItems");
        assert_eq!(prefixed("clear", "firstNames"), "clearFirstNames");
        assert_eq!(builder_class("Point", "Builder"), "PointBuilder");
    }
}
