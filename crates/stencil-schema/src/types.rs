use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Visibility
///
/// Declared visibility of a field, method or generated member.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Package => "package",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Access
///
/// Access level requested by a directive parameter. `None` suppresses
/// generation for that member entirely.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Package,
    Private,
    None,
}

impl Access {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "package" => Some(Self::Package),
            "private" => Some(Self::Private),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    #[must_use]
    pub const fn visibility(self) -> Option<Visibility> {
        match self {
            Self::Public => Some(Visibility::Public),
            Self::Protected => Some(Visibility::Protected),
            Self::Package => Some(Visibility::Package),
            Self::Private => Some(Visibility::Private),
            Self::None => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Public => Visibility::Public.as_str(),
            Self::Protected => Visibility::Protected.as_str(),
            Self::Package => Visibility::Package.as_str(),
            Self::Private => Visibility::Private.as_str(),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TypeRef
///
/// A declared type as the front-end saw it: a (possibly qualified) name,
/// type arguments and an array marker.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TypeRef {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub array: bool,
}

const COLLECTIONS: [&str; 13] = [
    "ArrayList",
    "Collection",
    "HashSet",
    "ImmutableList",
    "ImmutableSet",
    "Iterable",
    "LinkedHashSet",
    "LinkedList",
    "List",
    "NavigableSet",
    "Set",
    "SortedSet",
    "TreeSet",
];

const SETS: [&str; 7] = [
    "HashSet",
    "ImmutableSet",
    "LinkedHashSet",
    "NavigableSet",
    "Set",
    "SortedSet",
    "TreeSet",
];

const LOCKS: [&str; 5] = [
    "Lock",
    "ReadWriteLock",
    "ReentrantLock",
    "ReentrantReadWriteLock",
    "StampedLock",
];

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            array: false,
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            args,
            array: false,
        }
    }

    #[must_use]
    pub fn array_of(element: Self) -> Self {
        Self {
            array: true,
            ..element
        }
    }

    #[must_use]
    pub fn int() -> Self {
        Self::new("int")
    }

    #[must_use]
    pub fn long() -> Self {
        Self::new("long")
    }

    #[must_use]
    pub fn double() -> Self {
        Self::new("double")
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::new("boolean")
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new("String")
    }

    #[must_use]
    pub fn object() -> Self {
        Self::new("Object")
    }

    /// Name without package qualifier.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.array
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !self.array && primitive_rank(&self.name).is_some()
    }

    #[must_use]
    pub fn is_boolean(&self) -> bool {
        !self.array && self.name == "boolean"
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        !self.array && self.name == "void"
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        !self.array && COLLECTIONS.contains(&self.simple_name())
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.array && SETS.contains(&self.simple_name())
    }

    #[must_use]
    pub fn is_lock(&self) -> bool {
        !self.array && LOCKS.contains(&self.simple_name())
    }

    /// Element type of a collection or array, if known.
    #[must_use]
    pub fn element(&self) -> Option<Self> {
        if self.array {
            return Some(Self {
                array: false,
                ..self.clone()
            });
        }

        self.args.first().cloned()
    }

    /// Erased form used for signature comparison. Class type parameters erase
    /// to `Object`, type arguments are dropped.
    #[must_use]
    pub fn erased(&self, type_params: &[String]) -> String {
        let base = if type_params.iter().any(|p| *p == self.name) {
            "Object"
        } else {
            self.simple_name()
        };

        if self.array {
            format!("{base}[]")
        } else {
            base.to_string()
        }
    }

    /// Whether a value of type `other` may be assigned to a binding of this
    /// type: identical types or primitive widening.
    #[must_use]
    pub fn accepts(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }
        if self.array || other.array {
            return false;
        }

        match (primitive_rank(&self.name), primitive_rank(&other.name)) {
            (Some(to), Some(from)) => widens(from, to),
            _ => self.simple_name() == other.simple_name() && self.args == other.args,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        if self.array {
            f.write_str("[]")?;
        }

        Ok(())
    }
}

// primitive_rank
// position in the widening chain; char and boolean sit outside it
fn primitive_rank(name: &str) -> Option<u8> {
    match name {
        "boolean" => Some(0),
        "byte" => Some(1),
        "short" => Some(2),
        "char" => Some(3),
        "int" => Some(4),
        "long" => Some(5),
        "float" => Some(6),
        "double" => Some(7),
        _ => None,
    }
}

const fn widens(from: u8, to: u8) -> bool {
    match (from, to) {
        (0, 0) => true,
        (0, _) | (_, 0) => false,
        // char only widens to int and above, nothing widens to char
        (3, t) => t == 3 || t >= 4,
        (_, 3) => false,
        (f, t) => f <= t,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erasure_maps_type_params_to_object() {
        let params = vec!["T".to_string()];

        assert_eq!(TypeRef::new("T").erased(&params), "Object");
        assert_eq!(
            TypeRef::generic("java.util.List", vec![TypeRef::string()]).erased(&params),
            "List"
        );
        assert_eq!(TypeRef::array_of(TypeRef::string()).erased(&params), "String[]");
    }

    #[test]
    fn widening_follows_primitive_chain() {
        assert!(TypeRef::long().accepts(&TypeRef::int()));
        assert!(TypeRef::double().accepts(&TypeRef::long()));
        assert!(!TypeRef::int().accepts(&TypeRef::long()));
        assert!(!TypeRef::new("char").accepts(&TypeRef::new("short")));
        assert!(!TypeRef::int().accepts(&TypeRef::boolean()));
        assert!(!TypeRef::string().accepts(&TypeRef::int()));
    }

    #[test]
    fn collection_families_are_recognised() {
        let set = TypeRef::generic("java.util.Set", vec![TypeRef::string()]);

        assert!(set.is_collection());
        assert!(set.is_set());
        assert_eq!(set.element(), Some(TypeRef::string()));
        assert!(!TypeRef::array_of(TypeRef::int()).is_collection());
        assert!(TypeRef::new("ReentrantLock").is_lock());
    }

    #[test]
    fn display_renders_arguments_and_arrays() {
        let ty = TypeRef::generic("Map", vec![TypeRef::string(), TypeRef::int()]);

        assert_eq!(ty.to_string(), "Map<String, int>");
        assert_eq!(TypeRef::array_of(TypeRef::double()).to_string(), "double[]");
    }
}
