use crate::{hash, instance::Instance};
use std::sync::Arc;
use stencil_schema::{expr::Literal, types::TypeRef};

///
/// Value
///
/// A run-time value. Objects are shared references; everything else is
/// held by value.
///

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),

    /// Insertion-ordered, duplicates already removed.
    Set(Vec<Value>),
    Object(Arc<Instance>),
}

impl Value {
    /// Default of an unassigned field of type `ty`.
    #[must_use]
    pub fn zero(ty: &TypeRef) -> Self {
        if ty.is_array() {
            return Self::Null;
        }

        match ty.name.as_str() {
            "boolean" => Self::Bool(false),
            "byte" | "short" | "char" | "int" | "long" => Self::Int(0),
            "float" | "double" => Self::Float(0.0),
            _ => Self::Null,
        }
    }

    #[must_use]
    pub fn from_literal(lit: &Literal) -> Self {
        match lit {
            Literal::Null => Self::Null,
            Literal::Bool(v) => Self::Bool(*v),
            Literal::Int(v) => Self::Int(*v),
            Literal::Float(v) => Self::Float(*v),
            Literal::Text(v) => Self::Text(v.clone()),
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Object(_) => "object",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&Arc<Instance>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Elements of a list or set.
    #[must_use]
    pub fn items(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Reference identity for objects, plain equality for everything else.
    #[must_use]
    pub fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Object(_), _) | (_, Self::Object(_)) => false,
            _ => self.equals_with(other, &mut by_identity) == Ok(true),
        }
    }

    /// Structural equality. Objects are compared through `objects`, so the
    /// caller decides between identity and a generated `equals`.
    pub fn equals_with<E>(
        &self,
        other: &Self,
        objects: &mut impl FnMut(&Arc<Instance>, &Arc<Instance>) -> Result<bool, E>,
    ) -> Result<bool, E> {
        match (self, other) {
            (Self::Null, Self::Null) => Ok(true),
            (Self::Bool(a), Self::Bool(b)) => Ok(a == b),
            (Self::Int(a), Self::Int(b)) => Ok(a == b),
            (Self::Float(a), Self::Float(b)) => {
                Ok(hash::canonical_bits(*a) == hash::canonical_bits(*b))
            }
            (Self::Text(a), Self::Text(b)) => Ok(a == b),
            (Self::List(a), Self::List(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b) {
                    if !x.equals_with(y, objects)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Self::Set(a), Self::Set(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for x in a {
                    if !contains(b, x, objects)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Self::Object(a), Self::Object(b)) => {
                if Arc::ptr_eq(a, b) {
                    return Ok(true);
                }
                objects(a, b)
            }
            _ => Ok(false),
        }
    }

    /// Hash under the fixed policy; objects are hashed through `objects`.
    pub fn hash_with<E>(
        &self,
        objects: &mut impl FnMut(&Arc<Instance>) -> Result<i32, E>,
    ) -> Result<i32, E> {
        Ok(match self {
            Self::Null => hash::NULL,
            Self::Bool(v) => hash::boolean(*v),
            Self::Int(v) => hash::fold(*v),
            Self::Float(v) => hash::float(*v),
            Self::Text(v) => hash::text(v),
            Self::List(items) => {
                let mut acc = hash::Accumulator::new();
                for v in items {
                    acc.add(v.hash_with(objects)?);
                }
                acc.finish()
            }
            Self::Set(items) => {
                let mut sum = 0_i32;
                for v in items {
                    sum = sum.wrapping_add(v.hash_with(objects)?);
                }
                sum
            }
            Self::Object(o) => objects(o)?,
        })
    }
}

// by_identity
// objects were already compared by pointer
const fn by_identity(_: &Arc<Instance>, _: &Arc<Instance>) -> Result<bool, ()> {
    Ok(false)
}

// contains
fn contains<E>(
    items: &[Value],
    needle: &Value,
    objects: &mut impl FnMut(&Arc<Instance>, &Arc<Instance>) -> Result<bool, E>,
) -> Result<bool, E> {
    for item in items {
        if item.equals_with(needle, objects)? {
            return Ok(true);
        }
    }

    Ok(false)
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}

impl From<Arc<Instance>> for Value {
    fn from(v: Arc<Instance>) -> Self {
        Self::Object(v)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn no_objects(_: &Arc<Instance>, _: &Arc<Instance>) -> Result<bool, ()> {
        Ok(false)
    }

    #[test]
    fn floats_compare_by_canonical_bits() {
        let nan = Value::Float(f64::NAN);

        assert_eq!(nan.equals_with(&Value::Float(f64::NAN), &mut no_objects), Ok(true));
        assert_eq!(
            Value::Float(0.0).equals_with(&Value::Float(-0.0), &mut no_objects),
            Ok(false)
        );
    }

    #[test]
    fn sets_ignore_order_lists_do_not() {
        let a = vec![Value::from(1), Value::from(2)];
        let b = vec![Value::from(2), Value::from(1)];

        assert_eq!(
            Value::Set(a.clone()).equals_with(&Value::Set(b.clone()), &mut no_objects),
            Ok(true)
        );
        assert_eq!(
            Value::List(a).equals_with(&Value::List(b), &mut no_objects),
            Ok(false)
        );
    }

    #[test]
    fn zero_follows_the_declared_type() {
        assert!(matches!(Value::zero(&TypeRef::int()), Value::Int(0)));
        assert!(matches!(Value::zero(&TypeRef::boolean()), Value::Bool(false)));
        assert!(Value::zero(&TypeRef::string()).is_null());
        assert!(Value::zero(&TypeRef::array_of(TypeRef::int())).is_null());
    }
}
