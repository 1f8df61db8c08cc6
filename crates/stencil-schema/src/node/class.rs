use crate::{
    node::{DirectiveInvocation, FieldSpec, MethodSpec},
    types::TypeRef,
};
use serde::{Deserialize, Serialize};

///
/// ClassSpec
///
/// Immutable snapshot of one class as supplied by the front-end.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ClassSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInvocation>,

    /// Names of nested types the user declared themselves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_types: Vec<String>,

    #[serde(default)]
    pub is_final: bool,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            directives: Vec::new(),
            nested_types: Vec::new(),
            is_final: false,
        }
    }

    #[must_use]
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn directive(mut self, invocation: DirectiveInvocation) -> Self {
        self.directives.push(invocation);
        self
    }

    #[must_use]
    pub fn nested_type(mut self, name: impl Into<String>) -> Self {
        self.nested_types.push(name.into());
        self
    }

    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The class as a type, with its own type parameters as arguments.
    #[must_use]
    pub fn self_type(&self) -> TypeRef {
        TypeRef::generic(
            self.name.clone(),
            self.type_params.iter().map(TypeRef::new).collect(),
        )
    }

    #[must_use]
    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.iter().any(|d| d.name == name)
    }

    /// Instance fields in declaration order.
    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.is_static())
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodSpec> {
        self.methods.iter().filter(|m| m.is_constructor())
    }
}
