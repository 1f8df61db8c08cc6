use crate::{error::RuntimeError, eval::Frame, value::Value};
use std::collections::BTreeMap;
use stencil_schema::node::BodyHandle;

///
/// Host
///
/// Everything the interpreter cannot see into: user-written bodies, opaque
/// calls in initializers, and resource release.
///

pub trait Host: Send + Sync {
    /// Run a user-written body.
    fn invoke(&self, body: &BodyHandle, frame: &Frame) -> Result<Value, RuntimeError>;

    /// Evaluate an opaque call such as `System.currentTimeMillis()`.
    fn call(&self, function: &str, _frame: &Frame) -> Result<Value, RuntimeError> {
        Err(RuntimeError::Unbound(function.to_string()))
    }

    /// Call a method on a value the interpreter does not own.
    fn method(&self, receiver: &Value, name: &str) -> Result<Value, RuntimeError> {
        Err(RuntimeError::NoMethod {
            class: receiver.type_name().to_string(),
            name: name.to_string(),
            arity: 0,
        })
    }

    /// Release a scoped resource by calling `method` on it.
    fn release(&self, _resource: &Value, _method: &str) -> Result<(), RuntimeError> {
        Ok(())
    }

    /// The `this(..)`/`super(..)` prefix of a user constructor.
    fn delegate(&self, _body: &BodyHandle, _frame: &Frame) -> Result<(), RuntimeError> {
        Ok(())
    }
}

type BodyFn = Box<dyn Fn(&Frame) -> Result<Value, RuntimeError> + Send + Sync>;
type ReleaseFn = Box<dyn Fn(&Value, &str) -> Result<(), RuntimeError> + Send + Sync>;

///
/// Bodies
///
/// Closure-backed host, keyed by body handle and function name.
///

#[derive(Default)]
pub struct Bodies {
    bodies: BTreeMap<String, BodyFn>,
    functions: BTreeMap<String, BodyFn>,
    release: Option<ReleaseFn>,
}

impl Bodies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn body(
        mut self,
        handle: impl Into<String>,
        f: impl Fn(&Frame) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    ) -> Self {
        self.bodies.insert(handle.into(), Box::new(f));
        self
    }

    #[must_use]
    pub fn function(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Frame) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    ) -> Self {
        self.functions.insert(name.into(), Box::new(f));
        self
    }

    #[must_use]
    pub fn on_release(
        mut self,
        f: impl Fn(&Value, &str) -> Result<(), RuntimeError> + Send + Sync + 'static,
    ) -> Self {
        self.release = Some(Box::new(f));
        self
    }
}

impl Host for Bodies {
    fn invoke(&self, body: &BodyHandle, frame: &Frame) -> Result<Value, RuntimeError> {
        let f = self
            .bodies
            .get(&body.0)
            .ok_or_else(|| RuntimeError::Unbound(body.0.clone()))?;

        f(frame)
    }

    fn call(&self, function: &str, frame: &Frame) -> Result<Value, RuntimeError> {
        let f = self
            .functions
            .get(function)
            .ok_or_else(|| RuntimeError::Unbound(function.to_string()))?;

        f(frame)
    }

    fn release(&self, resource: &Value, method: &str) -> Result<(), RuntimeError> {
        match &self.release {
            Some(f) => f(resource, method),
            None => Ok(()),
        }
    }
}
