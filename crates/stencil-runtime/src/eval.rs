//! Executes generated instruction sequences.
//!
//! The interpreter owns no user code: bodies, opaque calls and resource
//! release go through the [`Host`].

use crate::{
    error::{Failure, RuntimeError},
    host::Host,
    instance::Instance,
    scope::run_scoped,
    value::Value,
};
use log::debug;
use std::{collections::BTreeMap, sync::Arc};
use stencil_schema::{
    expr::Expr,
    member::{GeneratedMember, HASH_MULTIPLIER, HASH_SEED, Instruction, LockRef, MemberKind, Operand},
    node::{ClassSpec, MethodSpec, Storage},
    result::EmissionResult,
    types::TypeRef,
};

///
/// Frame
///
/// Receiver, arguments and locals of one running member.
///

#[derive(Debug)]
pub struct Frame {
    this: Option<Arc<Instance>>,
    args: BTreeMap<String, Value>,
    locals: BTreeMap<String, Value>,
    hash: i32,
}

impl Frame {
    fn new(
        this: Option<Arc<Instance>>,
        names: impl IntoIterator<Item = String>,
        args: Vec<Value>,
    ) -> Self {
        Self {
            this,
            args: names.into_iter().zip(args).collect(),
            locals: BTreeMap::new(),
            hash: HASH_SEED,
        }
    }

    #[must_use]
    pub const fn this(&self) -> Option<&Arc<Instance>> {
        self.this.as_ref()
    }

    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    #[must_use]
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    /// Argument or local bound to `name`.
    pub fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        self.args
            .get(name)
            .or_else(|| self.locals.get(name))
            .cloned()
            .ok_or_else(|| RuntimeError::Unbound(name.to_string()))
    }

    fn receiver(&self, what: &str) -> Result<&Arc<Instance>, RuntimeError> {
        self.this
            .as_ref()
            .ok_or_else(|| RuntimeError::NoReceiver(what.to_string()))
    }
}

///
/// FieldSlot
///

#[derive(Debug)]
struct FieldSlot {
    name: String,
    ty: TypeRef,
    default: Option<Expr>,
    is_static: bool,
    lazy: bool,
}

///
/// LoadedClass
///

#[derive(Debug)]
struct LoadedClass {
    name: String,
    fields: Vec<FieldSlot>,
    members: Vec<GeneratedMember>,
    user: Vec<MethodSpec>,
    statics: Arc<Instance>,
}

impl LoadedClass {
    fn new(name: String, fields: Vec<FieldSlot>, members: Vec<GeneratedMember>, user: Vec<MethodSpec>) -> Self {
        let statics = fields
            .iter()
            .filter(|f| f.is_static)
            .map(|f| (f.name.clone(), Value::zero(&f.ty)))
            .collect();
        let statics = Arc::new(Instance::new(name.clone(), statics, Vec::new()));

        Self {
            name,
            fields,
            members,
            user,
            statics,
        }
    }

    fn from_class(class: &ClassSpec, members: &[GeneratedMember]) -> Self {
        let fields = class
            .fields
            .iter()
            .map(|f| FieldSlot {
                name: f.name.clone(),
                ty: f.ty.clone(),
                default: f.default.clone(),
                is_static: f.is_static(),
                lazy: f.storage == Storage::LazySlot,
            })
            .collect();
        let members = members
            .iter()
            .filter(|m| m.kind != MemberKind::NestedType)
            .cloned()
            .collect();

        Self::new(class.name.clone(), fields, members, class.methods.clone())
    }

    // from_nested
    // a generated nested type: its fields and members come from the IR
    fn from_nested(member: &GeneratedMember) -> Self {
        let (fields, members): (Vec<_>, Vec<_>) = member
            .nested
            .iter()
            .cloned()
            .partition(|m| m.kind == MemberKind::Field);
        let fields = fields
            .into_iter()
            .map(|f| FieldSlot {
                ty: f.signature.returns.clone().unwrap_or_else(TypeRef::object),
                name: f.signature.name,
                default: None,
                is_static: f.signature.is_static,
                lazy: false,
            })
            .collect();

        Self::new(member.signature.name.clone(), fields, members, Vec::new())
    }

    fn allocate(&self) -> Arc<Instance> {
        let fields = self
            .fields
            .iter()
            .filter(|f| !f.is_static)
            .map(|f| (f.name.clone(), Value::zero(&f.ty)))
            .collect();
        let lazy: Vec<_> = self
            .fields
            .iter()
            .filter(|f| f.lazy)
            .map(|f| f.name.clone())
            .collect();

        Arc::new(Instance::new(self.name.clone(), fields, lazy))
    }

    fn method(&self, name: &str, arity: usize, is_static: bool) -> Option<&GeneratedMember> {
        self.members.iter().find(|m| {
            m.kind == MemberKind::Method
                && m.name() == name
                && m.signature.params.len() == arity
                && m.signature.is_static == is_static
        })
    }

    fn wrapper(&self, index: usize) -> Option<&GeneratedMember> {
        self.members
            .iter()
            .find(|m| m.kind == MemberKind::Wrapper && m.wraps == Some(index))
    }

    fn is_static_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name && f.is_static)
    }
}

fn param_names(m: &GeneratedMember) -> impl Iterator<Item = String> + '_ {
    m.signature.params.iter().map(|p| p.name.clone())
}

///
/// Interpreter
///

pub struct Interpreter<H> {
    classes: BTreeMap<String, LoadedClass>,
    host: H,
}

impl<H: Host> Interpreter<H> {
    pub fn new(result: &EmissionResult, host: H) -> Self {
        let mut interp = Self {
            classes: BTreeMap::new(),
            host,
        };
        interp.load(result);

        interp
    }

    /// Load another processed class, for example one used as a field type.
    pub fn load(&mut self, result: &EmissionResult) {
        for nested in result
            .members
            .iter()
            .filter(|m| m.kind == MemberKind::NestedType)
        {
            let class = LoadedClass::from_nested(nested);
            self.classes.insert(class.name.clone(), class);
        }

        let class = LoadedClass::from_class(&result.class, &result.members);
        debug!(
            "Interpreter: loaded '{}' with {} generated member(s)",
            class.name,
            class.members.len()
        );
        self.classes.insert(class.name.clone(), class);
    }

    pub const fn host(&self) -> &H {
        &self.host
    }

    fn class(&self, name: &str) -> Result<&LoadedClass, RuntimeError> {
        self.classes
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownClass(name.to_string()))
    }

    /// Create an instance through the constructor with matching arity.
    pub fn construct(&self, class: &str, args: Vec<Value>) -> Result<Arc<Instance>, RuntimeError> {
        let rt = self.class(class)?;
        let arity = args.len();

        if let Some(ctor) = rt
            .members
            .iter()
            .find(|m| m.kind == MemberKind::Constructor && m.signature.params.len() == arity)
        {
            let this = rt.allocate();
            let mut frame = Frame::new(Some(Arc::clone(&this)), param_names(ctor), args);
            self.exec(rt, &ctor.body, &mut frame)?;

            return Ok(this);
        }

        let user = rt
            .user
            .iter()
            .enumerate()
            .find(|(_, m)| m.is_constructor() && m.params.len() == arity);
        if let Some((index, method)) = user {
            let this = rt.allocate();
            let names = method.params.iter().map(|p| p.name.clone());
            let mut frame = Frame::new(Some(Arc::clone(&this)), names, args);
            self.init_fields(rt, &this, &frame)?;
            self.run_user(rt, index, method, &mut frame)?;

            return Ok(this);
        }

        // the implicit no-argument constructor
        let declares_any = rt.members.iter().any(|m| m.kind == MemberKind::Constructor)
            || rt.user.iter().any(MethodSpec::is_constructor);
        if arity == 0 && !declares_any {
            let this = rt.allocate();
            self.init_fields(rt, &this, &Frame::new(Some(Arc::clone(&this)), [], Vec::new()))?;

            return Ok(this);
        }

        Err(RuntimeError::NoConstructor {
            class: class.to_string(),
            arity,
        })
    }

    /// Call an instance method, generated or user-written.
    pub fn call(&self, this: &Arc<Instance>, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let rt = self.class(this.class())?;

        self.dispatch(rt, Some(Arc::clone(this)), name, args)
    }

    pub fn call_static(&self, class: &str, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let rt = self.class(class)?;

        self.dispatch(rt, None, name, args)
    }

    /// Value equality, dispatching to a generated `equals` for objects.
    pub fn equals(&self, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
        a.equals_with(b, &mut |x: &Arc<Instance>, y: &Arc<Instance>| self.object_equals(x, y))
    }

    /// Hash under the fixed policy, dispatching to a generated `hashCode`.
    pub fn hash(&self, v: &Value) -> Result<i32, RuntimeError> {
        v.hash_with(&mut |o: &Arc<Instance>| self.object_hash(o))
    }

    fn object_equals(&self, a: &Arc<Instance>, b: &Arc<Instance>) -> Result<bool, RuntimeError> {
        let generated = self
            .classes
            .get(a.class())
            .is_some_and(|rt| rt.method("equals", 1, false).is_some());
        if !generated {
            return Ok(Arc::ptr_eq(a, b));
        }

        let out = self.call(a, "equals", vec![Value::Object(Arc::clone(b))])?;
        out.as_bool().ok_or(RuntimeError::TypeMismatch {
            expected: "bool",
            found: out.type_name(),
        })
    }

    fn object_hash(&self, o: &Arc<Instance>) -> Result<i32, RuntimeError> {
        let generated = self
            .classes
            .get(o.class())
            .is_some_and(|rt| rt.method("hashCode", 0, false).is_some());
        if !generated {
            return Ok(crate::hash::fold(i64::try_from(o.id()).unwrap_or_default()));
        }

        let out = self.call(o, "hashCode", Vec::new())?;
        out.as_int()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or(RuntimeError::TypeMismatch {
                expected: "int",
                found: out.type_name(),
            })
    }

    fn dispatch(
        &self,
        rt: &LoadedClass,
        this: Option<Arc<Instance>>,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let arity = args.len();
        let is_static = this.is_none();

        if let Some(m) = rt.method(name, arity, is_static) {
            let mut frame = Frame::new(this, param_names(m), args);
            return Ok(self.exec(rt, &m.body, &mut frame)?.unwrap_or(Value::Null));
        }

        let user = rt.user.iter().enumerate().find(|(_, m)| {
            !m.is_constructor() && m.name == name && m.params.len() == arity && m.is_static == is_static
        });
        if let Some((index, method)) = user {
            let names = method.params.iter().map(|p| p.name.clone());
            let mut frame = Frame::new(this, names, args);
            return self.run_user(rt, index, method, &mut frame);
        }

        Err(RuntimeError::NoMethod {
            class: rt.name.clone(),
            name: name.to_string(),
            arity,
        })
    }

    // run_user
    // through the composed wrapper when there is one
    fn run_user(
        &self,
        rt: &LoadedClass,
        index: usize,
        method: &MethodSpec,
        frame: &mut Frame,
    ) -> Result<Value, RuntimeError> {
        if let Some(w) = rt.wrapper(index) {
            return Ok(self.exec(rt, &w.body, frame)?.unwrap_or(Value::Null));
        }
        if method.delegates {
            self.host.delegate(&method.body, frame)?;
        }

        self.host.invoke(&method.body, frame)
    }

    // init_fields
    // field initializers, as run before a user constructor body
    fn init_fields(&self, rt: &LoadedClass, this: &Instance, frame: &Frame) -> Result<(), RuntimeError> {
        for f in rt.fields.iter().filter(|f| !f.is_static && !f.lazy) {
            if let Some(expr) = &f.default {
                this.set(&f.name, self.eval(expr, frame)?);
            }
        }

        Ok(())
    }

    fn exec(
        &self,
        rt: &LoadedClass,
        body: &[Instruction],
        frame: &mut Frame,
    ) -> Result<Option<Value>, RuntimeError> {
        for ins in body {
            if let Some(v) = self.step(rt, ins, frame)? {
                return Ok(Some(v));
            }
        }

        Ok(None)
    }

    // step
    // Some(value) ends the member
    #[allow(clippy::too_many_lines)]
    fn step(
        &self,
        rt: &LoadedClass,
        ins: &Instruction,
        frame: &mut Frame,
    ) -> Result<Option<Value>, RuntimeError> {
        match ins {
            Instruction::InitDefault { field, expr } => {
                let v = self.eval(expr, frame)?;
                frame.receiver(field)?.set(field, v);
            }
            Instruction::RequireNonNull { name } => {
                if frame.lookup(name)?.is_null() {
                    return Err(Failure::invalid_argument(name.clone()).into());
                }
            }
            Instruction::Assign { field, value } => {
                let v = self.operand(value, frame)?;
                frame.receiver(field)?.set(field, v);
            }
            Instruction::Append { field, value } => {
                let v = self.operand(value, frame)?;
                frame.receiver(field)?.update(field, |slot| push(slot, vec![v]));
            }
            Instruction::AppendAll { field, value } => {
                let v = self.operand(value, frame)?;
                let items = v
                    .items()
                    .ok_or(RuntimeError::TypeMismatch {
                        expected: "collection",
                        found: v.type_name(),
                    })?
                    .to_vec();
                frame.receiver(field)?.update(field, |slot| push(slot, items));
            }
            Instruction::Clear { field } => {
                frame.receiver(field)?.set(field, Value::List(Vec::new()));
            }
            Instruction::Return(op) => return self.operand(op, frame).map(Some),
            Instruction::ReturnThis => {
                return Ok(Some(Value::Object(Arc::clone(frame.receiver("this")?))));
            }
            Instruction::ReturnNew { class, args, init } => {
                let args = args
                    .iter()
                    .map(|a| self.operand(a, frame))
                    .collect::<Result<Vec<_>, _>>()?;
                let created = self.construct(class, args)?;
                for (field, op) in init {
                    created.set(field, self.operand(op, frame)?);
                }

                return Ok(Some(Value::Object(created)));
            }
            Instruction::ReturnThisIfUnchanged { field, param } => {
                let this = frame.receiver(field)?;
                if this.field(field)?.identical(&frame.lookup(param)?) {
                    return Ok(Some(Value::Object(Arc::clone(this))));
                }
            }
            Instruction::LazyGet { field, init } => {
                let this = Arc::clone(frame.receiver(field)?);
                let slot = this
                    .lazy(field)
                    .ok_or_else(|| RuntimeError::Unbound(format!("{}.{field}", this.class())))?;
                let frame: &Frame = frame;

                return slot.get_or_try_init(|| self.eval(init, frame)).map(Some);
            }
            Instruction::EnsureSameType { param } => {
                let this = frame.receiver(param)?;
                match frame.lookup(param)? {
                    Value::Object(other) if Arc::ptr_eq(&other, this) => {
                        return Ok(Some(Value::Bool(true)));
                    }
                    Value::Object(other) if other.class() == this.class() => {}
                    _ => return Ok(Some(Value::Bool(false))),
                }
            }
            Instruction::CompareField { field, param, .. } => {
                let mine = frame.receiver(field)?.field(field)?;
                let other = frame.lookup(param)?;
                let other = other.as_object().ok_or(RuntimeError::TypeMismatch {
                    expected: "object",
                    found: other.type_name(),
                })?;
                if !self.equals(&mine, &other.field(field)?)? {
                    return Ok(Some(Value::Bool(false)));
                }
            }
            Instruction::HashSeed(seed) => frame.hash = *seed,
            Instruction::HashField { field, .. } => {
                let v = frame.receiver(field)?.field(field)?;
                let h = self.hash(&v)?;
                frame.hash = frame.hash.wrapping_mul(HASH_MULTIPLIER).wrapping_add(h);
            }
            Instruction::ReturnHash => return Ok(Some(Value::Int(frame.hash.into()))),
            Instruction::WithLock { lock, mode, body } => {
                let owner = match lock {
                    LockRef::Implicit { is_static: true } => Arc::clone(&rt.statics),
                    LockRef::Named(name) if rt.is_static_field(name) => Arc::clone(&rt.statics),
                    _ => Arc::clone(frame.receiver("lock")?),
                };
                let out = match lock {
                    LockRef::Named(name) => owner
                        .locks()
                        .with_named(name, || self.exec(rt, body, frame)),
                    LockRef::Implicit { .. } => {
                        owner.locks().with(*mode, || self.exec(rt, body, frame))
                    }
                }?;
                if out.is_some() {
                    return Ok(out);
                }
            }
            Instruction::Scoped {
                binding,
                acquire,
                release,
                body,
            } => {
                // acquisition failures propagate before anything needs release
                let resource = self.eval(acquire, frame)?;
                frame.locals.insert(binding.clone(), resource.clone());

                let out = run_scoped(
                    resource,
                    |_| self.exec(rt, body, frame),
                    |r| {
                        if r.is_null() {
                            Ok(())
                        } else {
                            self.host.release(&r, release)
                        }
                    },
                )?;
                if out.is_some() {
                    return Ok(out);
                }
            }
            // failures already travel unchanged
            Instruction::Rethrow { body, .. } => {
                let out = self.exec(rt, body, frame)?;
                if out.is_some() {
                    return Ok(out);
                }
            }
            Instruction::DelegateCall { body } => self.host.delegate(body, frame)?,
            Instruction::Invoke { body } => return self.host.invoke(body, frame).map(Some),
            Instruction::Inner => {}
        }

        Ok(None)
    }

    fn operand(&self, op: &Operand, frame: &Frame) -> Result<Value, RuntimeError> {
        Ok(match op {
            Operand::Field(f) => frame.receiver(f)?.field(f)?,
            Operand::Param(p) => frame.lookup(p)?,
            Operand::Literal(lit) => Value::from_literal(lit),
            Operand::This => Value::Object(Arc::clone(frame.receiver("this")?)),
            Operand::Defaulted { field, flag, expr } => {
                let this = frame.receiver(field)?;
                if this.get(flag).and_then(|v| v.as_bool()) == Some(true) {
                    this.field(field)?
                } else {
                    self.eval(expr, frame)?
                }
            }
            Operand::Snapshot { field, unique } => {
                let items = frame
                    .receiver(field)?
                    .get(field)
                    .and_then(|v| v.items().map(<[Value]>::to_vec))
                    .unwrap_or_default();
                if *unique {
                    Value::Set(self.dedup(items)?)
                } else {
                    Value::List(items)
                }
            }
        })
    }

    // dedup
    // first occurrence wins
    fn dedup(&self, items: Vec<Value>) -> Result<Vec<Value>, RuntimeError> {
        let mut out: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            let mut seen = false;
            for kept in &out {
                if self.equals(kept, &item)? {
                    seen = true;
                    break;
                }
            }
            if !seen {
                out.push(item);
            }
        }

        Ok(out)
    }

    fn eval(&self, expr: &Expr, frame: &Frame) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(Value::from_literal(lit)),
            Expr::Call { function, .. } => self.host.call(function, frame),
            Expr::New(ty) if ty.is_set() => Ok(Value::Set(Vec::new())),
            Expr::New(ty) if ty.is_collection() => Ok(Value::List(Vec::new())),
            Expr::New(ty) if self.classes.contains_key(&ty.name) => {
                self.construct(&ty.name, Vec::new()).map(Value::Object)
            }
            Expr::New(ty) => self.host.call(&format!("new {}", ty.name), frame),
            Expr::Local(name) => frame
                .local(name)
                .cloned()
                .ok_or_else(|| RuntimeError::Unbound(name.clone())),
            Expr::Method { receiver, name, .. } => match self.eval(receiver, frame)? {
                Value::Object(o) => self.call(&o, name, Vec::new()),
                other => self.host.method(&other, name),
            },
        }
    }
}

// push
// accumulate into a collection field, creating it on first use
fn push(slot: &mut Value, items: Vec<Value>) {
    match slot {
        Value::List(existing) | Value::Set(existing) => existing.extend(items),
        other => *other = Value::List(items),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Bodies;
    use stencil_schema::{
        expr::Literal,
        member::{Param, Priority, Section, Signature},
        node::FieldSpec,
        target::{DirectiveRef, Target},
        types::Visibility,
    };

    fn source() -> DirectiveRef {
        DirectiveRef {
            id: 0,
            name: "test".into(),
            target: Target::Class,
        }
    }

    fn counter() -> EmissionResult {
        let class = ClassSpec::new("Counter").field(FieldSpec::new("n", TypeRef::int()));
        let mut result = EmissionResult::new(class);

        result.members.push(GeneratedMember::new(
            MemberKind::Constructor,
            Signature::new("Counter", Visibility::Public).param(Param::new("n", TypeRef::int())),
            vec![Instruction::Assign {
                field: "n".into(),
                value: Operand::Param("n".into()),
            }],
            source(),
            Priority::explicit(Section::Constructor, 0),
        ));
        result.members.push(GeneratedMember::new(
            MemberKind::Method,
            Signature::new("getN", Visibility::Public).returns(TypeRef::int()),
            vec![Instruction::Return(Operand::Field("n".into()))],
            source(),
            Priority::explicit(Section::Accessor, 0),
        ));

        result
    }

    #[test]
    fn constructor_and_getter_round_trip_a_field() {
        let interp = Interpreter::new(&counter(), Bodies::new());

        let c = interp.construct("Counter", vec![Value::from(7)]).unwrap();
        let n = interp.call(&c, "getN", Vec::new()).unwrap();

        assert_eq!(n.as_int(), Some(7));
    }

    #[test]
    fn unknown_members_are_reported() {
        let interp = Interpreter::new(&counter(), Bodies::new());
        let c = interp.construct("Counter", vec![Value::from(1)]).unwrap();

        assert!(matches!(
            interp.call(&c, "setN", vec![Value::from(2)]),
            Err(RuntimeError::NoMethod { .. })
        ));
        assert!(matches!(
            interp.construct("Counter", Vec::new()),
            Err(RuntimeError::NoConstructor { arity: 0, .. })
        ));
    }

    #[test]
    fn snapshot_dedups_in_first_insertion_order() {
        let interp = Interpreter::new(&counter(), Bodies::new());
        let this = interp.construct("Counter", vec![Value::from(0)]).unwrap();
        this.set(
            "tags",
            Value::List(vec![Value::from("b"), Value::from("a"), Value::from("b")]),
        );
        let frame = Frame::new(Some(this), [], Vec::new());

        let snap = interp
            .operand(
                &Operand::Snapshot {
                    field: "tags".into(),
                    unique: true,
                },
                &frame,
            )
            .unwrap();

        let items: Vec<_> = snap.items().unwrap().iter().filter_map(Value::as_text).collect();
        assert_eq!(items, ["b", "a"]);
    }

    #[test]
    fn literal_operands_evaluate_without_a_receiver() {
        let interp = Interpreter::new(&counter(), Bodies::new());
        let frame = Frame::new(None, [], Vec::new());

        let v = interp
            .operand(&Operand::Literal(Literal::Text("x".into())), &frame)
            .unwrap();
        assert_eq!(v.as_text(), Some("x"));
        assert!(matches!(
            interp.operand(&Operand::This, &frame),
            Err(RuntimeError::NoReceiver(_))
        ));
    }
}
