use crate::{
    directive_kind::DirectiveKind,
    imp::{Gen, Output, target_method, wrapper},
    naming,
    registry::Directive,
    view::ClassView,
};
use stencil_schema::{
    error::DirectiveError,
    member::{Instruction, LockMode, LockRef, MemberKind, Priority, Section, Signature},
    types::{TypeRef, Visibility},
};

pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let (index, method) = target_method(view, d)?;
    if method.is_constructor() {
        return Err(DirectiveError::schema("constructors cannot be lock-wrapped"));
    }
    let is_static = method.is_static;

    let (lock, mode, synthetic) = match (d.kind, d.params.ident("lock")) {
        (DirectiveKind::Locked, Some(name)) => {
            let field = view.class().get_field(name).ok_or_else(|| {
                DirectiveError::schema(format!("lock field '{name}' does not exist"))
            })?;
            if !field.ty.is_lock() {
                return Err(DirectiveError::consistency(format!(
                    "'{name}' is {}, not a lock",
                    field.ty
                )));
            }
            if is_static && !field.is_static() {
                return Err(DirectiveError::consistency(format!(
                    "static method '{}' cannot lock instance field '{name}'",
                    method.name
                )));
            }

            (LockRef::Named(name.to_string()), LockMode::Exclusive, None)
        }
        (DirectiveKind::Locked, None) => (
            LockRef::Implicit { is_static },
            LockMode::Exclusive,
            Some(false),
        ),
        (DirectiveKind::LockedRead, _) => (LockRef::Implicit { is_static }, LockMode::Read, Some(true)),
        (DirectiveKind::LockedWrite, _) => {
            (LockRef::Implicit { is_static }, LockMode::Write, Some(true))
        }
        (kind, _) => {
            return Err(DirectiveError::schema(format!("{kind} is not a lock directive")));
        }
    };

    let g = Gen::new(view, d);
    let mut out = Output::default();

    out.push(wrapper(
        &g,
        index,
        method,
        Priority::LOCK,
        vec![Instruction::WithLock {
            lock,
            mode,
            body: vec![Instruction::Inner],
        }],
    ));

    // every method sharing the implicit lock emits the same field; the
    // resolver merges them
    if let Some(read_write) = synthetic {
        let ty = if read_write {
            TypeRef::new("java.util.concurrent.locks.ReentrantReadWriteLock")
        } else {
            TypeRef::new("java.util.concurrent.locks.ReentrantLock")
        };
        let mut sig = Signature::field(naming::lock_field(read_write, is_static), ty, Visibility::Private);
        sig.is_static = is_static;

        out.push(g.member(
            MemberKind::Field,
            sig,
            Vec::new(),
            Priority::explicit(Section::Field, 0),
        ));
    }

    Ok(out)
}
