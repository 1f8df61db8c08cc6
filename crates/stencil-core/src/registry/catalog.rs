use crate::{
    directive_kind::DirectiveKind as K,
    registry::{Arg, DirectiveSchema, ParamSchema, ParamType, Registry},
};
use stencil_schema::{node::TargetKind as T, types::Access};

fn access(name: &str, default: Access) -> ParamSchema {
    ParamSchema::new(name, ParamType::Access).default(Arg::Access(default))
}

// register_all
pub(super) fn register_all(reg: &mut Registry) {
    // accessors
    let getter = || {
        DirectiveSchema::new(K::Accessor, &[T::Class, T::Field])
            .param(access("read", Access::Public).sticky())
            .param(access("write", Access::None))
            .param(ParamSchema::new("lazy", ParamType::Bool).default(Arg::Bool(false)))
    };
    reg.register("accessor", getter());
    reg.register("getter", getter());
    reg.register(
        "setter",
        DirectiveSchema::new(K::Accessor, &[T::Class, T::Field])
            .param(access("read", Access::None))
            .param(access("write", Access::Public).sticky()),
    );

    // constructors
    reg.register(
        "required_args_constructor",
        DirectiveSchema::new(K::RequiredArgsConstructor, &[T::Class])
            .param(access("access", Access::Public)),
    );
    reg.register(
        "all_args_constructor",
        DirectiveSchema::new(K::AllArgsConstructor, &[T::Class])
            .param(access("access", Access::Public)),
    );

    // equality
    reg.register(
        "equals_and_hash_code",
        DirectiveSchema::new(K::EqualsAndHashCode, &[T::Class])
            .param(ParamSchema::new("exclude", ParamType::IdentList))
            .param(ParamSchema::new("hash_exclude", ParamType::IdentList))
            .param(ParamSchema::new("hash_include", ParamType::IdentList)),
    );
    reg.register(
        "equality_exclude",
        DirectiveSchema::new(K::EqualityExclude, &[T::Field]),
    );

    // builder
    reg.register(
        "builder",
        DirectiveSchema::new(K::Builder, &[T::Class])
            .param(ParamSchema::new("class_name", ParamType::Ident))
            .param(ParamSchema::new("method_name", ParamType::Ident))
            .param(ParamSchema::new("build_method", ParamType::Ident))
            .param(ParamSchema::new("setter_prefix", ParamType::Text))
            .param(access("access", Access::Public))
            .param(ParamSchema::new("to_builder", ParamType::Bool).default(Arg::Bool(false))),
    );
    reg.register(
        "builder_default",
        DirectiveSchema::new(K::BuilderDefault, &[T::Field]),
    );
    reg.register(
        "singular",
        DirectiveSchema::new(K::Singular, &[T::Field])
            .param(ParamSchema::new("name", ParamType::Ident)),
    );

    // immutable value
    reg.register(
        "value",
        DirectiveSchema::new(K::Value, &[T::Class]).excludes(&["data"]),
    );
    reg.register("non_final", DirectiveSchema::new(K::NonFinal, &[T::Field]));
    reg.register(
        "with",
        DirectiveSchema::new(K::With, &[T::Class, T::Field]).param(access("access", Access::Public)),
    );
    reg.register(
        "data",
        DirectiveSchema::new(K::Data, &[T::Class]).excludes(&["value"]),
    );

    // wrappers
    reg.register(
        "cleanup",
        DirectiveSchema::new(K::Cleanup, &[T::Local]).param(
            ParamSchema::new("release", ParamType::Ident).default(Arg::Ident("close".to_string())),
        ),
    );
    reg.register(
        "sneaky_throws",
        DirectiveSchema::new(K::SneakyThrows, &[T::Method])
            .param(ParamSchema::new("kinds", ParamType::IdentList)),
    );
    reg.register(
        "locked",
        DirectiveSchema::new(K::Locked, &[T::Method])
            .param(ParamSchema::new("lock", ParamType::Ident))
            .excludes(&["locked_read", "locked_write"]),
    );
    reg.register(
        "locked_read",
        DirectiveSchema::new(K::LockedRead, &[T::Method]).excludes(&["locked", "locked_write"]),
    );
    reg.register(
        "locked_write",
        DirectiveSchema::new(K::LockedWrite, &[T::Method]).excludes(&["locked", "locked_read"]),
    );
    reg.register(
        "non_null",
        DirectiveSchema::new(K::NonNull, &[T::Field, T::Parameter]),
    );

    // local inference
    reg.register(
        "val",
        DirectiveSchema::new(K::Val, &[T::Local]).excludes(&["var"]),
    );
    reg.register("var", DirectiveSchema::new(K::Var, &[T::Local]));
}
