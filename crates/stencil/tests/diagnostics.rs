use serde_json::json;
use stencil::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn account() -> ClassSpec {
    ClassSpec::new("Account")
        .field(FieldSpec::new("id", TypeRef::long()))
        .field(FieldSpec::new("name", TypeRef::string()))
        .field(FieldSpec::new("cache", TypeRef::string()).transient())
}

#[test]
fn excluded_fields_do_not_affect_equality() {
    init_logging();
    let class = account()
        .directive(DirectiveInvocation::class("all_args_constructor"))
        .directive(DirectiveInvocation::class("equals_and_hash_code").param("exclude", ["name"]));

    let out = stencil::process(&class);
    assert!(!out.has_errors(), "{:?}", out.diagnostics);
    let interp = Interpreter::new(&out, Bodies::new());

    let a = interp
        .construct("Account", vec![Value::from(1_i64), Value::from("a"), Value::from("x")])
        .unwrap();
    let b = interp
        .construct("Account", vec![Value::from(1_i64), Value::from("b"), Value::from("y")])
        .unwrap();

    assert!(interp.equals(&a.clone().into(), &b.clone().into()).unwrap());
    assert_eq!(interp.hash(&a.into()).unwrap(), interp.hash(&b.into()).unwrap());
}

#[test]
fn equality_exclude_marker_works_like_the_list() {
    let class = ClassSpec::new("Tagged")
        .directive(DirectiveInvocation::class("equals_and_hash_code"))
        .field(FieldSpec::new("id", TypeRef::long()))
        .field(
            FieldSpec::new("note", TypeRef::string())
                .directive(DirectiveInvocation::field("equality_exclude")),
        );

    let out = stencil::process(&class);
    let equals = out.method("equals").unwrap();

    let compared: Vec<_> = equals
        .body
        .iter()
        .filter_map(|i| match i {
            Instruction::CompareField { field, .. } => Some(field.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(compared, ["id"]);
}

#[test]
fn hash_fields_must_match_equals_fields() {
    init_logging();
    let class = account().directive(
        DirectiveInvocation::class("equals_and_hash_code")
            .param("exclude", ["name"])
            .param("hash_include", ["name"]),
    );

    let out = stencil::process(&class);

    let diag = out.with_code(ReasonCode::Consistency).next().unwrap();
    assert_eq!(diag.directive.as_deref(), Some("equals_and_hash_code"));
    assert_eq!(diag.target, "Account");
    assert!(diag.message.contains("name"));
    assert!(out.method("equals").is_none());
    assert!(out.method("hashCode").is_none());
}

#[test]
fn diagnostics_serialize_with_stable_codes() {
    let class = account()
        .directive(DirectiveInvocation::class("equals_and_hash_code").param("exclude", ["missing"]));

    let out = stencil::process(&class);
    let diag = out.errors().next().unwrap();

    let value = serde_json::to_value(diag).unwrap();
    assert_eq!(value["directive"], json!("equals_and_hash_code"));
    assert_eq!(value["target"], json!("Account"));
    assert_eq!(value["severity"], json!("error"));
    assert_eq!(value["code"], json!("schema"));

    let back: Diagnostic = serde_json::from_value(value).unwrap();
    assert_eq!(&back, diag);
}

#[test]
fn model_level_diagnostics_have_no_directive() {
    let class = ClassSpec::new("Config").field(FieldSpec::new("name", TypeRef::string()).final_());

    let out = stencil::process(&class);
    let value = serde_json::to_value(&out.diagnostics).unwrap();

    assert_eq!(value[0]["code"], json!("coverage"));
    assert_eq!(value[0]["target"], json!("Config.name"));
    assert!(value[0].get("directive").is_none());
}

#[test]
fn whole_result_round_trips_through_json() {
    let class = ClassSpec::new("Point")
        .directive(DirectiveInvocation::class("data"))
        .field(FieldSpec::new("x", TypeRef::int()).final_());

    let out = stencil::process(&class);
    let text = serde_json::to_string(&out).unwrap();
    let back: EmissionResult = serde_json::from_str(&text).unwrap();

    assert_eq!(back.members, out.members);
    assert_eq!(back.diagnostics, out.diagnostics);
}

#[test]
fn config_file_changes_generated_names() {
    let path = std::env::temp_dir().join(format!("stencil-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "[accessors]\nfluent = true\n\n[builder]\nsetter_prefix = \"with\"\n",
    )
    .unwrap();

    let engine = stencil::engine_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let class = ClassSpec::new("User")
        .directive(DirectiveInvocation::class("builder"))
        .field(
            FieldSpec::new("name", TypeRef::string())
                .directive(DirectiveInvocation::field("getter")),
        );
    let out = engine.process(&class);

    assert!(out.method("name").is_some());
    assert!(out.method("getName").is_none());
    let builder = out.nested_type("UserBuilder").unwrap();
    assert!(builder.nested_member(MemberKind::Method, "withName").is_some());
}

#[test]
fn missing_config_file_is_an_error() {
    let err = stencil::engine_from_file("/nonexistent/stencil.toml").unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
}
