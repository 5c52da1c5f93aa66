use proptest::prelude::*;
use rpcweave_shared::{Module, StructValue, TypeRef, Value};
use rpcweave_test::{Harness, MethodBuilder, ModuleBuilder, TypeBuilder};
use rpcweave_weaver::{SerializerProvider, Weaver, WeaverConfig};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .is_test(true)
        .try_init()
        .ok();
}

/// One behaviour with a single server call `Set(value)` storing its argument in `last`
fn echo_module(ty: TypeRef) -> ModuleBuilder {
    ModuleBuilder::new("Game").with_type(
        TypeBuilder::behaviour("Echo").field("last", ty.clone()).method(
            MethodBuilder::server_rpc("Set")
                .param("value", ty)
                .stores_params_in(&["last"]),
        ),
    )
}

fn round_trip(module: Module, value: Value) -> Option<Value> {
    let harness = Harness::weave(module);
    harness
        .send_to_server("Echo", "Set", vec![value], None)
        .unwrap()
        .get("last")
}

fn vector2(x: f32, y: f32) -> Value {
    Value::Struct(StructValue {
        type_name: "Vector2".to_string(),
        fields: vec![
            ("x".to_string(), Value::Float(x)),
            ("y".to_string(), Value::Float(y)),
        ],
    })
}

#[test]
fn float_round_trips() {
    init_logger();
    let value = Value::Float(-12.25);
    assert_eq!(round_trip(echo_module(TypeRef::Float).build(), value.clone()), Some(value));
}

#[test]
fn string_round_trips() {
    init_logger();
    let value = Value::Str("full throttle, captain".to_string());
    assert_eq!(round_trip(echo_module(TypeRef::String).build(), value.clone()), Some(value));
}

#[test]
fn declared_struct_round_trips() {
    init_logger();
    let module = echo_module(TypeRef::named("Vector2"))
        .with_struct("Vector2", &[("x", TypeRef::Float), ("y", TypeRef::Float)])
        .build();

    let value = vector2(3.5, -1.0);
    assert_eq!(round_trip(module, value.clone()), Some(value));
}

#[test]
fn nested_struct_round_trips() {
    init_logger();
    let module = echo_module(TypeRef::named("Cargo"))
        .with_struct("Vector2", &[("x", TypeRef::Float), ("y", TypeRef::Float)])
        .with_struct(
            "Cargo",
            &[
                ("label", TypeRef::String),
                ("count", TypeRef::UInt),
                ("at", TypeRef::named("Vector2")),
            ],
        )
        .build();

    let value = Value::Struct(StructValue {
        type_name: "Cargo".to_string(),
        fields: vec![
            ("label".to_string(), Value::Str("ore".to_string())),
            ("count".to_string(), Value::UInt(40)),
            ("at".to_string(), vector2(1.0, 2.0)),
        ],
    });
    assert_eq!(round_trip(module, value.clone()), Some(value));
}

#[test]
fn user_registered_composite_round_trips() {
    init_logger();
    // declared as a struct, but only the registration makes it marshalable
    let module = echo_module(TypeRef::named("Vector2"))
        .with_struct("Vector2", &[("x", TypeRef::Float), ("y", TypeRef::Float)])
        .build();
    let mut provider = SerializerProvider::new();
    provider.register_struct(
        "Vector2",
        vec![
            ("x".to_string(), TypeRef::Float),
            ("y".to_string(), TypeRef::Float),
        ],
    );
    let config = WeaverConfig {
        generate_struct_serializers: false,
        ..WeaverConfig::default()
    };
    let harness = Harness::weave_with(&Weaver::new(config, provider), module);

    let value = vector2(0.25, 8.0);
    let echo = harness
        .send_to_server("Echo", "Set", vec![value.clone()], None)
        .unwrap();
    assert_eq!(echo.get("last"), Some(value));
}

#[test]
fn every_builtin_type_round_trips() {
    init_logger();
    let cases = vec![
        (TypeRef::Bool, Value::Bool(true)),
        (TypeRef::Byte, Value::Byte(200)),
        (TypeRef::Int, Value::Int(i32::MIN)),
        (TypeRef::UInt, Value::UInt(u32::MAX)),
        (TypeRef::Long, Value::Long(i64::MIN)),
        (TypeRef::ULong, Value::ULong(u64::MAX)),
        (TypeRef::Float, Value::Float(f32::MAX)),
        (TypeRef::Double, Value::Double(-0.125)),
        (TypeRef::String, Value::Str(String::new())),
    ];
    for (ty, value) in cases {
        assert_eq!(
            round_trip(echo_module(ty.clone()).build(), value.clone()),
            Some(value),
            "round trip of {}",
            ty
        );
    }
}

proptest! {
    #[test]
    fn prop_int_and_string_arguments_round_trip(spin in any::<i32>(), label in ".{0,32}") {
        let module = ModuleBuilder::new("Game")
            .with_type(
                TypeBuilder::behaviour("Echo")
                    .field("spin", TypeRef::Int)
                    .field("label", TypeRef::String)
                    .method(
                        MethodBuilder::server_rpc("Set")
                            .param("spin", TypeRef::Int)
                            .param("label", TypeRef::String)
                            .stores_params_in(&["spin", "label"]),
                    ),
            )
            .build();
        let harness = Harness::weave(module);

        let echo = harness
            .send_to_server("Echo", "Set", vec![Value::Int(spin), Value::Str(label.clone())], None)
            .unwrap();

        prop_assert_eq!(echo.get("spin"), Some(Value::Int(spin)));
        prop_assert_eq!(echo.get("label"), Some(Value::Str(label)));
    }

    #[test]
    fn prop_double_round_trips(value in any::<f64>().prop_filter("NaN never equals itself", |v| !v.is_nan())) {
        let echoed = round_trip(echo_module(TypeRef::Double).build(), Value::Double(value));
        prop_assert_eq!(echoed, Some(Value::Double(value)));
    }
}
