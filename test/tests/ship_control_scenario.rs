use rpcweave_shared::{
    BitReader, MethodRef, Module, RemoteCallDirection, Serde, StableHash, TypeRef, Value,
};
use rpcweave_test::{Harness, MethodBuilder, ModuleBuilder, RecordingRuntime, TypeBuilder};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .is_test(true)
        .try_init()
        .ok();
}

fn ship_module() -> Module {
    ModuleBuilder::new("Game")
        .with_type(
            TypeBuilder::behaviour("ShipControl")
                .field("lastThrust", TypeRef::Float)
                .field("lastSpin", TypeRef::Int)
                .method(
                    MethodBuilder::server_rpc("Thrust")
                        .param("thrusting", TypeRef::Float)
                        .param("spin", TypeRef::Int)
                        .stores_params_in(&["lastThrust", "lastSpin"]),
                ),
        )
        .build()
}

#[test]
fn weaving_adds_relocated_method_and_trampoline() {
    init_logger();
    let original = ship_module();
    let harness = Harness::weave(original.clone());

    let ship = harness.module.find_type("ShipControl").unwrap();
    let names: Vec<&str> = ship.methods.iter().map(|method| method.name.as_str()).collect();
    assert_eq!(names, vec!["Thrust", "UserCode_Thrust", "InvokeUserCode_Thrust"]);

    let before = original.find_type("ShipControl").unwrap().method("Thrust").unwrap();
    let relocated = ship.method("UserCode_Thrust").unwrap();
    assert_eq!(relocated.body, before.body);
    assert_eq!(relocated.params, before.params);

    let registration = &harness.module.registrations[0];
    assert_eq!(registration.hash, StableHash::of("ShipControl::Thrust"));
    assert_eq!(registration.qualified_name, "ShipControl::Thrust");
    assert_eq!(registration.direction, RemoteCallDirection::ToServer);
    assert!(registration.requires_authority);
    assert_eq!(
        registration.trampoline,
        MethodRef::new("ShipControl", "InvokeUserCode_Thrust")
    );
    assert!(harness.module.weaved);
}

#[test]
fn dispatcher_sends_arguments_in_declaration_order() {
    init_logger();
    let harness = Harness::weave(ship_module());
    let mut client = RecordingRuntime::client();
    let ship = harness.instance("ShipControl");

    harness
        .call(&mut client, &ship, "Thrust", vec![Value::Float(0.5), Value::Int(-3)])
        .unwrap();

    let (direction, call) = client.take_sent();
    assert_eq!(direction, RemoteCallDirection::ToServer);
    assert_eq!(call.instance, ship);
    assert_eq!(call.qualified_name, "ShipControl::Thrust");
    assert_eq!(call.hash, StableHash::of("ShipControl::Thrust"));
    assert_eq!(call.channel, 0);
    assert!(call.flag);

    let mut reader = BitReader::new(&call.payload);
    assert_eq!(f32::de(&mut reader).unwrap(), 0.5);
    assert_eq!(i32::de(&mut reader).unwrap(), -3);

    // the original logic did not run locally
    assert_eq!(ship.get("lastThrust"), Some(Value::Float(0.0)));
    assert_eq!(ship.get("lastSpin"), Some(Value::Int(0)));
}

#[test]
fn trampoline_runs_original_logic_on_the_server() {
    init_logger();
    let harness = Harness::weave(ship_module());

    let ship = harness
        .send_to_server(
            "ShipControl",
            "Thrust",
            vec![Value::Float(0.5), Value::Int(-3)],
            Some(7),
        )
        .unwrap();

    assert_eq!(ship.get("lastThrust"), Some(Value::Float(0.5)));
    assert_eq!(ship.get("lastSpin"), Some(Value::Int(-3)));
}

#[test]
fn writers_are_returned_to_the_pool() {
    init_logger();
    let harness = Harness::weave(ship_module());
    let mut client = RecordingRuntime::client();
    let ship = harness.instance("ShipControl");
    let mut interpreter = rpcweave_shared::Interpreter::new(&harness.module, &mut client);

    for _ in 0..3 {
        interpreter
            .call_virtual(&ship, "Thrust", vec![Value::Float(1.0), Value::Int(1)])
            .unwrap();
    }

    assert_eq!(interpreter.pooled_writers(), 1);
}

#[test]
fn derived_types_inherit_remote_calls() {
    init_logger();
    let module = ModuleBuilder::new("Game")
        .with_type(
            TypeBuilder::behaviour("ShipControl")
                .field("lastThrust", TypeRef::Float)
                .field("lastSpin", TypeRef::Int)
                .method(
                    MethodBuilder::server_rpc("Thrust")
                        .param("thrusting", TypeRef::Float)
                        .param("spin", TypeRef::Int)
                        .stores_params_in(&["lastThrust", "lastSpin"]),
                ),
        )
        .with_type(TypeBuilder::new("Destroyer", Some("ShipControl")))
        .build();
    let harness = Harness::weave(module);

    let destroyer = harness
        .send_to_server("Destroyer", "Thrust", vec![Value::Float(2.0), Value::Int(4)], None)
        .unwrap();

    assert_eq!(destroyer.get("lastSpin"), Some(Value::Int(4)));
}
