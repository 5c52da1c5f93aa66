use rpcweave_shared::{BitReader, Serde, TypeRef, Value};
use rpcweave_test::{Harness, MethodBuilder, ModuleBuilder, RecordingRuntime, TypeBuilder};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .is_test(true)
        .try_init()
        .ok();
}

fn weave_turret() -> Harness {
    Harness::weave(
        ModuleBuilder::new("Game")
            .with_type(
                TypeBuilder::behaviour("Turret")
                    .field("power", TypeRef::Int)
                    .field("firedBy", TypeRef::Connection)
                    .method(
                        MethodBuilder::server_rpc("Fire")
                            .param("power", TypeRef::Int)
                            .sender("sender")
                            .stores_params_in(&["power", "firedBy"]),
                    ),
            )
            .build(),
    )
}

#[test]
fn sender_connection_is_not_serialized() {
    init_logger();
    let harness = weave_turret();
    let mut client = RecordingRuntime::client();
    let turret = harness.instance("Turret");

    // the caller passes nothing meaningful for the sender
    harness
        .call(&mut client, &turret, "Fire", vec![Value::Int(12), Value::Null])
        .unwrap();
    let (_, call) = client.take_sent();

    let mut reader = BitReader::new(&call.payload);
    assert_eq!(i32::de(&mut reader).unwrap(), 12);
    assert!(reader.bits_remaining() < 8);
}

#[test]
fn trampoline_injects_the_caller_connection() {
    init_logger();
    let harness = weave_turret();

    let turret = harness
        .send_to_server("Turret", "Fire", vec![Value::Int(12), Value::Null], Some(42))
        .unwrap();

    assert_eq!(turret.get("power"), Some(Value::Int(12)));
    assert_eq!(turret.get("firedBy"), Some(Value::Connection(42)));
}

#[test]
fn trampoline_reads_exactly_the_wire_arguments() {
    init_logger();
    let harness = weave_turret();
    let mut client = RecordingRuntime::client();
    let local = harness.instance("Turret");
    harness
        .call(&mut client, &local, "Fire", vec![Value::Int(-7), Value::Null])
        .unwrap();
    let (_, call) = client.take_sent();

    let mut server = RecordingRuntime::server();
    let remote = harness.instance("Turret");
    let reader = harness.deliver(&mut server, &remote, &call, Some(3)).unwrap();

    let mut expected = BitReader::new(&call.payload);
    i32::de(&mut expected).unwrap();
    assert_eq!(reader.bits_read(), expected.bits_read());
}
