use rpcweave_shared::{RemoteCallDirection, TypeRef, Value};
use rpcweave_test::{Harness, MethodBuilder, ModuleBuilder, RecordingRuntime, TypeBuilder};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .is_test(true)
        .try_init()
        .ok();
}

fn weave_ship() -> Harness {
    Harness::weave(
        ModuleBuilder::new("Game")
            .with_type(
                TypeBuilder::behaviour("ShipControl")
                    .field("lastSpin", TypeRef::Int)
                    .field("hits", TypeRef::Int)
                    .method(
                        MethodBuilder::server_rpc("Spin")
                            .param("spin", TypeRef::Int)
                            .stores_params_in(&["lastSpin"]),
                    )
                    .method(
                        MethodBuilder::client_rpc("Hit")
                            .param("hits", TypeRef::Int)
                            .stores_params_in(&["hits"]),
                    ),
            )
            .build(),
    )
}

#[test]
fn server_call_is_refused_outside_the_server() {
    init_logger();
    let harness = weave_ship();
    let mut client = RecordingRuntime::client();
    let ship = harness.instance("ShipControl");
    harness
        .call(&mut client, &ship, "Spin", vec![Value::Int(9)])
        .unwrap();
    let (_, call) = client.take_sent();

    let mut not_server = RecordingRuntime::client();
    let target = harness.instance("ShipControl");
    let reader = harness
        .deliver(&mut not_server, &target, &call, Some(1))
        .unwrap();

    assert_eq!(target.get("lastSpin"), Some(Value::Int(0)));
    assert_eq!(reader.bits_read(), 0);
    assert_eq!(
        not_server.errors,
        vec!["ServerRpc ShipControl::Spin called while not running as server".to_string()]
    );
    assert!(not_server.sent.is_empty());
}

#[test]
fn client_call_is_refused_outside_the_client() {
    init_logger();
    let harness = weave_ship();
    let mut server = RecordingRuntime::server();
    let ship = harness.instance("ShipControl");
    harness
        .call(&mut server, &ship, "Hit", vec![Value::Int(3)])
        .unwrap();
    let (direction, call) = server.take_sent();
    assert_eq!(direction, RemoteCallDirection::ToClient);

    let mut not_client = RecordingRuntime::server();
    let target = harness.instance("ShipControl");
    let reader = harness.deliver(&mut not_client, &target, &call, None).unwrap();

    assert_eq!(target.get("hits"), Some(Value::Int(0)));
    assert_eq!(reader.bits_read(), 0);
    assert_eq!(not_client.errors.len(), 1);
}

#[test]
fn listen_server_accepts_both_directions() {
    init_logger();
    let harness = weave_ship();
    let mut host = RecordingRuntime::host();
    let ship = harness.instance("ShipControl");

    harness
        .call(&mut host, &ship, "Spin", vec![Value::Int(5)])
        .unwrap();
    harness
        .call(&mut host, &ship, "Hit", vec![Value::Int(2)])
        .unwrap();
    let calls: Vec<_> = host.sent.drain(..).collect();

    for (_, call) in &calls {
        harness.deliver(&mut host, &ship, call, Some(0)).unwrap();
    }

    assert!(host.errors.is_empty());
    assert_eq!(ship.get("lastSpin"), Some(Value::Int(5)));
    assert_eq!(ship.get("hits"), Some(Value::Int(2)));
}
