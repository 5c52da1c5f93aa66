use rpcweave_shared::{MarkerValue, RemoteCallDirection, StableHash, TypeRef, Value};
use rpcweave_test::{Harness, MethodBuilder, ModuleBuilder, RecordingRuntime, TypeBuilder};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .is_test(true)
        .try_init()
        .ok();
}

fn weave_scoreboard(include_owner: Option<bool>) -> Harness {
    let mut announce = MethodBuilder::client_rpc("Announce")
        .marker_arg("channel", MarkerValue::Int(2))
        .param("winner", TypeRef::String)
        .param("score", TypeRef::Long)
        .stores_params_in(&["winner", "score"]);
    if let Some(include_owner) = include_owner {
        announce = announce.marker_arg("includeOwner", MarkerValue::Bool(include_owner));
    }
    Harness::weave(
        ModuleBuilder::new("Game")
            .with_type(
                TypeBuilder::behaviour("Scoreboard")
                    .field("winner", TypeRef::String)
                    .field("score", TypeRef::Long)
                    .method(announce),
            )
            .build(),
    )
}

#[test]
fn client_call_is_sent_from_the_server() {
    init_logger();
    let harness = weave_scoreboard(None);
    let mut server = RecordingRuntime::server();
    let board = harness.instance("Scoreboard");

    harness
        .call(
            &mut server,
            &board,
            "Announce",
            vec![Value::Str("blue".to_string()), Value::Long(9000)],
        )
        .unwrap();

    let (direction, call) = server.take_sent();
    assert_eq!(direction, RemoteCallDirection::ToClient);
    assert_eq!(call.hash, StableHash::of("Scoreboard::Announce"));
    assert_eq!(call.channel, 2);
    // includeOwner defaults to true
    assert!(call.flag);

    let registration = harness.registry.get(call.hash).unwrap();
    assert_eq!(registration.direction, RemoteCallDirection::ToClient);
    assert!(!registration.requires_authority);
}

#[test]
fn include_owner_is_passed_as_the_send_flag() {
    init_logger();
    let harness = weave_scoreboard(Some(false));
    let mut server = RecordingRuntime::server();
    let board = harness.instance("Scoreboard");

    harness
        .call(
            &mut server,
            &board,
            "Announce",
            vec![Value::Str("red".to_string()), Value::Long(1)],
        )
        .unwrap();

    let (_, call) = server.take_sent();
    assert!(!call.flag);
}

#[test]
fn client_receives_the_call() {
    init_logger();
    let harness = weave_scoreboard(None);
    let mut server = RecordingRuntime::server();
    let local = harness.instance("Scoreboard");
    harness
        .call(
            &mut server,
            &local,
            "Announce",
            vec![Value::Str("green".to_string()), Value::Long(-4)],
        )
        .unwrap();
    let (_, call) = server.take_sent();

    let mut client = RecordingRuntime::client();
    let remote = harness.instance("Scoreboard");
    harness.deliver(&mut client, &remote, &call, None).unwrap();

    assert!(client.errors.is_empty());
    assert_eq!(remote.get("winner"), Some(Value::Str("green".to_string())));
    assert_eq!(remote.get("score"), Some(Value::Long(-4)));
}
