use rpcweave_shared::{Module, TypeRef};
use rpcweave_test::{MethodBuilder, ModuleBuilder, TypeBuilder};
use rpcweave_weaver::{
    load_module, save_module, UnsupportedTypeError, WeaveError, WeaveOutcome, Weaver,
    WeaverError,
};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Off)
        .is_test(true)
        .try_init()
        .ok();
}

fn mixed_module() -> Module {
    ModuleBuilder::new("Game")
        .with_type(
            TypeBuilder::behaviour("ShipControl").method(
                MethodBuilder::server_rpc("Thrust")
                    .param("thrusting", TypeRef::Float)
                    .param("spin", TypeRef::Int),
            ),
        )
        .with_type(
            TypeBuilder::behaviour("Hold").method(
                MethodBuilder::server_rpc("Load").param("cargo", TypeRef::named("Cargo")),
            ),
        )
        .build()
}

#[test]
fn valid_calls_are_not_committed_when_another_fails() {
    init_logger();
    let original = mixed_module();
    let mut module = original.clone();

    let result = Weaver::default().weave(&mut module);

    let Err(WeaverError::Failed { diagnostics, .. }) = result else {
        panic!("expected the weave to fail");
    };
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].context.to_string(), "Hold::Load");
    assert_eq!(
        diagnostics[0].error,
        WeaveError::UnsupportedType(UnsupportedTypeError::Unregistered {
            ty: "Cargo".to_string()
        })
    );
    assert_eq!(module, original);
    assert!(module.registrations.is_empty());
}

#[test]
fn failed_weave_persists_nothing() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("game.json");
    save_module(&input, &mixed_module()).unwrap();

    let result = Weaver::default().weave_file(&input, &input);

    assert!(result.is_err());
    assert_eq!(load_module(&input).unwrap(), mixed_module());
    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn networked_field_types_are_checked_in_the_same_pass() {
    init_logger();
    let mut module = ModuleBuilder::new("Game")
        .with_type(
            TypeBuilder::behaviour("ShipControl")
                .networked("fuel", TypeRef::Float)
                .networked("owner", TypeRef::Connection)
                .method(MethodBuilder::server_rpc("Load").param("cargo", TypeRef::named("Cargo"))),
        )
        .build();

    let Err(WeaverError::Failed { diagnostics, .. }) = Weaver::default().weave(&mut module) else {
        panic!("expected the weave to fail");
    };

    let contexts: Vec<String> = diagnostics
        .iter()
        .map(|diagnostic| diagnostic.context.to_string())
        .collect();
    assert_eq!(contexts, vec!["ShipControl::Load", "ShipControl::owner"]);
}

#[test]
fn successful_weave_file_round_trips_through_disk() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("game.json");
    let output = dir.path().join("woven").join("game.json");
    let mut module = mixed_module();
    module.types.retain(|type_def| type_def.name == "ShipControl");
    save_module(&input, &module).unwrap();

    let outcome = Weaver::default().weave_file(&input, &output).unwrap();

    let WeaveOutcome::Woven(report) = outcome else {
        panic!("expected the module to be woven");
    };
    assert_eq!(report.remote_calls(), 1);
    let woven = load_module(&output).unwrap();
    assert!(woven.weaved);
    assert_eq!(woven.registrations, report.registrations);
}
