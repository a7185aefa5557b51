#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the registry commands.
//!
//! These drive [`commands::registry::apply`] against real files in a
//! temporary dotfiles root and check what ends up on disk.

mod common;

use common::{TestEnv, TestEnvBuilder};
use dotts::commands::registry::{self, EntryAction};
use dotts::error::RegistryError;
use dotts::logging::Logger;
use dotts::registry::{
    Domain, MachineAttributes, MachineRegistry, MethodRegistry, RegistryManager, RegistryValue,
};

fn run<V: RegistryValue>(
    registry: &RegistryManager<V>,
    action: EntryAction<V>,
) -> anyhow::Result<String> {
    let mut out = Vec::new();
    registry::apply(registry, action, &Logger::new("test"), &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

fn method(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

// ---------------------------------------------------------------------------
// Dependency scenario
// ---------------------------------------------------------------------------

#[test]
fn dependency_add_mod_scenario() {
    let env = TestEnv::new();
    let deps = MethodRegistry::dependencies(&env.paths());

    let (name, value) = method("neovim", "brew");
    run(&deps, EntryAction::Add { name, value }).unwrap();
    assert_eq!(run(&deps, EntryAction::List).unwrap(), "neovim: brew\n");

    let (name, value) = method("neovim", "apt");
    run(&deps, EntryAction::Modify { name, value }).unwrap();
    assert_eq!(run(&deps, EntryAction::List).unwrap(), "neovim: apt\n");

    let before = env.registry_text(Domain::Dependencies);
    let (name, value) = method("vim", "apt");
    let err = run(&deps, EntryAction::Modify { name, value }).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::NotFound { .. })
    ));
    assert_eq!(env.registry_text(Domain::Dependencies), before);
}

#[test]
fn registries_are_independent_files() {
    let env = TestEnv::new();
    let paths = env.paths();
    let (name, value) = method("EDITOR", "nvim");
    run(&MethodRegistry::env_vars(&paths), EntryAction::Add { name, value }).unwrap();
    let (name, value) = method("fzf", "git");
    run(&MethodRegistry::plugins(&paths), EntryAction::Add { name, value }).unwrap();

    assert_eq!(
        env.registry_text(Domain::EnvVars),
        "{\n  \"EDITOR\": \"nvim\"\n}\n"
    );
    assert_eq!(
        env.registry_text(Domain::Plugins),
        "{\n  \"fzf\": \"git\"\n}\n"
    );
    assert!(!paths.registry_file(Domain::Dependencies).exists());
}

#[test]
fn add_then_remove_restores_previous_document() {
    let env = TestEnvBuilder::new()
        .with_registry(Domain::Plugins, "{\n  \"fzf\": \"git\"\n}\n")
        .build();
    let plugins = MethodRegistry::plugins(&env.paths());
    let before = plugins.store().load().unwrap();

    let (name, value) = method("zoxide", "cargo");
    run(&plugins, EntryAction::Add { name, value }).unwrap();
    run(
        &plugins,
        EntryAction::Remove {
            name: "zoxide".to_string(),
        },
    )
    .unwrap();

    assert_eq!(plugins.store().load().unwrap(), before);
}

// ---------------------------------------------------------------------------
// Machines
// ---------------------------------------------------------------------------

#[test]
fn machine_duplicate_add_leaves_registry_unchanged() {
    let env = TestEnv::new();
    let machines = MachineRegistry::machines(&env.paths());
    let add = || EntryAction::Add {
        name: "laptop".to_string(),
        value: MachineAttributes::default(),
    };
    run(&machines, add()).unwrap();
    let before = env.registry_text(Domain::Machines);

    let err = run(&machines, add()).unwrap_err();
    assert_eq!(err.to_string(), "machine 'laptop' already exists");
    assert_eq!(env.registry_text(Domain::Machines), before);
    assert_eq!(before, "{\n  \"laptop\": {}\n}\n");
}

#[test]
fn machine_attributes_on_disk_survive_other_writes() {
    let env = TestEnvBuilder::new()
        .with_registry(Domain::Machines, r#"{"desktop": {"os": "arch"}}"#)
        .build();
    let machines = MachineRegistry::machines(&env.paths());
    run(
        &machines,
        EntryAction::Add {
            name: "laptop".to_string(),
            value: MachineAttributes::default(),
        },
    )
    .unwrap();
    insta::assert_snapshot!(run(&machines, EntryAction::List).unwrap().trim_end(), @r#"
    desktop: {"os":"arch"}
    laptop
    "#);
}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

#[test]
fn corrupt_registry_is_reported_not_emptied() {
    let env = TestEnvBuilder::new()
        .with_registry(Domain::Dependencies, "{\"neovim\": \"brew\",")
        .build();
    let deps = MethodRegistry::dependencies(&env.paths());

    let (name, value) = method("ripgrep", "cargo");
    let err = run(&deps, EntryAction::Add { name, value }).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::CorruptRegistry { .. })
    ));
    assert_eq!(
        env.registry_text(Domain::Dependencies),
        "{\"neovim\": \"brew\","
    );
}

#[test]
fn string_registry_holding_objects_is_corrupt() {
    let env = TestEnvBuilder::new()
        .with_registry(Domain::EnvVars, r#"{"EDITOR": {"value": "nvim"}}"#)
        .build();
    let err = run(&MethodRegistry::env_vars(&env.paths()), EntryAction::List).unwrap_err();
    assert!(err.to_string().contains("env.json"), "{err:#}");
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[test]
fn dependency_file_import() {
    let env = TestEnvBuilder::new()
        .with_file("Dependencies.json", r#"{"neovim": "brew", "tmux": "apt"}"#)
        .build();
    let deps = MethodRegistry::dependencies(&env.paths());
    let count = registry::import_into(
        &deps,
        &env.root_path().join("Dependencies.json"),
        &Logger::new("test"),
    )
    .unwrap();
    assert_eq!(count, 2);
    insta::assert_snapshot!(run(&deps, EntryAction::List).unwrap().trim_end(), @r"
    neovim: brew
    tmux: apt
    ");
}
