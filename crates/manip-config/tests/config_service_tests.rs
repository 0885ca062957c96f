// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
use manip_config::{ConfigError, ConfigService, ConfigStore, FsConfigStore, MemoryConfigStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
struct Limits {
    max_iterations: usize,
    error_threshold: f64,
}

#[test]
fn missing_key_loads_as_none() {
    let svc = ConfigService::new(MemoryConfigStore::new());
    let loaded: Option<Limits> = svc.load("absent").expect("load");
    assert!(loaded.is_none());
    let fallback: Limits = svc.load_or_default("absent").expect("load");
    assert_eq!(fallback, Limits::default());
}

#[test]
fn memory_store_round_trips_values() {
    let svc = ConfigService::new(MemoryConfigStore::new());
    let limits = Limits {
        max_iterations: 25,
        error_threshold: 1e-5,
    };
    svc.save("limits", &limits).expect("save");
    assert_eq!(svc.load::<Limits>("limits").expect("load"), Some(limits));
}

#[test]
fn fs_store_writes_one_file_per_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FsConfigStore::at(dir.path()).expect("store");
    let svc = ConfigService::new(store);
    svc.save("session", &Limits { max_iterations: 3, error_threshold: 0.5 })
        .expect("save");
    assert!(dir.path().join("session.json").exists());
    let loaded: Limits = svc.load_or_default("session").expect("load");
    assert_eq!(loaded.max_iterations, 3);
}

#[test]
fn malformed_blob_is_a_serde_error() {
    let store = MemoryConfigStore::new();
    store.save_raw("broken", b"{not json").expect("save raw");
    let svc = ConfigService::new(store);
    let err = svc.load::<Limits>("broken").unwrap_err();
    assert!(matches!(err, ConfigError::Serde(_)));
}

#[test]
fn remove_forgets_values_in_both_stores() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fs_svc = ConfigService::new(FsConfigStore::at(dir.path()).expect("store"));
    let mem_svc = ConfigService::new(MemoryConfigStore::new());
    let limits = Limits { max_iterations: 7, error_threshold: 0.1 };

    fs_svc.save("limits", &limits).expect("save");
    mem_svc.save("limits", &limits).expect("save");
    assert!(fs_svc.remove("limits").expect("remove"));
    assert!(mem_svc.remove("limits").expect("remove"));
    assert!(!fs_svc.remove("limits").expect("remove"));
    assert!(fs_svc.load::<Limits>("limits").expect("load").is_none());
    assert!(mem_svc.load::<Limits>("limits").expect("load").is_none());
}

#[test]
fn keys_with_separators_are_rejected() {
    let svc = ConfigService::new(MemoryConfigStore::new());
    let err = svc.save("../escape", &Limits::default()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidKey(ref k) if k == "../escape"));
    assert!(matches!(
        svc.load::<Limits>("").unwrap_err(),
        ConfigError::InvalidKey(_)
    ));
}

#[test]
fn dotted_keys_keep_their_full_name_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let svc = ConfigService::new(FsConfigStore::at(dir.path()).expect("store"));
    svc.save("stat.leaf", &Limits::default()).expect("save");
    assert!(dir.path().join("stat.leaf.json").exists());
}
