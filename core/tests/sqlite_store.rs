use reptile_core::{
    config::SimConfig,
    engine::SimEngine,
    save::{SaveManager, KEY_REPTILE_DATA},
    species::SpeciesId,
    store::{KvStore, SqliteStore},
    types::MS_PER_HOUR,
};
use std::path::PathBuf;

fn memory_store(namespace: &str) -> SqliteStore {
    let store = SqliteStore::in_memory(namespace).expect("in-memory store");
    store.migrate().expect("migration");
    store
}

/// Scratch database file, removed on drop.
struct TempDb(PathBuf);

impl TempDb {
    fn new(tag: &str) -> Self {
        let path = std::env::temp_dir()
            .join(format!("keeper-{tag}-{}.db", std::process::id()));
        let db = TempDb(path);
        db.cleanup();
        db
    }

    fn path(&self) -> &str {
        self.0.to_str().expect("utf-8 temp path")
    }

    fn cleanup(&self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path()));
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[test]
fn missing_keys_read_as_none() {
    let store = memory_store("reptile_game");
    assert_eq!(store.get("nothing").unwrap(), None);
}

#[test]
fn writes_are_staged_until_commit() {
    let mut store = memory_store("reptile_game");
    store.set("k", b"v1").unwrap();
    assert!(store.has_pending_writes());
    assert_eq!(store.get("k").unwrap(), Some(b"v1".to_vec()));
    store.commit().unwrap();
    assert!(!store.has_pending_writes());

    store.set("k", b"v2").unwrap();
    store.commit().unwrap();
    assert_eq!(store.get("k").unwrap(), Some(b"v2".to_vec()));

    store.erase("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
    store.commit().unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn committed_values_survive_reopen_and_uncommitted_do_not() {
    let db = TempDb::new("reopen");
    {
        let mut store = SqliteStore::open(db.path(), "reptile_game").unwrap();
        store.migrate().unwrap();
        store.set("kept", b"yes").unwrap();
        store.commit().unwrap();
        store.set("lost", b"no").unwrap();
    }
    let store = SqliteStore::open(db.path(), "reptile_game").unwrap();
    store.migrate().unwrap();
    assert_eq!(store.get("kept").unwrap(), Some(b"yes".to_vec()));
    assert_eq!(store.get("lost").unwrap(), None);
}

#[test]
fn namespaces_are_isolated() {
    let db = TempDb::new("namespaces");
    let mut game = SqliteStore::open(db.path(), "reptile_game").unwrap();
    game.migrate().unwrap();
    let mut other = SqliteStore::open(db.path(), "settings").unwrap();

    game.set("k", b"game").unwrap();
    game.commit().unwrap();
    other.set("k", b"other").unwrap();
    other.commit().unwrap();
    assert_eq!(game.get("k").unwrap(), Some(b"game".to_vec()));

    game.erase_all().unwrap();
    game.commit().unwrap();
    assert_eq!(game.get("k").unwrap(), None);
    assert_eq!(other.get("k").unwrap(), Some(b"other".to_vec()));
}

#[test]
fn save_manager_round_trips_through_sqlite() {
    let db = TempDb::new("saves");
    let mut engine = SimEngine::new(SimConfig::with_seed(3));
    engine.add(SpeciesId::PogonaVitticeps, "Sunny").unwrap();
    engine.add(SpeciesId::BallPython, "Orion").unwrap();
    engine.run_ticks(48, MS_PER_HOUR);

    {
        let store = SqliteStore::open(db.path(), "reptile_game").unwrap();
        store.migrate().unwrap();
        let mut saves = SaveManager::new(store);
        saves.save(engine.reptiles(), engine.now()).unwrap();
        saves.backup().unwrap();
    }

    let store = SqliteStore::open(db.path(), "reptile_game").unwrap();
    store.migrate().unwrap();
    let saves = SaveManager::new(store);
    assert!(saves.has_save_data().unwrap());
    assert!(saves.save_size().unwrap() > 0);
    let loaded = saves.load().unwrap().expect("save present");
    assert_eq!(loaded.reptiles, engine.reptiles());
    assert_eq!(loaded.timestamp, engine.now());

    let mut revived = SimEngine::new(SimConfig::default());
    assert!(revived.restore_or_default(&saves));
    assert_eq!(revived.count(), 2);
    assert!(saves.store().get(KEY_REPTILE_DATA).unwrap().is_some());
}
