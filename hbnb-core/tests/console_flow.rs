//! End-to-end console sessions against a real storage file.
//!
//! Each test drives the console the way the binary does: a fresh storage
//! handle is reloaded from disk, commands are fed line by line, and a second
//! handle reloads the file to check what was persisted.

use hbnb_core::{AttrValue, Console, EntityKind, FileStorage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("file.json")
}

/// Start a console over a freshly reloaded store, the way the binary does.
fn open(path: &Path) -> Console<Vec<u8>> {
    let mut storage = FileStorage::with_path(path);
    storage.reload().expect("Failed to reload storage");
    Console::new(storage, Vec::new())
}

fn run(console: &mut Console<Vec<u8>>, script: &str) -> String {
    console.run(script.as_bytes(), false).expect("Console failed");
    String::from_utf8(std::mem::take(console.output_mut())).unwrap()
}

// =============================================================================
// Create / show / destroy
// =============================================================================

#[test]
fn test_create_show_destroy_show() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let mut console = open(&store_path(&dir));

    let id = run(&mut console, "create User\n").trim().to_string();
    let key = format!("User.{id}");
    assert_eq!(console.storage().len(), 1);
    assert!(console.storage().get(&key).is_some());

    let shown = run(&mut console, &format!("show User {id}\n"));
    assert!(shown.contains("[User]"), "Rendered entity should name its kind");
    assert!(shown.contains(&id), "Rendered entity should contain its id");

    let destroyed = run(&mut console, &format!("destroy User {id}\n"));
    assert!(destroyed.is_empty());
    assert!(console.storage().is_empty());

    let missing = run(&mut console, &format!("show User {id}\n"));
    assert_eq!(missing, "** no instance found **\n");
}

// =============================================================================
// Update coercion
// =============================================================================

#[test]
fn test_update_digit_string_is_integer() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = store_path(&dir);
    let mut console = open(&path);

    let id = run(&mut console, "create BaseModel\n").trim().to_string();
    run(&mut console, &format!("update BaseModel {id} name \"42\"\n"));

    let key = format!("BaseModel.{id}");
    assert_eq!(
        console.storage().get(&key).unwrap().get("name"),
        Some(&AttrValue::Int(42))
    );

    // The integer survives a restart as a JSON number.
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[&key]["name"], 42);

    let restarted = open(&path);
    assert_eq!(
        restarted.storage().get(&key).unwrap().get("name"),
        Some(&AttrValue::Int(42))
    );
}

// =============================================================================
// Persistence across restarts
// =============================================================================

#[test]
fn test_state_survives_restart() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = store_path(&dir);

    let mut ids = Vec::new();
    {
        let mut console = open(&path);
        for kind in EntityKind::ALL {
            let id = run(&mut console, &format!("create {kind}\n"))
                .trim()
                .to_string();
            ids.push((kind, id));
        }
        let (kind, id) = &ids[1];
        run(&mut console, &format!("update {kind} {id} email \"a@b.c\"\n"));
    }

    let mut console = open(&path);
    assert_eq!(console.storage().len(), EntityKind::ALL.len());
    for (kind, id) in &ids {
        let key = format!("{kind}.{id}");
        let entity = console.storage().get(&key).expect("Entity should reload");
        assert_eq!(entity.kind(), *kind);
        assert!(entity.updated_at() >= entity.created_at());
    }

    let (kind, id) = &ids[1];
    let listed = run(&mut console, &format!("all {kind}\n"));
    assert!(listed.contains(id));
    assert!(listed.contains("\"email\": \"a@b.c\""));
}

#[test]
fn test_missing_file_starts_empty() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let mut console = open(&store_path(&dir));

    assert!(console.storage().is_empty());
    assert_eq!(run(&mut console, "all\n"), "[]\n");
    assert!(!store_path(&dir).exists(), "Reading commands must not create the file");
}

#[test]
fn test_destroy_is_persisted() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = store_path(&dir);

    let mut console = open(&path);
    let keep = run(&mut console, "create Amenity\n").trim().to_string();
    let gone = run(&mut console, "create Amenity\n").trim().to_string();
    run(&mut console, &format!("destroy Amenity {gone}\n"));

    let restarted = open(&path);
    assert_eq!(restarted.storage().len(), 1);
    assert!(restarted.storage().get(&format!("Amenity.{keep}")).is_some());
}
