//! End-to-end coverage: scan a real tree, search it, and feed filesystem
//! changes back into the index.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use sniff::scanner::{self, ScanOptions};
use sniff::{FsWatcher, SearchEngine, WatchEvent, WatchEventKind};

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dirs");
    }
    fs::write(path, contents).expect("write file");
}

fn sample_root() -> tempfile::TempDir {
    let temp = tempfile::TempDir::new().expect("tempdir");
    write(&temp.path().join("src/main.zig"), "pub fn main() {}\n");
    write(&temp.path().join("src/scorer.zig"), "");
    write(&temp.path().join("docs/README.md"), "# docs\n");
    temp
}

fn engine_for(root: &Path) -> SearchEngine {
    let root = root.canonicalize().expect("canonicalize");
    let options = ScanOptions::default();
    let mut engine = SearchEngine::new(root.clone(), options.clone(), 50);
    for path in scanner::scan_directory(&root, &options) {
        engine.index_mut().add(&path);
    }
    engine
}

fn result_paths(engine: &mut SearchEngine, query: &str) -> Vec<String> {
    engine
        .search(query)
        .iter()
        .map(|hit| hit.path.to_string())
        .collect()
}

#[test]
fn scan_and_search_end_to_end() {
    let temp = sample_root();
    let mut engine = engine_for(temp.path());
    assert_eq!(engine.index().count(), 3);

    let hits = engine.search("main");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "src/main.zig");
    assert_eq!(hits[0].positions, [4, 5, 6, 7]);
}

#[test]
fn created_and_deleted_events_update_results() {
    let temp = sample_root();
    let mut engine = engine_for(temp.path());
    let root = engine.root().to_path_buf();

    assert!(result_paths(&mut engine, "brand").is_empty());

    let created = root.join("brand_new.txt");
    write(&created, "");
    engine.apply_watch_events(&[WatchEvent {
        path: created.clone(),
        kind: WatchEventKind::Created,
    }]);
    assert_eq!(result_paths(&mut engine, "brand"), ["brand_new.txt"]);

    fs::remove_file(&created).expect("remove");
    engine.apply_watch_events(&[WatchEvent {
        path: created,
        kind: WatchEventKind::Deleted,
    }]);
    assert!(result_paths(&mut engine, "brand").is_empty());
}

#[test]
fn duplicate_created_events_do_not_duplicate_entries() {
    let temp = sample_root();
    let mut engine = engine_for(temp.path());
    let root = engine.root().to_path_buf();

    let created = root.join("once.txt");
    write(&created, "");
    let event = WatchEvent {
        path: created,
        kind: WatchEventKind::Created,
    };
    engine.apply_watch_events(&[event.clone(), event]);
    assert_eq!(result_paths(&mut engine, "once"), ["once.txt"]);
}

#[test]
fn directory_deletion_removes_the_subtree() {
    let temp = sample_root();
    let mut engine = engine_for(temp.path());
    let root = engine.root().to_path_buf();

    fs::remove_dir_all(root.join("src")).expect("remove dir");
    engine.apply_watch_events(&[WatchEvent {
        path: root.join("src"),
        kind: WatchEventKind::Deleted,
    }]);

    assert!(result_paths(&mut engine, "main").is_empty());
    assert!(result_paths(&mut engine, "scorer").is_empty());
    assert_eq!(result_paths(&mut engine, "readme"), ["docs/README.md"]);
}

#[test]
fn directory_modification_triggers_a_subtree_rescan() {
    let temp = sample_root();
    let mut engine = engine_for(temp.path());
    let root = engine.root().to_path_buf();

    // a file appeared without its own event; the directory event picks it up
    write(&root.join("src/fresh.zig"), "");
    engine.apply_watch_events(&[WatchEvent {
        path: root.join("src"),
        kind: WatchEventKind::Modified,
    }]);

    assert_eq!(result_paths(&mut engine, "fresh"), ["src/fresh.zig"]);
    assert_eq!(result_paths(&mut engine, "main"), ["src/main.zig"]);
}

#[test]
fn rename_settles_after_the_paired_created_event() {
    let temp = sample_root();
    let mut engine = engine_for(temp.path());
    let root = engine.root().to_path_buf();

    let old = root.join("docs/README.md");
    let new = root.join("docs/MANUAL.md");
    fs::rename(&old, &new).expect("rename");

    engine.apply_watch_events(&[
        WatchEvent {
            path: old,
            kind: WatchEventKind::Renamed,
        },
        WatchEvent {
            path: new,
            kind: WatchEventKind::Created,
        },
    ]);

    assert!(result_paths(&mut engine, "readme").is_empty());
    assert_eq!(result_paths(&mut engine, "manual"), ["docs/MANUAL.md"]);
}

#[test]
fn file_modification_events_are_ignored() {
    let temp = sample_root();
    let mut engine = engine_for(temp.path());
    let root = engine.root().to_path_buf();

    let before = result_paths(&mut engine, "main");
    write(&root.join("src/main.zig"), "changed contents\n");
    engine.apply_watch_events(&[WatchEvent {
        path: root.join("src/main.zig"),
        kind: WatchEventKind::Modified,
    }]);
    assert_eq!(result_paths(&mut engine, "main"), before);
}

#[test]
fn events_outside_the_root_are_ignored() {
    let temp = sample_root();
    let mut engine = engine_for(temp.path());
    let count = engine.index().count();

    engine.apply_watch_events(&[WatchEvent {
        path: PathBuf::from("/somewhere/else/file.txt"),
        kind: WatchEventKind::Created,
    }]);
    assert_eq!(engine.index().count(), count);
}

#[test]
fn live_watcher_sees_a_created_file() {
    let temp = sample_root();
    let mut engine = engine_for(temp.path());
    let root = engine.root().to_path_buf();

    let Ok(watcher) = FsWatcher::watch(&root) else {
        // backends can be unavailable in constrained environments
        return;
    };
    // give the backend a moment to arm before mutating
    std::thread::sleep(Duration::from_millis(250));
    write(&root.join("observed.txt"), "");

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut seen = Vec::new();
    while Instant::now() < deadline {
        seen.extend(watcher.poll());
        if seen
            .iter()
            .any(|event| event.path.ends_with("observed.txt"))
        {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(
        seen.iter().any(|event| event.path.ends_with("observed.txt")),
        "watcher never reported the new file: {seen:?}"
    );

    engine.apply_watch_events(&seen);
    assert_eq!(result_paths(&mut engine, "observed"), ["observed.txt"]);
}
