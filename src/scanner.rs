//! Parallel filesystem traversal feeding the path index.
//!
//! Walking runs on the `ignore` crate's worker pool; discovered paths are
//! funneled through a channel and drained by the calling thread, which keeps
//! index mutation single-threaded.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc;

use ignore::{DirEntry, Error as IgnoreError, WalkBuilder, WalkState};
use tracing::debug;

/// Directory names skipped regardless of ignore files.
pub const DEFAULT_IGNORE_NAMES: &[&str] = &[".git", "node_modules", "target", ".venv"];

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_depth: Option<usize>,
    pub respect_gitignore: bool,
    pub include_hidden: bool,
    pub ignore_names: Vec<String>,
    pub threads: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            respect_gitignore: true,
            include_hidden: true,
            ignore_names: DEFAULT_IGNORE_NAMES.iter().map(|name| name.to_string()).collect(),
            threads: None,
        }
    }
}

impl ScanOptions {
    fn thread_count(&self) -> usize {
        self.threads
            .filter(|&threads| threads > 0)
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
    }
}

/// Walk `root` and return every file path relative to it, `/`-separated.
///
/// Unreadable entries are logged and skipped; a single bad file never aborts
/// the scan.
pub fn scan_directory(root: &Path, options: &ScanOptions) -> Vec<String> {
    scan_subtree(root, root, options)
}

/// Walk `dir` (a subtree of `root`) and return file paths relative to
/// `root`. Used by watch-event handling to refresh one directory.
pub fn scan_subtree(root: &Path, dir: &Path, options: &ScanOptions) -> Vec<String> {
    let (tx, rx) = mpsc::channel::<String>();
    let walker_root: Arc<Path> = Arc::from(root);

    build_walk(dir, options).build_parallel().run(|| {
        let sender = tx.clone();
        let root = Arc::clone(&walker_root);
        Box::new(move |entry: Result<DirEntry, IgnoreError>| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("skipping unreadable entry: {err}");
                    return WalkState::Continue;
                }
            };
            let Some(file_type) = entry.file_type() else {
                return WalkState::Continue;
            };
            if !file_type.is_file() {
                return WalkState::Continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root.as_ref()).unwrap_or(path);
            let relative_display = relative.to_string_lossy().replace('\\', "/");
            if sender.send(relative_display).is_err() {
                return WalkState::Quit;
            }

            WalkState::Continue
        })
    });

    drop(tx);
    rx.into_iter().collect()
}

/// Build a configured walker for the given root and options.
fn build_walk(root: &Path, options: &ScanOptions) -> WalkBuilder {
    let mut walker = WalkBuilder::new(root);

    walker
        .hidden(!options.include_hidden)
        .follow_links(false)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .ignore(options.respect_gitignore)
        .parents(true)
        .threads(options.thread_count())
        .max_depth(options.max_depth);

    if !options.ignore_names.is_empty() {
        let ignores: Arc<HashSet<OsString>> = Arc::new(
            options
                .ignore_names
                .iter()
                .map(OsString::from)
                .collect(),
        );
        walker.filter_entry(move |entry| !ignores.contains(entry.file_name()));
    }

    walker
}
