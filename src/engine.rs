//! Query-time engine: ties the index, scorer and selector together and
//! applies scanner, cache and watcher input to the index.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cache::IndexCache;
use crate::index::PathIndex;
use crate::query::Query;
use crate::scanner::{self, ScanOptions};
use crate::scorer::Scorer;
use crate::selector::{ResultSelector, SearchHit};
use crate::watcher::{WatchEvent, WatchEventKind};

pub struct SearchEngine {
    root: PathBuf,
    options: ScanOptions,
    limit: usize,
    index: PathIndex,
    scorer: Scorer,
}

impl SearchEngine {
    pub fn new(root: PathBuf, options: ScanOptions, limit: usize) -> Self {
        Self {
            root,
            options,
            limit,
            index: PathIndex::new(),
            scorer: Scorer::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    /// Mutable access for bulk loads from collaborators other than the
    /// built-in scanner and cache. Invalidates outstanding search results.
    pub fn index_mut(&mut self) -> &mut PathIndex {
        &mut self.index
    }

    /// Populate the index: from the cache snapshot when one loads cleanly,
    /// otherwise by a full scan that then overwrites the snapshot.
    pub fn index_directory(&mut self) {
        let cache = IndexCache::for_root(&self.root);

        if let Some(cache) = &cache {
            match cache.load(&mut self.index) {
                Ok(timestamp) => {
                    info!(
                        "loaded {} entries from cache (indexed at {timestamp})",
                        self.index.count()
                    );
                    return;
                }
                Err(err) => debug!("cache miss for {}: {err}", self.root.display()),
            }
        }

        self.index.clear();
        for path in scanner::scan_directory(&self.root, &self.options) {
            self.index.add(&path);
        }
        info!("indexed {} files under {}", self.index.count(), self.root.display());

        if let Some(cache) = &cache
            && let Err(err) = cache.save(&self.index)
        {
            warn!("failed to write index cache: {err:#}");
        }
    }

    /// Run one search. Hits borrow path slices from the index, so they must
    /// be consumed before the next mutation; the borrow checker enforces it.
    pub fn search<'s>(&'s mut self, query_str: &str) -> Vec<SearchHit<'s>> {
        if query_str.is_empty() {
            return Vec::new();
        }

        let query = Query::new(query_str);
        let mut selector = ResultSelector::new(self.limit);
        let scorer = &mut self.scorer;
        let index = &self.index;

        for entry in index.iter_entries() {
            let window_start = if query.uses_full_path() {
                0
            } else {
                entry.basename_start as usize
            };

            let scored = if selector.is_saturated() {
                scorer.score_with_threshold(
                    query.raw(),
                    query.lower(),
                    entry.path,
                    entry.path_lower,
                    window_start,
                    selector.min_score() + 1,
                )
            } else {
                scorer.score(
                    query.raw(),
                    query.lower(),
                    entry.path,
                    entry.path_lower,
                    window_start,
                )
            };

            let Some(scored) = scored else { continue };
            if !selector.would_accept(scored.score) {
                continue;
            }

            selector.insert(SearchHit {
                path: entry.path,
                score: scored.score,
                positions: scored.positions.to_vec(),
                depth: entry.depth,
                basename_len: (entry.path.len() - entry.basename_start as usize) as u32,
            });
        }

        selector.finalize()
    }

    /// Apply a batch of watcher events to the index. Non-atomic across
    /// events; must not run while search results are alive.
    pub fn apply_watch_events(&mut self, events: &[WatchEvent]) {
        for event in events {
            let Some(relative) = self.relative_path(&event.path) else {
                continue;
            };
            if relative.is_empty() {
                // the scan root itself changed
                match event.kind {
                    WatchEventKind::Deleted => self.index.clear(),
                    _ => self.rescan_all(),
                }
                continue;
            }

            match event.kind {
                WatchEventKind::Created => self.apply_created(&event.path, &relative),
                WatchEventKind::Deleted => self.remove_path_and_children(&relative),
                WatchEventKind::Modified => {
                    // file contents are not indexed; only directory-level
                    // modifications change the path set
                    if event.path.is_dir() {
                        self.index.remove_with_prefix(&format!("{relative}/"));
                        self.rescan_subtree(&event.path);
                    }
                }
                WatchEventKind::Renamed => {
                    self.remove_path_and_children(&relative);
                    // the new name normally arrives as a created event; if
                    // the backend reported the surviving path, re-add it now
                    if event.path.exists() {
                        self.apply_created(&event.path, &relative);
                    }
                }
            }
        }
    }

    fn apply_created(&mut self, absolute: &Path, relative: &str) {
        match fs::metadata(absolute) {
            Ok(metadata) if metadata.is_dir() => self.rescan_subtree(absolute),
            Ok(_) => {
                self.index.remove(relative);
                self.index.add(relative);
            }
            Err(err) => debug!("skipping created path {}: {err}", absolute.display()),
        }
    }

    fn remove_path_and_children(&mut self, relative: &str) {
        self.index.remove(relative);
        self.index.remove_with_prefix(&format!("{relative}/"));
    }

    fn rescan_subtree(&mut self, dir: &Path) {
        for path in scanner::scan_subtree(&self.root, dir, &self.options) {
            self.index.remove(&path);
            self.index.add(&path);
        }
    }

    fn rescan_all(&mut self) {
        self.index.clear();
        for path in scanner::scan_directory(&self.root, &self.options) {
            self.index.add(&path);
        }
    }

    fn relative_path(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        Some(relative.to_string_lossy().replace('\\', "/"))
    }
}
