//! Filesystem change notification.
//!
//! `notify` picks the platform backend (inotify, FSEvents, directory-change
//! notifications, or polling); backend callbacks forward events through a
//! channel and the engine drains them with a non-blocking [`FsWatcher::poll`]
//! between searches. Index state is never touched from the backend thread.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::warn;

/// What happened to a path, as far as the index cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Created,
    Deleted,
    Modified,
    Renamed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: WatchEventKind,
}

/// Recursive watcher over one scan root.
pub struct FsWatcher {
    rx: Receiver<notify::Result<Event>>,
    _watcher: RecommendedWatcher,
}

impl FsWatcher {
    pub fn watch(root: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |event| {
            let _ = tx.send(event);
        })
        .context("failed to create filesystem watcher")?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch {}", root.display()))?;

        Ok(Self {
            rx,
            _watcher: watcher,
        })
    }

    /// Drain pending backend events without blocking.
    pub fn poll(&self) -> Vec<WatchEvent> {
        let mut events = Vec::new();
        for result in self.rx.try_iter() {
            match result {
                Ok(event) => translate(&event.kind, &event.paths, &mut events),
                Err(err) => warn!("watch backend error: {err}"),
            }
        }
        events
    }
}

/// Map one backend event onto index-relevant events.
///
/// Rename pairs arrive either as separate From/To events or as one event
/// carrying both paths; the To side is reported as a creation so the engine
/// re-stats it, which errs toward rescanning on ambiguous backends.
fn translate(kind: &EventKind, paths: &[PathBuf], out: &mut Vec<WatchEvent>) {
    let mapped = match kind {
        EventKind::Create(_) => WatchEventKind::Created,
        EventKind::Remove(_) => WatchEventKind::Deleted,
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::To => WatchEventKind::Created,
            RenameMode::Both => {
                if let [from, to] = paths {
                    out.push(WatchEvent {
                        path: from.clone(),
                        kind: WatchEventKind::Renamed,
                    });
                    out.push(WatchEvent {
                        path: to.clone(),
                        kind: WatchEventKind::Created,
                    });
                    return;
                }
                WatchEventKind::Renamed
            }
            _ => WatchEventKind::Renamed,
        },
        EventKind::Modify(_) => WatchEventKind::Modified,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => return,
    };

    out.extend(paths.iter().map(|path| WatchEvent {
        path: path.clone(),
        kind: mapped,
    }));
}
