pub mod app_dirs;
pub mod cache;
pub mod engine;
pub mod index;
pub mod protocol;
pub mod query;
pub mod scanner;
pub mod scorer;
pub mod selector;
pub mod watcher;

pub use engine::SearchEngine;
pub use index::{PathEntry, PathIndex};
pub use query::Query;
pub use scanner::ScanOptions;
pub use scorer::{MATRIX_LIMIT, ScoredMatch, Scorer, is_subsequence};
pub use selector::{MAX_RESULTS, ResultSelector, SearchHit};
pub use watcher::{FsWatcher, WatchEvent, WatchEventKind};
