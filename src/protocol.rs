//! Newline-delimited JSON protocol for driving the engine from another
//! process: queries arrive one per line on stdin, events leave one JSON
//! object per line on stdout.

use std::io::{BufRead, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::engine::SearchEngine;
use crate::selector::SearchHit;
use crate::watcher::FsWatcher;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProtocolEvent<'a> {
    Ready {
        files: usize,
        #[serde(rename = "indexTime")]
        index_time: u64,
    },
    Results {
        query: &'a str,
        #[serde(rename = "searchTime")]
        search_time: u64,
        results: Vec<ResultEntry<'a>>,
    },
    Error {
        message: &'a str,
    },
}

#[derive(Serialize)]
pub struct ResultEntry<'a> {
    path: &'a str,
    score: i32,
    positions: &'a [u32],
}

impl<'a> ResultEntry<'a> {
    pub fn from_hit(hit: &'a SearchHit<'a>) -> Self {
        Self {
            path: hit.path,
            score: hit.score,
            positions: &hit.positions,
        }
    }
}

/// Serialize one event as a single output line and flush it.
pub fn emit(output: &mut impl Write, event: &ProtocolEvent<'_>) -> Result<()> {
    serde_json::to_writer(&mut *output, event).context("failed to serialize protocol event")?;
    output.write_all(b"\n").context("failed to write protocol event")?;
    output.flush().context("failed to flush protocol event")?;
    Ok(())
}

/// Drive the engine from `input` until EOF, announcing readiness first.
///
/// Watcher events are applied between queries, never during one.
pub fn run_json_mode(
    engine: &mut SearchEngine,
    watcher: Option<&FsWatcher>,
    index_time_ms: u64,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    emit(
        &mut output,
        &ProtocolEvent::Ready {
            files: engine.index().count(),
            index_time: index_time_ms,
        },
    )?;

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                let message = format!("failed to read query: {err}");
                emit(&mut output, &ProtocolEvent::Error { message: &message })?;
                continue;
            }
        };
        let query = line.strip_suffix('\r').unwrap_or(&line);

        if let Some(watcher) = watcher {
            engine.apply_watch_events(&watcher.poll());
        }

        let started = Instant::now();
        let hits = engine.search(query);
        let search_time = started.elapsed().as_millis() as u64;
        let results = hits.iter().map(ResultEntry::from_hit).collect();

        emit(
            &mut output,
            &ProtocolEvent::Results {
                query,
                search_time,
                results,
            },
        )?;
    }

    Ok(())
}
