mod cli;

use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use sniff::engine::SearchEngine;
use sniff::protocol::{self, ProtocolEvent};
use sniff::scanner::ScanOptions;
use sniff::watcher::FsWatcher;

use cli::{CliArgs, parse_cli};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    run(parse_cli())
}

/// Dispatch one of the three front-end modes. User-facing failures are
/// reported and converted into a clean exit so a driving process never sees
/// a non-zero status for bad input.
fn run(cli: CliArgs) -> Result<()> {
    let Some(directory) = cli.directory.clone() else {
        return report_user_error(
            &cli,
            "no directory given (usage: sniff [--json] [--limit N] <directory> [query])",
        );
    };
    let root = match directory.canonicalize() {
        Ok(root) => root,
        Err(err) => {
            let message = format!("cannot resolve {}: {err}", directory.display());
            return report_user_error(&cli, &message);
        }
    };

    let mut engine = SearchEngine::new(root.clone(), ScanOptions::default(), cli.limit);
    let started = Instant::now();
    engine.index_directory();
    let index_time_ms = started.elapsed().as_millis() as u64;

    if let Some(query) = &cli.query {
        cli::print_hits(&engine.search(query));
        return Ok(());
    }

    let watcher = match FsWatcher::watch(&root) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!("continuing without filesystem watching: {err:#}");
            None
        }
    };

    if cli.json {
        let stdin = io::stdin();
        protocol::run_json_mode(
            &mut engine,
            watcher.as_ref(),
            index_time_ms,
            stdin.lock(),
            io::stdout(),
        )
    } else {
        run_interactive(&mut engine, watcher.as_ref())
    }
}

fn report_user_error(cli: &CliArgs, message: &str) -> Result<()> {
    if cli.json {
        protocol::emit(&mut io::stdout(), &ProtocolEvent::Error { message })?;
    } else {
        eprintln!("sniff: {message}");
    }
    Ok(())
}

/// Prompted loop on stdin; each line is one query.
fn run_interactive(engine: &mut SearchEngine, watcher: Option<&FsWatcher>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        stdout.write_all(b"> ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim_end_matches(['\n', '\r']);

        if let Some(watcher) = watcher {
            engine.apply_watch_events(&watcher.poll());
        }
        cli::print_hits(&engine.search(query));
    }

    Ok(())
}
