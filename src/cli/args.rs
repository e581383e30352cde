use std::path::PathBuf;

use clap::Parser;

use sniff::selector::MAX_RESULTS;

/// Parse command line arguments into the strongly typed [`CliArgs`] structure.
pub(crate) fn parse_cli() -> CliArgs {
    CliArgs::parse()
}

#[derive(Parser, Debug)]
#[command(
    name = "sniff",
    version,
    about = "Interactive fuzzy file finder",
    ignore_errors = true
)]
/// Command-line arguments accepted by the `sniff` binary.
///
/// Unrecognized arguments are ignored rather than rejected, first-wins: the
/// first positional is the directory, the second the query, anything further
/// is swallowed by the hidden catch-all.
pub(crate) struct CliArgs {
    #[arg(value_name = "DIRECTORY", help = "Directory to index and search")]
    pub(crate) directory: Option<PathBuf>,
    #[arg(
        value_name = "QUERY",
        help = "Run a single query and print matches (default: interactive prompt)"
    )]
    pub(crate) query: Option<String>,
    #[arg(long, help = "Read queries from stdin and emit JSON events on stdout")]
    pub(crate) json: bool,
    #[arg(
        long,
        value_name = "N",
        default_value_t = MAX_RESULTS,
        help = "Maximum number of results per query"
    )]
    pub(crate) limit: usize,
    #[arg(value_name = "EXTRA", hide = true, num_args = 0..)]
    pub(crate) extra: Vec<String>,
}
