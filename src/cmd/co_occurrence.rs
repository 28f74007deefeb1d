use std::io::BufRead;

use crate::structures::IndexedCrossList;
use crate::util;
use crate::waf::{self, CoOccurrenceMatrix, DELIM_TERMID};
use crate::{CliError, CliResult};

static USAGE: &str = "
Slides a fixed-width window over a termid stream (one paragraph per input
line) and accumulates, for every ordered pair of termids that co-occur
within the window, the number of observations and their summed distance.
Paragraph boundaries (line breaks) are inserted as the reserved delimiter
termid, so a pair is never counted across them.

When --background (or --background-file) is given, accumulates the
asymmetric cross-set variant instead: a pair counts if the left term is
foreground and the right is foreground-or-background, or the left term is
background and the right is foreground.

Usage:
    waf co-occurrence [options] [<input>]
    waf co-occurrence --help

Options:
    -W, --window <n>          Window width; pairs are counted at distances
                               1..n-1. [default: 5]
    --care <id>...            Restrict counted pairs to this termid (may be
                               repeated).
    --care-file <path>        File of termids to restrict to.
    --background <id>...      Background termid for a cross-set accumulation
                               (may be repeated).
    --background-file <path>  File of background termids.
    --sparse-rows <n>         Hash overlay row buckets. [default: 16]
    --sparse-columns <n>      Hash overlay column buckets. [default: 16]
    -o, --output <path>       Write the co-occurrence matrix here instead of
                               stdout.
    --log <path>              Write informational logs to <path>.
    -h, --help                Display this message
";

#[derive(Deserialize)]
struct Args {
    arg_input: Option<String>,
    flag_window: usize,
    flag_care: Vec<String>,
    flag_care_file: Option<String>,
    flag_background: Vec<String>,
    flag_background_file: Option<String>,
    flag_sparse_rows: usize,
    flag_sparse_columns: usize,
    flag_output: Option<String>,
    flag_log: Option<String>,
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;
    let _guard = util::init_logging(args.flag_log.as_deref())?;

    let care = util::care_predicate_ids(&args.flag_care, &args.flag_care_file)?;
    let background = util::care_predicate_ids(&args.flag_background, &args.flag_background_file)?;

    let reader = util::input_reader(&args.arg_input)?;
    let mut terms: Vec<u64> = Vec::new();
    let mut universe = 0usize;

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if n > 0 {
            terms.push(DELIM_TERMID);
        }
        for token in line.split_whitespace() {
            let id: u64 = token
                .parse()
                .map_err(|_| CliError::Other(format!("'{token}' is not a valid termid")))?;
            universe = universe.max(id as usize + 1);
            terms.push(id);
        }
    }

    let mut matrix: CoOccurrenceMatrix =
        IndexedCrossList::new(universe.max(1), universe.max(1), (0.0, 0));
    matrix.sparse(args.flag_sparse_rows.max(1), args.flag_sparse_columns.max(1))?;

    let cares = |id: u64, set: &Option<std::collections::HashSet<u64>>| match set {
        Some(set) => set.contains(&id),
        None => true,
    };

    match &background {
        Some(background_set) => {
            let foreground_set = care.clone();
            waf::accumulate_cross(
                &terms,
                args.flag_window,
                |id| cares(id, &foreground_set),
                |id| background_set.contains(&id),
                &mut matrix,
            )?;
        }
        None => {
            waf::accumulate(
                &terms,
                args.flag_window,
                |id| cares(id, &care),
                |id| cares(id, &care),
                &mut matrix,
            )?;
        }
    }

    tracing::info!(edges = matrix.size(), "accumulated co-occurrence matrix");

    let mut writer = util::output_writer(&args.flag_output)?;
    matrix.write_to(&mut util::WriteAdapter(&mut writer))?;

    Ok(())
}
