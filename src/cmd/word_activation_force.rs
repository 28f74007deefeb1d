use std::fs::File;
use std::io::BufReader;

use crate::structures::IndexedCrossList;
use crate::util;
use crate::waf::{self, CoOccurrenceMatrix, FrequencyVector};
use crate::CliResult;

static USAGE: &str = "
Computes the Word Activation Force `waf(i, j) = n^2 / (f_i * f_j * d_mean^2)`
for every co-occurrence edge whose endpoints satisfy the care predicate,
from a co-occurrence matrix file and a frequency-vector file.

Usage:
    waf word-activation-force [options] <co-occurrence> <frequency>
    waf word-activation-force --help

Options:
    --care <id>...          Restrict to this termid (may be repeated).
    --care-file <path>      File of termids to restrict to.
    --precision <n>         Drop values below this floor. [default: 0]
    --sparse-rows <n>       Hash overlay row buckets. [default: 16]
    --sparse-columns <n>    Hash overlay column buckets. [default: 16]
    -o, --output <path>     Write the WAF matrix here instead of stdout.
    --log <path>            Write informational logs to <path>.
    -h, --help              Display this message
";

#[derive(Deserialize)]
struct Args {
    arg_co_occurrence: String,
    arg_frequency: String,
    flag_care: Vec<String>,
    flag_care_file: Option<String>,
    flag_precision: f64,
    flag_sparse_rows: usize,
    flag_sparse_columns: usize,
    flag_output: Option<String>,
    flag_log: Option<String>,
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;
    let _guard = util::init_logging(args.flag_log.as_deref())?;

    let care = util::care_predicate_ids(&args.flag_care, &args.flag_care_file)?;

    let cooccurrence: CoOccurrenceMatrix = {
        let file = BufReader::new(File::open(&args.arg_co_occurrence)?);
        IndexedCrossList::read_from(
            file,
            (0.0, 0u64),
            args.flag_sparse_rows.max(1),
            args.flag_sparse_columns.max(1),
        )?
    };

    let frequency = FrequencyVector::read_from(File::open(&args.arg_frequency)?)?;

    let matrix = waf::waf(
        &cooccurrence,
        &frequency,
        |id| match &care {
            Some(set) => set.contains(&id),
            None => true,
        },
        args.flag_precision,
        args.flag_sparse_rows,
        args.flag_sparse_columns,
    )?;

    tracing::info!(edges = matrix.size(), "computed word activation force matrix");

    let mut writer = util::output_writer(&args.flag_output)?;
    matrix.write_to(&mut util::WriteAdapter(&mut writer))?;

    Ok(())
}
