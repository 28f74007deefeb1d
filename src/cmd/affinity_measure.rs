use std::fs::File;
use std::io::BufReader;

use crate::structures::IndexedCrossList;
use crate::util;
use crate::waf::{self, WafMatrix};
use crate::CliResult;

static USAGE: &str = "
Computes the symmetric affinity measure `aff(i, j) = sqrt(K_mean * L_mean)`
between every pair of cared-about termids in a WAF matrix.

With --diagonal, instead compares a term's in-/out-neighbour profile across
two WAF matrices over a shared term universe (e.g. a foreground corpus
against a background one) and reports one `(termid affinity)` pair per
cared-about term rather than a full matrix.

Usage:
    waf affinity-measure [options] <waf-matrix>
    waf affinity-measure --diagonal [options] <waf-matrix> <background-waf-matrix>
    waf affinity-measure --help

Options:
    --diagonal              Compute the cross-matrix diagonal instead of a
                             full pairwise matrix.
    --care <id>...          Restrict to this termid (may be repeated).
    --care-file <path>      File of termids to restrict to.
    --min-affinity <n>      Drop values below this floor. [default: 0]
    --sparse-rows <n>       Hash overlay row buckets. [default: 16]
    --sparse-columns <n>    Hash overlay column buckets. [default: 16]
    -o, --output <path>     Write the result here instead of stdout.
    --log <path>            Write informational logs to <path>.
    -h, --help              Display this message
";

#[derive(Deserialize)]
struct Args {
    arg_waf_matrix: String,
    arg_background_waf_matrix: Option<String>,
    flag_diagonal: bool,
    flag_care: Vec<String>,
    flag_care_file: Option<String>,
    flag_min_affinity: f64,
    flag_sparse_rows: usize,
    flag_sparse_columns: usize,
    flag_output: Option<String>,
    flag_log: Option<String>,
}

fn read_waf_matrix(path: &str, sr: usize, sc: usize) -> CliResult<WafMatrix> {
    let file = BufReader::new(File::open(path)?);
    Ok(IndexedCrossList::read_from(file, 0.0, sr.max(1), sc.max(1))?)
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;
    let _guard = util::init_logging(args.flag_log.as_deref())?;

    let care = util::care_predicate_ids(&args.flag_care, &args.flag_care_file)?;
    let cares = move |id: u64| match &care {
        Some(set) => set.contains(&id),
        None => true,
    };

    let matrix = read_waf_matrix(&args.arg_waf_matrix, args.flag_sparse_rows, args.flag_sparse_columns)?;
    let mut writer = util::output_writer(&args.flag_output)?;

    if args.flag_diagonal {
        let background_path = args.arg_background_waf_matrix.as_deref().ok_or_else(|| {
            crate::CliError::Other("--diagonal requires <background-waf-matrix>".to_string())
        })?;
        let background =
            read_waf_matrix(background_path, args.flag_sparse_rows, args.flag_sparse_columns)?;
        let pairs = waf::between_matrices_diagonal(&matrix, &background, cares)?;
        let pairs: Vec<(u64, f64)> = pairs
            .into_iter()
            .filter(|(_, value)| *value >= args.flag_min_affinity)
            .collect();
        tracing::info!(pairs = pairs.len(), "computed cross-matrix affinity diagonal");
        crate::structures::serialization::write_pairs(
            pairs.into_iter(),
            &mut util::WriteAdapter(&mut writer),
        )?;
    } else {
        let out = waf::affinity(
            &matrix,
            cares,
            args.flag_min_affinity,
            args.flag_sparse_rows,
            args.flag_sparse_columns,
        )?;
        tracing::info!(pairs = out.size(), "computed affinity matrix");
        out.write_to(&mut util::WriteAdapter(&mut writer))?;
    }

    Ok(())
}
