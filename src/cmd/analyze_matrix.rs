use std::fs::File;
use std::io::BufReader;

use crate::structures::StreamingMatrix;
use crate::util;
use crate::CliResult;

static USAGE: &str = "
Reports summary statistics about a serialized matrix file (a co-occurrence,
WAF or affinity matrix) without loading it into memory: its declared
dimensions, the number of populated cells, and each row's/column's
occupancy. With --row, also dumps every cell of a single row.

Usage:
    waf analyze-matrix [options] <matrix>
    waf analyze-matrix --help

Options:
    --kind <kind>          Shape of each cell's value: \"scalar\" for a WAF
                            or affinity matrix, \"co-occurrence\" for a
                            `(d_sum n)` pair matrix. [default: scalar]
    --row <r>              Dump every cell of row <r> instead of summarizing.
    -o, --output <path>    Write the report here instead of stdout.
    --log <path>           Write informational logs to <path>.
    -h, --help             Display this message
";

#[derive(Deserialize)]
struct Args {
    arg_matrix: String,
    flag_kind: String,
    flag_row: Option<usize>,
    flag_output: Option<String>,
    flag_log: Option<String>,
}

fn run_scalar(args: &Args) -> CliResult<()> {
    let file = BufReader::new(File::open(&args.arg_matrix)?);
    let matrix = StreamingMatrix::<_, f64>::new(file)?;
    report(&matrix, args, |value| value.to_string())
}

fn run_cooccurrence(args: &Args) -> CliResult<()> {
    let file = BufReader::new(File::open(&args.arg_matrix)?);
    let matrix = StreamingMatrix::<_, (f64, u64)>::new(file)?;
    report(&matrix, args, |(d_sum, n)| format!("{d_sum} {n}"))
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;
    let _guard = util::init_logging(args.flag_log.as_deref())?;

    match args.flag_kind.as_str() {
        "scalar" => run_scalar(&args),
        "co-occurrence" => run_cooccurrence(&args),
        other => Err(crate::CliError::Other(format!(
            "'{other}' is not a known --kind (expected scalar or co-occurrence)"
        ))),
    }
}

fn report<R, T>(
    matrix: &StreamingMatrix<R, T>,
    args: &Args,
    format_value: impl Fn(T) -> String,
) -> CliResult<()>
where
    R: std::io::Read + std::io::Seek,
    T: crate::structures::serialization::GrammarValue + Clone,
{
    use std::io::Write as _;

    let mut writer = util::output_writer(&args.flag_output)?;

    match args.flag_row {
        Some(row) => {
            for cell in matrix.row_iter(row)? {
                let cell = cell?;
                writeln!(writer, "{} {} {}", cell.row, cell.column, format_value(cell.value))?;
            }
        }
        None => {
            let populated: usize = (0..matrix.rows())
                .map(|r| matrix.row_size(r))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .sum();
            writeln!(writer, "rows: {}", matrix.rows())?;
            writeln!(writer, "columns: {}", matrix.columns())?;
            writeln!(writer, "populated cells: {populated}")?;
            for row in 0..matrix.rows() {
                let size = matrix.row_size(row)?;
                if size > 0 {
                    writeln!(writer, "row {row}: {size} cells")?;
                }
            }
            for column in 0..matrix.columns() {
                let size = matrix.column_size(column)?;
                if size > 0 {
                    writeln!(writer, "column {column}: {size} cells")?;
                }
            }
        }
    }

    Ok(())
}
