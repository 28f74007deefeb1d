use std::io::BufRead;

use crate::util;
use crate::waf::FrequencyVector;
use crate::CliResult;

static USAGE: &str = "
Accumulates how many times each termid occurs across a termid stream (the
kind `term-to-termid` produces) into a frequency-vector file.

Usage:
    waf termid-frequency [options] [<input>]
    waf termid-frequency --help

Options:
    -o, --output <path>    Write the frequency vector here instead of stdout.
    --log <path>           Write informational logs to <path>.
    -h, --help             Display this message
";

#[derive(Deserialize)]
struct Args {
    arg_input: Option<String>,
    flag_output: Option<String>,
    flag_log: Option<String>,
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;
    let _guard = util::init_logging(args.flag_log.as_deref())?;

    let reader = util::input_reader(&args.arg_input)?;
    let mut frequency = FrequencyVector::new();

    for line in reader.lines() {
        let line = line?;
        for token in line.split_whitespace() {
            let id: u64 = token
                .parse()
                .map_err(|_| crate::CliError::Other(format!("'{token}' is not a valid termid")))?;
            frequency.increment(id);
        }
    }

    tracing::info!(distinct_termids = frequency.len(), "accumulated frequency vector");

    let mut writer = util::output_writer(&args.flag_output)?;
    frequency.write_to(&mut util::WriteAdapter(&mut writer))?;

    Ok(())
}
