use regex::Regex;

use crate::util;
use crate::waf::{FrequencyVector, TermSet};
use crate::CliResult;

static USAGE: &str = "
Filters a term-set file down to the terms matching a regex pattern and/or
meeting a minimum frequency (read from a companion frequency-vector file),
writing the surviving `(termid term)` pairs to a new term-set file.

Usage:
    waf filter-termset [options] <term-set>
    waf filter-termset --help

Options:
    --pattern <regex>       Keep only terms matching this regex.
    --frequency <path>      Frequency-vector file to filter by minimum
                             frequency.
    --min-frequency <n>     Minimum frequency required; only meaningful
                             together with --frequency. [default: 0]
    -o, --output <path>     Write the filtered term set here instead of
                             stdout.
    --log <path>            Write informational logs to <path>.
    -h, --help              Display this message
";

#[derive(Deserialize)]
struct Args {
    arg_term_set: String,
    flag_pattern: Option<String>,
    flag_frequency: Option<String>,
    flag_min_frequency: u64,
    flag_output: Option<String>,
    flag_log: Option<String>,
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;
    let _guard = util::init_logging(args.flag_log.as_deref())?;

    let terms = TermSet::read_from(std::fs::File::open(&args.arg_term_set)?)?;

    let pattern = args
        .flag_pattern
        .as_deref()
        .map(Regex::new)
        .transpose()?;

    let frequency = match &args.flag_frequency {
        Some(path) => Some(FrequencyVector::read_from(std::fs::File::open(path)?)?),
        None => None,
    };

    let mut filtered = TermSet::new();
    for (id, term) in terms.iter() {
        if let Some(pattern) = &pattern {
            if !pattern.is_match(term) {
                continue;
            }
        }
        if let Some(frequency) = &frequency {
            if frequency.get(id) < args.flag_min_frequency {
                continue;
            }
        }
        filtered.insert(id, term)?;
    }

    tracing::info!(
        kept = filtered.len(),
        dropped = terms.len() - filtered.len(),
        "filtered term set"
    );

    let mut writer = util::output_writer(&args.flag_output)?;
    filtered.write_to(&mut util::WriteAdapter(&mut writer))?;

    Ok(())
}
