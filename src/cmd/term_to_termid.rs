use std::io::{BufRead, Write as _};

use crate::util;
use crate::waf::term_set::TermSet;
use crate::CliResult;

static USAGE: &str = "
Translates a stream of whitespace-separated terms into a stream of termids,
interning every previously unseen term into a term-set file as it is
encountered. One paragraph per input line; the paragraph boundary is carried
by the line break alone; no sentinel token is ever written to the termid
stream file.

Usage:
    waf term-to-termid [options] [<input>]
    waf term-to-termid --help

Options:
    --term-set <path>      Path to the term-set file to load and extend. A
                            missing file starts from an empty term set. If
                            omitted, interning starts from an empty term set
                            and the result is discarded instead of written
                            back anywhere.
    -o, --output <path>    Write the termid stream here instead of stdout.
    --log <path>           Write informational logs to <path>.
    -h, --help             Display this message
";

#[derive(Deserialize)]
struct Args {
    arg_input: Option<String>,
    flag_term_set: Option<String>,
    flag_output: Option<String>,
    flag_log: Option<String>,
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;
    let _guard = util::init_logging(args.flag_log.as_deref())?;

    let mut terms = match &args.flag_term_set {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => TermSet::read_from(file)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TermSet::new(),
            Err(e) => return Err(e.into()),
        },
        None => TermSet::new(),
    };

    let reader = util::input_reader(&args.arg_input)?;
    let mut writer = util::output_writer(&args.flag_output)?;

    for line in reader.lines() {
        let line = line?;
        let ids: Vec<String> = line
            .split_whitespace()
            .map(|term| terms.intern(term).to_string())
            .collect();
        writeln!(writer, "{}", ids.join(" "))?;
        tracing::debug!(paragraph_terms = ids.len(), "translated one paragraph");
    }

    if let Some(path) = &args.flag_term_set {
        let term_set_file = std::fs::File::create(path)?;
        let mut term_set_out = std::io::BufWriter::new(term_set_file);
        terms.write_to(&mut util::WriteAdapter(&mut term_set_out))?;
    }

    Ok(())
}
