#[macro_use]
extern crate serde_derive;

use std::borrow::ToOwned;
use std::env;
use std::fmt;
use std::io;
use std::process;

use colored::Colorize;
use docopt::Docopt;

mod cmd;
mod error;
mod structures;
mod util;
mod waf;

use error::WafError;

macro_rules! command_list {
    () => {
        "
    help                   Display this message, or a subcommand's help

## Build the term vocabulary
    term-to-termid         Translate a whitespace-tokenized stream into termids
    termid-frequency       Accumulate termid occurrence counts
    filter-termset         Filter a term set by pattern and/or frequency

## Compute the analytics core
    co-occurrence          Accumulate a windowed co-occurrence matrix
    word-activation-force  Compute the WAF measure from co-occurrence + frequency
    affinity-measure       Compute the affinity measure from a WAF matrix

## Inspect matrix files
    analyze-matrix         Report summary statistics about a matrix file
"
    };
}

static USAGE: &str = concat!(
    "
Usage:
    waf [options] <command> [<args>...]
    waf [options]

Options:
    -h, --help    Display this message
    <command> -h  Display the command help message
    --version     Print version info and exit

Commands:",
    command_list!()
);

#[derive(Deserialize)]
struct Args {
    arg_command: Option<Command>,
}

// Ref: https://github.com/medialab/xan/issues/566
#[cfg(not(windows))]
fn set_virtual_terminal() {}

#[cfg(windows)]
fn set_virtual_terminal() {
    colored::control::set_virtual_terminal(true).ok();
}

fn main() {
    set_virtual_terminal();

    let args: Args = Docopt::new(USAGE)
        .and_then(|d| {
            d.options_first(true)
                .version(Some(util::version()))
                .deserialize()
        })
        .unwrap_or_else(|e| {
            match e {
                docopt::Error::Deserialize(_) => {
                    // Command mismatch
                    eprintln!(
                        "Please choose one of the following commands/flags:\n{}",
                        util::colorize_main_help(command_list!())
                    );
                    eprintln!(
                        "{}",
                        format!(
                            "Unknown command {}!\nUse one of the commands listed above.",
                            std::env::args()
                                .nth(1)
                                .unwrap_or_else(|| "<missing>".to_string())
                        )
                        .red()
                    );
                    process::exit(1);
                }
                _ => {
                    e.exit();
                }
            }
        });

    match args.arg_command {
        None => {
            println!(
                "{}",
                util::colorize_main_help(&format!(
                    "waf (v{}) accumulates co-occurrence, Word Activation Force and affinity \
                     statistics over tokenized text.

Please choose one of the following commands/flags:\n{}",
                    util::version(),
                    command_list!()
                ))
            );
            process::exit(0);
        }
        Some(cmd) => match cmd.run() {
            Ok(()) => process::exit(0),
            Err(CliError::Flag(err)) => err.exit(),
            Err(CliError::Waf(err)) => {
                eprintln!("waf {}: {}", env::args().nth(1).unwrap_or_default(), err);
                process::exit(1);
            }
            Err(CliError::Io(ref err)) if err.kind() == io::ErrorKind::BrokenPipe => {
                process::exit(0);
            }
            Err(CliError::Io(err)) => {
                eprintln!("waf {}: {}", env::args().nth(1).unwrap_or_default(), err);
                process::exit(1);
            }
            Err(CliError::Other(msg)) => {
                eprintln!("waf {}: {}", env::args().nth(1).unwrap_or_default(), msg);
                process::exit(1);
            }
            Err(CliError::Help(usage, exit_code)) => {
                println!("{}", usage);
                process::exit(exit_code);
            }
        },
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Command {
    Help,
    #[serde(rename = "term-to-termid")]
    TermToTermid,
    #[serde(rename = "termid-frequency")]
    TermidFrequency,
    #[serde(rename = "filter-termset")]
    FilterTermset,
    #[serde(rename = "co-occurrence")]
    CoOccurrence,
    #[serde(rename = "word-activation-force")]
    WordActivationForce,
    #[serde(rename = "affinity-measure")]
    AffinityMeasure,
    #[serde(rename = "analyze-matrix")]
    AnalyzeMatrix,
}

impl Command {
    fn run(&self) -> CliResult<()> {
        let argv: Vec<_> = env::args().collect();
        let argv: Vec<_> = argv.iter().map(|s| &**s).collect();
        let argv = &*argv;

        match self {
            Command::Help => {
                if argv.len() < 3 {
                    println!("{}", util::colorize_main_help(USAGE));
                    Ok(())
                } else {
                    cmd::help::run(argv)
                }
            }
            Command::TermToTermid => cmd::term_to_termid::run(argv),
            Command::TermidFrequency => cmd::termid_frequency::run(argv),
            Command::FilterTermset => cmd::filter_termset::run(argv),
            Command::CoOccurrence => cmd::co_occurrence::run(argv),
            Command::WordActivationForce => cmd::word_activation_force::run(argv),
            Command::AffinityMeasure => cmd::affinity_measure::run(argv),
            Command::AnalyzeMatrix => cmd::analyze_matrix::run(argv),
        }
    }
}

/// Re-dispatches `waf help <command>` as `<command> --help`, so a
/// subcommand's usage string is the single source of truth for its own
/// help text.
fn run_command_help(name: &str) -> CliResult<()> {
    let argv = ["waf", name, "--help"];
    match name {
        "term-to-termid" => cmd::term_to_termid::run(&argv),
        "termid-frequency" => cmd::termid_frequency::run(&argv),
        "filter-termset" => cmd::filter_termset::run(&argv),
        "co-occurrence" => cmd::co_occurrence::run(&argv),
        "word-activation-force" => cmd::word_activation_force::run(&argv),
        "affinity-measure" => cmd::affinity_measure::run(&argv),
        "analyze-matrix" => cmd::analyze_matrix::run(&argv),
        "help" => {
            println!("{}", util::colorize_main_help(USAGE));
            Ok(())
        }
        other => Err(CliError::Other(format!("'{other}' is not a waf command"))),
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    Flag(docopt::Error),
    Io(io::Error),
    Other(String),
    Help(String, i32),
    Waf(WafError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CliError::Flag(ref e) => e.fmt(f),
            CliError::Io(ref e) => e.fmt(f),
            CliError::Other(ref s) => f.write_str(s),
            CliError::Help(ref s, _) => f.write_str(s),
            CliError::Waf(ref e) => e.fmt(f),
        }
    }
}

impl From<docopt::Error> for CliError {
    fn from(err: docopt::Error) -> CliError {
        use colored::Colorize;

        match err {
            docopt::Error::WithProgramUsage(kind, usage) => {
                let usage = util::colorize_help(&usage);

                match kind.as_ref() {
                    docopt::Error::Help => CliError::Help(usage, 0),
                    _ => CliError::Help(
                        format!(
                            "{}\n\n{} Use the {} flag for more information.",
                            util::colorize_help(&usage),
                            "Invalid command!".red(),
                            "-h,--help".cyan()
                        ),
                        1,
                    ),
                }
            }
            _ => CliError::Flag(err),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> CliError {
        CliError::Io(err)
    }
}

impl From<String> for CliError {
    fn from(err: String) -> CliError {
        CliError::Other(err)
    }
}

impl<'a> From<&'a str> for CliError {
    fn from(err: &'a str) -> CliError {
        CliError::Other(err.to_owned())
    }
}

impl From<regex::Error> for CliError {
    fn from(err: regex::Error) -> CliError {
        match err {
            regex::Error::CompiledTooBig(size) => {
                CliError::Other(format!("attempted to create too large a regex ({} bytes)! regexes are probably not the answer here, sorry :'(.", size))
            }
            _ => CliError::Other(format!("{:?}", err)),
        }
    }
}

impl From<WafError> for CliError {
    fn from(err: WafError) -> CliError {
        CliError::Waf(err)
    }
}

impl From<fmt::Error> for CliError {
    fn from(_: fmt::Error) -> CliError {
        CliError::Other("failed writing output".to_string())
    }
}

impl From<()> for CliError {
    fn from(_: ()) -> CliError {
        CliError::Other("unknown error".to_string())
    }
}
