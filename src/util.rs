use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, Write};

use colored::Colorize;
use docopt::Docopt;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::{CliError, CliResult};

pub fn version() -> String {
    let (maj, min, pat, pre) = (
        option_env!("CARGO_PKG_VERSION_MAJOR"),
        option_env!("CARGO_PKG_VERSION_MINOR"),
        option_env!("CARGO_PKG_VERSION_PATCH"),
        option_env!("CARGO_PKG_VERSION_PRE"),
    );
    match (maj, min, pat, pre) {
        (Some(maj), Some(min), Some(pat), Some(pre)) => {
            if pre.is_empty() {
                format!("{}.{}.{}", maj, min, pat)
            } else {
                format!("{}.{}.{}-{}", maj, min, pat, pre)
            }
        }
        _ => "".to_owned(),
    }
}

lazy_static! {
    static ref FLAG_REGEX: Regex = Regex::new(r"([\s,/\(])(--?[A-Za-z][\w\-]*)").unwrap();
    static ref SECTION_REGEX: Regex = Regex::new("(?im)^.*(?:usage|options?):|---+").unwrap();
    static ref QUOTE_REGEX: Regex = Regex::new(r#"(?m)"[^"\n]+"|'[^'\n]+'|`[^`\n]+`"#).unwrap();
    static ref MAIN_SECTION_REGEX: Regex = Regex::new("(?m)^#+.+").unwrap();
    static ref MAIN_COMMAND_REGEX: Regex = Regex::new(r"(?m)^\s{4}[\w\-]+").unwrap();
    static ref MAIN_ALIAS_REGEX: Regex = Regex::new(r"\([^\)\s]+\)").unwrap();
}

pub fn colorize_help(help: &str) -> String {
    let help = FLAG_REGEX.replace_all(help, |caps: &Captures| {
        caps[1].to_string() + &caps[2].cyan().to_string()
    });
    let help = MAIN_SECTION_REGEX
        .replace_all(&help, |caps: &Captures| caps[0].yellow().bold().to_string());
    let help =
        SECTION_REGEX.replace_all(&help, |caps: &Captures| caps[0].yellow().bold().to_string());
    let help = QUOTE_REGEX.replace_all(&help, |caps: &Captures| caps[0].green().to_string());

    help.into_owned()
}

pub fn colorize_main_help(help: &str) -> String {
    let help =
        MAIN_SECTION_REGEX.replace_all(help, |caps: &Captures| caps[0].yellow().bold().to_string());
    let help = MAIN_COMMAND_REGEX.replace_all(&help, |caps: &Captures| {
        "    ".to_string() + &caps[0][4..].cyan().bold().to_string()
    });
    let help = MAIN_ALIAS_REGEX.replace_all(&help, |caps: &Captures| caps[0].dimmed().to_string());

    help.replace("waf", &"waf".red().to_string())
}

pub fn get_args<T>(usage: &str, argv: &[&str]) -> CliResult<T>
where
    T: DeserializeOwned,
{
    Docopt::new(usage)
        .and_then(|d| {
            d.argv(argv.iter().copied())
                .version(Some(version()))
                .help(true)
                .deserialize()
        })
        .map_err(From::from)
}

/// Parses a `--key value` flag repeated any number of times into the
/// `Vec<String>` docopt hands back, the way the teacher's
/// `SelectColumns`-style multi-valued flags accumulate.
pub fn non_empty_or_none(values: &[String]) -> Option<&[String]> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Installs a file-backed `tracing` subscriber when `--log <path>` was
/// given, and installs nothing otherwise — so `tracing` events are simply
/// dropped at the call site, matching "absent `--log` silences
/// informational logs". Returns the worker guard the caller must keep
/// alive for as long as logging should flush.
pub fn init_logging(log_path: Option<&str>) -> CliResult<Option<WorkerGuard>> {
    let path = match log_path {
        Some(path) => path,
        None => return Ok(None),
    };
    let file = File::create(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(EnvFilter::new("info"))
        .try_init();
    Ok(Some(guard))
}

/// Reads whitespace-separated termids, one per line, ignoring blank lines —
/// the shape of a foreground/background care-set file passed to
/// `co-occurrence`, `word-activation-force` or `affinity-measure`.
pub fn read_termid_set(path: &str) -> CliResult<std::collections::HashSet<u64>> {
    let file = File::open(path)?;
    let mut set = std::collections::HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        for token in line.split_whitespace() {
            let id: u64 = token
                .parse()
                .map_err(|_| CliError::Other(format!("'{token}' is not a valid termid")))?;
            set.insert(id);
        }
    }
    Ok(set)
}

/// Merges a repeated `--care <id>` flag with an optional `--care-file
/// <path>` into the termid set a subcommand's care predicate should
/// restrict itself to. `None` means "every termid is cared about" — the
/// case where neither flag was given.
pub fn care_predicate_ids(
    ids: &[String],
    file: &Option<String>,
) -> CliResult<Option<std::collections::HashSet<u64>>> {
    if ids.is_empty() && file.is_none() {
        return Ok(None);
    }
    let mut set = match file {
        Some(path) => read_termid_set(path)?,
        None => std::collections::HashSet::new(),
    };
    for id in ids {
        let id: u64 = id
            .parse()
            .map_err(|_| CliError::Other(format!("'{id}' is not a valid termid")))?;
        set.insert(id);
    }
    Ok(Some(set))
}

/// Opens `<input>` for reading, or falls back to stdin when absent —
/// matching the teacher's `Config::new(&None)` stdin fallback.
pub fn input_reader(path: &Option<String>) -> CliResult<Box<dyn BufRead>> {
    match path {
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Opens `<output>` for writing, or falls back to stdout when absent.
pub fn output_writer(path: &Option<String>) -> CliResult<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(File::create(path)?)),
        None => Ok(Box::new(io::stdout())),
    }
}

/// Bridges `std::io::Write` to the grammar types' `std::fmt::Write` surface,
/// so a term set, frequency vector or matrix can serialize straight into a
/// file or stdout handle.
pub struct WriteAdapter<'a, W: Write>(pub &'a mut W);

impl<'a, W: Write> std::fmt::Write for WriteAdapter<'a, W> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.0.write_all(s.as_bytes()).map_err(|_| std::fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_or_none_distinguishes_absent_from_empty() {
        let empty: Vec<String> = Vec::new();
        assert!(non_empty_or_none(&empty).is_none());
        let one = vec!["a".to_string()];
        assert_eq!(non_empty_or_none(&one), Some(&one[..]));
    }

    #[test]
    fn care_predicate_ids_is_none_when_nothing_was_given() {
        let ids: Vec<String> = Vec::new();
        assert!(care_predicate_ids(&ids, &None).unwrap().is_none());
    }

    #[test]
    fn care_predicate_ids_collects_repeated_flags() {
        let ids = vec!["3".to_string(), "7".to_string()];
        let set = care_predicate_ids(&ids, &None).unwrap().unwrap();
        assert!(set.contains(&3) && set.contains(&7) && set.len() == 2);
    }

    #[test]
    fn write_adapter_forwards_bytes() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut adapter = WriteAdapter(&mut buf);
            std::fmt::Write::write_str(&mut adapter, "cat").unwrap();
        }
        assert_eq!(buf, b"cat");
    }
}
