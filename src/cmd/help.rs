use crate::util;
use crate::CliResult;

static USAGE: &str = "
Displays the top-level help message, or a subcommand's own help when one is
named.

Usage:
    waf help [<command>]
    waf help --help

Options:
    -h, --help    Display this message
";

#[derive(Deserialize)]
struct Args {
    arg_command: Option<String>,
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;

    match args.arg_command.as_deref() {
        None => {
            println!("{}", util::colorize_main_help(crate::USAGE));
            Ok(())
        }
        Some(name) => crate::run_command_help(name),
    }
}
