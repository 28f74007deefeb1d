use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

/// A scratch directory plus a thin wrapper around invoking the built `waf`
/// binary inside it — the integration-test harness every subcommand test
/// drives its fixtures and assertions through.
pub struct Workdir {
    root: PathBuf,
}

impl Workdir {
    pub fn new(name: &str) -> Workdir {
        let root = env::temp_dir().join("waf-tests").join(name);
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        Workdir { root }
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Writes `lines` to `filename`, one per line, inside the scratch
    /// directory.
    pub fn create(&self, filename: &str, lines: Vec<String>) {
        let mut contents = lines.join("\n");
        contents.push('\n');
        fs::write(self.path(filename), contents).unwrap();
    }

    pub fn command(&self, sub: &str) -> process::Command {
        let mut cmd = process::Command::new(waf_bin());
        cmd.current_dir(&self.root);
        cmd.arg(sub);
        cmd
    }

    /// Runs `cmd`, asserting success, and returns its stdout.
    pub fn stdout(&self, cmd: &mut process::Command) -> String {
        let output = cmd.output().unwrap();
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    pub fn read_to_string(&self, filename: &str) -> String {
        fs::read_to_string(self.path(filename)).unwrap()
    }

    /// Lines of `filename`, each split on whitespace — the shape every
    /// pair/cell grammar file comes back as once unparsed into tokens.
    pub fn read_lines(&self, filename: &str) -> Vec<Vec<String>> {
        self.read_to_string(filename)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect()
    }
}

fn waf_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_waf"))
}
