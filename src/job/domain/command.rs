//! Rendered external command invocations.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Fully rendered external command, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    working_dir: Utf8PathBuf,
}

impl CommandSpec {
    /// Creates a command spec.
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = String>,
        working_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
            working_dir: working_dir.into(),
        }
    }

    /// Creates a command running a shell line in the given directory.
    ///
    /// Build and deploy templates render to shell lines, matching how
    /// operators write them in project scripts.
    #[must_use]
    pub fn shell(line: impl Into<String>, working_dir: impl Into<Utf8PathBuf>) -> Self {
        Self::new("sh", ["-c".to_owned(), line.into()], working_dir)
    }

    /// Returns the program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the program arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the working directory the process starts in.
    #[must_use]
    pub fn working_dir(&self) -> &Utf8Path {
        &self.working_dir
    }

    /// Returns a single-line rendering for logs.
    #[must_use]
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
