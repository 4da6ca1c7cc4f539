//! GitHub Actions workflow commands.
//!
//! Outputs go to the file named by `GITHUB_OUTPUT` using a heredoc with a
//! random delimiter. Without that file the legacy `::set-output` command is
//! printed instead.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use uuid::Uuid;

/// Writes outputs and failure annotations for the Actions runner.
#[derive(Debug, Clone, Default)]
pub struct WorkflowCommands {
    output_file: Option<PathBuf>,
}

impl WorkflowCommands {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self { output_file }
    }

    /// Use the runner's `GITHUB_OUTPUT` file when present.
    pub fn from_env() -> Self {
        let output_file = std::env::var_os("GITHUB_OUTPUT")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        Self::new(output_file)
    }

    /// Set a step output.
    pub fn set_output<W: Write>(&self, out: &mut W, name: &str, value: &str) -> io::Result<()> {
        match &self.output_file {
            Some(path) => {
                let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{}<<{}\n{}\n{}", name, delimiter, value, delimiter)
            }
            None => {
                writeln!(
                    out,
                    "::set-output name={}::{}",
                    escape_property(name),
                    escape_data(value)
                )
            }
        }
    }

    /// Annotate the run as failed. The caller sets the exit code.
    pub fn set_failed<W: Write>(&self, out: &mut W, message: &str) -> io::Result<()> {
        writeln!(out, "::error::{}", escape_data(message))
    }
}

/// Escape a command message.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a command property value.
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
