use super::{ExtractError, convert};
use crate::Result;
use crate::model::{Artifact, Value, ValueType};
use ohno::{IntoAppError, app_err, bail};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

/// Extracts a value by piping the artifact into an external command and parsing its output.
#[derive(Debug)]
pub struct CommandExtractor {
    args: Vec<String>,
}

impl CommandExtractor {
    /// # Errors
    ///
    /// Returns an error if the argument vector or the program name is empty.
    pub fn new(args: Vec<String>) -> Result<Self> {
        let Some(program) = args.first() else {
            bail!("command argument list cannot be empty");
        };

        if program.is_empty() {
            bail!("command program name cannot be empty");
        }

        Ok(Self { args })
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub(super) fn extract(&self, artifact: &Artifact, value_type: ValueType) -> Result<Value, ExtractError> {
        let content = artifact.content()?;
        let (program, rest) = self
            .args
            .split_first()
            .ok_or_else(|| app_err!("command argument list cannot be empty"))?;

        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .into_app_err_with(|| format!("running command {:?}", self.args))?;

        let mut stdin = child.stdin.take().ok_or_else(|| app_err!("command stdin was not captured"))?;
        let output = thread::scope(|scope| {
            // a command may exit without consuming its input, so write errors are ignored
            let _ = scope.spawn(move || {
                let _ = stdin.write_all(content);
            });
            child.wait_with_output()
        })
        .into_app_err_with(|| format!("waiting for command {:?}", self.args))?;

        if !output.status.success() {
            let code = output.status.code().map_or_else(|| "none".to_string(), |c| c.to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::parse_failure(format!(
                "command {:?} failed with exit code {code}: {}",
                self.args,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        convert(stdout, value_type).map_err(|e| match e {
            ExtractError::ParseFailure(m) => ExtractError::parse_failure(format!("parsing output '{stdout}': {m}")),
            fatal @ ExtractError::Fatal(_) => fatal,
        })
    }
}
