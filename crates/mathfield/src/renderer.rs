//! Math renderer capability and the external-process implementation.

use std::process::{Command, Stdio};

use crate::config::RendererConfig;
use crate::error::{MathFieldError, Result};

/// Turns math fragments into HTML fragments.
///
/// Implementations must return exactly one HTML string per input fragment, in
/// input order. Any failure aborts the whole render.
pub trait MathRenderer {
    fn render(&self, fragments: &[String]) -> Result<Vec<String>>;
}

impl<R: MathRenderer + ?Sized> MathRenderer for &R {
    fn render(&self, fragments: &[String]) -> Result<Vec<String>> {
        (**self).render(fragments)
    }
}

impl<R: MathRenderer + ?Sized> MathRenderer for Box<R> {
    fn render(&self, fragments: &[String]) -> Result<Vec<String>> {
        (**self).render(fragments)
    }
}

/// Renders by running an external program once per call.
///
/// The program gets the configured script as its first argument and one
/// argument per fragment after it, and must print one HTML line per fragment.
/// Anything written to stderr fails the render, whatever the exit status.
/// No shell is involved, so fragments are never interpreted.
#[derive(Debug, Clone, Default)]
pub struct CommandRenderer {
    config: RendererConfig,
}

impl CommandRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    fn command(&self, fragments: &[String]) -> Command {
        let mut command = Command::new(&self.config.program);
        if let Some(script) = &self.config.script {
            command.arg(script);
        }
        command
            .args(fragments)
            .env("LC_ALL", &self.config.locale)
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl MathRenderer for CommandRenderer {
    fn render(&self, fragments: &[String]) -> Result<Vec<String>> {
        tracing::debug!(
            program = %self.config.program,
            fragments = fragments.len(),
            "invoking math renderer"
        );

        let child = self.command(fragments).spawn().map_err(|source| {
            MathFieldError::ExternalToolUnavailable {
                program: self.config.program.clone(),
                source,
            }
        })?;
        // reads stdout and stderr to EOF, then reaps the child
        let output = child.wait_with_output()?;

        if !output.stderr.is_empty() {
            return Err(MathFieldError::ExternalRenderError {
                message: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        if !output.status.success() {
            tracing::warn!(
                program = %self.config.program,
                status = %output.status,
                "math renderer exited unsuccessfully without writing to stderr"
            );
        }

        let stdout = String::from_utf8(output.stdout).map_err(|err| {
            MathFieldError::ExternalRenderError {
                message: format!("math renderer wrote invalid UTF-8: {err}"),
            }
        })?;
        Ok(split_output(&stdout))
    }
}

/// One fragment per line; surrounding newlines are not fragments, and empty
/// output has none.
pub(crate) fn split_output(stdout: &str) -> Vec<String> {
    let stdout = stdout.trim_matches('\n');
    if stdout.is_empty() {
        return Vec::new();
    }
    stdout
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_owned())
        .collect()
}
