//! Page-layout text extraction by shelling out to `pdftotext -layout`.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use auszug_core::ParseError;
use tracing::debug;

pub const DEFAULT_COMMAND: &str = "pdftotext";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How to turn a PDF into layout-preserving text.
#[derive(Debug, Clone)]
pub struct Extractor {
    pub command: String,
    pub timeout: Duration,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Extractor {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Run `<command> -layout <path> -` and return its stdout.
    ///
    /// Spawn failure, timeout, non-zero exit and blank output are all
    /// extraction errors.
    pub async fn extract(&self, path: &Path) -> Result<String, ParseError> {
        let child = tokio::process::Command::new(&self.command)
            .arg("-layout")
            .arg(path)
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ParseError::Extraction(format!("spawning {}: {e}", self.command)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                ParseError::Extraction(format!(
                    "{} timed out after {}s on {}",
                    self.command,
                    self.timeout.as_secs(),
                    path.display()
                ))
            })?
            .map_err(|e| ParseError::Extraction(format!("waiting for {}: {e}", self.command)))?;

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            if !line.trim().is_empty() {
                debug!(source = %path.display(), "{}.stderr: {line}", self.command);
            }
        }

        if !output.status.success() {
            return Err(ParseError::Extraction(format!(
                "{} exited with {} on {}",
                self.command,
                output.status,
                path.display()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(ParseError::Extraction(format!(
                "{} produced no text for {}",
                self.command,
                path.display()
            )));
        }
        Ok(text)
    }
}
