//! Out-of-process office-suite conversion.
//!
//! Targets the in-process stack cannot produce (the ODP drawing container)
//! delegate to a headless LibreOffice invocation. The invocation is awaited
//! to completion; success is reported only after the exit status is zero AND
//! the expected output file exists. Returning before the process finishes is
//! a bug, not an async contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::ConversionError;
use super::traits::{ConversionJob, ConversionStrategy};

/// Configuration for the external office converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeConfig {
    /// Path to the LibreOffice binary.
    #[serde(default = "default_soffice_path")]
    pub soffice_path: PathBuf,

    /// Timeout for a single conversion in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_soffice_path() -> PathBuf {
    PathBuf::from("soffice")
}

fn default_timeout() -> u64 {
    120
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            soffice_path: default_soffice_path(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Shells out to `soffice --headless --convert-to <ext>`.
pub struct OfficeProcessStrategy {
    config: OfficeConfig,
}

impl OfficeProcessStrategy {
    pub fn new(config: OfficeConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(OfficeConfig::default())
    }

    /// Builds the soffice argument list for one conversion.
    fn build_args(input_path: &Path, outdir: &Path, target_ext: &str) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--convert-to".to_string(),
            target_ext.to_string(),
            "--outdir".to_string(),
            outdir.to_string_lossy().to_string(),
            input_path.to_string_lossy().to_string(),
        ]
    }

    /// The path soffice writes on its own: input stem, target extension,
    /// inside the out directory.
    fn expected_output(input_path: &Path, outdir: &Path, target_ext: &str) -> PathBuf {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        outdir.join(format!("{}.{}", stem, target_ext))
    }
}

#[async_trait]
impl ConversionStrategy for OfficeProcessStrategy {
    fn name(&self) -> &'static str {
        "office_process"
    }

    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError> {
        let program = self.config.soffice_path.display().to_string();
        let target_ext = job.target.extension();
        let outdir = job
            .output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let args = Self::build_args(&job.input_path, &outdir, target_ext);
        debug!(%program, ?args, "Invoking office converter");

        let output_future = Command::new(&self.config.soffice_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, output_future).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConversionError::ExternalProcessFailure {
                    program,
                    status: None,
                    stderr: "executable not found".to_string(),
                });
            }
            Ok(Err(e)) => return Err(ConversionError::Io(e)),
            Err(_) => {
                return Err(ConversionError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            return Err(ConversionError::ExternalProcessFailure {
                program,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // A clean exit without the expected file is still a failure.
        let produced = Self::expected_output(&job.input_path, &outdir, target_ext);
        match tokio::fs::metadata(&produced).await {
            Ok(meta) if meta.len() > 0 => {}
            _ => {
                return Err(ConversionError::ExternalProcessFailure {
                    program,
                    status: output.status.code(),
                    stderr: format!("expected output missing: {}", produced.display()),
                });
            }
        }

        if produced != job.output_path {
            tokio::fs::rename(&produced, &job.output_path).await?;
        }

        let meta = tokio::fs::metadata(&job.output_path).await?;
        Ok(meta.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TargetFormat;

    fn job(dir: &Path) -> ConversionJob {
        ConversionJob {
            input_path: dir.join("upload-req.png"),
            output_path: dir.join("photo-req.odp"),
            media_type: "image/png".to_string(),
            target: TargetFormat::Odp,
        }
    }

    #[test]
    fn test_build_args() {
        let args = OfficeProcessStrategy::build_args(
            Path::new("/upload/upload-req.png"),
            Path::new("/upload"),
            "odp",
        );
        assert_eq!(
            args,
            vec![
                "--headless",
                "--convert-to",
                "odp",
                "--outdir",
                "/upload",
                "/upload/upload-req.png",
            ]
        );
    }

    #[test]
    fn test_expected_output_uses_input_stem() {
        let path = OfficeProcessStrategy::expected_output(
            Path::new("/upload/upload-req.png"),
            Path::new("/upload"),
            "odp",
        );
        assert_eq!(path, PathBuf::from("/upload/upload-req.odp"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_external_process_failure() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = OfficeProcessStrategy::new(OfficeConfig {
            soffice_path: PathBuf::from("/nonexistent/soffice-binary"),
            timeout_secs: 5,
        });

        let err = strategy.execute(&job(dir.path())).await.unwrap_err();
        assert!(matches!(
            err,
            ConversionError::ExternalProcessFailure { status: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_external_process_failure() {
        let dir = tempfile::tempdir().unwrap();
        // `false` exits 1 regardless of arguments.
        let strategy = OfficeProcessStrategy::new(OfficeConfig {
            soffice_path: PathBuf::from("false"),
            timeout_secs: 5,
        });

        let err = strategy.execute(&job(dir.path())).await.unwrap_err();
        match err {
            ConversionError::ExternalProcessFailure { status, .. } => {
                assert_eq!(status, Some(1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!dir.path().join("photo-req.odp").exists());
    }

    #[tokio::test]
    async fn test_clean_exit_without_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        // `true` exits 0 but writes nothing; success must not be reported.
        let strategy = OfficeProcessStrategy::new(OfficeConfig {
            soffice_path: PathBuf::from("true"),
            timeout_secs: 5,
        });

        let err = strategy.execute(&job(dir.path())).await.unwrap_err();
        match err {
            ConversionError::ExternalProcessFailure { status, stderr, .. } => {
                assert_eq!(status, Some(0));
                assert!(stderr.contains("expected output missing"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!dir.path().join("photo-req.odp").exists());
    }

    #[tokio::test]
    async fn test_produced_file_is_moved_to_request_path() {
        let dir = tempfile::tempdir().unwrap();
        // Stand-in converter: a shell script that writes the file soffice
        // would have written.
        let script = dir.path().join("fake-soffice.sh");
        let produced = dir.path().join("upload-req.odp");
        tokio::fs::write(
            &script,
            format!("#!/bin/sh\nprintf 'odp-bytes' > {}\n", produced.display()),
        )
        .await
        .unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let strategy = OfficeProcessStrategy::new(OfficeConfig {
            soffice_path: script,
            timeout_secs: 5,
        });

        let job = job(dir.path());
        let size = strategy.execute(&job).await.unwrap();

        assert_eq!(size, 9);
        assert!(job.output_path.exists());
        assert!(!produced.exists(), "intermediate file renamed away");
    }
}
