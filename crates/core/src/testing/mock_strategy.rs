use async_trait::async_trait;
use std::sync::Mutex;

use crate::strategy::{ConversionError, ConversionJob, ConversionStrategy};

/// Strategy double that records jobs and writes a fixed payload.
pub struct MockStrategy {
    name: &'static str,
    payload: Option<Vec<u8>>,
    jobs: Mutex<Vec<ConversionJob>>,
}

impl MockStrategy {
    /// A strategy that succeeds, writing `payload` to the output path.
    pub fn succeeding(name: &'static str, payload: &[u8]) -> Self {
        Self {
            name,
            payload: Some(payload.to_vec()),
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// A strategy that always fails without writing anything.
    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            payload: None,
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Jobs executed so far, in call order.
    pub fn executed_jobs(&self) -> Vec<ConversionJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversionStrategy for MockStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(&self, job: &ConversionJob) -> Result<u64, ConversionError> {
        self.jobs.lock().unwrap().push(job.clone());
        match &self.payload {
            Some(payload) => {
                tokio::fs::write(&job.output_path, payload).await?;
                Ok(payload.len() as u64)
            }
            None => Err(ConversionError::backend("mock strategy failure")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TargetFormat;

    #[tokio::test]
    async fn test_succeeding_mock_writes_payload() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = MockStrategy::succeeding("mock_ok", b"payload");
        let job = ConversionJob {
            input_path: dir.path().join("in"),
            output_path: dir.path().join("out"),
            media_type: "image/png".to_string(),
            target: TargetFormat::Pdf,
        };

        let size = strategy.execute(&job).await.unwrap();
        assert_eq!(size, 7);
        assert_eq!(strategy.executed_jobs().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_mock_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = MockStrategy::failing("mock_fail");
        let job = ConversionJob {
            input_path: dir.path().join("in"),
            output_path: dir.path().join("out"),
            media_type: "image/png".to_string(),
            target: TargetFormat::Pdf,
        };

        assert!(strategy.execute(&job).await.is_err());
        assert!(!job.output_path.exists());
    }
}
