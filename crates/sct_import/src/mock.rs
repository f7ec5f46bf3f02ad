//! Recording publisher for testing.
//!
//! Captures every publish request instead of touching git, and can be told
//! to fail for a given repository.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{ImportError, ImportResult};
use crate::publisher::{PublishRequest, RepoPublisher};

/// Publisher that records requests.
#[derive(Clone, Default)]
pub struct MockPublisher {
    requests: Arc<RwLock<Vec<PublishRequest>>>,
    failing_repository: Arc<RwLock<Option<String>>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every publish to `repository`.
    pub fn fail_for(self, repository: impl Into<String>) -> Self {
        *self.failing_repository.write() = Some(repository.into());
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<PublishRequest> {
        self.requests.read().clone()
    }
}

#[async_trait]
impl RepoPublisher for MockPublisher {
    async fn publish(&self, request: &PublishRequest) -> ImportResult<()> {
        self.requests.write().push(request.clone());
        if self.failing_repository.read().as_deref() == Some(request.repository_name.as_str()) {
            return Err(ImportError::Command {
                command: format!("git push {}", request.repository_name),
                stderr: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}
