// src/common/hooks.rs

use std::future::Future;
use std::pin::Pin;

use crate::common::error::AppError;

type HookFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send>>;

/// Side effects that may only run after the owning transaction has
/// committed. Each hook carries its own error boundary: a failure is logged
/// and never reaches the caller, so the core write path stays available even
/// when a side effect is broken.
#[derive(Default)]
pub struct PostCommitHooks {
    hooks: Vec<(&'static str, HookFuture)>,
}

impl PostCommitHooks {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn push<F>(&mut self, name: &'static str, fut: F)
    where
        F: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        self.hooks.push((name, Box::pin(fut)));
    }

    /// Runs every hook in order. Call this only after commit.
    pub async fn run(self) {
        for (name, hook) in self.hooks {
            if let Err(e) = hook.await {
                tracing::warn!("post-commit hook '{}' failed: {}", name, e);
            }
        }
    }

    /// Detaches the hooks onto the runtime so the response is not held up.
    pub fn spawn(self) {
        if !self.hooks.is_empty() {
            tokio::spawn(self.run());
        }
    }
}
