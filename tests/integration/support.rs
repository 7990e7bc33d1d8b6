//! Remote matchers with scripted behaviour.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use roster::search::remote::{RemoteHit, RemoteMatcher};
use roster::{Result, RosterError};

/// Answers with fixed hits after an optional delay.
pub struct ScriptedMatcher {
    pub hits: Vec<RemoteHit>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedMatcher {
    pub fn new(hits: Vec<RemoteHit>) -> Self {
        Self {
            hits,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(hits: Vec<RemoteHit>, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(hits)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteMatcher for ScriptedMatcher {
    async fn match_records(&self, _query: &str, _catalog: &str) -> Result<Vec<RemoteHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.hits.clone())
    }
}

/// Always fails.
pub struct BrokenMatcher;

impl RemoteMatcher for BrokenMatcher {
    async fn match_records(&self, _query: &str, _catalog: &str) -> Result<Vec<RemoteHit>> {
        Err(RosterError::Remote("connection reset".to_string()))
    }
}

pub fn hit(id: u32, confidence: f64) -> RemoteHit {
    RemoteHit {
        id,
        confidence: Some(confidence),
    }
}
