use super::walk::CancelToken;
use std::sync::Mutex;
use tracing::debug;

/// Holds the token of the one outstanding scan for a caller session.
#[derive(Debug, Default)]
pub struct ScanSession {
    current: Mutex<Option<CancelToken>>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new scan, canceling whichever scan this session started before.
    pub fn begin(&self) -> CancelToken {
        let token = CancelToken::new();
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = guard.replace(token.clone()) {
            if !previous.is_canceled() {
                debug!("Canceling superseded scan");
            }
            previous.cancel();
        }
        token
    }

    /// Cancel the outstanding scan, if any.
    pub fn cancel(&self) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = guard.take() {
            token.cancel();
        }
    }
}
