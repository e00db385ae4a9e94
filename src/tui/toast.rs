//! Transient notifications that dismiss themselves.

use std::time::{Duration, Instant};

/// How long a short notification stays on screen.
pub const TOAST_SHORT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    expires_at: Instant,
}

impl Toast {
    pub fn new(message: &str, now: Instant, duration: Duration) -> Self {
        Self {
            message: message.to_string(),
            expires_at: now + duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
