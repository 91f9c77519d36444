//! Client-side countdown for the emailed registration code.
//!
//! Purely presentational: the server invalidates expired codes on its own.
//! Expiry only disables submission here, it never cancels a request.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::RegistrationConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("Enter the {expected}-digit code from your email")]
    Malformed { expected: usize },
    #[error("Verification code has expired. Please request a new one.")]
    Expired,
}

/// A syntactically valid verification code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

/// Digits-only pattern, compiled once
static DIGITS_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn digits_pattern() -> Option<&'static Regex> {
    DIGITS_PATTERN
        .get_or_init(|| Regex::new(r"^[0-9]+$").ok())
        .as_ref()
}

impl VerificationCode {
    pub fn parse(raw: &str, length: usize) -> Result<Self, CodeError> {
        let code = raw.trim();
        if code.len() == length && digits_pattern().is_some_and(|pattern| pattern.is_match(code)) {
            Ok(Self(code.to_string()))
        } else {
            Err(CodeError::Malformed { expected: length })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct CodeCountdown {
    ttl: Duration,
    code_length: usize,
    deadline: Option<Instant>,
    /// Server reported the code as expired before our clock ran out
    expired_early: bool,
}

impl CodeCountdown {
    pub fn new(config: &RegistrationConfig) -> Self {
        Self {
            ttl: Duration::from_secs(config.code_ttl_secs),
            code_length: config.code_length,
            deadline: None,
            expired_early: false,
        }
    }

    /// Start counting when the code has been emailed.
    pub fn start(&mut self) {
        self.deadline = Some(Instant::now() + self.ttl);
        self.expired_early = false;
    }

    /// A new code was sent; the full window starts again.
    pub fn restart(&mut self) {
        self.start();
    }

    /// The server answered `code_expired`.
    pub fn expire(&mut self) {
        self.expired_early = true;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some() && !self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.expired_early || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn remaining(&self) -> Duration {
        if self.expired_early {
            return Duration::ZERO;
        }
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => self.ttl,
        }
    }

    /// Validate a code for submission.
    pub fn check_submission(&self, raw: &str) -> Result<VerificationCode, CodeError> {
        if self.is_expired() {
            return Err(CodeError::Expired);
        }
        VerificationCode::parse(raw, self.code_length)
    }

    pub fn label(&self) -> String {
        if self.is_expired() {
            "Code expired".to_string()
        } else {
            format!("Time remaining ({} minutes)", self.ttl.as_secs().div_ceil(60))
        }
    }
}

impl fmt::Display for CodeCountdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.remaining().as_secs();
        write!(f, "{:02}:{:02}", secs / 60, secs % 60)
    }
}
