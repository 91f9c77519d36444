// Registration email-code helpers

pub mod countdown;

pub use countdown::{CodeCountdown, CodeError, VerificationCode};
