//! Login pre-flight: the checks a login submission passes before any
//! credential lookup happens.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::metrics;
use crate::security::integrity::detect_suspicious_input;
use crate::security::rate_limit::{Clock, SlidingWindowLimiter, SystemClock};
use crate::security::rut::validate_rut;
use crate::security::sanitize::sanitize_str;
use crate::security::validate::{utf16_len, validate_email, MAX_EMAIL_LEN};

/// Longest well-formed RUT, dotted: `12.345.678-5`.
const MAX_RUT_LEN: usize = 12;

/// How the user identifies themselves on the login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    Email,
    Rut,
}

impl LoginMethod {
    /// Usernames longer than this can never pass the format check.
    fn max_len(self) -> usize {
        match self {
            LoginMethod::Email => MAX_EMAIL_LEN,
            LoginMethod::Rut => MAX_RUT_LEN,
        }
    }

    fn format_error(self) -> GuardError {
        match self {
            LoginMethod::Email => GuardError::InvalidEmail,
            LoginMethod::Rut => GuardError::InvalidRut,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            LoginMethod::Email => "email",
            LoginMethod::Rut => "rut",
        }
    }
}

/// Rate limit key for a login attempt, e.g. `email_ana@correo.cl`.
pub fn login_identifier(method: LoginMethod, username: &str) -> String {
    format!("{}_{}", method.prefix(), username)
}

/// Reasons a login submission is turned away before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("Demasiados intentos de login. Intentos restantes: {remaining}")]
    RateLimited { remaining: u32 },

    #[error("El campo contiene caracteres no válidos")]
    InvalidCharacters,

    #[error("Formato de email inválido")]
    InvalidEmail,

    #[error("Formato de RUT inválido")]
    InvalidRut,
}

/// A login submission that passed pre-flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginAttempt {
    pub identifier: String,
    pub username: String,
    pub remaining: u32,
}

/// Gatekeeper shared by every login path.
pub struct LoginGuard<C: Clock = SystemClock> {
    limiter: Arc<SlidingWindowLimiter<C>>,
}

impl<C: Clock> Clone for LoginGuard<C> {
    fn clone(&self) -> Self {
        Self {
            limiter: self.limiter.clone(),
        }
    }
}

impl<C: Clock> LoginGuard<C> {
    pub fn new(limiter: Arc<SlidingWindowLimiter<C>>) -> Self {
        Self { limiter }
    }

    pub fn limiter(&self) -> &SlidingWindowLimiter<C> {
        &self.limiter
    }

    /// Rate-limit, then check the username's characters and format.
    ///
    /// Every submission counts against the limit, including ones that
    /// later fail format checks.
    /// Over-long usernames are rejected before touching the limiter, so
    /// they never occupy a slot in it.
    pub fn preflight(&self, method: LoginMethod, username: &str) -> Result<LoginAttempt, GuardError> {
        if utf16_len(username) > method.max_len() {
            tracing::debug!(len = username.len(), "Login username too long");
            metrics::record_login_attempt("invalid");
            return Err(method.format_error());
        }

        let identifier = login_identifier(method, username);

        if !self.limiter.is_allowed(&identifier) {
            metrics::record_login_attempt("rate_limited");
            return Err(GuardError::RateLimited {
                remaining: self.limiter.remaining_attempts(&identifier),
            });
        }

        if detect_suspicious_input(username) {
            tracing::warn!(identifier = %identifier, "Suspicious input on login");
            metrics::record_suspicious_input("login");
        }

        let sanitized = sanitize_str(username);
        let result = if sanitized != username {
            Err(GuardError::InvalidCharacters)
        } else {
            let well_formed = match method {
                LoginMethod::Email => validate_email(&sanitized),
                LoginMethod::Rut => validate_rut(&sanitized),
            };
            if well_formed {
                Ok(())
            } else {
                Err(method.format_error())
            }
        };

        if let Err(e) = result {
            tracing::debug!(identifier = %identifier, error = %e, "Login pre-flight rejected");
            metrics::record_login_attempt("invalid");
            return Err(e);
        }

        metrics::record_login_attempt("allowed");
        Ok(LoginAttempt {
            remaining: self.limiter.remaining_attempts(&identifier),
            identifier,
            username: sanitized,
        })
    }

    /// Clear the attempt history after a successful login.
    pub fn record_success(&self, method: LoginMethod, username: &str) {
        self.limiter.reset(&login_identifier(method, username));
    }
}
