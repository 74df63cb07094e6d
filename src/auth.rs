//! Shared-secret confirmation for sensitive ledger mutations.
//!
//! The secret is compared with plain equality and kept in cleartext. The gate keeps
//! no state between calls, so repeated wrong guesses are neither counted nor slowed
//! down.

use std::fmt;

use tracing::warn;

use crate::errors::{LedgerError, LedgerResult};

/// Short credential (PIN) that unlocks sensitive actions.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}

/// Whether an intent needs the secret before it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    Routine,
    Sensitive,
}

pub fn verify(candidate: &str, expected: &str) -> bool {
    candidate == expected
}

/// Runs deferred actions only after the caller proves knowledge of the shared secret.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationGate {
    secret: Option<SharedSecret>,
}

impl AuthorizationGate {
    pub fn new(secret: SharedSecret) -> Self {
        Self {
            secret: Some(secret),
        }
    }

    /// A gate with no secret configured. It denies every sensitive action.
    pub fn locked() -> Self {
        Self { secret: None }
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match &self.secret {
            Some(expected) => verify(candidate, expected.as_str()),
            None => false,
        }
    }

    /// Invokes `action` exactly once if `candidate` matches, otherwise returns the denial
    /// without invoking it.
    pub fn authorize<T, F>(&self, candidate: &str, action: F) -> LedgerResult<T>
    where
        F: FnOnce() -> LedgerResult<T>,
    {
        if !self.verify(candidate) {
            let reason = if self.has_secret() {
                "incorrect PIN"
            } else {
                "no PIN configured"
            };
            warn!(reason, "sensitive action denied");
            return Err(LedgerError::Authorization(reason.into()));
        }
        action()
    }

    /// Routine actions run directly; sensitive ones go through [`authorize`](Self::authorize).
    pub fn guard<T, F>(
        &self,
        sensitivity: Sensitivity,
        candidate: Option<&str>,
        action: F,
    ) -> LedgerResult<T>
    where
        F: FnOnce() -> LedgerResult<T>,
    {
        match sensitivity {
            Sensitivity::Routine => action(),
            Sensitivity::Sensitive => self.authorize(candidate.unwrap_or_default(), action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn verify_is_plain_equality() {
        assert!(verify("1234", "1234"));
        assert!(!verify("0000", "1234"));
        assert!(!verify("1234 ", "1234"));
    }

    #[test]
    fn matching_pin_runs_action_once() {
        let gate = AuthorizationGate::new(SharedSecret::new("1234"));
        let calls = Cell::new(0);
        let value = gate
            .authorize("1234", || {
                calls.set(calls.get() + 1);
                Ok(7)
            })
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn wrong_pin_denies_without_running() {
        let gate = AuthorizationGate::new(SharedSecret::new("1234"));
        let calls = Cell::new(0);
        let err = gate
            .authorize("0000", || {
                calls.set(calls.get() + 1);
                Ok(())
            })
            .unwrap_err();
        assert!(err.is_authorization());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn locked_gate_denies_sensitive_but_allows_routine() {
        let gate = AuthorizationGate::locked();
        assert!(gate
            .guard(Sensitivity::Sensitive, Some(""), || Ok(()))
            .is_err());
        assert!(gate.guard(Sensitivity::Routine, None, || Ok(())).is_ok());
    }

    #[test]
    fn debug_output_hides_secret() {
        let gate = AuthorizationGate::new(SharedSecret::new("9876"));
        assert!(!format!("{gate:?}").contains("9876"));
    }
}
