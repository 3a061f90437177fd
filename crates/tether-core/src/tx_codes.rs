// ─────────────────────────────────────────────────────────────────
// Transaction Code Registry — single-use simulated payment codes
// ─────────────────────────────────────────────────────────────────
// Fixed pool of 20 codes (TX-001..TX-020) standing in for on-chain
// payment references. At-most-once consumption is the core invariant:
// a reserved code never returns to the pool, even if the submission
// that reserved it later fails.
// ─────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Number of codes in the fixed namespace.
pub const TX_CODE_COUNT: usize = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("transaction code {0} is not in the known set")]
    Unknown(String),
    #[error("transaction code {0} has already been used")]
    AlreadyUsed(String),
}

/// Proof that a code was consumed. Not cloneable: exactly one reservation
/// exists per consumed code, and it is surrendered to `submit::settle`.
#[derive(Debug)]
pub struct Reservation {
    pub tx_hash: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TransactionCodeRegistry {
    /// code -> consumed flag. BTreeMap keeps TX-001..TX-020 in order.
    codes: BTreeMap<String, bool>,
}

impl Default for TransactionCodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionCodeRegistry {
    pub fn new() -> Self {
        let codes = (1..=TX_CODE_COUNT)
            .map(|i| (format!("TX-{:03}", i), false))
            .collect();
        Self { codes }
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.codes.contains_key(code)
    }

    /// True if the code is known and not yet consumed.
    pub fn is_available(&self, code: &str) -> bool {
        matches!(self.codes.get(code), Some(false))
    }

    /// Unconsumed codes, in namespace order.
    pub fn list_available(&self) -> Vec<&str> {
        self.codes
            .iter()
            .filter(|(_, used)| !**used)
            .map(|(code, _)| code.as_str())
            .collect()
    }

    /// Consume a code. The consumed flag is set before any external effect
    /// of the ping is attempted, so the same code can never be reserved
    /// twice — system-wide, across all validators.
    pub fn reserve(&mut self, code: &str) -> Result<Reservation, CodeError> {
        match self.codes.get_mut(code) {
            None => Err(CodeError::Unknown(code.to_string())),
            Some(used) if *used => Err(CodeError::AlreadyUsed(code.to_string())),
            Some(used) => {
                *used = true;
                Ok(Reservation {
                    tx_hash: code.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_shape() {
        let reg = TransactionCodeRegistry::new();
        let available = reg.list_available();
        assert_eq!(available.len(), TX_CODE_COUNT);
        assert_eq!(available[0], "TX-001");
        assert_eq!(available[19], "TX-020");
    }

    #[test]
    fn test_reserve_consumes_exactly_once() {
        let mut reg = TransactionCodeRegistry::new();
        let res = reg.reserve("TX-005").unwrap();
        assert_eq!(res.tx_hash, "TX-005");
        assert!(!reg.is_available("TX-005"));
        assert!(reg.is_known("TX-005"));

        assert_eq!(
            reg.reserve("TX-005").unwrap_err(),
            CodeError::AlreadyUsed("TX-005".to_string())
        );
        assert_eq!(reg.list_available().len(), TX_CODE_COUNT - 1);
    }

    #[test]
    fn test_unknown_code() {
        let mut reg = TransactionCodeRegistry::new();
        assert_eq!(
            reg.reserve("TX-999").unwrap_err(),
            CodeError::Unknown("TX-999".to_string())
        );
        assert_eq!(
            reg.reserve("0xdeadbeef").unwrap_err(),
            CodeError::Unknown("0xdeadbeef".to_string())
        );
        // Failed reservations leave the pool untouched
        assert_eq!(reg.list_available().len(), TX_CODE_COUNT);
    }

    #[test]
    fn test_reservation_survives_failed_submission() {
        // The registry has no "unreserve" — a consumed code stays consumed.
        // This mirrors the non-reversible nature of a spent payment reference.
        let mut reg = TransactionCodeRegistry::new();
        let _dropped = reg.reserve("TX-001").unwrap();
        assert!(!reg.is_available("TX-001"));
    }

    #[test]
    fn test_exhausting_the_pool() {
        let mut reg = TransactionCodeRegistry::new();
        let all: Vec<String> = reg.list_available().iter().map(|s| s.to_string()).collect();
        for code in &all {
            reg.reserve(code).unwrap();
        }
        assert!(reg.list_available().is_empty());
    }
}
