// ─────────────────────────────────────────────────────────────────
// Reward Ledger — append-only record of simulated money movement
// ─────────────────────────────────────────────────────────────────
// Entries are never mutated, reordered or deleted. A correction, if
// ever needed, is a new counter-entry. Balance is defined as
// starting balance + sum of signed amounts, always recomputable from
// the full history.
// ─────────────────────────────────────────────────────────────────

use crate::STARTING_BALANCE_UETH;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Reward credited to a validator for a recorded ping
    PingPayment,
    /// Registration fee debited from a website owner
    WebsiteFee,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LedgerEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Signed µETH: positive credits, negative debits
    pub amount_ueth: i128,
    pub tx_hash: String,
    pub timestamp: u64,
    pub uid: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RewardLedger {
    /// Insertion order is the total order — never resorted.
    entries: Vec<LedgerEntry>,
    starting_balance_ueth: i128,
}

impl Default for RewardLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::with_starting_balance(STARTING_BALANCE_UETH)
    }

    pub fn with_starting_balance(starting_balance_ueth: i128) -> Self {
        Self {
            entries: Vec::new(),
            starting_balance_ueth,
        }
    }

    pub fn starting_balance_ueth(&self) -> i128 {
        self.starting_balance_ueth
    }

    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// Current balance: starting balance + sum of signed entry amounts.
    /// This is the single ledger definition — any display that derives a
    /// balance another way is wrong, not a second truth.
    pub fn balance_of(&self, uid: u64) -> i128 {
        self.starting_balance_ueth
            + self
                .entries
                .iter()
                .filter(|e| e.uid == uid)
                .map(|e| e.amount_ueth)
                .sum::<i128>()
    }

    /// Sum of credits for a user (rewards earned).
    pub fn total_earned_of(&self, uid: u64) -> i128 {
        self.entries
            .iter()
            .filter(|e| e.uid == uid && e.amount_ueth > 0)
            .map(|e| e.amount_ueth)
            .sum()
    }

    /// Sum of debits for a user, as a positive number.
    pub fn total_spent_of(&self, uid: u64) -> i128 {
        -self
            .entries
            .iter()
            .filter(|e| e.uid == uid && e.amount_ueth < 0)
            .map(|e| e.amount_ueth)
            .sum::<i128>()
    }

    /// A user's entries, newest first. A fresh finite snapshot each call,
    /// not a live stream.
    pub fn history_of(&self, uid: u64, limit: Option<usize>) -> Vec<&LedgerEntry> {
        let iter = self.entries.iter().rev().filter(|e| e.uid == uid);
        match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }
}
