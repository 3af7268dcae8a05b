use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::hash::sha256_hex;

/// Milliseconds since the Unix epoch, or 0 if the clock is set before it.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// A value transfer between two accounts.
///
/// Construction never validates: a zero or negative `amount` is representable
/// and only rejected when the transaction is offered to
/// [`Blockchain::add_transaction`](crate::Blockchain::add_transaction).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: i64,
    pub timestamp: i64,
}

impl Transaction {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: i64) -> Self {
        Self::at(from, to, amount, now_millis())
    }

    /// Builds a transaction with an explicit creation instant.
    pub fn at(from: impl Into<String>, to: impl Into<String>, amount: i64, timestamp: i64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            timestamp,
        }
    }

    /// Recomputed on every call; transactions carry no cached digest.
    pub fn fingerprint(&self) -> String {
        sha256_hex(format!(
            "{}{}{}{}",
            self.from, self.to, self.amount, self.timestamp
        ))
    }

    pub fn touches(&self, address: &str) -> bool {
        self.from == address || self.to == address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice_to_bob() -> Transaction {
        Transaction::at("Alice", "Bob", 10, 1_600_000_000_000)
    }

    #[test]
    fn fingerprint_covers_all_fields() {
        let tx = alice_to_bob();
        assert_eq!(tx.fingerprint(), sha256_hex("AliceBob101600000000000"));

        let mut other = tx.clone();
        other.amount = 11;
        assert_ne!(tx.fingerprint(), other.fingerprint());

        let mut other = tx.clone();
        other.timestamp += 1;
        assert_ne!(tx.fingerprint(), other.fingerprint());

        let mut other = tx.clone();
        other.to = "Carol".into();
        assert_ne!(tx.fingerprint(), other.fingerprint());
    }

    #[test]
    fn fingerprint_is_stable() {
        let tx = alice_to_bob();
        assert_eq!(tx.fingerprint(), tx.fingerprint());
    }

    #[test]
    fn new_accepts_any_amount() {
        let tx = Transaction::new("Alice", "Bob", -5);
        assert_eq!(tx.amount, -5);
        assert!(tx.timestamp > 0);
        assert_eq!(Transaction::new("Alice", "Bob", 0).amount, 0);
    }

    #[test]
    fn touches_sender_and_recipient() {
        let tx = alice_to_bob();
        assert!(tx.touches("Alice"));
        assert!(tx.touches("Bob"));
        assert!(!tx.touches("Carol"));
    }

    #[test]
    fn transaction_serialization_example() {
        let tx = alice_to_bob();
        let json = serde_json::to_string(&tx).unwrap();
        let expected_json = r#"{"from":"Alice","to":"Bob","amount":10,"timestamp":1600000000000}"#;
        assert_eq!(json, expected_json);
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, deserialized);
    }
}
