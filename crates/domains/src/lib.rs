//! # domains
//!
//! The central domain models, port traits, and error taxonomy for Wayfarer.
//! Adapters (storage, auth, api) depend on this crate and nothing in here
//! depends on them.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn conversation_id_is_order_independent() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(conversation_id(a, b), conversation_id(b, a));
    }

    #[test]
    fn conversation_id_joins_sorted_pair() {
        let a: Uuid = "00000000-0000-7000-8000-000000000001".parse().unwrap();
        let b: Uuid = "00000000-0000-7000-8000-000000000002".parse().unwrap();
        assert_eq!(conversation_id(b, a), format!("{a}_{b}"));
    }

    #[test]
    fn otp_state_travels_as_one_unit() {
        let account = Account {
            id: Uuid::now_v7(),
            kind: AccountKind::Traveler,
            name: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$stub".into(),
            is_verified: false,
            otp: None,
            speciality: None,
            rate_per_day: None,
            created_at: chrono::Utc::now(),
        };
        // No pending code means no expiry either; the Option enforces it.
        assert!(account.otp.is_none());
    }
}
