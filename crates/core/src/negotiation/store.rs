use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use super::Terms;

/// In-memory per-user negotiation state.
///
/// The outer map lock is held only long enough to clone out the per-user
/// cell; callers then serialize the read-decide-write of a single user's
/// round on that cell's async mutex. Rounds for distinct users never
/// contend with each other.
pub struct SessionStore {
    initial_price: Decimal,
    sessions: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Decimal>>>>,
}

impl SessionStore {
    pub fn new(terms: &Terms) -> Self {
        Self { initial_price: terms.initial_price, sessions: Mutex::new(HashMap::new()) }
    }

    /// Per-user price cell, created lazily at the initial price.
    pub fn entry(&self, user_id: &str) -> Arc<tokio::sync::Mutex<Decimal>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions
            .entry(user_id.to_owned())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(self.initial_price)))
            .clone()
    }

    /// Current reference price for a user; the initial price when the user
    /// has never completed a round.
    pub async fn reference_price(&self, user_id: &str) -> Decimal {
        let cell = {
            let sessions =
                self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            sessions.get(user_id).cloned()
        };
        match cell {
            Some(cell) => *cell.lock().await,
            None => self.initial_price,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::SessionStore;
    use crate::negotiation::Terms;

    #[tokio::test]
    async fn unseen_user_reads_the_initial_price_without_creating_a_session() {
        let store = SessionStore::new(&Terms::default());

        assert_eq!(store.reference_price("u-1").await, Decimal::from(100));
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn entry_is_created_once_and_writes_are_visible() {
        let store = SessionStore::new(&Terms::default());

        let cell = store.entry("u-1");
        *cell.lock().await = Decimal::from(90);

        assert_eq!(store.reference_price("u-1").await, Decimal::from(90));
        assert_eq!(store.session_count(), 1);

        // Re-entering yields the same cell, not a reset one.
        let again = store.entry("u-1");
        assert_eq!(*again.lock().await, Decimal::from(90));
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn sessions_are_independent_across_users() {
        let store = SessionStore::new(&Terms::default());

        *store.entry("u-1").lock().await = Decimal::from(60);
        *store.entry("u-2").lock().await = Decimal::from(80);

        assert_eq!(store.reference_price("u-1").await, Decimal::from(60));
        assert_eq!(store.reference_price("u-2").await, Decimal::from(80));
    }

    #[tokio::test]
    async fn holding_one_user_lock_does_not_block_another_user() {
        let store = SessionStore::new(&Terms::default());

        let held = store.entry("u-1");
        let _guard = held.lock().await;

        // Must complete immediately even while u-1's cell is locked.
        let other = store.entry("u-2");
        let value = tokio::time::timeout(std::time::Duration::from_millis(100), other.lock())
            .await
            .expect("distinct user lock must not contend");
        assert_eq!(*value, Decimal::from(100));
    }
}
