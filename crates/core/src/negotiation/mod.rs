//! Negotiation core: sentiment-tiered discounting, the accept/reject/counter
//! decision rules, per-user session state, and one-round orchestration.

pub mod discount;
pub mod engine;
pub mod service;
pub mod store;

use rust_decimal::Decimal;

/// Commercial bounds of a negotiation. The reference price for every live
/// session stays within `[min_price, initial_price]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terms {
    /// Anchor price for users with no prior rounds.
    pub initial_price: Decimal,
    /// Hard floor. Offers below it are rejected outright.
    pub min_price: Decimal,
    /// Minimum movement toward the buyer on every counteroffer.
    pub counter_step: Decimal,
}

impl Default for Terms {
    fn default() -> Self {
        Self {
            initial_price: Decimal::from(100),
            min_price: Decimal::from(50),
            counter_step: Decimal::from(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::Terms;

    #[test]
    fn default_terms_match_the_published_price_card() {
        let terms = Terms::default();
        assert_eq!(terms.initial_price, Decimal::from(100));
        assert_eq!(terms.min_price, Decimal::from(50));
        assert_eq!(terms.counter_step, Decimal::from(5));
    }
}
