use rust_decimal::Decimal;

use super::Terms;

/// Outcome of one negotiation round. Each variant carries the amount to
/// report to the buyer; `updated_reference` says what, if anything, must
/// be written back to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Deal closed at the buyer's own offer. The session reference price
    /// is left as-is: the deal closes at the offered price, not at the
    /// discounted final price.
    Accept { price: Decimal },
    /// Offer below the floor. The counter is always `min_price` and the
    /// session is pinned to the floor.
    Reject { counter: Decimal },
    /// Offer negotiable but short. The seller concedes to the larger of
    /// `offer + counter_step` and the discounted final price, so the
    /// session never moves faster than the discount schedule allows while
    /// always moving at least one step toward the buyer.
    Counter { counteroffer: Decimal },
}

impl Decision {
    /// New reference price to persist, when the round changes it.
    pub fn updated_reference(&self) -> Option<Decimal> {
        match self {
            Self::Accept { .. } => None,
            Self::Reject { counter } => Some(*counter),
            Self::Counter { counteroffer } => Some(*counteroffer),
        }
    }

    /// The amount the buyer sees, regardless of variant.
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Accept { price } => *price,
            Self::Reject { counter } => *counter,
            Self::Counter { counteroffer } => *counteroffer,
        }
    }
}

/// Decide one round. Total over its numeric domain: any finite offer and
/// any discount produce a defined `Decision`, no error path.
pub fn decide(terms: &Terms, reference_price: Decimal, offer: Decimal, discount: Decimal) -> Decision {
    let final_price = (reference_price - discount).max(terms.min_price);

    if offer >= final_price {
        Decision::Accept { price: offer }
    } else if offer < terms.min_price {
        Decision::Reject { counter: terms.min_price }
    } else {
        Decision::Counter { counteroffer: (offer + terms.counter_step).max(final_price) }
    }
}
