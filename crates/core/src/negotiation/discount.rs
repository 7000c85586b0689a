use rust_decimal::Decimal;

/// Tone bands derived from a polarity score in [-1.0, 1.0].
///
/// Classification is total: NaN and out-of-range values fail every
/// positive comparison and land in `Low`, so junk polarity can only
/// reduce the discount, never crash or inflate it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SentimentTier {
    High,
    Medium,
    Low,
}

impl SentimentTier {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.5 {
            Self::High
        } else if polarity > 0.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Fixed discount amounts per sentiment tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscountSchedule {
    pub high: Decimal,
    pub medium: Decimal,
    pub low: Decimal,
}

impl Default for DiscountSchedule {
    fn default() -> Self {
        Self { high: Decimal::from(15), medium: Decimal::from(10), low: Decimal::from(5) }
    }
}

impl DiscountSchedule {
    pub fn discount(&self, polarity: f64) -> Decimal {
        match SentimentTier::from_polarity(polarity) {
            SentimentTier::High => self.high,
            SentimentTier::Medium => self.medium,
            SentimentTier::Low => self.low,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{DiscountSchedule, SentimentTier};

    #[test]
    fn tiers_split_at_zero_and_half() {
        assert_eq!(SentimentTier::from_polarity(0.8), SentimentTier::High);
        assert_eq!(SentimentTier::from_polarity(0.51), SentimentTier::High);
        assert_eq!(SentimentTier::from_polarity(0.5), SentimentTier::Medium);
        assert_eq!(SentimentTier::from_polarity(0.01), SentimentTier::Medium);
        assert_eq!(SentimentTier::from_polarity(0.0), SentimentTier::Low);
        assert_eq!(SentimentTier::from_polarity(-0.7), SentimentTier::Low);
    }

    #[test]
    fn junk_polarity_falls_to_the_low_tier() {
        assert_eq!(SentimentTier::from_polarity(f64::NAN), SentimentTier::Low);
        assert_eq!(SentimentTier::from_polarity(f64::NEG_INFINITY), SentimentTier::Low);
        // Out-of-range positive junk still gets the best tier rather
        // than crashing; the contract only promises a defined result.
        assert_eq!(SentimentTier::from_polarity(7.0), SentimentTier::High);
    }

    #[test]
    fn discount_is_monotonically_non_decreasing_across_tier_boundaries() {
        let schedule = DiscountSchedule::default();
        let samples = [-1.0, -0.2, 0.0, 0.2, 0.5, 0.6, 1.0];
        let discounts: Vec<Decimal> =
            samples.iter().map(|polarity| schedule.discount(*polarity)).collect();

        for pair in discounts.windows(2) {
            assert!(pair[0] <= pair[1], "discount dropped between adjacent polarities");
        }
        for discount in discounts {
            assert!(
                [Decimal::from(5), Decimal::from(10), Decimal::from(15)].contains(&discount),
                "discount outside the fixed tier set"
            );
        }
    }
}
