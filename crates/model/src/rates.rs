use rust_decimal::Decimal;

/// Per-level commission rates, level 1 first.
///
/// Levels past the end of the table (and level `0`) have a rate of zero,
/// so a short table only suppresses commission, never counting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CommissionRates(Vec<Decimal>);

impl CommissionRates {
    /// Create a rate table without validation.
    pub fn new(rates: Vec<Decimal>) -> Self {
        Self(rates)
    }

    /// Create a rate table, rejecting any rate outside `[0, 1]`.
    pub fn try_new(rates: Vec<Decimal>) -> crate::Result<Self> {
        for (level, rate) in (1..).zip(rates.iter()) {
            if rate.is_sign_negative() || *rate > Decimal::ONE {
                return Err(crate::Error::InvalidRate {
                    level,
                    rate: *rate,
                });
            }
        }
        Ok(Self(rates))
    }

    /// Create a table with the same rate for the first `levels` levels.
    pub fn uniform(rate: Decimal, levels: usize) -> Self {
        Self(vec![rate; levels])
    }

    /// Get the rate of the given level (1-based).
    pub fn rate(&self, level: usize) -> Decimal {
        level
            .checked_sub(1)
            .and_then(|idx| self.0.get(idx))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether rates never increase with depth.
    pub fn is_non_increasing(&self) -> bool {
        self.0.windows(2).all(|w| w[0] >= w[1])
    }

    /// Iterate over `(level, rate)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Decimal)> + '_ {
        (1..).zip(self.0.iter().copied())
    }
}

impl FromIterator<Decimal> for CommissionRates {
    fn from_iter<T: IntoIterator<Item = Decimal>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn missing_levels_are_zero() {
        let rates = CommissionRates::new(vec![dec!(0.05), dec!(0.02)]);
        assert_eq!(rates.rate(0), Decimal::ZERO);
        assert_eq!(rates.rate(1), dec!(0.05));
        assert_eq!(rates.rate(2), dec!(0.02));
        assert_eq!(rates.rate(3), Decimal::ZERO);
        assert_eq!(rates.rate(usize::MAX), Decimal::ZERO);
    }

    #[test]
    fn reject_out_of_range() {
        let err = CommissionRates::try_new(vec![dec!(0.1), dec!(1.5)]).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidRate { level: 2, .. }));

        let err = CommissionRates::try_new(vec![dec!(-0.01)]).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidRate { level: 1, .. }));

        assert!(CommissionRates::try_new(vec![Decimal::ONE, Decimal::ZERO]).is_ok());
    }

    #[test]
    fn monotonic() {
        assert!(CommissionRates::uniform(dec!(0.02), 10).is_non_increasing());
        assert!(CommissionRates::from_iter([dec!(0.1), dec!(0.05)]).is_non_increasing());
        assert!(!CommissionRates::from_iter([dec!(0.01), dec!(0.05)]).is_non_increasing());
    }
}
