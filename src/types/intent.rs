//! Purchase intent definitions
//!
//! A [`PurchaseIntent`] describes what a caller wants to buy. Manual number
//! sets are validated when they are built, so an invalid set can never reach
//! a protocol submission.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lottery product sold by the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductKind {
    /// 6/45 draw product
    Lotto,
    /// Pension-style 720 product
    Pension,
}

/// How ticket numbers are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurchaseMode {
    /// The portal generates the numbers
    Auto,
    /// The caller supplies one number set per ticket
    Manual,
}

/// Six distinct numbers in `1..=45`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct NumberSet([u8; NumberSet::LEN]);

impl NumberSet {
    /// Numbers per set
    pub const LEN: usize = 6;
    /// Smallest allowed number
    pub const MIN: u8 = 1;
    /// Largest allowed number
    pub const MAX: u8 = 45;

    /// Validate and wrap six numbers, keeping the caller's order
    pub fn new(numbers: [u8; Self::LEN]) -> Result<Self> {
        if let Some(n) = numbers
            .iter()
            .find(|n| !(Self::MIN..=Self::MAX).contains(*n))
        {
            return Err(Error::invalid_intent(format!(
                "number {} outside {}..={}",
                n,
                Self::MIN,
                Self::MAX
            )));
        }

        let distinct: HashSet<u8> = numbers.iter().copied().collect();
        if distinct.len() != Self::LEN {
            return Err(Error::invalid_intent(format!(
                "number set {:?} contains duplicates",
                numbers
            )));
        }

        Ok(Self(numbers))
    }

    /// The numbers in the order they were supplied
    pub fn numbers(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl TryFrom<Vec<u8>> for NumberSet {
    type Error = Error;

    fn try_from(numbers: Vec<u8>) -> Result<Self> {
        let len = numbers.len();
        let numbers: [u8; Self::LEN] = numbers.try_into().map_err(|_| {
            Error::invalid_intent(format!(
                "number set must have {} numbers, got {}",
                Self::LEN,
                len
            ))
        })?;
        Self::new(numbers)
    }
}

impl From<NumberSet> for Vec<u8> {
    fn from(set: NumberSet) -> Self {
        set.0.to_vec()
    }
}

/// What a caller asks a protocol client to buy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseIntent {
    pub product: ProductKind,
    pub mode: PurchaseMode,
    /// Number of tickets, `1..=5`
    pub count: u8,
    /// Exactly `count` sets, required only in manual mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_sets: Option<Vec<NumberSet>>,
}

impl PurchaseIntent {
    /// Largest number of tickets in one submission
    pub const MAX_COUNT: u8 = 5;

    /// Tickets ordered by one pension purchase
    pub const PENSION_COUNT: u8 = 5;

    /// Auto-generated lotto tickets
    pub fn lotto_auto(count: u8) -> Self {
        Self {
            product: ProductKind::Lotto,
            mode: PurchaseMode::Auto,
            count,
            manual_sets: None,
        }
    }

    /// Manual lotto tickets, one per supplied set
    pub fn lotto_manual(sets: Vec<NumberSet>) -> Self {
        Self {
            product: ProductKind::Lotto,
            mode: PurchaseMode::Manual,
            count: u8::try_from(sets.len()).unwrap_or(u8::MAX),
            manual_sets: Some(sets),
        }
    }

    /// The fixed pension purchase
    pub fn pension() -> Self {
        Self {
            product: ProductKind::Pension,
            mode: PurchaseMode::Auto,
            count: Self::PENSION_COUNT,
            manual_sets: None,
        }
    }

    /// Check the intent before anything is sent to the portal
    pub fn validate(&self) -> Result<()> {
        if !(1..=Self::MAX_COUNT).contains(&self.count) {
            return Err(Error::invalid_intent(format!(
                "count {} outside 1..={}",
                self.count,
                Self::MAX_COUNT
            )));
        }

        match (self.product, self.mode) {
            (ProductKind::Lotto, PurchaseMode::Manual) => {
                let actual = self.manual_sets.as_ref().map_or(0, Vec::len);
                if actual != usize::from(self.count) {
                    return Err(Error::InvalidManualSetCount {
                        expected: usize::from(self.count),
                        actual,
                    });
                }
            }
            (ProductKind::Lotto, PurchaseMode::Auto) => {}
            (ProductKind::Pension, PurchaseMode::Manual) => {
                return Err(Error::invalid_intent(
                    "pension purchases only support auto mode",
                ));
            }
            (ProductKind::Pension, PurchaseMode::Auto) => {
                if self.count != Self::PENSION_COUNT {
                    return Err(Error::invalid_intent(format!(
                        "pension purchases always order {} tickets",
                        Self::PENSION_COUNT
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use rstest::rstest;

    fn set(numbers: [u8; 6]) -> NumberSet {
        NumberSet::new(numbers).unwrap()
    }

    #[rstest]
    #[case([0, 2, 3, 4, 5, 6])]
    #[case([1, 2, 3, 4, 5, 46])]
    #[case([1, 1, 3, 4, 5, 6])]
    fn test_number_set_rejects_invalid(#[case] numbers: [u8; 6]) {
        let err = NumberSet::new(numbers).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIntent);
    }

    #[test]
    fn test_number_set_keeps_order() {
        let numbers = set([45, 1, 30, 7, 12, 3]);
        assert_eq!(numbers.numbers(), &[45, 1, 30, 7, 12, 3]);
    }

    #[test]
    fn test_number_set_deserialization() {
        let sets: Vec<NumberSet> =
            serde_json::from_str("[[1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12]]").unwrap();
        assert_eq!(sets.len(), 2);

        assert!(serde_json::from_str::<NumberSet>("[1, 2, 3]").is_err());
        assert!(serde_json::from_str::<NumberSet>("[1, 2, 3, 4, 5, 99]").is_err());
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    fn test_count_out_of_range(#[case] count: u8) {
        let err = PurchaseIntent::lotto_auto(count).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIntent);
    }

    #[test]
    fn test_manual_set_count_mismatch() {
        let intent = PurchaseIntent {
            product: ProductKind::Lotto,
            mode: PurchaseMode::Manual,
            count: 3,
            manual_sets: Some(vec![set([1, 2, 3, 4, 5, 6]), set([7, 8, 9, 10, 11, 12])]),
        };
        let err = intent.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidManualSetCount {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_manual_without_sets() {
        let intent = PurchaseIntent {
            manual_sets: None,
            ..PurchaseIntent::lotto_manual(vec![set([1, 2, 3, 4, 5, 6])])
        };
        assert_eq!(
            intent.validate().unwrap_err().kind(),
            ErrorKind::InvalidManualSetCount
        );
    }

    #[test]
    fn test_pension_intent() {
        assert!(PurchaseIntent::pension().validate().is_ok());

        let mut intent = PurchaseIntent::pension();
        intent.count = 2;
        assert!(intent.validate().is_err());

        intent.count = 5;
        intent.mode = PurchaseMode::Manual;
        assert!(intent.validate().is_err());
    }
}
