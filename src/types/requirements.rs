//! Draw rounds and the per-attempt token bundle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential identifier of the draw a purchase is placed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Round(u32);

impl Round {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// The round following the last drawn one shown on the landing page
    pub fn after(last_drawn: u32) -> Self {
        Self(last_drawn.saturating_add(1))
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-issued tokens needed to submit one lotto purchase.
///
/// Deliberately not `Clone`: the payload builder takes the bundle by value,
/// so a bundle can back at most one submission.
#[derive(Debug, PartialEq, Eq)]
pub struct PurchaseRequirements {
    readiness_token: String,
    round: Round,
    draw_date: String,
    pay_limit_date: String,
}

impl PurchaseRequirements {
    pub fn new(
        readiness_token: impl Into<String>,
        round: Round,
        draw_date: impl Into<String>,
        pay_limit_date: impl Into<String>,
    ) -> Self {
        Self {
            readiness_token: readiness_token.into(),
            round,
            draw_date: draw_date.into(),
            pay_limit_date: pay_limit_date.into(),
        }
    }

    /// Token returned by the readiness probe
    pub fn readiness_token(&self) -> &str {
        &self.readiness_token
    }

    pub fn round(&self) -> Round {
        self.round
    }

    /// Draw date hidden field of the game page
    pub fn draw_date(&self) -> &str {
        &self.draw_date
    }

    /// Payment deadline hidden field of the game page
    pub fn pay_limit_date(&self) -> &str {
        &self.pay_limit_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_after_last_drawn() {
        let round = Round::after(1142);
        assert_eq!(round.number(), 1143);
        assert_eq!(round.to_string(), "1143");
    }

    #[test]
    fn test_round_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Round::new(7)).unwrap(), "7");
    }

    #[test]
    fn test_requirements_accessors() {
        let req = PurchaseRequirements::new("10.0.0.1", Round::new(1143), "2024/11/02", "2025/11/03");
        assert_eq!(req.readiness_token(), "10.0.0.1");
        assert_eq!(req.round(), Round::new(1143));
        assert_eq!(req.draw_date(), "2024/11/02");
        assert_eq!(req.pay_limit_date(), "2025/11/03");
    }
}
