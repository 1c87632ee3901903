//! Site-protocol clients
//!
//! Each product client drives a fixed chain of dependent HTTP exchanges. Every
//! step returns a distinct type that the next step consumes, so a token
//! extraction step cannot be skipped:
//!
//! - Lotto: `fetch_round` → [`Round`](crate::types::Round) →
//!   `fetch_requirements` → [`PurchaseRequirements`](crate::types::PurchaseRequirements) →
//!   `build_payload` → [`LottoPayload`] → `submit` → [`SubmitReply`] → `classify`
//! - Pension: `fetch_round` → `request_auto_numbers` → [`AutoSelection`] →
//!   `request_order` → [`Order`] → `confirm`

pub mod envelope;
pub mod extract;
pub mod lotto;
pub mod pension;
pub mod portal;

pub use envelope::Envelope;
pub use extract::{Document, Locator};
pub use lotto::{LottoClient, LottoPayload, SlotParam, SubmitReply};
pub use pension::{AutoSelection, Order, PensionClient};
pub use portal::{AccountClient, HistoryCell};

/// `application/x-www-form-urlencoded` body from ordered pairs
pub(crate) fn form_body(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().copied())
        .finish()
}

/// Parse a JSON body, mapping empty or non-JSON text to a malformed response
pub(crate) fn parse_json(context: &str, body: &str) -> crate::Result<serde_json::Value> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(crate::Error::malformed(context, body));
    }
    serde_json::from_str(trimmed).map_err(|e| {
        tracing::warn!("{} returned non-JSON body: {}", context, e);
        crate::Error::malformed(context, body)
    })
}
