//! Type definitions for the portal protocol clients
//!
//! This module contains the purchase intent handed in by callers, the
//! short-lived server token bundle and the result objects handed to the
//! reporting layer.

pub mod intent;
pub mod requirements;
pub mod result;
pub mod serde_helpers;

pub use intent::{NumberSet, ProductKind, PurchaseIntent, PurchaseMode};
pub use requirements::{PurchaseRequirements, Round};
pub use result::{
    DrawnNumber, LineDetail, LottoLine, PurchaseResult, PurchasedNumbers, Selection,
    WinningCheckResult,
};
