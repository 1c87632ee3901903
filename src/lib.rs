//! Lotto Portal Client
//!
//! A protocol client for the dhlottery web portal. It buys tickets for the
//! 6/45 lotto and the pension 720 product and checks the winning status of
//! recent purchases, given a session obtained by a separate login step.
//!
//! # Architecture
//!
//! - **Transport**: one cookie-persisting HTTP handle per run, injected into
//!   every client
//! - **Protocol clients**: [`LottoClient`] and [`PensionClient`] drive the
//!   strictly sequential purchase chains; [`AccountClient`] reads the balance
//!   and purchase history
//! - **Envelope**: the PBKDF2 / AES-CBC wrapper used by every pension exchange
//! - **Results**: [`PurchaseResult`] and [`WinningCheckResult`] are plain
//!   serialisable values; failures are reported inside them, never raised
//!
//! # Usage
//!
//! ```bash
//! lotto-portal --session-id "$JSESSIONID" buy-lotto --count 5
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use lotto_portal_client::{
//!     HttpTransport, LottoClient, PurchaseIntent, SessionContext, Settings,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::default();
//! let transport = Arc::new(HttpTransport::new(&settings.network)?);
//! let client = LottoClient::new(transport, Arc::new(settings.portal));
//!
//! let session = SessionContext::new("session-id-from-login")?;
//! let result = client.purchase(&session, &PurchaseIntent::lotto_auto(5)).await;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use error::{Error, ErrorKind, Result};
pub use protocol::{AccountClient, Envelope, LottoClient, PensionClient};
pub use session::SessionContext;
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::{
    NumberSet, ProductKind, PurchaseIntent, PurchaseMode, PurchaseResult, PurchasedNumbers,
    WinningCheckResult,
};
