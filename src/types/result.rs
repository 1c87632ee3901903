//! Result objects handed to the reporting layer
//!
//! Field names (camelCase on the wire) and the `success` discriminant are a
//! stable contract for the notification collaborator.

use crate::{Error, ErrorKind, types::ProductKind};
use serde::{Deserialize, Serialize};

/// How the portal picked the numbers of one lotto line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selection {
    Manual,
    SemiAuto,
    Auto,
    Unknown,
}

impl Selection {
    fn from_code(code: char) -> Self {
        match code {
            '1' => Self::Manual,
            '2' => Self::SemiAuto,
            '3' => Self::Auto,
            _ => Self::Unknown,
        }
    }
}

/// One purchased lotto line, e.g. `A|01|02|04|27|39|443`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LottoLine {
    pub slot: String,
    pub numbers: Vec<u8>,
    pub selection: Selection,
}

impl LottoLine {
    /// Parse a line as returned in `arrGameChoiceNum`.
    ///
    /// The last field carries the final number followed by a one-digit
    /// selection code.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut fields = raw.trim().split('|');
        let slot = fields.next()?.trim().to_string();
        let mut fields: Vec<&str> = fields.map(str::trim).collect();

        let last = fields.pop()?;
        let code = last.chars().last()?;
        let last_number = &last[..last.len() - code.len_utf8()];
        fields.push(last_number);

        let numbers = fields
            .iter()
            .map(|n| n.parse::<u8>().ok())
            .collect::<Option<Vec<u8>>>()?;
        if numbers.is_empty() || slot.is_empty() {
            return None;
        }

        Some(Self {
            slot,
            numbers,
            selection: Selection::from_code(code),
        })
    }
}

/// Numbers confirmed by a purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PurchasedNumbers {
    None,
    Lotto(Vec<LottoLine>),
    /// Raw comma-separated ticket string, e.g. `1123456,2123456`
    Pension(String),
}

impl PurchasedNumbers {
    /// Pension ticket numbers split into lines
    pub fn pension_tickets(&self) -> Vec<&str> {
        match self {
            Self::Pension(raw) => raw.split(',').map(str::trim).filter(|t| !t.is_empty()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Outcome of one purchase attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResult {
    pub success: bool,
    pub product: ProductKind,
    pub round_id: String,
    pub purchased_numbers: PurchasedNumbers,
    pub remaining_balance: String,
    pub raw_server_message: String,
    /// `None` when the portal did not say whether the session is logged in
    pub login_confirmed: Option<bool>,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
}

impl PurchaseResult {
    /// Failed result for an error raised by one of the protocol steps
    pub fn failure(product: ProductKind, error: &Error) -> Self {
        Self {
            success: false,
            product,
            round_id: String::new(),
            purchased_numbers: PurchasedNumbers::None,
            remaining_balance: String::new(),
            raw_server_message: error.raw_body().unwrap_or_default().to_string(),
            login_confirmed: None,
            error_kind: Some(error.kind()),
            message: Some(error.to_string()),
        }
    }

    pub fn with_balance(mut self, balance: impl Into<String>) -> Self {
        self.remaining_balance = balance.into();
        self
    }

    /// Round the attempt was made for, when the result does not carry one yet
    pub fn with_round(mut self, round_id: impl Into<String>) -> Self {
        if self.round_id.is_empty() {
            self.round_id = round_id.into();
        }
        self
    }
}

/// A drawn-number cell of a lotto result line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnNumber {
    pub value: String,
    /// The number matched the draw
    pub matched: bool,
}

/// Per-line prize status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDetail {
    pub label: String,
    pub status: String,
    pub drawn_numbers: Vec<DrawnNumber>,
}

/// Outcome of a winning check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningCheckResult {
    pub has_data: bool,
    pub product: ProductKind,
    pub round_id: String,
    pub prize_amount: String,
    pub purchase_date: String,
    pub winning_date: String,
    pub per_line_details: Vec<LineDetail>,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
}

impl WinningCheckResult {
    /// Sentinel returned when the history window holds no purchase
    pub fn no_data(product: ProductKind) -> Self {
        Self {
            has_data: false,
            product,
            round_id: String::new(),
            prize_amount: String::new(),
            purchase_date: String::new(),
            winning_date: String::new(),
            per_line_details: Vec::new(),
            error_kind: None,
            message: Some("no winning data".to_string()),
        }
    }

    pub fn failure(product: ProductKind, error: &Error) -> Self {
        Self {
            error_kind: Some(error.kind()),
            message: Some(error.to_string()),
            ..Self::no_data(product)
        }
    }
}
