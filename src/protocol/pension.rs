//! Pension 720 purchase and winning check
//!
//! Every pension exchange is wrapped in an [`Envelope`]: the plaintext form
//! payload is encrypted and posted as `q`, and the JSON answer carries the
//! encrypted reply under the same key. The passphrase comes from the session
//! id and stays fixed for one purchase attempt; salt and IV are fresh for
//! each request.

use super::envelope::Envelope;
use super::portal::{
    AccountClient, COL_DRAW_DATE, COL_PRIZE, COL_PURCHASE_DATE, COL_RESULT, COL_ROUND,
    COL_TICKET, HISTORY_COLUMNS, HistoryCell, build_headers, cell_text, fetch_round,
    with_session,
};
use super::{form_body, parse_json};
use crate::{
    Error, Result,
    config::PortalSettings,
    session::SessionContext,
    transport::{HttpTransport, Transport},
    types::{
        LineDetail, ProductKind, PurchaseIntent, PurchaseMode, PurchaseResult, PurchasedNumbers,
        Round, WinningCheckResult, serde_helpers::scalar_to_string,
    },
    utils::SearchWindow,
};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::Arc;

pub const GAME_PAGE_PATH: &str = "/game/pension720/game.jsp";
pub const AUTO_NO_PATH: &str = "/game/pension720/process/makeAutoNo.jsp";
pub const ORDER_NO_PATH: &str = "/game/pension720/process/makeOrderNo.jsp";
pub const CONFIRM_PATH: &str = "/game/pension720/process/connPro.jsp";

const ROUND_ANCHOR: &str = "drwNo720";
const LOTTO_ID: &str = "LP72";
const WIN_GRADE: u8 = 1;
/// `resultCode` of an accepted purchase
const SUCCESS_CODE: &str = "100";
/// Field of the `|`-separated `resultMsg` holding the purchased round
const RESULT_ROUND_FIELD: usize = 3;
const PRICE_PER_TICKET: u32 = 1000;

/// Number string drawn by `makeAutoNo.jsp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSelection {
    round: Round,
    number: String,
}

impl AutoSelection {
    pub fn round(&self) -> Round {
        self.round
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    /// The five ticket lines, group digit `1..=5` followed by the number
    pub fn ticket_lines(&self) -> Vec<String> {
        (1..=PurchaseIntent::PENSION_COUNT)
            .map(|group| format!("{}{}", group, self.number))
            .collect()
    }
}

/// Order issued by `makeOrderNo.jsp` for an auto selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    selection: AutoSelection,
    order_no: String,
    order_date: String,
}

impl Order {
    pub fn round(&self) -> Round {
        self.selection.round
    }

    pub fn selection(&self) -> &AutoSelection {
        &self.selection
    }

    pub fn order_no(&self) -> &str {
        &self.order_no
    }

    pub fn order_date(&self) -> &str {
        &self.order_date
    }
}

/// Convenience type alias for the client over the reqwest transport
pub type HttpPensionClient = PensionClient<HttpTransport>;

/// Protocol client for the pension product
#[derive(Debug)]
pub struct PensionClient<T: Transport = HttpTransport> {
    transport: Arc<T>,
    account: AccountClient<T>,
}

impl<T: Transport> PensionClient<T> {
    pub fn new(transport: Arc<T>, portal: Arc<PortalSettings>) -> Self {
        let account = AccountClient::new(Arc::clone(&transport), portal);
        Self { transport, account }
    }

    fn portal(&self) -> &PortalSettings {
        self.account.portal()
    }

    /// Buy the five-ticket auto set for the next round.
    ///
    /// Never fails: errors of any step are folded into a failed
    /// [`PurchaseResult`].
    pub async fn purchase(
        &self,
        session: &SessionContext,
        intent: &PurchaseIntent,
        username: &str,
    ) -> PurchaseResult {
        match self.try_purchase(session, intent, username).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Pension purchase failed: {}", e);
                PurchaseResult::failure(ProductKind::Pension, &e)
            }
        }
    }

    async fn try_purchase(
        &self,
        session: &SessionContext,
        intent: &PurchaseIntent,
        username: &str,
    ) -> Result<PurchaseResult> {
        check_intent(intent)?;
        if username.trim().is_empty() {
            return Err(Error::invalid_intent("username must not be empty"));
        }

        let envelope = Envelope::for_session(session);
        let round = self.fetch_round().await?;
        let result = match self.purchase_round(session, &envelope, round, username).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Pension purchase for round {} failed: {}", round, e);
                PurchaseResult::failure(ProductKind::Pension, &e)
            }
        };

        tracing::info!(
            "Pension purchase for round {}: success={}",
            result.round_id,
            result.success
        );

        let balance = self.account.balance_after_purchase(session).await;
        Ok(result.with_round(round.to_string()).with_balance(balance))
    }

    /// Auto numbers, order and confirmation for a known round
    async fn purchase_round(
        &self,
        session: &SessionContext,
        envelope: &Envelope,
        round: Round,
        username: &str,
    ) -> Result<PurchaseResult> {
        let selection = self.request_auto_numbers(session, envelope, round).await?;
        let order = self.request_order(session, envelope, selection).await?;
        self.confirm(session, envelope, order, username).await
    }

    /// Next round from the landing page
    pub async fn fetch_round(&self) -> Result<Round> {
        fetch_round(self.transport.as_ref(), self.portal(), ROUND_ANCHOR).await
    }

    /// Ask the portal to draw an auto number for `round`
    pub async fn request_auto_numbers(
        &self,
        session: &SessionContext,
        envelope: &Envelope,
        round: Round,
    ) -> Result<AutoSelection> {
        let plaintext = format!(
            "ROUND={}&SEL_NO=&BUY_CNT=&AUTO_SEL_SET=SA&SEL_CLASS=&BUY_TYPE=A&ACCS_TYPE=01",
            round
        );
        let (reply, raw) = self
            .exchange(session, envelope, AUTO_NO_PATH, &plaintext)
            .await?;

        let number = field(&reply, "selLotNo").ok_or(Error::AutoNumberUnavailable { raw })?;
        tracing::debug!("Auto number for round {}: {}", round, number);
        Ok(AutoSelection { round, number })
    }

    /// Reserve an order for the five tickets of `selection`
    pub async fn request_order(
        &self,
        session: &SessionContext,
        envelope: &Envelope,
        selection: AutoSelection,
    ) -> Result<Order> {
        let plaintext = format!(
            "ROUND={}&AUTO_SEL_SET=SA&SEL_CLASS=&SEL_NO={}&BUY_TYPE=M&BUY_CNT={}",
            selection.round,
            selection.number,
            PurchaseIntent::PENSION_COUNT
        );
        let (reply, raw) = self
            .exchange(session, envelope, ORDER_NO_PATH, &plaintext)
            .await?;

        match (field(&reply, "orderNo"), field(&reply, "orderDate")) {
            (Some(order_no), Some(order_date)) => {
                tracing::debug!("Order {} issued on {}", order_no, order_date);
                Ok(Order {
                    selection,
                    order_no,
                    order_date,
                })
            }
            _ => Err(Error::OrderUnavailable { raw }),
        }
    }

    /// Confirm the order and classify the portal's answer
    pub async fn confirm(
        &self,
        session: &SessionContext,
        envelope: &Envelope,
        order: Order,
        username: &str,
    ) -> Result<PurchaseResult> {
        let plaintext = confirm_payload(&order, username);
        let (reply, _) = self
            .exchange(session, envelope, CONFIRM_PATH, &plaintext)
            .await?;
        Ok(classify(order.round(), &reply))
    }

    /// Winning status of the newest purchase in the last seven days
    pub async fn check_winning(&self, session: &SessionContext) -> WinningCheckResult {
        self.check_winning_in(session, &SearchWindow::current()).await
    }

    /// Winning status of the newest purchase inside `window`
    pub async fn check_winning_in(
        &self,
        session: &SessionContext,
        window: &SearchWindow,
    ) -> WinningCheckResult {
        match self.try_check_winning(session, window).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Pension winning check failed: {}", e);
                WinningCheckResult::failure(ProductKind::Pension, &e)
            }
        }
    }

    async fn try_check_winning(
        &self,
        session: &SessionContext,
        window: &SearchWindow,
    ) -> Result<WinningCheckResult> {
        let cells = self
            .account
            .history(session, LOTTO_ID, WIN_GRADE, window)
            .await?;
        if cells.len() <= 1 {
            tracing::info!("No pension purchases between {:?} and {:?}", window.start, window.end);
            return Ok(WinningCheckResult::no_data(ProductKind::Pension));
        }

        Ok(WinningCheckResult {
            has_data: true,
            product: ProductKind::Pension,
            round_id: cell_text(&cells, COL_ROUND)?,
            prize_amount: aggregate_prizes(&cells),
            purchase_date: cell_text(&cells, COL_PURCHASE_DATE)?,
            winning_date: cell_text(&cells, COL_DRAW_DATE)?,
            per_line_details: ticket_details(&cells),
            error_kind: None,
            message: None,
        })
    }

    /// Post one enveloped payload and decode the enveloped reply.
    ///
    /// Returns the decoded JSON and the decrypted text for diagnostics.
    async fn exchange(
        &self,
        session: &SessionContext,
        envelope: &Envelope,
        path: &str,
        plaintext: &str,
    ) -> Result<(Value, String)> {
        let portal = self.portal();
        let url = format!("{}{}", portal.pension_url, path);
        let headers = with_session(self.headers()?, session)?;

        let sealed = envelope.encode(plaintext);
        let quoted = urlencoding::encode(&sealed);
        let body = form_body(&[("q", quoted.as_ref())]);

        tracing::debug!("Pension exchange {}", path);
        let response = self.transport.post(&url, &headers, Some(body)).await?;

        let outer = parse_json(path, &response.body)?;
        let sealed_reply = outer
            .get("q")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::malformed(path, response.body.as_str()))?;

        let decoded = envelope.decode(sealed_reply)?;
        let reply = parse_json(path, &decoded)?;
        Ok((reply, decoded))
    }

    fn headers(&self) -> Result<HeaderMap> {
        let portal = self.portal();
        build_headers(
            &portal.pension_url,
            &format!("{}{}", portal.pension_url, GAME_PAGE_PATH),
            &[("x-requested-with", "XMLHttpRequest")],
        )
    }
}

fn check_intent(intent: &PurchaseIntent) -> Result<()> {
    if intent.product != ProductKind::Pension {
        return Err(Error::invalid_intent("intent is not for the pension product"));
    }
    if intent.mode != PurchaseMode::Auto {
        return Err(Error::invalid_intent("pension purchases are auto only"));
    }
    intent.validate()
}

fn field(reply: &Value, name: &str) -> Option<String> {
    reply
        .get(name)
        .and_then(scalar_to_string)
        .filter(|value| !value.trim().is_empty())
}

/// Plaintext of the `connPro.jsp` confirmation
fn confirm_payload(order: &Order, username: &str) -> String {
    let count = usize::from(PurchaseIntent::PENSION_COUNT);
    let lines = order.selection.ticket_lines().join(",");
    let set_types = vec!["SA"; count].join(",");
    // The portal's own form sends a trailing separator here
    let buy_types = format!("{},", vec!["A"; count].join(","));
    let round = order.round();

    format!(
        "ROUND={round}&FLAG=&BUY_KIND=01&BUY_NO={lines}&BUY_CNT={count}\
         &BUY_SET_TYPE={set_types}&BUY_TYPE={buy_types}&CS_TYPE=01\
         &orderNo={order_no}&orderDate={order_date}&TRANSACTION_ID=&WIN_DATE=\
         &USER_ID={user}&PAY_TYPE=&resultErrorCode=&resultErrorMsg=&resultOrderNo=\
         &WORKING_FLAG=true&NUM_CHANGE_TYPE=&auto_process=N&set_type=SA&classnum=&selnum=\
         &buytype=M&num1=&num2=&num3=&num4=&num5=&num6=&DSEC=34&CLOSE_DATE=&verifyYN=N\
         &curdeposit=&curpay={pay}&DROUND={round}&DSEC=0&CLOSE_DATE=&verifyYN=N\
         &lotto720_radio_group=on",
        lines = urlencoding::encode(&lines),
        set_types = urlencoding::encode(&set_types),
        buy_types = urlencoding::encode(&buy_types),
        order_no = urlencoding::encode(&order.order_no),
        order_date = urlencoding::encode(&order.order_date),
        user = urlencoding::encode(username),
        pay = PRICE_PER_TICKET * u32::from(PurchaseIntent::PENSION_COUNT),
    )
}

/// Map the decoded `connPro.jsp` reply to the reporting contract
fn classify(round: Round, reply: &Value) -> PurchaseResult {
    let code = field(reply, "resultCode");
    let result_msg = field(reply, "resultMsg").unwrap_or_default();
    let login_confirmed = field(reply, "loginYn").map(|flag| flag == "Y");
    let success = code.as_deref() == Some(SUCCESS_CODE) && login_confirmed != Some(false);

    let round_id = result_msg
        .split('|')
        .nth(RESULT_ROUND_FIELD)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| round.to_string());

    let purchased_numbers = match field(reply, "saleTicket") {
        Some(ticket) if success => PurchasedNumbers::Pension(ticket),
        _ => PurchasedNumbers::None,
    };

    let message = if success {
        None
    } else if login_confirmed == Some(false) {
        Some("session is not logged in".to_string())
    } else {
        Some(format!(
            "purchase rejected (resultCode {})",
            code.as_deref().unwrap_or("missing")
        ))
    };

    PurchaseResult {
        success,
        product: ProductKind::Pension,
        round_id,
        purchased_numbers,
        remaining_balance: String::new(),
        raw_server_message: result_msg,
        login_confirmed,
        error_kind: None,
        message,
    }
}

/// Prize cells of every ticket row, joined with `,`
pub fn aggregate_prizes(cells: &[HistoryCell]) -> String {
    cells
        .iter()
        .skip(COL_PRIZE)
        .step_by(HISTORY_COLUMNS)
        .map(|cell| cell.text.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// One detail per complete history row: ticket number and draw result
fn ticket_details(cells: &[HistoryCell]) -> Vec<LineDetail> {
    cells
        .chunks_exact(HISTORY_COLUMNS)
        .map(|row| LineDetail {
            label: row[COL_TICKET].text.clone(),
            status: row[COL_RESULT].text.clone(),
            drawn_numbers: Vec::new(),
        })
        .collect()
}
