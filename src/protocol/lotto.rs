//! 6/45 lotto purchase and winning check
//!
//! Purchase chain: landing page round → readiness probe and game-page hidden
//! dates → payload → `execBuy.do` → classification. The winning check reads
//! the purchase history and follows the newest row's detail link.

use super::extract::{Document, Locator, element_text, select_within};
use super::portal::{
    AccountClient, COL_DRAW_DATE, COL_PRIZE, COL_PURCHASE_DATE, COL_ROUND, COL_TICKET,
    build_headers, cell_text, fetch_round, with_session,
};
use super::{form_body, parse_json};
use crate::{
    Error, Result,
    config::PortalSettings,
    session::SessionContext,
    transport::{HttpTransport, Transport},
    types::{
        DrawnNumber, LineDetail, LottoLine, ProductKind, PurchaseIntent, PurchaseMode,
        PurchaseRequirements, PurchaseResult, PurchasedNumbers, Round, WinningCheckResult,
        serde_helpers::{
            deserialize_flexible_string, deserialize_lenient, deserialize_string_list,
            scalar_to_string,
        },
    },
    utils::SearchWindow,
};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const READY_PATH: &str = "/olotto/game/egovUserReadySocket.json";
pub const GAME_PATH: &str = "/olotto/game/game645.do";
pub const BUY_PATH: &str = "/olotto/game/execBuy.do";

const ROUND_ANCHOR: &str = "lottoDrwNo";
const DRAW_DATE_FIELD: &str = "ROUND_DRAW_DATE";
const PAY_LIMIT_FIELD: &str = "WAMT_PAY_TLMT_END_DT";
const LOTTO_ID: &str = "LO40";
const WIN_GRADE: u8 = 2;
const TICKET_PRICE: u32 = 1000;
const SLOTS: [char; PurchaseIntent::MAX_COUNT as usize] = ['A', 'B', 'C', 'D', 'E'];
const BUY_CONTEXT: &str = "execBuy";

/// Status text the portal shows for a losing line
pub const NO_PRIZE_STATUS: &str = "낙첨";
/// Rank substituted for [`NO_PRIZE_STATUS`]
pub const NO_PRIZE_RANK: &str = "0등";

/// One labelled ticket line of a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotParam {
    /// `"0"` for auto, `"1"` for manual
    #[serde(rename = "genType")]
    pub gen_type: &'static str,
    #[serde(rename = "arrGameChoiceNum")]
    pub numbers: Option<Vec<u8>>,
    #[serde(rename = "alpabet")]
    pub slot: char,
}

/// A submission built from one requirements bundle
#[derive(Debug, PartialEq, Eq)]
pub struct LottoPayload {
    round: Round,
    readiness_token: String,
    draw_date: String,
    pay_limit_date: String,
    slots: Vec<SlotParam>,
}

impl LottoPayload {
    pub fn round(&self) -> Round {
        self.round
    }

    pub fn slots(&self) -> &[SlotParam] {
        &self.slots
    }

    /// Total price in won
    pub fn amount(&self) -> u32 {
        TICKET_PRICE * self.slots.len() as u32
    }

    /// Urlencoded form body for `execBuy.do`
    pub fn to_form(&self) -> Result<String> {
        let round = self.round.to_string();
        let amount = self.amount().to_string();
        let param = serde_json::to_string(&self.slots)?;
        let count = self.slots.len().to_string();

        Ok(form_body(&[
            ("round", round.as_str()),
            ("direct", self.readiness_token.as_str()),
            ("nBuyAmount", amount.as_str()),
            ("param", param.as_str()),
            (DRAW_DATE_FIELD, self.draw_date.as_str()),
            (PAY_LIMIT_FIELD, self.pay_limit_date.as_str()),
            ("gameCnt", count.as_str()),
        ]))
    }
}

#[derive(Debug, Default, Deserialize)]
struct BuyResponse {
    #[serde(rename = "loginYn", default, deserialize_with = "deserialize_flexible_string")]
    login_yn: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    result: Option<BuyResult>,
}

#[derive(Debug, Default, Deserialize)]
struct BuyResult {
    #[serde(rename = "resultMsg", default, deserialize_with = "deserialize_flexible_string")]
    result_msg: Option<String>,
    #[serde(rename = "buyRound", default, deserialize_with = "deserialize_flexible_string")]
    buy_round: Option<String>,
    #[serde(rename = "arrGameChoiceNum", default, deserialize_with = "deserialize_string_list")]
    lines: Vec<String>,
}

/// Decoded `execBuy.do` response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReply {
    round: Round,
    login_yn: Option<String>,
    result_msg: Option<String>,
    buy_round: Option<String>,
    lines: Vec<String>,
}

impl SubmitReply {
    /// Decode the submit body for the round it was sent against.
    ///
    /// Empty or non-JSON bodies, and JSON that is not an object, are
    /// [`Error::MalformedResponse`] carrying the raw text.
    pub fn parse(round: Round, body: &str) -> Result<Self> {
        let value = parse_json(BUY_CONTEXT, body)?;
        if !value.is_object() {
            return Err(Error::malformed(BUY_CONTEXT, body));
        }
        let response: BuyResponse =
            serde_json::from_value(value).map_err(|_| Error::malformed(BUY_CONTEXT, body))?;
        let result = response.result.unwrap_or_default();

        Ok(Self {
            round,
            login_yn: response.login_yn,
            result_msg: result.result_msg,
            buy_round: result.buy_round,
            lines: result.lines,
        })
    }
}

/// Keys of a purchase-detail page, taken from the history row's link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailKeys {
    pub order_no: String,
    pub barcode: String,
    pub issue_no: String,
}

impl DetailKeys {
    /// Parse `javascript:detailPop('orderNo','barcode','issueNo');`
    pub fn from_link(href: &str) -> Result<Self> {
        let mut args = href.split('\'').skip(1).step_by(2);
        match (args.next(), args.next(), args.next()) {
            (Some(order_no), Some(barcode), Some(issue_no)) => Ok(Self {
                order_no: order_no.to_string(),
                barcode: barcode.to_string(),
                issue_no: issue_no.to_string(),
            }),
            _ => Err(Error::extraction(format!("detail link arguments in {:?}", href))),
        }
    }

    fn url(&self, account_url: &str) -> Result<url::Url> {
        let base = format!("{}{}", account_url, super::portal::LOTTO_DETAIL_PATH);
        let mut url = url::Url::parse(&base)
            .map_err(|e| Error::config(format!("Invalid detail URL {}: {}", base, e)))?;
        url.query_pairs_mut()
            .append_pair("orderNo", &self.order_no)
            .append_pair("barcode", &self.barcode)
            .append_pair("issueNo", &self.issue_no);
        Ok(url)
    }
}

/// Convenience type alias for the client over the reqwest transport
pub type HttpLottoClient = LottoClient<HttpTransport>;

/// Protocol client for the 6/45 product
#[derive(Debug)]
pub struct LottoClient<T: Transport = HttpTransport> {
    transport: Arc<T>,
    account: AccountClient<T>,
}

impl<T: Transport> LottoClient<T> {
    pub fn new(transport: Arc<T>, portal: Arc<PortalSettings>) -> Self {
        let account = AccountClient::new(Arc::clone(&transport), portal);
        Self { transport, account }
    }

    fn portal(&self) -> &PortalSettings {
        self.account.portal()
    }

    /// Buy tickets for the next round.
    ///
    /// Never fails: errors of any step are folded into a failed
    /// [`PurchaseResult`]. An invalid intent is rejected before any request.
    pub async fn purchase(&self, session: &SessionContext, intent: &PurchaseIntent) -> PurchaseResult {
        match self.try_purchase(session, intent).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Lotto purchase failed: {}", e);
                PurchaseResult::failure(ProductKind::Lotto, &e)
            }
        }
    }

    async fn try_purchase(
        &self,
        session: &SessionContext,
        intent: &PurchaseIntent,
    ) -> Result<PurchaseResult> {
        check_product(intent)?;
        intent.validate()?;

        let round = self.fetch_round().await?;
        let result = match self.purchase_round(session, intent, round).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Lotto purchase for round {} failed: {}", round, e);
                PurchaseResult::failure(ProductKind::Lotto, &e)
            }
        };

        tracing::info!(
            "Lotto purchase for round {}: success={}",
            round,
            result.success
        );

        let balance = self.account.balance_after_purchase(session).await;
        Ok(result.with_round(round.to_string()).with_balance(balance))
    }

    /// Requirements, payload and submission for a known round
    async fn purchase_round(
        &self,
        session: &SessionContext,
        intent: &PurchaseIntent,
        round: Round,
    ) -> Result<PurchaseResult> {
        let requirements = self.fetch_requirements(session, round).await?;
        let payload = Self::build_payload(intent, requirements)?;
        let reply = self.submit(session, payload).await?;
        Ok(Self::classify(reply))
    }

    /// Next round from the landing page
    pub async fn fetch_round(&self) -> Result<Round> {
        fetch_round(self.transport.as_ref(), self.portal(), ROUND_ANCHOR).await
    }

    /// Readiness token and hidden game-page dates for one attempt
    pub async fn fetch_requirements(
        &self,
        session: &SessionContext,
        round: Round,
    ) -> Result<PurchaseRequirements> {
        let portal = self.portal();
        let game_url = format!("{}{}", portal.lotto_url, GAME_PATH);

        let mut ready_headers =
            build_headers(&portal.lotto_url, &game_url, &[("x-requested-with", "XMLHttpRequest")])?;
        ready_headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=UTF-8"),
        );
        let ready_headers = with_session(ready_headers, session)?;

        let ready_url = format!("{}{}", portal.lotto_url, READY_PATH);
        let ready = self.transport.post(&ready_url, &ready_headers, None).await?;
        let readiness_token = parse_json("egovUserReadySocket", &ready.body)
            .ok()
            .and_then(|value| value.get("ready_ip").and_then(scalar_to_string))
            .ok_or_else(|| Error::requirements("ready_ip"))?;

        let game_headers = with_session(self.game_headers()?, session)?;
        let page = self.transport.get(&game_url, &game_headers).await?;
        let (draw_date, pay_limit_date) = {
            let doc = Document::parse(&page.body);
            (
                hidden_value(&doc, DRAW_DATE_FIELD)?,
                hidden_value(&doc, PAY_LIMIT_FIELD)?,
            )
        };

        tracing::debug!(
            "Requirements for round {}: draw {}, pay limit {}",
            round,
            draw_date,
            pay_limit_date
        );
        Ok(PurchaseRequirements::new(
            readiness_token,
            round,
            draw_date,
            pay_limit_date,
        ))
    }

    /// Pair the intent's slots with a requirements bundle, consuming it
    pub fn build_payload(
        intent: &PurchaseIntent,
        requirements: PurchaseRequirements,
    ) -> Result<LottoPayload> {
        check_product(intent)?;
        intent.validate()?;

        let count = usize::from(intent.count);
        let slots = match intent.mode {
            PurchaseMode::Auto => SLOTS[..count]
                .iter()
                .map(|&slot| SlotParam {
                    gen_type: "0",
                    numbers: None,
                    slot,
                })
                .collect(),
            PurchaseMode::Manual => {
                let sets = intent.manual_sets.as_deref().unwrap_or_default();
                if sets.len() != count {
                    return Err(Error::InvalidManualSetCount {
                        expected: count,
                        actual: sets.len(),
                    });
                }
                SLOTS[..count]
                    .iter()
                    .zip(sets)
                    .map(|(&slot, set)| SlotParam {
                        gen_type: "1",
                        numbers: Some(set.numbers().to_vec()),
                        slot,
                    })
                    .collect()
            }
        };

        Ok(LottoPayload {
            round: requirements.round(),
            readiness_token: requirements.readiness_token().to_string(),
            draw_date: requirements.draw_date().to_string(),
            pay_limit_date: requirements.pay_limit_date().to_string(),
            slots,
        })
    }

    /// Send the purchase form
    pub async fn submit(&self, session: &SessionContext, payload: LottoPayload) -> Result<SubmitReply> {
        let url = format!("{}{}", self.portal().lotto_url, BUY_PATH);
        let headers = with_session(self.game_headers()?, session)?;
        let body = payload.to_form()?;

        tracing::debug!(
            "Submitting {} slot(s) for round {}",
            payload.slots().len(),
            payload.round()
        );
        let response = self.transport.post(&url, &headers, Some(body)).await?;
        SubmitReply::parse(payload.round(), &response.body)
    }

    /// Map a submit reply to the reporting contract
    pub fn classify(reply: SubmitReply) -> PurchaseResult {
        let login_confirmed = reply.login_yn.as_deref().map(|flag| flag == "Y");
        let accepted = reply
            .result_msg
            .as_deref()
            .is_some_and(|msg| msg.trim().eq_ignore_ascii_case("SUCCESS"));
        let success = login_confirmed == Some(true) && accepted;

        let message = match (login_confirmed, accepted) {
            (Some(true), true) => None,
            (Some(false), _) => Some("session is not logged in".to_string()),
            (None, _) => Some("portal did not report the login state".to_string()),
            (Some(true), false) => Some(
                reply
                    .result_msg
                    .clone()
                    .unwrap_or_else(|| "purchase rejected".to_string()),
            ),
        };

        let lines = reply
            .lines
            .iter()
            .filter_map(|raw| {
                let line = LottoLine::parse(raw);
                if line.is_none() {
                    tracing::warn!("Skipping unparsable lotto line {:?}", raw);
                }
                line
            })
            .collect::<Vec<_>>();

        PurchaseResult {
            success,
            product: ProductKind::Lotto,
            round_id: reply
                .buy_round
                .unwrap_or_else(|| reply.round.to_string()),
            purchased_numbers: if lines.is_empty() {
                PurchasedNumbers::None
            } else {
                PurchasedNumbers::Lotto(lines)
            },
            remaining_balance: String::new(),
            raw_server_message: reply.result_msg.unwrap_or_default(),
            login_confirmed,
            error_kind: None,
            message,
        }
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
                tracing::warn!("Lotto winning check failed: {}", e);
                WinningCheckResult::failure(ProductKind::Lotto, &e)
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
            tracing::info!("No lotto purchases between {:?} and {:?}", window.start, window.end);
            return Ok(WinningCheckResult::no_data(ProductKind::Lotto));
        }

        let href = cells
            .get(COL_TICKET)
            .and_then(|cell| cell.link.as_deref())
            .ok_or_else(|| Error::extraction("history detail link"))?;
        let url = DetailKeys::from_link(href)?.url(&self.portal().account_url)?;

        let body = self.account.get_page(url.as_str(), session).await?;
        let lines = parse_detail_lines(&body)?;

        Ok(WinningCheckResult {
            has_data: true,
            product: ProductKind::Lotto,
            round_id: cell_text(&cells, COL_ROUND)?,
            prize_amount: cell_text(&cells, COL_PRIZE)?,
            purchase_date: cell_text(&cells, COL_PURCHASE_DATE)?,
            winning_date: cell_text(&cells, COL_DRAW_DATE)?,
            per_line_details: lines,
            error_kind: None,
            message: None,
        })
    }

    fn game_headers(&self) -> Result<reqwest::header::HeaderMap> {
        let portal = self.portal();
        build_headers(
            &portal.lotto_url,
            &format!("{}{}", portal.lotto_url, GAME_PATH),
            &[],
        )
    }
}

fn check_product(intent: &PurchaseIntent) -> Result<()> {
    if intent.product != ProductKind::Lotto {
        return Err(Error::invalid_intent("intent is not for the lotto product"));
    }
    Ok(())
}

fn hidden_value(doc: &Document, id: &str) -> Result<String> {
    doc.attr(&Locator::Id(id), "value")
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::requirements(id))
}

/// Per-line label, prize status and drawn numbers of a detail page
pub fn parse_detail_lines(body: &str) -> Result<Vec<LineDetail>> {
    let doc = Document::parse(body);
    let mut lines = Vec::new();

    for item in doc.select_all("div.selected li")? {
        let spans = select_within(&item, "strong span")?;
        let (Some(label), Some(status)) = (spans.first(), spans.get(1)) else {
            tracing::warn!("Skipping detail line without label/status");
            continue;
        };

        let drawn_numbers = select_within(&item, "div.nums > span")?
            .iter()
            .map(|number| DrawnNumber {
                value: element_text(number),
                matched: select_within(number, "span.ball_645").is_ok_and(|balls| !balls.is_empty()),
            })
            .collect();

        lines.push(LineDetail {
            label: element_text(label),
            status: normalize_status(&element_text(status)),
            drawn_numbers,
        });
    }

    Ok(lines)
}

fn normalize_status(status: &str) -> String {
    super::extract::collapse_whitespace(&status.replace(NO_PRIZE_STATUS, NO_PRIZE_RANK))
}
