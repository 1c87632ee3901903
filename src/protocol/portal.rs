//! Pages shared by both products
//!
//! Endpoint paths, request headers, the landing-page round lookup, the
//! account balance and the purchase-history table.

use super::extract::{Document, Locator, element_text, select_within};
use super::form_body;
use crate::{
    Error, Result,
    config::PortalSettings,
    session::SessionContext,
    transport::{HttpTransport, Transport},
    types::Round,
    utils::SearchWindow,
};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use std::sync::Arc;

pub const LANDING_PATH: &str = "/common.do?method=main";
pub const BALANCE_PATH: &str = "/userSsl.do?method=myPage";
pub const HISTORY_PATH: &str = "/myPage.do?method=lottoBuyList";
pub const LOTTO_DETAIL_PATH: &str = "/myPage.do?method=lotto645Detail";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const LANGUAGE: &str = "ko,en-US;q=0.9,en;q=0.8,ko-KR;q=0.7";

/// Cells of a history table row set, each with the first link it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCell {
    pub text: String,
    pub link: Option<String>,
}

/// Columns of one history row
pub(crate) const HISTORY_COLUMNS: usize = 8;
pub(crate) const COL_PURCHASE_DATE: usize = 0;
pub(crate) const COL_ROUND: usize = 2;
pub(crate) const COL_TICKET: usize = 3;
pub(crate) const COL_RESULT: usize = 5;
pub(crate) const COL_PRIZE: usize = 6;
pub(crate) const COL_DRAW_DATE: usize = 7;

/// Build a header map from static pairs plus a dynamic origin/referer
pub(crate) fn build_headers(
    origin: &str,
    referer: &str,
    extra: &[(&'static str, &'static str)],
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(LANGUAGE));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    headers.insert(ORIGIN, header_value(origin)?);
    headers.insert(REFERER, header_value(referer)?);
    for (name, value) in extra {
        headers.insert(*name, HeaderValue::from_static(*value));
    }
    Ok(headers)
}

/// Header map carrying the session cookies
pub(crate) fn with_session(mut headers: HeaderMap, session: &SessionContext) -> Result<HeaderMap> {
    session.apply_to(&mut headers)?;
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::config(format!("Invalid header value {}: {}", value, e)))
}

/// Read the next round from the landing page.
///
/// The page shows the last drawn round under `anchor_id`.
pub(crate) async fn fetch_round<T: Transport>(
    transport: &T,
    portal: &PortalSettings,
    anchor_id: &str,
) -> Result<Round> {
    let url = format!("{}{}", portal.main_url, LANDING_PATH);
    let response = transport.get(&url, &HeaderMap::new()).await?;

    let text = Document::parse(&response.body).text(&Locator::Id(anchor_id))?;
    let last_drawn: u32 = text
        .replace(',', "")
        .parse()
        .map_err(|_| Error::extraction(format!("#{} (not a round number: {:?})", anchor_id, text)))?;

    let round = Round::after(last_drawn);
    tracing::debug!("Next round for #{} is {}", anchor_id, round);
    Ok(round)
}

/// Account page client, shared by both product clients
#[derive(Debug)]
pub struct AccountClient<T: Transport = HttpTransport> {
    transport: Arc<T>,
    portal: Arc<PortalSettings>,
}

impl<T: Transport> Clone for AccountClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            portal: Arc::clone(&self.portal),
        }
    }
}

impl<T: Transport> AccountClient<T> {
    pub fn new(transport: Arc<T>, portal: Arc<PortalSettings>) -> Self {
        Self { transport, portal }
    }

    /// Deposit balance as displayed by the portal, e.g. `12,000원`
    pub async fn balance(&self, session: &SessionContext) -> Result<String> {
        let url = format!("{}{}", self.portal.account_url, BALANCE_PATH);
        let headers = with_session(self.account_headers()?, session)?;
        let response = self.transport.post(&url, &headers, None).await?;

        let balance = Document::parse(&response.body).text(&Locator::Css("p.total_new strong"))?;
        tracing::debug!("Balance: {}", balance);
        Ok(balance)
    }

    /// Balance after a purchase attempt; a failed read leaves it empty
    pub async fn balance_after_purchase(&self, session: &SessionContext) -> String {
        match self.balance(session).await {
            Ok(balance) => balance,
            Err(e) => {
                tracing::warn!("Could not read balance after purchase: {}", e);
                String::new()
            }
        }
    }

    /// Query the purchase history of one product over `window`
    pub async fn history(
        &self,
        session: &SessionContext,
        lotto_id: &str,
        win_grade: u8,
        window: &SearchWindow,
    ) -> Result<Vec<HistoryCell>> {
        let url = format!("{}{}", self.portal.account_url, HISTORY_PATH);
        let headers = with_session(self.account_headers()?, session)?;
        let start = window.start_param();
        let end = window.end_param();
        let grade = win_grade.to_string();
        let body = form_body(&[
            ("nowPage", "1"),
            ("searchStartDate", start.as_str()),
            ("searchEndDate", end.as_str()),
            ("winGrade", grade.as_str()),
            ("lottoId", lotto_id),
            ("sortOrder", "DESC"),
        ]);

        tracing::debug!("Querying {} history {}..{}", lotto_id, start, end);
        let response = self.transport.post(&url, &headers, Some(body)).await?;
        parse_history(&response.body)
    }

    /// GET a page on the account host with session cookies
    pub(crate) async fn get_page(&self, url: &str, session: &SessionContext) -> Result<String> {
        let headers = with_session(self.account_headers()?, session)?;
        Ok(self.transport.get(url, &headers).await?.body)
    }

    pub(crate) fn portal(&self) -> &PortalSettings {
        &self.portal
    }

    fn account_headers(&self) -> Result<HeaderMap> {
        let referer = format!("{}{}", self.portal.account_url, BALANCE_PATH);
        build_headers(&self.portal.account_url, &referer, &[])
    }
}

/// Cells of the first body of the history table.
///
/// A single cell is the portal's "no results" row.
pub fn parse_history(body: &str) -> Result<Vec<HistoryCell>> {
    let doc = Document::parse(body);
    let table_body = doc.find(&Locator::Css("table.tbl_data.tbl_data_col tbody"))?;

    let cells = select_within(&table_body, "td")?
        .into_iter()
        .map(|cell| {
            let link = select_within(&cell, "a")
                .ok()
                .and_then(|links| links.into_iter().next())
                .and_then(|a| a.value().attr("href").map(str::to_string));
            HistoryCell {
                text: element_text(&cell),
                link,
            }
        })
        .collect();

    Ok(cells)
}

/// Text of a history cell, failing when the row is shorter than expected
pub(crate) fn cell_text(cells: &[HistoryCell], index: usize) -> Result<String> {
    cells
        .get(index)
        .map(|cell| cell.text.clone())
        .ok_or_else(|| Error::extraction(format!("history cell {}", index)))
}
