//! Common test utilities and helpers
//!
//! This module provides a scripted in-memory transport and page fixtures
//! shared by the protocol integration tests.

#![allow(dead_code)]

/// Scripted transport double
pub mod transport {
    use async_trait::async_trait;
    use lotto_portal_client::{Error, RawResponse, Result, Transport};
    use reqwest::header::HeaderMap;
    use std::{collections::VecDeque, sync::Mutex};

    /// Base URL every test client points at
    pub const BASE: &str = "https://portal.test";

    /// One request seen by the transport
    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub method: &'static str,
        pub url: String,
        pub headers: HeaderMap,
        pub body: Option<String>,
    }

    impl Recorded {
        /// Path and query of the request URL
        pub fn path(&self) -> &str {
            self.url.strip_prefix(BASE).unwrap_or(&self.url)
        }

        /// Decoded form fields of the body
        pub fn form(&self) -> Vec<(String, String)> {
            url::form_urlencoded::parse(self.body.as_deref().unwrap_or_default().as_bytes())
                .into_owned()
                .collect()
        }

        pub fn form_value(&self, name: &str) -> Option<String> {
            self.form()
                .into_iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value)
        }
    }

    /// Replies with queued responses in order and records every request.
    ///
    /// Running out of responses is a transport failure, like a dropped
    /// connection.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<RawResponse>>>,
        requests: Mutex<Vec<Recorded>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a 200 response
        pub fn respond(self, body: impl Into<String>) -> Self {
            self.push(Ok(RawResponse::new(200, body)));
            self
        }

        /// Queue a failure
        pub fn fail(self, error: Error) -> Self {
            self.push(Err(error));
            self
        }

        pub fn push(&self, response: Result<RawResponse>) {
            self.responses.lock().unwrap().push_back(response);
        }

        pub fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn next(&self, method: &'static str, url: &str, headers: &HeaderMap, body: Option<String>) -> Result<RawResponse> {
            self.requests.lock().unwrap().push(Recorded {
                method,
                url: url.to_string(),
                headers: headers.clone(),
                body,
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(connection_dropped(url)))
        }
    }

    /// I/O failure standing in for a timeout or reset connection
    pub fn connection_dropped(url: &str) -> Error {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionAborted,
            format!("no scripted response for {}", url),
        ))
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str, headers: &HeaderMap) -> Result<RawResponse> {
            self.next("GET", url, headers, None)
        }

        async fn post(
            &self,
            url: &str,
            headers: &HeaderMap,
            body: Option<String>,
        ) -> Result<RawResponse> {
            self.next("POST", url, headers, body)
        }
    }
}

/// Portal page fixtures
pub mod pages {
    /// Landing page showing the last drawn rounds of both products
    pub fn landing(lotto_round: u32, pension_round: u32) -> String {
        format!(
            r#"<html><body>
                 <div class="win_result"><h4><strong id="lottoDrwNo">{}</strong>회 당첨결과</h4></div>
                 <div class="win720"><h4><strong id="drwNo720">{}</strong>회</h4></div>
               </body></html>"#,
            lotto_round, pension_round
        )
    }

    /// Lotto game page with both hidden date inputs
    pub fn game_page(draw_date: &str, pay_limit: &str) -> String {
        format!(
            r#"<html><body><form id="frm">
                 <input type="hidden" id="ROUND_DRAW_DATE" name="ROUND_DRAW_DATE" value="{}">
                 <input type="hidden" id="WAMT_PAY_TLMT_END_DT" name="WAMT_PAY_TLMT_END_DT" value="{}">
               </form></body></html>"#,
            draw_date, pay_limit
        )
    }

    /// Account page with a deposit balance
    pub fn balance(amount: &str) -> String {
        format!(
            r#"<div class="box_money"><p class="total_new">총 예치금 <strong>{}</strong></p></div>"#,
            amount
        )
    }

    /// History table holding the given rows of eight cells
    pub fn history(rows: &[[&str; 8]]) -> String {
        let body = if rows.is_empty() {
            r#"<tr><td colspan="8" class="nodata">조회 결과가 없습니다.</td></tr>"#.to_string()
        } else {
            rows.iter()
                .map(|row| {
                    let cells = row
                        .iter()
                        .enumerate()
                        .map(|(i, text)| {
                            if i == 3 && text.starts_with("javascript:") {
                                format!(r#"<td><a href="{}">상세</a></td>"#, text)
                            } else {
                                format!("<td>{}</td>", text)
                            }
                        })
                        .collect::<String>();
                    format!("<tr>{}</tr>", cells)
                })
                .collect()
        };
        format!(
            r#"<table class="tbl_data tbl_data_col"><thead><tr><th>구입일자</th></tr></thead><tbody>{}</tbody></table>"#,
            body
        )
    }
}

/// Test helper functions
pub mod helpers {
    use super::transport::{BASE, ScriptedTransport};
    use lotto_portal_client::{SessionContext, config::PortalSettings};
    use std::sync::Arc;

    /// 40-character session id; the envelope passphrase is its first 32
    pub const SESSION_ID: &str = "K7dQx2VbN9pLmR4sT1wYz8HcJ3fGa6Ue.node01";

    pub fn session() -> SessionContext {
        SessionContext::new(SESSION_ID).unwrap()
    }

    pub fn portal() -> Arc<PortalSettings> {
        Arc::new(PortalSettings::single_host(BASE))
    }

    pub fn shared(transport: ScriptedTransport) -> Arc<ScriptedTransport> {
        Arc::new(transport)
    }
}
