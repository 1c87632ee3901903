//! Session context supplied by the login collaborator

use crate::{Error, Result};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use std::fmt;

/// Name of the portal's session cookie
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// Characters of the session id used as the envelope passphrase
const PASSPHRASE_LEN: usize = 32;

/// Authenticated credentials for one run.
///
/// Protocol clients only read from it; it is invalidated by the login step
/// or by the portal expiring the session.
#[derive(Clone)]
pub struct SessionContext {
    session_id: String,
    extra_cookies: Vec<(String, String)>,
}

impl SessionContext {
    /// Create a context from the portal's raw session identifier
    pub fn new(session_id: impl Into<String>) -> Result<Self> {
        let session_id = session_id.into().trim().to_string();
        if session_id.is_empty() {
            return Err(Error::config("session id must not be empty"));
        }
        Ok(Self {
            session_id,
            extra_cookies: Vec::new(),
        })
    }

    /// Add a further cookie issued during login
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_cookies.push((name.into(), value.into()));
        self
    }

    /// Raw server-issued session identifier
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Passphrase for the encryption envelope: the first 32 characters of
    /// the session id
    pub fn passphrase(&self) -> &str {
        match self.session_id.char_indices().nth(PASSPHRASE_LEN) {
            Some((idx, _)) => &self.session_id[..idx],
            None => &self.session_id,
        }
    }

    /// Inject the session cookies into an outgoing request's headers
    pub fn apply_to(&self, headers: &mut HeaderMap) -> Result<()> {
        let mut cookie = format!("{}={}", SESSION_COOKIE, self.session_id);
        for (name, value) in &self.extra_cookies {
            cookie.push_str(&format!("; {}={}", name, value));
        }

        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| Error::config(format!("Invalid session cookie: {}", e)))?;
        headers.insert(COOKIE, value);
        Ok(())
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("session_id", &"<redacted>")
            .field("extra_cookies", &self.extra_cookies.len())
            .finish()
    }
}
