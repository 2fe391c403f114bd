//! Gmail bindings for Rust
//! Refreshes an OAuth access token and sends multipart mail through the Gmail REST API

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
pub const SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost";

// Parts are base64 encoded, so '-' never occurs inside them.
const BOUNDARY: &str = "----=_digest_part_boundary";
const LINE_WIDTH: usize = 76;

#[derive(Error, Debug)]
pub enum GmailError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Authentication rejected: {0}")]
    Auth(String),
    #[error("Send rejected: {0}")]
    Send(String),
    #[error("Invalid header value")]
    InvalidHeader,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// OAuth client credentials plus a long-lived refresh token
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Token endpoint response, for both refresh and code exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshPayload<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ExchangePayload<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Serialize)]
struct SendPayload {
    raw: String,
}

/// Response of `users.messages.send`
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: Option<String>,
}

/// A mail with a plain text and an HTML alternative
#[derive(Debug, Clone)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl Message {
    /// Render as an RFC 2822 multipart/alternative message
    pub fn to_mime(&self) -> String {
        let mut out = String::new();
        out.push_str("MIME-Version: 1.0\r\n");
        out.push_str(&format!("To: {}\r\n", self.to));
        out.push_str(&format!("From: {}\r\n", self.from));
        out.push_str(&format!("Subject: {}\r\n", encode_header(&self.subject)));
        out.push_str(&format!(
            "Content-Type: multipart/alternative; boundary=\"{}\"\r\n\r\n",
            BOUNDARY
        ));

        for (subtype, content) in [("plain", &self.text), ("html", &self.html)] {
            out.push_str(&format!("--{}\r\n", BOUNDARY));
            out.push_str(&format!("Content-Type: text/{}; charset=\"utf-8\"\r\n", subtype));
            out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
            out.push_str(&wrap_base64(content));
            out.push_str("\r\n");
        }

        out.push_str(&format!("--{}--\r\n", BOUNDARY));
        out
    }

    /// The `raw` field expected by the Gmail API
    pub fn encode_raw(&self) -> String {
        URL_SAFE.encode(self.to_mime())
    }
}

/// RFC 2047 encoded-word for non-ASCII header values
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}

fn wrap_base64(content: &str) -> String {
    let encoded = STANDARD.encode(content);
    encoded
        .as_bytes()
        .chunks(LINE_WIDTH)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\r\n")
}

fn error_text(response: Response) -> String {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    format!("{} {}", status, body.trim())
}

/// Exchange a refresh token for a fresh access token
pub fn refresh_access_token(
    client: &Client,
    credentials: &Credentials,
) -> Result<TokenGrant, GmailError> {
    let payload = RefreshPayload {
        client_id: &credentials.client_id,
        client_secret: &credentials.client_secret,
        refresh_token: &credentials.refresh_token,
        grant_type: "refresh_token",
    };

    let response = client.post(TOKEN_URI).form(&payload).send()?;
    if !response.status().is_success() {
        return Err(GmailError::Auth(error_text(response)));
    }

    Ok(response.json()?)
}

/// Consent page URL for an installed-app authorization code flow
pub fn authorization_url(client_id: &str, redirect_uri: &str) -> Result<String, GmailError> {
    let url = Url::parse_with_params(
        AUTH_URI,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", SEND_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| GmailError::InvalidUrl(e.to_string()))?;

    Ok(url.to_string())
}

/// Accept either a bare authorization code or the full redirect URL holding it
pub fn code_from_redirect(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    match Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned()),
        Err(_) => Some(input.to_string()),
    }
}

/// Trade an authorization code for access and refresh tokens
pub fn exchange_code(
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenGrant, GmailError> {
    let payload = ExchangePayload {
        client_id,
        client_secret,
        code,
        redirect_uri,
        grant_type: "authorization_code",
    };

    let response = Client::new().post(TOKEN_URI).form(&payload).send()?;
    if !response.status().is_success() {
        return Err(GmailError::Auth(error_text(response)));
    }

    Ok(response.json()?)
}

pub struct GmailClient {
    url: String,
    client: Client,
}

impl GmailClient {
    /// Refresh an access token and build a client authorized with it
    pub fn connect(credentials: &Credentials) -> Result<Self, GmailError> {
        let grant = refresh_access_token(&Client::new(), credentials)?;
        Self::with_token(API_BASE, &grant.access_token)
    }

    pub fn with_token(url: &str, access_token: &str) -> Result<Self, GmailError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token))
                .map_err(|_| GmailError::InvalidHeader)?,
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Send a message as the authenticated user
    pub fn send(&self, message: &Message) -> Result<SentMessage, GmailError> {
        let payload = SendPayload {
            raw: message.encode_raw(),
        };

        let response = self
            .client
            .post(format!("{}/users/me/messages/send", self.url))
            .json(&payload)
            .send()?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(GmailError::Auth(error_text(response)));
        }
        if !status.is_success() {
            return Err(GmailError::Send(error_text(response)));
        }

        Ok(response.json()?)
    }
}
