use std::{error::Error, fmt, time::Duration};

use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://quotes-api-self.vercel.app/quote";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Message shown to the user whenever a quote could not be obtained
pub const FETCH_ERROR_MESSAGE: &str = "Could not fetch text. Please try again.";

/// Why a quote fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure
    Network(String),
    /// The service answered with a non-success status
    Status(u16),
    /// The body was not the expected JSON shape
    Malformed(String),
    /// The service returned an empty quote
    EmptyQuote,
}

impl FetchError {
    /// Human readable message for the UI. The detail is only logged.
    pub fn user_message(&self) -> &'static str {
        FETCH_ERROR_MESSAGE
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(detail) => write!(f, "network error: {detail}"),
            FetchError::Status(code) => write!(f, "quote service returned status {code}"),
            FetchError::Malformed(detail) => write!(f, "invalid data format from API: {detail}"),
            FetchError::EmptyQuote => write!(f, "quote service returned an empty quote"),
        }
    }
}

impl Error for FetchError {}

/// Provider of the text a session asks the user to type
pub trait QuoteSource: Send + Sync + 'static {
    fn fetch_random_quote(&self) -> Result<String, FetchError>;
}

#[derive(Debug, Deserialize)]
struct QuotePayload {
    quote: String,
}

/// Extract the quote text from a JSON response body
pub fn parse_quote_payload(body: &str) -> Result<String, FetchError> {
    let payload: QuotePayload =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if payload.quote.is_empty() {
        return Err(FetchError::EmptyQuote);
    }

    Ok(payload.quote)
}

/// Fetches quotes over HTTP with a single GET per call
#[derive(Debug)]
pub struct HttpQuoteSource {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpQuoteSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpQuoteSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl QuoteSource for HttpQuoteSource {
    fn fetch_random_quote(&self) -> Result<String, FetchError> {
        tracing::debug!(endpoint = %self.endpoint, "requesting quote");

        let response = match self.agent.get(&self.endpoint).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Network(transport.to_string()))
            }
        };

        let body = response
            .into_string()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        parse_quote_payload(&body)
    }
}

/// Serves the same text on every call, without touching the network
#[derive(Debug, Clone)]
pub struct FixedQuoteSource {
    text: String,
}

impl FixedQuoteSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl QuoteSource for FixedQuoteSource {
    fn fetch_random_quote(&self) -> Result<String, FetchError> {
        if self.text.is_empty() {
            return Err(FetchError::EmptyQuote);
        }
        Ok(self.text.clone())
    }
}
