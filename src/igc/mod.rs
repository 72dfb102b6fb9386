//! Track parsing: fetches an IGC file from a URL or local path and turns it into a [`Track`].

pub mod parser;

use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::track::Track;

pub use parser::parse_igc;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to fetch track: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("track host returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to read track file: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing {0} record")]
    MissingRecord(&'static str),
    #[error("line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },
}

/// Resolves a location into a parsed track. The HTTP layer only sees this trait,
/// so tests can register tracks without touching the network.
pub trait TrackParser: Send + Sync {
    fn parse<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Track, ParseError>>;
}

/// Reads IGC files over http(s), or from disk for anything that is not a URL.
#[derive(Debug, Clone)]
pub struct IgcLocationParser {
    client: reqwest::Client,
}

impl IgcLocationParser {
    pub fn new(timeout: Duration) -> Result<Self, ParseError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(IgcLocationParser { client })
    }

    async fn fetch(&self, location: &str) -> Result<String, ParseError> {
        if is_remote(location) {
            let response = self.client.get(location).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ParseError::Status(status));
            }
            let bytes = response.bytes().await?;
            Ok(decode_igc_bytes(bytes.to_vec()))
        } else {
            let bytes = tokio::fs::read(location).await?;
            Ok(decode_igc_bytes(bytes))
        }
    }
}

impl TrackParser for IgcLocationParser {
    fn parse<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Track, ParseError>> {
        Box::pin(async move {
            let text = self.fetch(location).await?;
            parse_igc(&text)
        })
    }
}

/// UTF-8 when valid, otherwise ISO-8859-1: older loggers write header text in Latin-1.
pub fn decode_igc_bytes(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
