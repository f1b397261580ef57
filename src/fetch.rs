//! Content fetch collaborator for the `fetch` tool

use async_trait::async_trait;
use reqwest::Client;

use crate::config::FetchConfig;
use crate::error::{GatewayError, Result};
use crate::tools::ContentBlock;

/// Retrieves a URL and turns it into content blocks
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<ContentBlock>>;
}

/// reqwest-backed fetcher following redirects
pub struct HttpFetcher {
    client: Client,
    max_output_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| GatewayError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_output_bytes: config.max_output_bytes,
        })
    }
}

/// Cut `text` to at most `max_bytes` on a char boundary, marking the cut
pub fn truncate_output(mut text: String, max_bytes: usize) -> String {
    if text.len() > max_bytes {
        let mut cut = max_bytes;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("\n... [output truncated]");
    }
    text
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<ContentBlock>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Fetch(format!("{} timed out", url))
            } else {
                GatewayError::Fetch(format!("{}: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Fetch(format!("{} returned HTTP {}", url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Fetch(format!("Failed to read body of {}: {}", url, e)))?;

        Ok(vec![ContentBlock::text(truncate_output(body, self.max_output_bytes))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_output("hello".to_string(), 10), "hello");
    }

    #[test]
    fn test_truncate_long_text() {
        let out = truncate_output("abcdefghij".to_string(), 4);
        assert_eq!(out, "abcd\n... [output truncated]");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // 'é' is two bytes; a cut at byte 2 would split it
        let out = truncate_output("aé-rest".to_string(), 2);
        assert!(out.starts_with("a\n"));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_fetch_error() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, GatewayError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_fetch_error() {
        let config = FetchConfig {
            timeout_ms: 2_000,
            ..Default::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, GatewayError::Fetch(_)));
    }
}
