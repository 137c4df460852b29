//! Web helper: fetch a URL named in the message and summarize the page.

use reqwest::Client;
use tracing::{debug, warn};

use crate::blackboard::{Blackboard, Role};
use crate::config::WebConfig;
use crate::error::AppError;
use crate::llm::LlmClient;

/// Returned verbatim when the message names no URL. No network call is made.
pub const USAGE_HINT: &str =
    "No URL found in your request. Try 'fetch http://...' or 'scrape https://...'";

const FETCH_NOTE: &str = "(web helper fetching a URL...)";

pub struct WebHelper {
    llm: LlmClient,
    client: Client,
    max_body_chars: usize,
}

impl WebHelper {
    pub fn new(config: &WebConfig, llm: LlmClient) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("web helper: build HTTP client: {e}")))?;
        Ok(Self {
            llm,
            client,
            max_body_chars: config.max_body_chars,
        })
    }

    /// Fetch the first `http(s)://` token in the message, truncate the body,
    /// and ask the completion client to interpret it against the
    /// conversation. Transport and HTTP failures are rendered as text, not
    /// errors.
    pub async fn handle(&self, message: &str, board: &mut Blackboard) -> Result<String, AppError> {
        // Note lands in history before the fetch, regardless of outcome.
        board.push(Role::System, FETCH_NOTE);

        let Some(url) = extract_url(message) else {
            return Ok(USAGE_HINT.to_string());
        };

        debug!(%url, "web helper fetching");
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%url, error = %e, "web fetch transport error");
                return Ok(format!("Error fetching {url}: {e}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "web fetch returned non-success status");
            return Ok(format!("Failed to fetch {url}. HTTP status {status}"));
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return Ok(format!("Error fetching {url}: {e}")),
        };

        let truncated = truncate_chars(&body, self.max_body_chars);
        board.web_cache.insert(url.to_string(), truncated.clone());

        let prompt = format!(
            "{}\n\nFetched webpage:\n{truncated}\n\nUser asked: {message}",
            board.flatten_history()
        );
        Ok(self.llm.complete_soft(&prompt, None).await)
    }
}

/// First whitespace-delimited token starting with `http://` or `https://`.
fn extract_url(message: &str) -> Option<&str> {
    message
        .split_whitespace()
        .find(|w| w.starts_with("http://") || w.starts_with("https://"))
}

/// Prefix of at most `max` characters, never splitting a code point.
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;

    fn helper() -> WebHelper {
        WebHelper::new(&WebConfig::default(), LlmClient::Dummy(DummyProvider)).unwrap()
    }

    #[test]
    fn extract_url_finds_first_http_token() {
        assert_eq!(
            extract_url("fetch http://example.com please"),
            Some("http://example.com")
        );
        assert_eq!(
            extract_url("scrape https://a.test and http://b.test"),
            Some("https://a.test")
        );
        assert_eq!(extract_url("no links here"), None);
        // `httpx://` and bare `www.` do not count.
        assert_eq!(extract_url("see www.example.com or httpx://x"), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[tokio::test]
    async fn no_url_yields_usage_hint_and_note() {
        let helper = helper();
        let mut board = Blackboard::new();

        let reply = helper.handle("fetch something for me", &mut board).await.unwrap();

        assert_eq!(reply, USAGE_HINT);
        assert_eq!(board.history.len(), 1);
        assert_eq!(board.history[0].role, Role::System);
        assert!(board.web_cache.is_empty());
    }

    #[tokio::test]
    async fn transport_error_is_soft() {
        let helper = helper();
        let mut board = Blackboard::new();

        // Discard port: connection refused, no listener.
        let reply = helper
            .handle("fetch http://127.0.0.1:9", &mut board)
            .await
            .unwrap();
        assert!(reply.starts_with("Error fetching http://127.0.0.1:9"), "{reply}");
    }

    #[tokio::test]
    async fn success_truncates_and_caches_body() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let body = "x".repeat(5000);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let helper = helper();
        let mut board = Blackboard::new();
        let url = server.uri();

        let reply = helper.handle(&format!("fetch {url}"), &mut board).await.unwrap();

        let cached = board.web_cache.get(&url).expect("body cached under url");
        assert_eq!(cached.len(), 3000);
        assert!(reply.contains("Fetched webpage:"));
        assert!(reply.contains(&format!("User asked: fetch {url}")));
    }

    #[tokio::test]
    async fn non_success_status_is_soft() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let helper = helper();
        let mut board = Blackboard::new();

        let reply = helper
            .handle(&format!("fetch {}", server.uri()), &mut board)
            .await
            .unwrap();
        assert!(reply.contains("HTTP status 404"), "{reply}");
        assert!(board.web_cache.is_empty());
    }
}
