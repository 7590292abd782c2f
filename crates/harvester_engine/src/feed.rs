use std::time::Duration;

use futures_util::StreamExt;
use harvest_logging::{harvest_debug, harvest_warn};
use harvester_core::{Metric, RawItem};
use serde::{Deserialize, Deserializer};

use crate::source::{ContentSource, SourceError};
use crate::FeedFailure;

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    /// Query parameter carrying the zero-based page number.
    pub page_param: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
            page_param: "page".to_string(),
        }
    }
}

/// One item of a JSON feed page. Counters may be display strings (`"12.3K"`) or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FeedItem {
    #[serde(default, deserialize_with = "scalar_text")]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub likes: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub reposts: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub replies: Option<String>,
    #[serde(default, alias = "permalink")]
    pub url: Option<String>,
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }))
}

impl RawItem for FeedItem {
    fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn engagement(&self, metric: Metric) -> Option<&str> {
        match metric {
            Metric::Likes => self.likes.as_deref(),
            Metric::Reposts => self.reposts.as_deref(),
            Metric::Replies => self.replies.as_deref(),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn permalink(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Paginated JSON feed exposed as an ever-growing visible batch.
///
/// Every page fetched since the last refresh stays visible; `advance` fetches
/// the next page. Any fetch failure marks the source unhealthy until a later
/// fetch succeeds.
pub struct HttpFeedSource {
    base: reqwest::Url,
    settings: FeedSettings,
    client: reqwest::Client,
    visible: Vec<FeedItem>,
    next_page: u64,
    loaded: bool,
    last_failure: Option<FeedFailure>,
}

impl HttpFeedSource {
    pub fn new(url: &str, settings: FeedSettings) -> Result<Self, SourceError> {
        let base =
            reqwest::Url::parse(url).map_err(|err| SourceError::InvalidUrl(err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SourceError::Client(err.to_string()))?;
        Ok(Self {
            base,
            settings,
            client,
            visible: Vec::new(),
            next_page: 0,
            loaded: false,
            last_failure: None,
        })
    }

    pub fn last_failure(&self) -> Option<&FeedFailure> {
        self.last_failure.as_ref()
    }

    async fn load_next_page(&mut self) {
        let page = self.next_page;
        match self.fetch_page(page).await {
            Ok(items) => {
                harvest_debug!("Feed page {} returned {} items", page, items.len());
                self.visible.extend(items);
                self.next_page += 1;
                self.last_failure = None;
            }
            Err(failure) => {
                harvest_warn!("Feed page {} failed: {}", page, failure);
                self.last_failure = Some(failure);
            }
        }
        self.loaded = true;
    }

    async fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.load_next_page().await;
        }
    }

    async fn fetch_page(&self, page: u64) -> Result<Vec<FeedItem>, FeedFailure> {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair(&self.settings.page_param, &page.to_string());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedFailure::HttpStatus(status.as_u16()));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FeedFailure::TooLarge {
                    max_bytes: self.settings.max_bytes,
                    actual: Some(content_len),
                });
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FeedFailure::TooLarge {
                    max_bytes: self.settings.max_bytes,
                    actual: Some(next_len),
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes).map_err(|err| FeedFailure::InvalidBody(err.to_string()))
    }
}

#[async_trait::async_trait]
impl ContentSource for HttpFeedSource {
    type Item = FeedItem;

    async fn current_batch(&mut self) -> Result<Vec<FeedItem>, SourceError> {
        self.ensure_loaded().await;
        Ok(self.visible.clone())
    }

    async fn advance(&mut self) -> Result<(), SourceError> {
        self.load_next_page().await;
        Ok(())
    }

    async fn healthy(&mut self) -> Result<bool, SourceError> {
        self.ensure_loaded().await;
        Ok(self.last_failure.is_none())
    }

    async fn refresh(&mut self) -> Result<(), SourceError> {
        self.visible.clear();
        self.next_page = 0;
        self.last_failure = None;
        self.load_next_page().await;
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FeedFailure {
    if err.is_timeout() {
        return FeedFailure::Timeout;
    }
    FeedFailure::Network
}
