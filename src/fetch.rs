//! Asset references and the fetchers that resolve them to bytes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Default cap on a single fetched asset.
pub const DEFAULT_MAX_ASSET_BYTES: usize = 8 * 1024 * 1024;

/// Validated reference to an addressable vector asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetRef(reqwest::Url);

impl AssetRef {
    /// Parse and validate a reference. Anything that is not an absolute URL is an input error.
    pub fn parse(raw: &str) -> DrapeResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DrapeError::input("empty asset reference"));
        }
        let url = reqwest::Url::parse(raw)
            .map_err(|e| DrapeError::input(format!("malformed asset reference '{raw}': {e}")))?;
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn url(&self) -> &reqwest::Url {
        &self.0
    }
}

impl TryFrom<String> for AssetRef {
    type Error = DrapeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AssetRef> for String {
    fn from(r: AssetRef) -> Self {
        r.0.into()
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves asset references to raw bytes. Each call is a suspension point.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, asset: &AssetRef) -> DrapeResult<Vec<u8>>;
}

/// Fetches `http`/`https` assets with a shared client.
#[derive(Clone, Debug)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpAssetFetcher {
    /// Client with a per-request timeout and a response size cap.
    pub fn new(timeout: Duration, max_bytes: usize) -> DrapeResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("drape/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, max_bytes })
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    #[tracing::instrument(level = "debug", skip_all, fields(asset = %asset))]
    async fn fetch(&self, asset: &AssetRef) -> DrapeResult<Vec<u8>> {
        if !matches!(asset.scheme(), "http" | "https") {
            return Err(DrapeError::input(format!(
                "unsupported asset scheme '{}'",
                asset.scheme()
            )));
        }
        let resp = self
            .client
            .get(asset.url().clone())
            .send()
            .await?
            .error_for_status()?;
        if resp
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(DrapeError::network(format!(
                "asset '{asset}' exceeds {} bytes",
                self.max_bytes
            )));
        }
        let bytes = resp.bytes().await?;
        if bytes.len() > self.max_bytes {
            return Err(DrapeError::network(format!(
                "asset '{asset}' exceeds {} bytes",
                self.max_bytes
            )));
        }
        Ok(bytes.to_vec())
    }
}

/// Serves assets from a fixed in-memory table. Counts every fetch it answers.
#[derive(Debug, Default)]
pub struct StaticAssetFetcher {
    assets: HashMap<String, Vec<u8>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticAssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under the reference `raw`.
    pub fn with_asset(mut self, raw: &str, bytes: impl Into<Vec<u8>>) -> DrapeResult<Self> {
        let key = AssetRef::parse(raw)?;
        self.assets.insert(key.as_str().to_string(), bytes.into());
        Ok(self)
    }

    /// Simulate latency on every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetFetcher for StaticAssetFetcher {
    async fn fetch(&self, asset: &AssetRef) -> DrapeResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.assets
            .get(asset.as_str())
            .cloned()
            .ok_or_else(|| DrapeError::network(format!("asset '{asset}' not found")))
    }
}
