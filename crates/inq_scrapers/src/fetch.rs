use async_trait::async_trait;
use inq_core::Result;

/// How a scraper obtains page HTML. The default fetcher is a plain HTTP
/// client; the `webdriver` feature adds a browser-backed one for pages that
/// only render their content from scripts.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(feature = "webdriver")]
pub mod webdriver {
    use super::PageFetcher;
    use async_trait::async_trait;
    use inq_core::{Error, Result};
    use std::time::Duration;

    /// Extra wait after navigation so script-rendered content settles.
    const SETTLE: Duration = Duration::from_secs(2);

    pub struct WebDriverFetcher {
        client: fantoccini::Client,
    }

    impl WebDriverFetcher {
        /// Connects to a running WebDriver endpoint (e.g. geckodriver on
        /// http://localhost:4444).
        pub async fn connect(webdriver_url: &str) -> Result<Self> {
            let client = fantoccini::ClientBuilder::native()
                .connect(webdriver_url)
                .await
                .map_err(|e| Error::Scraping(format!("WebDriver session failed: {}", e)))?;
            Ok(Self { client })
        }
    }

    #[async_trait]
    impl PageFetcher for WebDriverFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            let mut client = self.client.clone();
            client
                .goto(url)
                .await
                .map_err(|e| Error::Scraping(format!("Navigation failed: {}", e)))?;
            tokio::time::sleep(SETTLE).await;
            client
                .source()
                .await
                .map_err(|e| Error::Scraping(format!("Page source unavailable: {}", e)))
        }
    }
}

#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverFetcher;
