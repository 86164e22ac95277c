use async_trait::async_trait;
use std::collections::HashMap;
use inq_core::Result;
use crate::fetch::PageFetcher;

/// Canned fetcher backing the crate's offline tests.
pub(crate) struct FixtureFetcher {
    pages: HashMap<String, String>,
}

impl FixtureFetcher {
    pub fn new(pages: Vec<(&str, &str)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| inq_core::Error::Scraping(format!("No fixture for {}", url)))
    }
}
