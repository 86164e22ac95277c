use async_trait::async_trait;
use scraper::Html;
use inq_core::{Article, Error, Result};
use crate::fetch::PageFetcher;
use crate::scrapers::{utils, LinkRules, Scraper, SourceMetadata};

#[derive(Debug, Clone)]
pub struct GeicoScraper;

impl GeicoScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://www.geico.com/living/";

    const CONTENT_SELECTORS: &'static [&'static str] = &[
        "article [class*='entry-content'] p",
        "article p",
        "main p",
    ];
}

impl Default for GeicoScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scraper for GeicoScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: "GEICO",
            emoji: "🦎",
            base_url: Self::BASE_URL,
        }
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("geico.com")
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["geico"]
    }

    fn listing_selectors(&self) -> &'static [&'static str] {
        &[
            "article h2 a",
            "article a",
            "div[class*='post'] a",
        ]
    }

    fn link_rules(&self) -> LinkRules {
        LinkRules {
            include: &["/living/"],
            exclude: &["quote", "login", "share=", "#respond", "/category/", "/tag/"],
            max_articles: 10,
        }
    }

    async fn scrape_article(&self, fetcher: &dyn PageFetcher, url: &str) -> Result<Article> {
        let html = fetcher.fetch(url).await?;
        let document = Html::parse_document(&html);

        let title = utils::extract_title(&document);
        let content = utils::extract_paragraphs(&document, Self::CONTENT_SELECTORS);
        if content.trim().is_empty() {
            return Err(Error::Scraping(format!("No article body found at {}", url)));
        }

        Ok(utils::build_article(
            url,
            title,
            content,
            self.source_metadata().name,
        ))
    }
}
