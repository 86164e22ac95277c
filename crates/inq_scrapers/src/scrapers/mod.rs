use async_trait::async_trait;
use chrono::Utc;
use scraper::{Html, Selector};
use url::Url;
use inq_core::{Article, Result};
use crate::fetch::PageFetcher;

pub mod providers;

pub use providers::get_scrapers;

#[derive(Debug, Clone, Copy)]
pub struct SourceMetadata {
    pub name: &'static str,
    pub emoji: &'static str,
    pub base_url: &'static str,
}

/// Substring rules applied to candidate article links from a listing page.
#[derive(Debug, Clone, Copy)]
pub struct LinkRules {
    /// A link must contain at least one of these (when non-empty).
    pub include: &'static [&'static str],
    /// A link containing any of these is dropped (compared lowercased).
    pub exclude: &'static [&'static str],
    /// Per-listing cap on how many links survive.
    pub max_articles: usize,
}

impl LinkRules {
    pub fn allows(&self, url: &str) -> bool {
        let lowered = url.to_lowercase();
        if !self.include.is_empty() && !self.include.iter().any(|s| lowered.contains(s)) {
            return false;
        }
        !self.exclude.iter().any(|s| lowered.contains(s))
    }
}

#[async_trait]
pub trait Scraper: Send + Sync {
    fn source_metadata(&self) -> SourceMetadata;

    /// Returns true if this scraper can handle the given URL.
    fn can_handle(&self, url: &str) -> bool;

    /// CLI shorthand names for this scraper.
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }

    /// CSS selectors tried in order against the listing page.
    fn listing_selectors(&self) -> &'static [&'static str];

    fn link_rules(&self) -> LinkRules;

    /// Collects candidate article URLs from the source's listing page.
    async fn article_urls(&self, fetcher: &dyn PageFetcher) -> Result<Vec<String>> {
        let meta = self.source_metadata();
        let html = fetcher.fetch(meta.base_url).await?;
        Ok(utils::extract_article_links(
            &html,
            meta.base_url,
            self.listing_selectors(),
            &self.link_rules(),
        ))
    }

    /// Scrapes a single article page.
    async fn scrape_article(&self, fetcher: &dyn PageFetcher, url: &str) -> Result<Article>;
}

/// Shared extraction helpers for scrapers.
pub mod utils {
    use super::*;

    /// Candidate links by selector, with a bare list-item fallback when no
    /// configured selector matches anything. Relative hrefs resolve against
    /// the listing URL; results are deduplicated in discovery order and
    /// capped by the rules.
    pub fn extract_article_links(
        html: &str,
        base_url: &str,
        selectors: &[&str],
        rules: &LinkRules,
    ) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut hrefs: Vec<String> = Vec::new();

        for selector in selectors {
            if let Ok(selector) = Selector::parse(selector) {
                hrefs.extend(
                    document
                        .select(&selector)
                        .filter_map(|el| el.value().attr("href"))
                        .map(str::to_string),
                );
            }
        }

        if hrefs.is_empty() {
            if let Ok(fallback) = Selector::parse("li a") {
                hrefs.extend(
                    document
                        .select(&fallback)
                        .filter_map(|el| el.value().attr("href"))
                        .map(str::to_string),
                );
            }
        }

        let mut urls = Vec::new();
        for href in hrefs {
            let Some(url) = resolve_url(base_url, &href) else {
                continue;
            };
            if !rules.allows(&url) {
                continue;
            }
            if urls.contains(&url) {
                continue;
            }
            urls.push(url);
            if urls.len() >= rules.max_articles {
                break;
            }
        }

        urls
    }

    pub fn resolve_url(base_url: &str, href: &str) -> Option<String> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Some(href.to_string());
        }
        let base = Url::parse(base_url).ok()?;
        base.join(href).ok().map(|u| u.to_string())
    }

    /// Title from the first h1, falling back to the document title element.
    pub fn extract_title(document: &Html) -> String {
        let h1 = Selector::parse("h1").unwrap();
        if let Some(el) = document.select(&h1).next() {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return text;
            }
        }
        let title = Selector::parse("title").unwrap();
        document
            .select(&title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Paragraph text under the first selector that yields any, joined with
    /// blank lines.
    pub fn extract_paragraphs(document: &Html, selectors: &[&str]) -> String {
        for selector in selectors {
            if let Ok(selector) = Selector::parse(selector) {
                let paragraphs: Vec<String> = document
                    .select(&selector)
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .filter(|text| !text.is_empty())
                    .collect();
                if !paragraphs.is_empty() {
                    return paragraphs.join("\n\n");
                }
            }
        }
        String::new()
    }

    pub fn build_article(url: &str, title: String, content: String, source: &str) -> Article {
        Article {
            url: url.to_string(),
            title,
            content,
            source: source.to_string(),
            scraped_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: LinkRules = LinkRules {
        include: &["/resources/"],
        exclude: &["quote", "calculator"],
        max_articles: 3,
    };

    #[test]
    fn test_rules_include_and_exclude() {
        assert!(RULES.allows("https://x.com/resources/car/abc"));
        assert!(!RULES.allows("https://x.com/other/abc"));
        assert!(!RULES.allows("https://x.com/resources/car/quote"));
        assert!(!RULES.allows("https://x.com/resources/car/Premium-CALCULATOR"));
    }

    #[test]
    fn test_extract_links_filters_and_caps() {
        let html = r#"
            <main>
              <a href="/resources/car/one">One</a>
              <a href="/resources/car/two">Two</a>
              <a href="/resources/car/quote">Get a quote</a>
              <a href="/resources/car/one">One again</a>
              <a href="/resources/car/three">Three</a>
              <a href="/resources/car/four">Four</a>
            </main>
        "#;
        let urls = utils::extract_article_links(html, "https://x.com/resources/car", &["main a"], &RULES);
        assert_eq!(
            urls,
            vec![
                "https://x.com/resources/car/one".to_string(),
                "https://x.com/resources/car/two".to_string(),
                "https://x.com/resources/car/three".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_links_excluded_never_appear() {
        let html = r#"
            <main>
              <a href="/resources/a-quote-page">A</a>
              <a href="/resources/rate-calculator">B</a>
            </main>
        "#;
        let urls = utils::extract_article_links(html, "https://x.com/", &["main a"], &RULES);
        assert!(urls.is_empty());
    }

    #[test]
    fn test_extract_links_list_item_fallback() {
        let html = r#"
            <ul>
              <li><a href="/resources/car/from-list">From list</a></li>
            </ul>
        "#;
        // No configured selector matches, so the li fallback kicks in.
        let urls = utils::extract_article_links(html, "https://x.com/", &["main a"], &RULES);
        assert_eq!(urls, vec!["https://x.com/resources/car/from-list".to_string()]);
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            utils::resolve_url("https://x.com/listing", "/a/b").as_deref(),
            Some("https://x.com/a/b")
        );
        assert_eq!(
            utils::resolve_url("https://x.com/", "https://y.com/c").as_deref(),
            Some("https://y.com/c")
        );
        assert!(utils::resolve_url("not a url", "/a").is_none());
    }

    #[test]
    fn test_extract_title_prefers_h1() {
        let document = Html::parse_document(
            "<html><head><title>Doc title</title></head><body><h1>Heading</h1></body></html>",
        );
        assert_eq!(utils::extract_title(&document), "Heading");

        let document = Html::parse_document(
            "<html><head><title>Doc title</title></head><body></body></html>",
        );
        assert_eq!(utils::extract_title(&document), "Doc title");
    }

    #[test]
    fn test_extract_paragraphs_first_matching_selector() {
        let document = Html::parse_document(
            "<html><body><article><p>first</p><p>second</p></article></body></html>",
        );
        let text = utils::extract_paragraphs(&document, &["main p", "article p"]);
        assert_eq!(text, "first\n\nsecond");
    }
}
