use std::sync::Arc;
use tracing::{info, warn};
use inq_core::{ChunkStorage, EmbeddedChunk, Error, InferenceModel, Result, TextSplitter};
use crate::fetch::PageFetcher;
use crate::scrapers::{get_scrapers, Scraper, SourceMetadata};

/// Outcome of an ingestion run. Failures are logged and skipped, never
/// propagated, so the report is how callers see them.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestReport {
    pub articles: usize,
    pub chunks: usize,
    pub failures: usize,
}

/// Runs the scrape → chunk → embed → upsert pipeline over the configured
/// provider scrapers, sequentially.
pub struct IngestManager {
    storage: Arc<dyn ChunkStorage>,
    model: Arc<dyn InferenceModel>,
    fetcher: Arc<dyn PageFetcher>,
    splitter: TextSplitter,
    max_articles: Option<usize>,
    scrapers: Vec<Box<dyn Scraper>>,
}

impl IngestManager {
    pub fn new(
        storage: Arc<dyn ChunkStorage>,
        model: Arc<dyn InferenceModel>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            storage,
            model,
            fetcher,
            splitter: TextSplitter::default(),
            max_articles: None,
            scrapers: get_scrapers(),
        }
    }

    pub fn with_splitter(mut self, splitter: TextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Per-run cap on articles per source, tightening the per-listing cap
    /// each scraper already applies.
    pub fn with_max_articles(mut self, max_articles: Option<usize>) -> Self {
        self.max_articles = max_articles;
        self
    }

    pub fn add_scraper(&mut self, scraper: Box<dyn Scraper>) {
        self.scrapers.push(scraper);
    }

    pub fn sources(&self) -> Vec<SourceMetadata> {
        self.scrapers.iter().map(|s| s.source_metadata()).collect()
    }

    fn scraper_for_url(&self, url: &str) -> Result<&dyn Scraper> {
        self.scrapers
            .iter()
            .find(|s| s.can_handle(url))
            .map(|s| s.as_ref())
            .ok_or_else(|| Error::Scraping(format!("No scraper found for URL: {}", url)))
    }

    fn scrapers_for_source(&self, source: Option<&str>) -> Result<Vec<&dyn Scraper>> {
        match source {
            None => Ok(self.scrapers.iter().map(|s| s.as_ref()).collect()),
            Some(name) => {
                let name = name.to_lowercase();
                let matched: Vec<&dyn Scraper> = self
                    .scrapers
                    .iter()
                    .filter(|s| s.cli_names().contains(&name.as_str()))
                    .map(|s| s.as_ref())
                    .collect();
                if matched.is_empty() {
                    Err(Error::Scraping(format!("No scraper found for source: {}", name)))
                } else {
                    Ok(matched)
                }
            }
        }
    }

    /// Ingest one article: scrape, chunk, embed each chunk, upsert the batch.
    /// A chunk whose embedding request fails is skipped.
    async fn ingest_article(&self, scraper: &dyn Scraper, url: &str) -> Result<usize> {
        let article = scraper.scrape_article(self.fetcher.as_ref(), url).await?;
        info!("📰 Scraped article: {}", article.title);

        let chunks = self.splitter.chunk_article(&article);
        if chunks.is_empty() {
            warn!("Article produced no chunks, skipping: {}", url);
            return Ok(0);
        }
        info!("✂️ Split into {} chunks", chunks.len());

        let mut embedded = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            match self.model.generate_embeddings(&chunk.text).await {
                Ok(embedding) => embedded.push(EmbeddedChunk { chunk, embedding }),
                Err(e) => warn!("Embedding failed for chunk {}: {}", chunk_label(&chunk), e),
            }
        }
        if embedded.is_empty() {
            warn!("No chunk of {} could be embedded", url);
            return Ok(0);
        }

        self.storage.upsert_chunks(&embedded).await?;
        info!("💾 Upserted {} vectors for {}", embedded.len(), url);
        Ok(embedded.len())
    }

    /// Ingest a single URL through whichever scraper claims it.
    pub async fn ingest_url(&self, url: &str) -> Result<usize> {
        let scraper = self.scraper_for_url(url)?;
        self.ingest_article(scraper, url).await
    }

    /// Ingest one named source, or every configured source when `None`.
    /// Failing articles and failing listings are logged and skipped.
    pub async fn ingest_source(&self, source: Option<&str>) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        for scraper in self.scrapers_for_source(source)? {
            let meta = scraper.source_metadata();
            info!("{} Ingesting from {}", meta.emoji, meta.name);

            let mut urls = match scraper.article_urls(self.fetcher.as_ref()).await {
                Ok(urls) => urls,
                Err(e) => {
                    warn!("Listing fetch failed for {}: {}", meta.name, e);
                    report.failures += 1;
                    continue;
                }
            };
            if let Some(cap) = self.max_articles {
                urls.truncate(cap);
            }
            info!("🔗 Found {} article links", urls.len());

            for url in urls {
                match self.ingest_article(scraper, &url).await {
                    Ok(chunks) => {
                        report.articles += 1;
                        report.chunks += chunks;
                    }
                    Err(e) => {
                        warn!("Failed to ingest {}: {}", url, e);
                        report.failures += 1;
                    }
                }
            }
        }

        info!(
            "✅ Ingestion done: {} articles, {} chunks, {} failures",
            report.articles, report.chunks, report.failures
        );
        Ok(report)
    }
}

fn chunk_label(chunk: &inq_core::Chunk) -> String {
    format!("{}/{}", chunk.index + 1, chunk.total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureFetcher;
    use inq_inference::models::MockModel;
    use inq_storage::backends::memory::MemoryStorage;

    const LISTING: &str = r#"
        <main>
          <a href="/resources/car-insurance/deductible-basics">Deductibles</a>
          <a href="/resources/car-insurance/liability-coverage">Liability</a>
          <a href="/resources/car-insurance/broken-link">Broken</a>
        </main>
    "#;

    const ARTICLE_ONE: &str = r#"
        <html><body><h1>Deductible basics</h1>
        <main><p>A deductible is the amount you pay out of pocket before your
        coverage kicks in. Choosing a higher deductible usually lowers your
        premium.</p></main></body></html>
    "#;

    const ARTICLE_TWO: &str = r#"
        <html><body><h1>Liability coverage</h1>
        <main><p>Liability coverage pays for injuries and damage you cause to
        others. Most states require a minimum amount of it.</p></main></body></html>
    "#;

    async fn manager_with_fixtures() -> (IngestManager, Arc<MemoryStorage>) {
        let fetcher = FixtureFetcher::new(vec![
            ("https://www.allstate.com/resources/car-insurance", LISTING),
            (
                "https://www.allstate.com/resources/car-insurance/deductible-basics",
                ARTICLE_ONE,
            ),
            (
                "https://www.allstate.com/resources/car-insurance/liability-coverage",
                ARTICLE_TWO,
            ),
        ]);
        let storage = Arc::new(MemoryStorage::new().await.unwrap());
        let manager = IngestManager::new(
            storage.clone(),
            Arc::new(MockModel::new()),
            Arc::new(fetcher),
        );
        (manager, storage)
    }

    #[tokio::test]
    async fn test_ingest_source_logs_and_skips_failures() {
        let (manager, storage) = manager_with_fixtures().await;
        let report = manager.ingest_source(Some("allstate")).await.unwrap();

        // Two articles land; the broken link is counted, not fatal.
        assert_eq!(report.articles, 2);
        assert_eq!(report.failures, 1);
        assert!(report.chunks >= 2);
        assert_eq!(storage.chunk_count().await, report.chunks);
    }

    #[tokio::test]
    async fn test_ingested_chunks_are_retrievable() {
        let (manager, storage) = manager_with_fixtures().await;
        manager.ingest_source(Some("allstate")).await.unwrap();

        let model = MockModel::new();
        let query = model.generate_embeddings("deductible out of pocket").await.unwrap();
        let results = storage.query(&query, 2).await.unwrap();
        assert!(!results.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_source_is_an_error() {
        let (manager, _) = manager_with_fixtures().await;
        assert!(manager.ingest_source(Some("lemonade")).await.is_err());
    }

    #[tokio::test]
    async fn test_max_articles_cap() {
        let (manager, _) = manager_with_fixtures().await;
        let manager = manager.with_max_articles(Some(1));
        let report = manager.ingest_source(Some("allstate")).await.unwrap();
        assert_eq!(report.articles, 1);
        assert_eq!(report.failures, 0);
    }

    #[tokio::test]
    async fn test_ingest_url_routes_by_scraper() {
        let (manager, _) = manager_with_fixtures().await;
        let count = manager
            .ingest_url("https://www.allstate.com/resources/car-insurance/deductible-basics")
            .await
            .unwrap();
        assert!(count >= 1);

        assert!(manager.ingest_url("https://example.com/nothing").await.is_err());
    }
}
