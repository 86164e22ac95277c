use crate::scrapers::Scraper;

pub mod allstate;
pub mod geico;
pub mod progressive;

pub use allstate::AllstateScraper;
pub use geico::GeicoScraper;
pub use progressive::ProgressiveScraper;

/// All configured provider scrapers.
pub fn get_scrapers() -> Vec<Box<dyn Scraper>> {
    vec![
        Box::new(AllstateScraper::new()),
        Box::new(GeicoScraper::new()),
        Box::new(ProgressiveScraper::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_provider_handles_its_own_urls() {
        let scrapers = get_scrapers();
        assert_eq!(scrapers.len(), 3);

        let allstate = "https://www.allstate.com/resources/car-insurance/abc";
        let geico = "https://www.geico.com/living/abc";
        let progressive = "https://www.progressive.com/answers/abc";

        assert!(scrapers.iter().any(|s| s.can_handle(allstate)));
        assert!(scrapers.iter().any(|s| s.can_handle(geico)));
        assert!(scrapers.iter().any(|s| s.can_handle(progressive)));
        assert!(!scrapers.iter().any(|s| s.can_handle("https://example.com/a")));
    }

    #[test]
    fn test_cli_names_are_unique() {
        let mut names: Vec<String> = get_scrapers()
            .iter()
            .flat_map(|s| s.cli_names().into_iter().map(String::from).collect::<Vec<_>>())
            .collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(before, names.len());
    }
}
