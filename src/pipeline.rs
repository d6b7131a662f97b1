use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::dataset;
use crate::error::FetchError;
use crate::fetch::Fetch;
use crate::parser;
use crate::parser::detail::{self, DetailFields};
use crate::parser::listing::{self, ListingFields, ListingMode};
use crate::record::{Accumulator, PaintingRecord};

/// Counts reported after a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pages: usize,
    pub collected: usize,
    pub skipped: usize,
    pub mode: Option<ListingMode>,
}

/// Fetch one painting's detail page and pull its palette and media link.
pub async fn enrich<F: Fetch>(fetcher: &F, config: &PipelineConfig, id: u32) -> Result<DetailFields, FetchError> {
    let raw = fetcher.fetch(&config.detail_url(id)).await?;
    Ok(detail::extract(&parser::parse(&raw)))
}

/// Walk every listing page and every item on it, in order. Any fetch failure
/// aborts the walk.
pub async fn collect<F: Fetch>(
    fetcher: &F,
    config: &PipelineConfig,
    verbose: i32,
) -> Result<(Vec<PaintingRecord>, RunSummary)> {
    let mut acc = Accumulator::new(config.vocabulary.clone());
    let mut summary = RunSummary::default();

    for url in config.listing_urls() {
        info!("Fetching listing {}", url);
        let raw = fetcher.fetch(&url).await?;
        let (items, skipped) = read_listing(&raw, &mut summary.mode, config);
        summary.pages += 1;
        summary.skipped += skipped;

        let pb = progress_bar(items.len(), verbose)?;
        for fields in items {
            let id = fields.id;
            if acc.contains(id) {
                warn!("Painting {} already collected, skipping", id);
                summary.skipped += 1;
                pb.inc(1);
                continue;
            }

            let detail = enrich(fetcher, config, id).await?;
            acc.push(fields, detail);
            if verbose > 0 {
                pb.suspend(|| println!("collected data from painting {}", id));
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
    }

    summary.collected = acc.len();
    Ok((acc.into_records(), summary))
}

/// Collect everything, then write the dataset once.
pub async fn run<F: Fetch>(fetcher: &F, config: &PipelineConfig, output: &Path, verbose: i32) -> Result<RunSummary> {
    let (records, summary) = collect(fetcher, config, verbose).await?;
    dataset::write(&records, &config.vocabulary, config.row_order, output)?;
    Ok(summary)
}

/// Parse one listing page. The markup variant is fixed by the first page
/// that has items and reused for the rest of the run.
fn read_listing(raw: &str, mode: &mut Option<ListingMode>, config: &PipelineConfig) -> (Vec<ListingFields>, usize) {
    let doc = parser::parse(raw);
    let nodes = listing::items(&doc);
    let Some(first) = nodes.first() else {
        info!("Listing page has no paintings");
        return (Vec::new(), 0);
    };

    let mode = *mode.get_or_insert_with(|| {
        let detected = ListingMode::detect(*first);
        info!("Listing markup: {:?}", detected);
        if detected.is_best_effort() {
            warn!("Season, episode and color counts are read from free text and are not validated");
        }
        detected
    });

    let (items, skipped) = listing::extract_items(&nodes, mode, config);
    info!("Listing page: {} paintings, {} skipped", items.len(), skipped);
    (items, skipped)
}

fn progress_bar(len: usize, verbose: i32) -> Result<ProgressBar> {
    if verbose <= 0 {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::{RowOrder, DETAIL_URL_TEMPLATE, LISTING_URL};
    use crate::record::ColorVocabulary;

    /// Serves fixture pages by URL; anything else is a 404.
    struct FixtureFetcher {
        pages: HashMap<String, String>,
    }

    impl FixtureFetcher {
        fn new() -> Self {
            Self { pages: HashMap::new() }
        }

        fn page(mut self, url: &str, fixture: &str) -> Self {
            let body = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
            self.pages.insert(url.to_string(), body);
            self
        }

        fn detail(self, id: u32, fixture: &str) -> Self {
            self.page(&DETAIL_URL_TEMPLATE.replace("{id}", &id.to_string()), fixture)
        }
    }

    impl Fetch for FixtureFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            })
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            vocabulary: ColorVocabulary::new([
                "Alizarin Crimson",
                "Bright Red",
                "Phthalo Blue",
                "Sap Green",
                "Titanium White",
                "Van Dyke Brown",
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn two_items_three_colors_each() {
        let fetcher = FixtureFetcher::new()
            .page(LISTING_URL, "listing_free_text")
            .detail(1, "detail_style")
            .detail(2, "detail_style");

        let (records, summary) = collect(&fetcher, &config(), 0).await.unwrap();
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.collected, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.mode, Some(ListingMode::FreeText));

        assert_eq!(records.len(), 2);
        for r in &records {
            assert_eq!(r.colors.len(), 3);
            assert_eq!(r.color_hexes.len(), 3);
            assert_eq!(r.colors[0], "Alizarin Crimson");
            assert_eq!(r.color_hexes[0], "#4E1500");
            assert_eq!(r.sequence_number(), (r.season - 1) * 13 + r.episode);
            for (name, present) in &r.color_indicators {
                let expected = ["Alizarin Crimson", "Bright Red", "Titanium White"].contains(&name.as_str());
                assert_eq!(*present, expected, "{name}");
            }
        }
        assert_eq!(records[1].sequence_number(), 2);
    }

    #[tokio::test]
    async fn missing_media_link_does_not_abort() {
        let fetcher = FixtureFetcher::new()
            .page(LISTING_URL, "listing_free_text")
            .detail(1, "detail_no_video")
            .detail(2, "detail_style");

        let (records, _) = collect(&fetcher, &config(), 0).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].media_link, None);
        assert!(records[1].media_link.is_some());
    }

    #[tokio::test]
    async fn empty_listing_writes_header_only() {
        let fetcher = FixtureFetcher::new().page(LISTING_URL, "listing_empty");
        let path = std::env::temp_dir().join(format!("painting_scraper_empty_{}.csv", std::process::id()));

        let summary = run(&fetcher, &config(), &path, 0).await.unwrap();
        assert_eq!(summary.collected, 0);
        assert_eq!(summary.mode, None);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn detail_failure_is_fatal() {
        let fetcher = FixtureFetcher::new()
            .page(LISTING_URL, "listing_free_text")
            .detail(1, "detail_style");

        let err = collect(&fetcher, &config(), 0).await.unwrap_err();
        let fetch = err.downcast_ref::<FetchError>().unwrap();
        assert!(matches!(fetch, FetchError::Status { status, .. } if *status == reqwest::StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn mode_is_fixed_by_first_page_and_ids_stay_unique() {
        let config = PipelineConfig {
            listing_pages: Some(3),
            ..config()
        };
        let fetcher = FixtureFetcher::new()
            .page(&format!("{LISTING_URL}?page=1"), "listing_empty")
            .page(&format!("{LISTING_URL}?page=2"), "listing_structured")
            .page(&format!("{LISTING_URL}?page=3"), "listing_structured")
            .detail(15, "detail_structured")
            .detail(16, "detail_empty_palette");

        let (records, summary) = collect(&fetcher, &config, 0).await.unwrap();
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.mode, Some(ListingMode::StructuredAttributes));
        assert_eq!(summary.skipped, 2);
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![15, 16]);

        let blue = &records[0];
        assert!(blue
            .color_indicators
            .iter()
            .any(|(name, present)| name == "Phthalo Blue" && *present));
        let empty = &records[1];
        assert!(empty.colors.is_empty());
        assert!(empty.color_indicators.iter().all(|(_, present)| !present));
    }

    #[tokio::test]
    async fn run_is_idempotent_and_round_trips() {
        let fetcher = FixtureFetcher::new()
            .page(LISTING_URL, "listing_free_text")
            .detail(1, "detail_style")
            .detail(2, "detail_no_video");
        let config = PipelineConfig {
            row_order: RowOrder::KeyedBySequenceNumber,
            ..config()
        };
        let first = std::env::temp_dir().join(format!("painting_scraper_a_{}.csv", std::process::id()));
        let second = std::env::temp_dir().join(format!("painting_scraper_b_{}.csv", std::process::id()));

        run(&fetcher, &config, &first, 0).await.unwrap();
        run(&fetcher, &config, &second, 0).await.unwrap();
        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());

        let (records, _) = collect(&fetcher, &config, 0).await.unwrap();
        assert_eq!(dataset::read(&first, &config.vocabulary).unwrap(), records);

        std::fs::remove_file(&first).unwrap();
        std::fs::remove_file(&second).unwrap();
    }
}
