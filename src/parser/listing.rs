use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use tracing::warn;

use super::{attr, by_tag, digit_runs, parse_number, text_of, Document};
use crate::config::PipelineConfig;
use crate::error::ExtractError;
use crate::record::sequence_number;

static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.painting-holder").unwrap());

/// Summary fields of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFields {
    pub id: u32,
    pub image_ref: String,
    pub title: String,
    pub season: u32,
    pub episode: u32,
    pub color_count: u32,
    /// Markup variant the fields were read from.
    pub mode: ListingMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    StructuredAttributes,
    FreeText,
}

impl ListingMode {
    /// Inspect the first listing item and pick the variant for the whole run.
    pub fn detect(first_item: ElementRef<'_>) -> Self {
        if first_item.value().attr("data-id").is_some() {
            Self::StructuredAttributes
        } else {
            Self::FreeText
        }
    }

    pub fn source(self) -> &'static dyn ListingSource {
        match self {
            Self::StructuredAttributes => &StructuredAttributes,
            Self::FreeText => &FreeText,
        }
    }

    /// Free-text values come from positional digit runs and are never
    /// cross-checked against anything.
    pub fn is_best_effort(self) -> bool {
        matches!(self, Self::FreeText)
    }
}

/// Per-field extraction from one listing item node.
pub trait ListingSource {
    fn mode(&self) -> ListingMode;
    fn extract_id(&self, item: ElementRef<'_>) -> Result<u32, ExtractError>;
    /// Image reference as it appears in the markup, possibly site-relative.
    fn extract_image(&self, item: ElementRef<'_>) -> Result<String, ExtractError>;
    fn extract_title(&self, item: ElementRef<'_>) -> Result<String, ExtractError>;
    fn extract_season_episode(&self, item: ElementRef<'_>) -> Result<(u32, u32), ExtractError>;
    fn extract_color_count(&self, item: ElementRef<'_>) -> Result<u32, ExtractError>;

    fn extract(
        &self,
        item: ElementRef<'_>,
        config: &PipelineConfig,
    ) -> Result<ListingFields, ExtractError> {
        let (season, episode) = self.extract_season_episode(item)?;
        if sequence_number(season, episode).is_none() {
            return Err(ExtractError::malformed(
                "season",
                format!("season {season}, episode {episode} is out of range"),
            ));
        }
        Ok(ListingFields {
            id: self.extract_id(item)?,
            image_ref: config.image_url(&self.extract_image(item)?),
            title: self.extract_title(item)?,
            season,
            episode,
            color_count: self.extract_color_count(item)?,
            mode: self.mode(),
        })
    }
}

/// Fields carried as `data-*` attributes on the item node itself.
pub struct StructuredAttributes;

impl ListingSource for StructuredAttributes {
    fn mode(&self) -> ListingMode {
        ListingMode::StructuredAttributes
    }

    fn extract_id(&self, item: ElementRef<'_>) -> Result<u32, ExtractError> {
        parse_number("data-id", attr(item, "data-id")?)
    }

    fn extract_image(&self, item: ElementRef<'_>) -> Result<String, ExtractError> {
        Ok(attr(item, "data-image")?.trim().to_string())
    }

    fn extract_title(&self, item: ElementRef<'_>) -> Result<String, ExtractError> {
        Ok(attr(item, "data-title")?.trim().to_string())
    }

    fn extract_season_episode(&self, item: ElementRef<'_>) -> Result<(u32, u32), ExtractError> {
        let season = parse_number("data-season", attr(item, "data-season")?)?;
        let episode = parse_number("data-episode", attr(item, "data-episode")?)?;
        Ok((season, episode))
    }

    fn extract_color_count(&self, item: ElementRef<'_>) -> Result<u32, ExtractError> {
        parse_number("data-color-count", attr(item, "data-color-count")?)
    }
}

/// Fields scattered over nested text: `<a data-img>` for id and image, the
/// first `<p>` for the title, and the digit runs of the second `<p>` for
/// season, episode and color count, in that order.
pub struct FreeText;

impl FreeText {
    fn data_img(item: ElementRef<'_>) -> Result<&str, ExtractError> {
        let anchor = by_tag(item, "a")
            .into_iter()
            .next()
            .ok_or(ExtractError::MissingField("a"))?;
        attr(anchor, "data-img")
    }

    fn paragraph(item: ElementRef<'_>, index: usize) -> Result<String, ExtractError> {
        by_tag(item, "p")
            .get(index)
            .map(|p| text_of(*p))
            .ok_or(ExtractError::MissingField("p"))
    }

    fn text_number(item: ElementRef<'_>, position: usize, field: &'static str) -> Result<u32, ExtractError> {
        let text = Self::paragraph(item, 1)?;
        let runs = digit_runs(&text);
        let raw = runs.get(position).ok_or_else(|| {
            ExtractError::malformed(
                field,
                format!("expected at least {} numbers in {text:?}, found {}", position + 1, runs.len()),
            )
        })?;
        parse_number(field, raw)
    }
}

impl ListingSource for FreeText {
    fn mode(&self) -> ListingMode {
        ListingMode::FreeText
    }

    fn extract_id(&self, item: ElementRef<'_>) -> Result<u32, ExtractError> {
        let data_img = Self::data_img(item)?;
        let raw = digit_runs(data_img)
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::malformed("data-img", format!("no number in {data_img:?}")))?;
        parse_number("data-img", raw)
    }

    fn extract_image(&self, item: ElementRef<'_>) -> Result<String, ExtractError> {
        Ok(Self::data_img(item)?.trim().to_string())
    }

    fn extract_title(&self, item: ElementRef<'_>) -> Result<String, ExtractError> {
        Self::paragraph(item, 0)
    }

    fn extract_season_episode(&self, item: ElementRef<'_>) -> Result<(u32, u32), ExtractError> {
        Ok((
            Self::text_number(item, 0, "season")?,
            Self::text_number(item, 1, "episode")?,
        ))
    }

    fn extract_color_count(&self, item: ElementRef<'_>) -> Result<u32, ExtractError> {
        Self::text_number(item, 2, "color_count")
    }
}

/// Listing item nodes in page order.
pub fn items(doc: &Document) -> Vec<ElementRef<'_>> {
    doc.select(&ITEM_SELECTOR)
}

/// Listing fields of every well-formed item, plus the count of skipped ones.
pub fn extract_items(
    items: &[ElementRef<'_>],
    mode: ListingMode,
    config: &PipelineConfig,
) -> (Vec<ListingFields>, usize) {
    let source = mode.source();
    let mut fields = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for (position, item) in items.iter().enumerate() {
        match source.extract(*item, config) {
            Ok(f) => fields.push(f),
            Err(e) => {
                warn!("Skipping listing item {}: {}", position, e);
                skipped += 1;
            }
        }
    }

    (fields, skipped)
}
