use std::collections::HashSet;

use tracing::warn;

use crate::config::EPISODES_PER_SEASON;
use crate::parser::detail::DetailFields;
use crate::parser::listing::ListingFields;

/// Comparable form of a color name: lowercase, `_` and `-` read as spaces,
/// whitespace collapsed.
pub fn normalize_color(name: &str) -> String {
    name.replace(['_', '-'], " ")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered set of known colors, one indicator column each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorVocabulary {
    names: Vec<String>,
}

impl ColorVocabulary {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column header for a known color, e.g. `Alizarin_Crimson`.
    pub fn column_name(name: &str) -> String {
        name.split_whitespace().collect::<Vec<_>>().join("_")
    }

    /// One `(name, present)` pair per known color, in vocabulary order.
    pub fn indicators(&self, palette: &[String]) -> Vec<(String, bool)> {
        let used: HashSet<String> = palette.iter().map(|c| normalize_color(c)).collect();
        self.names
            .iter()
            .map(|name| (name.clone(), used.contains(&normalize_color(name))))
            .collect()
    }
}

/// One catalog item, listing and detail fields combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintingRecord {
    pub id: u32,
    pub image_ref: String,
    pub title: String,
    pub season: u32,
    pub episode: u32,
    pub color_count: u32,
    pub media_link: Option<String>,
    pub colors: Vec<String>,
    pub color_hexes: Vec<String>,
    pub color_indicators: Vec<(String, bool)>,
}

impl PaintingRecord {
    /// Position of the episode across the whole run of the show. Records
    /// whose season/episode have no position sort last.
    pub fn sequence_number(&self) -> u32 {
        sequence_number(self.season, self.episode).unwrap_or(u32::MAX)
    }
}

/// `None` for season 0 or when the position does not fit in a `u32`.
pub fn sequence_number(season: u32, episode: u32) -> Option<u32> {
    season
        .checked_sub(1)?
        .checked_mul(EPISODES_PER_SEASON)?
        .checked_add(episode)
}

pub fn merge(listing: ListingFields, detail: DetailFields, known_colors: &ColorVocabulary) -> PaintingRecord {
    let color_indicators = known_colors.indicators(&detail.colors);
    PaintingRecord {
        id: listing.id,
        image_ref: listing.image_ref,
        title: listing.title,
        season: listing.season,
        episode: listing.episode,
        color_count: listing.color_count,
        media_link: detail.media_link,
        colors: detail.colors,
        color_hexes: detail.color_hexes,
        color_indicators,
    }
}

/// Append-only collection of records, unique by id.
pub struct Accumulator {
    vocabulary: ColorVocabulary,
    records: Vec<PaintingRecord>,
    seen: HashSet<u32>,
}

impl Accumulator {
    pub fn new(vocabulary: ColorVocabulary) -> Self {
        Self {
            vocabulary,
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.seen.contains(&id)
    }

    /// Merge and append. Returns `false`, keeping the first record, when the
    /// id was already collected.
    pub fn push(&mut self, listing: ListingFields, detail: DetailFields) -> bool {
        if !self.seen.insert(listing.id) {
            warn!("Duplicate painting {} ignored", listing.id);
            return false;
        }
        if detail.colors.len() as u32 != listing.color_count {
            warn!(
                "Painting {} lists {} colors but its palette has {}",
                listing.id,
                listing.color_count,
                detail.colors.len()
            );
        }
        self.records.push(merge(listing, detail, &self.vocabulary));
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<PaintingRecord> {
        self.records
    }
}
