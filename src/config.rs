use crate::record::ColorVocabulary;

pub const LISTING_URL: &str = "https://www.twoinchbrush.com/all-paintings";
pub const DETAIL_URL_TEMPLATE: &str = "https://www.twoinchbrush.com/painting/{id}";
pub const IMAGE_BASE_URL: &str = "https://www.twoinchbrush.com/";
pub const USER_AGENT: &str = concat!("painting_scraper/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_CSV_NAME: &str = "get_bob_ross_paintings.csv";

/// Every season of the show ran 13 episodes.
pub const EPISODES_PER_SEASON: u32 = 13;

/// Standard palette, in the column order of the exported dataset.
pub const KNOWN_COLORS: &[&str] = &[
    "Black Gesso",
    "Bright Red",
    "Burnt Umber",
    "Cadmium Yellow",
    "Dark Sienna",
    "Indian Red",
    "Indian Yellow",
    "Liquid Black",
    "Liquid Clear",
    "Midnight Black",
    "Phthalo Blue",
    "Phthalo Green",
    "Prussian Blue",
    "Sap Green",
    "Titanium White",
    "Van Dyke Brown",
    "Yellow Ochre",
    "Alizarin Crimson",
];

/// How dataset rows are ordered and what the leading column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowOrder {
    /// Page order, then listing order; leading column is the row position.
    #[default]
    Append,
    /// Stable sort by sequence number; leading column is the sequence number.
    KeyedBySequenceNumber,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub listing_url: String,
    /// `None` fetches `listing_url` once; `Some(n)` fetches `?page=1..=n`.
    pub listing_pages: Option<u32>,
    pub detail_url_template: String,
    pub image_base_url: String,
    pub user_agent: String,
    pub vocabulary: ColorVocabulary,
    pub row_order: RowOrder,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            listing_url: LISTING_URL.to_string(),
            listing_pages: None,
            detail_url_template: DETAIL_URL_TEMPLATE.to_string(),
            image_base_url: IMAGE_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            vocabulary: ColorVocabulary::new(KNOWN_COLORS.iter().copied()),
            row_order: RowOrder::default(),
        }
    }
}

impl PipelineConfig {
    pub fn listing_urls(&self) -> Vec<String> {
        match self.listing_pages {
            None => vec![self.listing_url.clone()],
            Some(pages) => {
                let separator = if self.listing_url.contains('?') { '&' } else { '?' };
                (1..=pages)
                    .map(|page| format!("{}{separator}page={page}", self.listing_url))
                    .collect()
            }
        }
    }

    pub fn detail_url(&self, id: u32) -> String {
        self.detail_url_template.replace("{id}", &id.to_string())
    }

    /// Resolve a site-relative asset path against `image_base_url`.
    pub fn image_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.image_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
