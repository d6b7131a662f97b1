use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

use super::{attr, by_tag, text_of, Document};
use crate::error::ExtractError;

static UNCLASSED_LIST: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul:not([class])").unwrap());
static FRAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("iframe").unwrap());

const COLOR_LIST_ID: &str = "color-list";

/// Palette and media link of one painting. `colors[i]` pairs with
/// `color_hexes[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub colors: Vec<String>,
    pub color_hexes: Vec<String>,
    pub media_link: Option<String>,
}

pub fn extract(doc: &Document) -> DetailFields {
    let mut fields = DetailFields::default();

    match color_list(doc) {
        Ok(list) => {
            for li in by_tag(list, "li") {
                let (name, hex) = color_entry(li);
                fields.colors.push(name);
                fields.color_hexes.push(hex);
            }
        }
        Err(e) => warn!("No palette on detail page: {}", e),
    }

    match media_link(doc) {
        Ok(src) => fields.media_link = Some(src),
        Err(e) => debug!("No media link on detail page: {}", e),
    }

    fields
}

/// `#color-list` when the page has one, else the first `<ul>` without a class.
fn color_list(doc: &Document) -> Result<ElementRef<'_>, ExtractError> {
    doc.by_id(COLOR_LIST_ID)
        .or_else(|| doc.select(&UNCLASSED_LIST).into_iter().next())
        .ok_or(ExtractError::MissingField("ul"))
}

fn color_entry(li: ElementRef<'_>) -> (String, String) {
    let name = match li.value().attr("data-name") {
        Some(n) => n.trim().to_string(),
        None => text_of(li),
    };
    let hex = color_hex(li).unwrap_or_else(|e| {
        warn!("Color {:?} has no hex value: {}", name, e);
        String::new()
    });
    (name, hex)
}

/// `data-hex`, or the value half of a `style="background: #RRGGBB"`.
fn color_hex(li: ElementRef<'_>) -> Result<String, ExtractError> {
    if let Some(hex) = li.value().attr("data-hex") {
        return Ok(hex.trim().to_string());
    }
    let style = attr(li, "style")?;
    let value = style
        .split(": ")
        .nth(1)
        .ok_or_else(|| ExtractError::malformed("style", format!("no `: ` in {style:?}")))?;
    Ok(value.trim().trim_end_matches(';').trim().to_string())
}

pub fn media_link(doc: &Document) -> Result<String, ExtractError> {
    let frame = doc
        .select(&FRAME)
        .into_iter()
        .next()
        .ok_or(ExtractError::MissingField("iframe"))?;
    Ok(attr(frame, "src")?.to_string())
}
