pub mod detail;
pub mod listing;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Parsed page. Every lookup returns matches in document order; no match is
/// an empty `Vec`.
pub struct Document {
    html: Html,
}

pub fn parse(raw_markup: &str) -> Document {
    Document {
        html: Html::parse_document(raw_markup),
    }
}

impl Document {
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn select(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.html.select(selector).collect()
    }

    pub fn by_tag(&self, tag: &str) -> Vec<ElementRef<'_>> {
        by_tag(self.root(), tag)
    }

    pub fn by_class(&self, tag: &str, class: &str) -> Vec<ElementRef<'_>> {
        by_class(self.root(), tag, class)
    }

    pub fn by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        descendants(self.root()).find(|el| el.value().id() == Some(id))
    }
}

fn descendants(scope: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    scope.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Descendant elements of `scope` named `tag`.
pub fn by_tag<'a>(scope: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    descendants(scope)
        .filter(|el| el.value().name() == tag)
        .collect()
}

/// Descendant elements of `scope` named `tag` carrying `class`.
pub fn by_class<'a>(scope: ElementRef<'a>, tag: &str, class: &str) -> Vec<ElementRef<'a>> {
    descendants(scope)
        .filter(|el| el.value().name() == tag && el.value().classes().any(|c| c == class))
        .collect()
}

/// Element text with runs of whitespace collapsed to a single space.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn attr<'a>(el: ElementRef<'a>, name: &'static str) -> Result<&'a str, ExtractError> {
    el.value().attr(name).ok_or(ExtractError::MissingField(name))
}

/// Every run of ASCII digits in `text`, in order.
pub fn digit_runs(text: &str) -> Vec<&str> {
    DIGITS_RE.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn parse_number(field: &'static str, raw: &str) -> Result<u32, ExtractError> {
    raw.trim()
        .parse()
        .map_err(|e| ExtractError::malformed(field, format!("{raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="painting-holder wide" id="first"><p>One</p><p>Two   words</p></div>
          <div class="painting-holder"><p>Three</p></div>
          <ul class="nav"><li>skip</li></ul>
          <ul><li style="background: #FFFFFF">White</li></ul>
        </body></html>
    "#;

    #[test]
    fn lookups_by_tag_class_and_id() {
        let doc = parse(PAGE);
        assert_eq!(doc.by_tag("ul").len(), 2);
        assert_eq!(doc.by_class("div", "painting-holder").len(), 2);
        assert_eq!(doc.by_class("div", "wide").len(), 1);
        assert!(doc.by_class("span", "painting-holder").is_empty());

        let first = doc.by_id("first").unwrap();
        let paragraphs = by_tag(first, "p");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(text_of(paragraphs[1]), "Two words");
        assert!(doc.by_id("missing").is_none());
    }

    #[test]
    fn selector_lookup_preserves_document_order() {
        let doc = parse(PAGE);
        let sel = Selector::parse("div.painting-holder p").unwrap();
        let texts: Vec<String> = doc.select(&sel).into_iter().map(text_of).collect();
        assert_eq!(texts, vec!["One", "Two words", "Three"]);
    }

    #[test]
    fn empty_markup_yields_no_matches() {
        let doc = parse("");
        assert!(doc.by_tag("div").is_empty());
        assert!(doc.by_class("div", "painting-holder").is_empty());
    }

    #[test]
    fn missing_attribute_is_typed() {
        let doc = parse(PAGE);
        let li = doc.by_tag("li")[1];
        assert_eq!(attr(li, "style"), Ok("background: #FFFFFF"));
        assert_eq!(attr(li, "data-hex"), Err(ExtractError::MissingField("data-hex")));
    }

    #[test]
    fn digit_runs_and_numbers() {
        assert_eq!(digit_runs("Season 3, Episode 12 - 7 colors"), vec!["3", "12", "7"]);
        assert!(digit_runs("no numbers here").is_empty());
        assert_eq!(parse_number("season", " 4 "), Ok(4));
        assert!(matches!(
            parse_number("season", "four"),
            Err(ExtractError::Malformed { field: "season", .. })
        ));
    }
}
