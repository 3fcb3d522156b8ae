//! Listing extraction from search-results HTML.
//!
//! Candidate blocks are `.ad-listitem` elements minus the promoted variants
//! (`.is-topad`, `.badge-hint-pro-small-srp`). A candidate without an ad id
//! or a detail link is dropped silently; missing title, price or description
//! elements yield empty strings.

use std::sync::LazyLock;

use klanavo_core::Listing;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static AD_ITEM: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".ad-listitem:not(.is-topad):not(.badge-hint-pro-small-srp)")
        .expect("valid selector")
});
static ARTICLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article").expect("valid selector"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2.text-module-begin a.ellipsis").expect("valid selector")
});
static PRICE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p.aditem-main--middle--price-shipping--price").expect("valid selector")
});
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p.aditem-main--middle--description").expect("valid selector")
});
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Parses a results page into listings, in document order.
///
/// `base_url` is prefixed to each ad's relative `data-href` to form the
/// canonical listing URL.
#[must_use]
pub fn extract_listings(html: &str, base_url: &str) -> Vec<Listing> {
    let document = Html::parse_document(html);
    let base = base_url.trim_end_matches('/');

    document
        .select(&AD_ITEM)
        .filter_map(|item| parse_ad(item, base))
        .collect()
}

fn parse_ad(item: ElementRef<'_>, base: &str) -> Option<Listing> {
    let article = item.select(&ARTICLE).next()?;
    let adid = non_empty_attr(article, "data-adid")?;
    let href = non_empty_attr(article, "data-href")?;

    let url = if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{base}{href}")
    };

    let title = first_text(article, &TITLE, "");
    let price = normalize_price(&first_text(article, &PRICE, " "));
    let description = first_text(article, &DESCRIPTION, " ");

    Some(Listing {
        adid: adid.to_string(),
        url,
        title,
        price,
        description,
    })
}

fn non_empty_attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Text of the first element matching `selector` under `scope`: each text node
/// trimmed, blanks dropped, pieces joined with `separator`, inner whitespace
/// runs collapsed to a single space.
fn first_text(scope: ElementRef<'_>, selector: &Selector, separator: &str) -> String {
    let Some(el) = scope.select(selector).next() else {
        return String::new();
    };
    let joined = el
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator);
    WHITESPACE_RE.replace_all(&joined, " ").into_owned()
}

/// Keeps only the ASCII digits of a price label.
///
/// `"1.234 € VB"` becomes `"1234"`; a label without digits (`"Zu verschenken"`)
/// becomes the empty string.
#[must_use]
pub fn normalize_price(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
