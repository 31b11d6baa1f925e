//! Title and brand extraction, independent of price-series extraction.

use crate::models::{UNKNOWN_BRAND, UNKNOWN_PRODUCT};
use scraper::{Html, Selector};

/// Selector cascade for the product title, most specific first.
const TITLE_SELECTORS: [&str; 4] =
    ["h1", ".product-title", r#"[class*="title"]"#, r#"[class*="product-name"]"#];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    pub title: String,
    pub brand: String,
}

impl Default for ProductInfo {
    fn default() -> Self {
        Self { title: UNKNOWN_PRODUCT.to_string(), brand: UNKNOWN_BRAND.to_string() }
    }
}

/// Pull title and brand out of a product page. Falls back to the og:title meta
/// field, then to placeholder defaults. Never fails.
pub fn extract_product_info(html: &str) -> ProductInfo {
    let doc = Html::parse_document(html);

    let title = title_from_selectors(&doc)
        .or_else(|| og_title(&doc))
        .filter(|t| !t.is_empty());

    match title {
        Some(title) => {
            let brand = brand_from_title(&title).unwrap_or_else(|| UNKNOWN_BRAND.to_string());
            ProductInfo { title, brand }
        }
        None => ProductInfo::default(),
    }
}

fn title_from_selectors(doc: &Html) -> Option<String> {
    for sel_str in &TITLE_SELECTORS {
        let Ok(sel) = Selector::parse(sel_str) else { continue };
        if let Some(el) = doc.select(&sel).next() {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn og_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse(r#"meta[property="og:title"]"#).ok()?;
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
}

/// First whitespace token of the title with punctuation stripped. Heuristic:
/// multi-word brands ("Samsung Galaxy" the brand vs "Samsung" the token) are
/// not disambiguated, by design.
pub fn brand_from_title(title: &str) -> Option<String> {
    let first = title.split_whitespace().next()?;
    let cleaned: String = first
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h1_wins_over_meta() {
        let html = r#"
            <html><head><meta property="og:title" content="Meta Name"></head>
            <body><h1>Samsung Galaxy S23 5G</h1></body></html>
        "#;
        let info = extract_product_info(html);
        assert_eq!(info.title, "Samsung Galaxy S23 5G");
        assert_eq!(info.brand, "Samsung");
    }

    #[test]
    fn falls_back_to_og_title() {
        let html = r#"
            <html><head><meta property="og:title" content="Xiaomi Redmi Note 12"></head>
            <body><p>no headings here</p></body></html>
        "#;
        let info = extract_product_info(html);
        assert_eq!(info.title, "Xiaomi Redmi Note 12");
        assert_eq!(info.brand, "Xiaomi");
    }

    #[test]
    fn class_substring_selector_matches() {
        let html = r#"<div class="prd-title-main">OnePlus 11R</div>"#;
        let info = extract_product_info(html);
        assert_eq!(info.title, "OnePlus 11R");
        assert_eq!(info.brand, "OnePlus");
    }

    #[test]
    fn defaults_when_nothing_matches() {
        let info = extract_product_info("<html><body></body></html>");
        assert_eq!(info.title, UNKNOWN_PRODUCT);
        assert_eq!(info.brand, UNKNOWN_BRAND);
    }

    #[test]
    fn brand_is_first_token() {
        assert_eq!(brand_from_title("Samsung Galaxy S23"), Some("Samsung".into()));
    }

    #[test]
    fn brand_strips_punctuation() {
        assert_eq!(brand_from_title("«Apple» iPhone"), Some("Apple".into()));
        assert_eq!(brand_from_title("(Renewed)"), Some("Renewed".into()));
    }

    #[test]
    fn all_punctuation_token_yields_none() {
        assert_eq!(brand_from_title("*** Phone"), None);
        assert_eq!(brand_from_title(""), None);
    }
}
