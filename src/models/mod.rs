use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const UNKNOWN_BRAND: &str = "Unknown Brand";

// ── Price point ───────────────────────────────────────────────────────────────

/// One point of a product's price history. `date` is kept as the source label
/// (ISO "YYYY-MM-DD" when we produce it ourselves, whatever the chart shipped
/// otherwise) — the pipeline never re-sorts or re-formats source labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: impl Into<String>, price: f64) -> Self {
        Self { date: date.into(), price }
    }
}

pub type PriceSeries = Vec<PricePoint>;

// ── Product record ────────────────────────────────────────────────────────────

/// Which extraction method produced the series. `Synthetic` output is
/// placeholder data and must never be treated as observed prices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeriesSource {
    Script,
    PageSource,
    NetworkLog,
    Synthetic,
}

impl SeriesSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::PageSource => "page-source",
            Self::NetworkLog => "network-log",
            Self::Synthetic => "synthetic",
        }
    }
}

/// Final per-URL result: built once by the pipeline, then handed to the sink
/// immutably. Brand is derived from the title at extraction time and never
/// recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub title: String,
    pub brand: String,
    pub series: PriceSeries,
    pub source: SeriesSource,
    pub scraped_at: NaiveDateTime,
}
