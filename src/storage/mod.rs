//! Tabular output sink.
//!
//! Multiple workers append concurrently, so all writes go through one mutex —
//! single-writer discipline over the shared CSV file.

use crate::models::ProductRecord;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Output layout: one file for many products, or the two-column layout used
/// when scraping a single product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    /// Header `title,brand,date,price`.
    MultiProduct,
    /// Header `Date,Price`.
    SingleProduct,
}

pub struct CsvSink {
    writer: Mutex<csv::Writer<std::fs::File>>,
    mode: SinkMode,
}

impl CsvSink {
    /// Create (truncate) the output file and write the header row.
    pub fn create(path: &Path, mode: SinkMode) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Could not create dir {:?}", parent))?;
            }
        }

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to open output CSV at {:?}", path))?;

        match mode {
            SinkMode::MultiProduct => writer.write_record(["title", "brand", "date", "price"])?,
            SinkMode::SingleProduct => writer.write_record(["Date", "Price"])?,
        }

        Ok(Self { writer: Mutex::new(writer), mode })
    }

    /// Append one row per price point. Returns the number of rows written.
    pub fn append_record(&self, record: &ProductRecord) -> Result<usize> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("csv writer lock poisoned"))?;
        write_rows(&mut writer, self.mode, record)
    }

    pub fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .map_err(|_| anyhow::anyhow!("csv writer lock poisoned"))?
            .flush()?;
        Ok(())
    }
}

fn write_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    mode: SinkMode,
    record: &ProductRecord,
) -> Result<usize> {
    for point in &record.series {
        match mode {
            SinkMode::MultiProduct => writer.write_record([
                record.title.as_str(),
                record.brand.as_str(),
                point.date.as_str(),
                fmt_price(point.price).as_str(),
            ])?,
            SinkMode::SingleProduct => {
                writer.write_record([point.date.as_str(), fmt_price(point.price).as_str()])?
            }
        }
    }
    Ok(record.series.len())
}

/// Whole-number prices print without a trailing ".0" so the file matches what
/// the site's charts show.
fn fmt_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < i64::MAX as f64 {
        format!("{}", price as i64)
    } else {
        format!("{}", price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PricePoint, SeriesSource};
    use chrono::Utc;

    fn record(title: &str, points: Vec<PricePoint>) -> ProductRecord {
        ProductRecord {
            title: title.to_string(),
            brand: title.split_whitespace().next().unwrap_or("?").to_string(),
            series: points,
            source: SeriesSource::PageSource,
            scraped_at: Utc::now().naive_utc(),
        }
    }

    fn render(mode: SinkMode, record: &ProductRecord) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_rows(&mut writer, mode, record).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn multi_product_rows() {
        let rec = record(
            "Samsung Galaxy S23",
            vec![
                PricePoint::new("2023-01-01", 999.0),
                PricePoint::new("2023-01-08", 949.5),
            ],
        );
        let out = render(SinkMode::MultiProduct, &rec);
        assert_eq!(
            out,
            "Samsung Galaxy S23,Samsung,2023-01-01,999\n\
             Samsung Galaxy S23,Samsung,2023-01-08,949.5\n"
        );
    }

    #[test]
    fn single_product_rows() {
        let rec = record("X", vec![PricePoint::new("2023-01-01", 100.0)]);
        assert_eq!(render(SinkMode::SingleProduct, &rec), "2023-01-01,100\n");
    }

    #[test]
    fn embedded_commas_are_quoted() {
        let rec = record("Phone, 256GB", vec![PricePoint::new("2023-01-01", 1.0)]);
        let out = render(SinkMode::MultiProduct, &rec);
        assert!(out.starts_with("\"Phone, 256GB\","));
    }

    #[test]
    fn test_fmt_price() {
        assert_eq!(fmt_price(999.0), "999");
        assert_eq!(fmt_price(949.5), "949.5");
        assert_eq!(fmt_price(0.0), "0");
    }
}
