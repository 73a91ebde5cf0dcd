use crate::error::ApiError;
use crate::{PriceProvider, slice_range};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PriceBar, PriceSeries};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One line of a `date,open,high,low,close,volume` file.
///
/// Header names are matched case-insensitively for the common spellings,
/// extra columns such as `Adj Close` are ignored, and `null` cells (as
/// written by Yahoo's CSV export) read as missing.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open", default, deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(alias = "High", default, deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(alias = "Low", default, deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(alias = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(alias = "Volume", default, deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

/// Reads daily history from `<dir>/<TICKER>.csv`.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Parses a whole price file. Rows without a close are skipped; missing
/// open, high or low fall back to the close.
pub fn parse_price_csv(ticker: &str, contents: &str) -> Result<PriceSeries, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut bars = Vec::new();
    for record in reader.deserialize::<CsvRow>() {
        let row = record?;
        let Some(close) = row.close else {
            tracing::debug!(ticker, date = %row.date, "Skipping row without a close");
            continue;
        };
        bars.push(PriceBar {
            date: row.date,
            open: row.open.unwrap_or(close),
            high: row.high.unwrap_or(close),
            low: row.low.unwrap_or(close),
            close,
            volume: row.volume.unwrap_or(0.0),
        });
    }

    Ok(PriceSeries::new(ticker, bars)?)
}

#[async_trait]
impl PriceProvider for CsvPriceSource {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        let path = self.path_for(ticker);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(ticker, path = %path.display(), "No price file for ticker");
                return Err(ApiError::NoData(ticker.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let series = parse_price_csv(ticker, &contents)?;
        let sliced = slice_range(&series, start, end)?;
        tracing::info!(ticker, bars = sliced.len(), path = %path.display(), "Loaded daily history");
        Ok(sliced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn parses_lowercase_header() {
        let body = "date,open,high,low,close,volume\n\
                    2024-01-02,10,11,9,10.5,1000\n\
                    2024-01-03,10.5,12,10,11.5,1500\n";
        let series = parse_price_csv("AAA", body).unwrap();
        assert_eq!(series.closes(), vec![10.5, 11.5]);
        assert_eq!(series.bars()[1].volume, 1500.0);
    }

    #[test]
    fn parses_yahoo_export_with_nulls() {
        let body = "Date,Open,High,Low,Close,Adj Close,Volume\n\
                    2024-01-03,null,null,null,null,null,null\n\
                    2024-01-02,10,11,9,10.5,10.4,1000\n";
        let series = parse_price_csv("AAA", body).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first_date(), Some(date(1, 2)));
    }

    #[test]
    fn unsorted_rows_are_ordered() {
        let body = "date,close\n2024-01-05,3\n2024-01-03,1\n2024-01-04,2\n";
        let series = parse_price_csv("AAA", body).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.bars()[0].open, 1.0);
    }

    #[test]
    fn bad_date_is_a_csv_error() {
        let body = "date,close\nyesterday,3\n";
        assert!(matches!(parse_price_csv("AAA", body), Err(ApiError::Csv(_))));
    }

    #[tokio::test]
    async fn reads_ticker_file_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("TCS.NS.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-01,1,1,1,1,0\n\
             2024-01-02,2,2,2,2,0\n\
             2024-01-03,3,3,3,3,0\n",
        )
        .unwrap();

        let source = CsvPriceSource::new(dir.path());
        let series = source
            .fetch_daily_history("TCS.NS", date(1, 2), date(1, 31))
            .await
            .unwrap();
        assert_eq!(series.ticker(), "TCS.NS");
        assert_eq!(series.closes(), vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn missing_file_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvPriceSource::new(dir.path());
        let err = source
            .fetch_daily_history("MISSING.NS", date(1, 1), date(1, 31))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoData(_)));
    }
}
