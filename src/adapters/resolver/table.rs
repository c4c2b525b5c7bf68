use crate::domain::model::{Coordinate, ZipCode};
use crate::domain::ports::CoordinateResolver;
use crate::utils::error::{GateError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ZipRow {
    #[serde(alias = "postal_code", alias = "zipcode")]
    zip: String,
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    longitude: f64,
}

/// In-memory ZIP centroid table.
#[derive(Debug, Clone, Default)]
pub struct ZipTable {
    centroids: HashMap<ZipCode, Coordinate>,
}

impl ZipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 CSV 檔案載入（欄位：zip,latitude,longitude）
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(&path)?;
        let table = Self::from_reader(file)?;
        tracing::info!(
            "Loaded {} ZIP centroids from {}",
            table.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut table = Self::new();
        let mut skipped = 0usize;

        for (index, row) in csv_reader.deserialize::<ZipRow>().enumerate() {
            let parsed = row.map_err(GateError::from).and_then(|row| {
                let zip = ZipCode::parse(&restore_leading_zeros(&row.zip))?;
                let coordinate = Coordinate::new(row.latitude, row.longitude)?;
                Ok((zip, coordinate))
            });

            match parsed {
                Ok((zip, coordinate)) => {
                    table.insert(zip, coordinate);
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Skipping ZIP table row {}: {}", index + 2, e);
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("{} ZIP table rows skipped", skipped);
        }
        Ok(table)
    }

    pub fn insert(&mut self, zip: ZipCode, coordinate: Coordinate) -> Option<Coordinate> {
        self.centroids.insert(zip, coordinate)
    }

    pub fn get(&self, zip: &ZipCode) -> Option<Coordinate> {
        self.centroids.get(zip).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.centroids.len()
    }
}

// Spreadsheet exports drop leading zeros ("7001" for 07001).
fn restore_leading_zeros(raw: &str) -> String {
    if (3..5).contains(&raw.len()) && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("{:0>5}", raw)
    } else {
        raw.to_string()
    }
}

#[async_trait]
impl CoordinateResolver for ZipTable {
    async fn resolve(&self, zip: &ZipCode) -> Result<Coordinate> {
        self.get(zip).ok_or_else(|| GateError::UnknownZip {
            zip: zip.to_string(),
        })
    }
}
