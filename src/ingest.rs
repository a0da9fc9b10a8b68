//! Additive import of an Overpass API JSON export.
//!
//! The loader never updates existing rows: records whose `osm_id` is already
//! present are skipped, as are non-node elements, elements missing the
//! configured category tags, and nodes without coordinates. Inserts are
//! committed in batches for throughput. Per-record failures are logged and
//! counted as skipped; a transport failure aborts the run.

use std::collections::HashMap;

use anyhow::Result;
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::{self, Pool, StoreError};
use crate::model::NewChurch;

/// Inserts per commit.
const BATCH_SIZE: u64 = 100;

/// Top-level shape of an Overpass API export.
#[derive(Debug, Deserialize)]
pub struct OverpassDump {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// A single Overpass element. Only `node` elements carry coordinates.
#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Tag pair selecting the subset of the dump to import.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    pub amenity: String,
    pub religion: String,
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self {
            amenity: "place_of_worship".into(),
            religion: "christian".into(),
        }
    }
}

/// Outcome counts of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: u64,
    pub skipped: u64,
}

pub fn parse_dump(raw: &str) -> Result<OverpassDump, serde_json::Error> {
    serde_json::from_str(raw)
}

impl OverpassElement {
    fn matches(&self, filter: &CategoryFilter) -> bool {
        self.kind == "node"
            && self.tags.get("amenity").map(String::as_str) == Some(filter.amenity.as_str())
            && self.tags.get("religion").map(String::as_str) == Some(filter.religion.as_str())
    }

    /// Build the create input; `None` when coordinates are missing.
    fn to_new_church(&self) -> Option<NewChurch> {
        let latitude = self.lat?;
        let longitude = self.lon?;
        Some(NewChurch {
            latitude,
            longitude,
            osm_id: Some(self.id),
            name: self.tags.get("name").cloned(),
            denomination: self.tags.get("denomination").cloned(),
            religion: self.tags.get("religion").cloned(),
            amenity: self.tags.get("amenity").cloned(),
            building: self.tags.get("building").cloned(),
            address: self
                .tags
                .get("addr:full")
                .or_else(|| self.tags.get("addr:street"))
                .cloned(),
            phone: self.tags.get("phone").cloned(),
            website: self.tags.get("website").cloned(),
            description: self.tags.get("description").cloned(),
        })
    }
}

/// Import every matching record of `dump` that is not already present.
pub async fn import_dump(
    pool: &Pool,
    dump: &OverpassDump,
    filter: &CategoryFilter,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let mut tx = pool.begin().await?;

    for element in &dump.elements {
        if !element.matches(filter) {
            continue;
        }
        let Some(new) = element.to_new_church() else {
            report.skipped += 1;
            continue;
        };

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM churches WHERE osm_id = ?")
            .bind(element.id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            report.skipped += 1;
            continue;
        }

        match db::create_church_tx(&mut tx, &new).await {
            Ok(_) => {
                report.added += 1;
                if report.added % BATCH_SIZE == 0 {
                    tx.commit().await?;
                    info!(added = report.added, "committed batch");
                    tx = pool.begin().await?;
                }
            }
            // Transport failures abort the whole run; anything else is a
            // bad record, logged and skipped.
            Err(StoreError::Database(err)) => return Err(err.into()),
            Err(err) => {
                warn!(osm_id = element.id, %err, "skipping record");
                report.skipped += 1;
            }
        }
    }

    tx.commit().await?;
    Ok(report)
}
