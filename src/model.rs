use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A place of worship as exposed to callers: every read path returns the
/// stored point decoded into plain `latitude`/`longitude`. Both are `None`
/// only if the stored point cannot be read, which the schema rules out but
/// the decode path tolerates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Church {
    pub id: i64,
    pub osm_id: Option<i64>,
    pub name: Option<String>,
    pub denomination: Option<String>,
    pub religion: Option<String>,
    pub amenity: Option<String>,
    pub building: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Proximity search hit: the entity plus its projected distance from the
/// query point, in metres.
#[derive(Debug, Clone, Serialize)]
pub struct ChurchWithDistance {
    #[serde(flatten)]
    pub church: Church,
    pub distance_meters: f64,
}

/// Input for creating a church. Coordinates are mandatory; everything else
/// is optional metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewChurch {
    pub latitude: f64,
    pub longitude: f64,
    pub osm_id: Option<i64>,
    pub name: Option<String>,
    pub denomination: Option<String>,
    pub religion: Option<String>,
    pub amenity: Option<String>,
    pub building: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

/// Sparse patch for updates: only fields present in the payload are applied,
/// absent fields are left untouched. `osm_id` is immutable and therefore not
/// patchable. Supplying a single coordinate dimension is allowed; the
/// repository merges it with the stored value of the other dimension.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChurchPatch {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: Option<String>,
    pub denomination: Option<String>,
    pub religion: Option<String>,
    pub amenity: Option<String>,
    pub building: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}
