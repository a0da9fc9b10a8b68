//! Database row models used by repositories.
//!
//! `ChurchRow` is the raw SQL shape with the EWKT `location` text; callers
//! never see it. Decoding into the domain entity happens exactly once, at
//! the edge of every read path.

use chrono::{DateTime, Utc};

use crate::geo;
use crate::model::Church;

/// One row of the `churches` table, location still encoded.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChurchRow {
    pub id: i64,
    pub osm_id: Option<i64>,
    pub name: Option<String>,
    pub denomination: Option<String>,
    pub religion: Option<String>,
    pub amenity: Option<String>,
    pub building: Option<String>,
    pub location: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChurchRow {
    /// Decode the stored point and produce the caller-facing entity. An
    /// unreadable point surfaces as absent coordinates rather than an error.
    pub fn into_church(self) -> Church {
        let coords = geo::decode_point(&self.location);
        Church {
            id: self.id,
            osm_id: self.osm_id,
            name: self.name,
            denomination: self.denomination,
            religion: self.religion,
            amenity: self.amenity,
            building: self.building,
            address: self.address,
            phone: self.phone,
            website: self.website,
            description: self.description,
            latitude: coords.map(|(lat, _)| lat),
            longitude: coords.map(|(_, lon)| lon),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
