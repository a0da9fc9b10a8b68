//! Read-only query strategies over the church table.
//!
//! Text search is a three-way OR substring match pushed down to SQL.
//! Proximity search cannot be pushed down (SQLite has no geodetic
//! transform), so it scans candidates, projects every stored point into Web
//! Mercator, and filters and orders on the planar distance in the
//! application. Semantics match a PostGIS `ST_DWithin`/`ST_Distance` pair
//! over `ST_Transform(location, 3857)`.

use tracing::instrument;

use super::error::Result;
use super::model::ChurchRow;
use super::repo::Pool;
use crate::geo;
use crate::model::{Church, ChurchWithDistance};

/// Case-insensitive substring search over `name`, `denomination` and
/// `address`. A row matches when the query occurs in any of the three; NULL
/// fields never match. Result order is store-default and not guaranteed.
#[instrument(skip_all)]
pub async fn search_churches(pool: &Pool, query: &str, limit: i64) -> Result<Vec<Church>> {
    let pattern = format!("%{query}%");
    // SQLite LIKE is case-insensitive for ASCII by default.
    let rows = sqlx::query_as::<_, ChurchRow>(
        "SELECT id, osm_id, name, denomination, religion, amenity, building, location, \
                address, phone, website, description, created_at, updated_at \
         FROM churches \
         WHERE name LIKE ? OR denomination LIKE ? OR address LIKE ? \
         LIMIT ?",
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ChurchRow::into_church).collect())
}

/// Radius-bounded proximity search, nearest first.
///
/// Both the query point and every candidate are projected into Web Mercator
/// before measuring; the radius boundary is inclusive. Ties keep the scan
/// order (stable sort). Rows whose stored point fails to decode are skipped.
#[instrument(skip_all)]
pub async fn find_nearby_churches(
    pool: &Pool,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    limit: i64,
) -> Result<Vec<ChurchWithDistance>> {
    let rows = sqlx::query_as::<_, ChurchRow>(
        "SELECT id, osm_id, name, denomination, religion, amenity, building, location, \
                address, phone, website, description, created_at, updated_at \
         FROM churches",
    )
    .fetch_all(pool)
    .await?;

    let origin = (latitude, longitude);
    let mut hits: Vec<ChurchWithDistance> = rows
        .into_iter()
        .filter_map(|row| {
            let point = geo::decode_point(&row.location)?;
            let distance = geo::projected_distance_m(origin, point);
            geo::within_radius(distance, radius_km).then(|| ChurchWithDistance {
                church: row.into_church(),
                distance_meters: distance,
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    hits.truncate(limit.max(0) as usize);
    Ok(hits)
}
