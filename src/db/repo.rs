use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::instrument;

use super::error::{Result, StoreError};
use super::model::ChurchRow;
use crate::geo;
use crate::model::{Church, ChurchPatch, NewChurch};

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> anyhow::Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // Enable WAL and stricter durability.
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous=FULL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the
/// parent directory exists. Leaves in-memory URLs and other schemes alone.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = url["sqlite:".len()..].trim_start_matches("//");
    let (path_part, query_part) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match path_part.strip_prefix("~/") {
        Some(tail) => match std::env::var("HOME") {
            Ok(home) => format!("{}/{}", home.trim_end_matches('/'), tail),
            Err(_) => path_part.to_string(),
        },
        None => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Translate a UNIQUE violation on insert into the duplicate-osm-id signal;
/// everything else stays a plain database error.
fn map_insert_error(err: sqlx::Error, osm_id: Option<i64>) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            if let Some(osm_id) = osm_id {
                return StoreError::DuplicateOsmId(osm_id);
            }
        }
    }
    StoreError::Database(err)
}

#[instrument(skip_all)]
pub async fn get_church(pool: &Pool, id: i64) -> Result<Church> {
    let row = sqlx::query_as::<_, ChurchRow>(
        "SELECT id, osm_id, name, denomination, religion, amenity, building, location, \
                address, phone, website, description, created_at, updated_at \
         FROM churches WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(ChurchRow::into_church)
        .ok_or(StoreError::NotFound(id))
}

#[instrument(skip_all)]
pub async fn list_churches(pool: &Pool, skip: i64, limit: i64) -> Result<Vec<Church>> {
    let rows = sqlx::query_as::<_, ChurchRow>(
        "SELECT id, osm_id, name, denomination, religion, amenity, building, location, \
                address, phone, website, description, created_at, updated_at \
         FROM churches LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ChurchRow::into_church).collect())
}

#[instrument(skip_all)]
pub async fn create_church(pool: &Pool, new: &NewChurch) -> Result<Church> {
    let mut tx = pool.begin().await?;
    let id = create_church_tx(&mut tx, new).await?;
    tx.commit().await?;
    get_church(pool, id).await
}

/// Transaction-scoped insert. The bulk loader uses this directly so it can
/// batch many inserts per commit.
pub async fn create_church_tx(tx: &mut Transaction<'_, Sqlite>, new: &NewChurch) -> Result<i64> {
    let location = geo::encode_point(new.latitude, new.longitude)?;
    let rec = sqlx::query(
        "INSERT INTO churches (osm_id, name, denomination, religion, amenity, building, \
                               location, address, phone, website, description) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(new.osm_id)
    .bind(&new.name)
    .bind(&new.denomination)
    .bind(&new.religion)
    .bind(&new.amenity)
    .bind(&new.building)
    .bind(&location)
    .bind(&new.address)
    .bind(&new.phone)
    .bind(&new.website)
    .bind(&new.description)
    .fetch_one(&mut **tx)
    .await
    .map_err(|err| map_insert_error(err, new.osm_id))?;
    Ok(rec.get("id"))
}

/// Apply a sparse patch: only fields present in `patch` are written, the
/// rest keep their stored values. Existence and the current point are read
/// before any mutation.
///
/// Location precedence: both coordinates patched means re-encode from the
/// patch alone; a single patched dimension is merged with the stored value
/// of the other dimension so the untouched one survives; no coordinates
/// leaves the location as is. The read-modify-write on the single-dimension
/// path is intentionally unguarded (no row lock, no version check); two
/// concurrent single-dimension updates can lose one dimension.
#[instrument(skip_all)]
pub async fn update_church(pool: &Pool, id: i64, patch: &ChurchPatch) -> Result<Church> {
    let mut tx = pool.begin().await?;
    let stored: Option<String> = sqlx::query_scalar("SELECT location FROM churches WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(stored) = stored else {
        return Err(StoreError::NotFound(id));
    };

    let location = match (patch.latitude, patch.longitude) {
        (Some(lat), Some(lon)) => Some(geo::encode_point(lat, lon)?),
        (None, None) => None,
        (lat, lon) => {
            // One dimension supplied: merge with the stored point. If the
            // stored point is unreadable the NaN fallback makes the encode
            // fail with an invalid-coordinate error instead of silently
            // fabricating a location.
            let (stored_lat, stored_lon) =
                geo::decode_point(&stored).unwrap_or((f64::NAN, f64::NAN));
            Some(geo::encode_point(
                lat.unwrap_or(stored_lat),
                lon.unwrap_or(stored_lon),
            )?)
        }
    };

    sqlx::query(
        "UPDATE churches SET \
            name = COALESCE(?, name), \
            denomination = COALESCE(?, denomination), \
            religion = COALESCE(?, religion), \
            amenity = COALESCE(?, amenity), \
            building = COALESCE(?, building), \
            address = COALESCE(?, address), \
            phone = COALESCE(?, phone), \
            website = COALESCE(?, website), \
            description = COALESCE(?, description), \
            location = COALESCE(?, location), \
            updated_at = CURRENT_TIMESTAMP \
         WHERE id = ?",
    )
    .bind(&patch.name)
    .bind(&patch.denomination)
    .bind(&patch.religion)
    .bind(&patch.amenity)
    .bind(&patch.building)
    .bind(&patch.address)
    .bind(&patch.phone)
    .bind(&patch.website)
    .bind(&patch.description)
    .bind(&location)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    get_church(pool, id).await
}

#[instrument(skip_all)]
pub async fn delete_church(pool: &Pool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM churches WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
