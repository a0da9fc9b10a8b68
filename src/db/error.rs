use thiserror::Error;

use crate::geo::GeoError;

/// Error taxonomy for store operations. Nothing here is retried or
/// swallowed; every variant propagates to the caller unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced church id does not exist.
    #[error("church {0} not found")]
    NotFound(i64),
    /// Create would violate the unique constraint on `osm_id`.
    #[error("a church with osm id {0} already exists")]
    DuplicateOsmId(i64),
    /// A coordinate failed the codec's finiteness check.
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),
    /// Transport or constraint failure from the backing store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
