//! Steeple: a location directory service for places of worship.
//!
//! The crate is organised around a small geospatial core:
//! - `geo`: conversion between latitude/longitude pairs and the stored
//!   point representation, plus the planar projection used for distances.
//! - `db`: SQL repositories for the church entity and the two search
//!   strategies (substring text search and radius-bounded proximity).
//! - `http`: the thin axum surface over the repositories.
//! - `ingest`: additive import of Overpass API exports.

pub mod config;
pub mod db;
pub mod geo;
pub mod http;
pub mod ingest;
pub mod model;
