//! Database module: entity models and SQL repositories.
//!
//! This module is split into four submodules:
//! - `error`: the typed error taxonomy surfaced by every store operation.
//! - `model`: row models that map SQL rows into decoded domain entities.
//! - `repo`: pool setup, migrations, and CRUD over the church table.
//! - `search`: the two read-only query strategies (text and proximity).
//!
//! External modules should import from `steeple::db` — we re-export the
//! repository and search APIs for convenience. The pool handle is created
//! once at process start by `init_pool` and passed by reference into every
//! function here; there is no ambient global connection.

pub mod error;
pub mod model;
pub mod repo;
pub mod search;

pub use error::StoreError;
pub use repo::*;
pub use search::*;
