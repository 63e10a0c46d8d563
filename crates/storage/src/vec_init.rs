//! Loading sqlite-vec into pooled connections.
//!
//! `vec_distance_l2` is only available once the extension is registered as
//! an auto-extension, which has to happen before the pool connects.

use std::sync::Once;

use rusqlite::Connection;
use rusqlite::ffi::sqlite3_auto_extension;
use sqlite_vec::sqlite3_vec_init;

use crate::error::StorageError;

static REGISTER: Once = Once::new();

/// Adds sqlite-vec to every connection opened from now on. Idempotent.
#[allow(clippy::missing_transmute_annotations)]
pub(crate) fn register_sqlite_vec() {
    REGISTER.call_once(|| {
        // SAFETY: sqlite3_vec_init has the entry-point signature sqlite3_auto_extension expects.
        unsafe {
            sqlite3_auto_extension(Some(std::mem::transmute(sqlite3_vec_init as *const ())));
        }
    });
}

/// Version string reported by the extension on `conn`.
///
/// # Errors
/// Fails when sqlite-vec is not loaded on this connection.
pub(crate) fn extension_version(conn: &Connection) -> Result<String, StorageError> {
    Ok(conn.query_row("SELECT vec_version()", [], |row| row.get(0))?)
}
