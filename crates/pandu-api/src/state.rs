use std::sync::Arc;

use chrono::FixedOffset;

use pandu_db::Database;
use pandu_types::models::Role;

pub type AppState = Arc<AppStateInner>;

/// Everything a handler needs, constructed once at startup and passed
/// explicitly. Nothing in the API layer reads the environment.
pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Fixed portal timezone; attendance days are computed in it.
    pub tz_offset: FixedOffset,
    /// Minimum role allowed to append ledger entries (admin by default,
    /// relaxable to moderator by configuration).
    pub ledger_write_role: Role,
}
