use crate::db::{DbPool, OrmConn};

/// Shared handles cloned into every handler: the plain sqlx pool for
/// migrations and audit writes, the SeaORM connection for everything else.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn) -> Self {
        Self { pool, orm }
    }
}
