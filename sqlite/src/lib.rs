//! SQLite persistence backend.
//!
//! [`SqliteStore`] implements [`KeyValueStore`](shellsense_db::KeyValueStore)
//! on top of a single prefixed table, so command history and recent
//! directories can live in an existing application database.
//!
//! # Quick start
//!
//! ```no_run
//! use shellsense_db::CommandHistory;
//! use shellsense_sqlite::SqliteStore;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("shellsense.db", "ss_")?;
//! let history = CommandHistory::load(&store, 500).await;
//! println!("{} commands remembered", history.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Table prefix customization
//!
//! The table name is prefixed with a configurable string, allowing several
//! isolated stores within the same SQLite database. Prefixes must contain
//! only alphanumeric characters and underscores.

mod error;
mod schema;
mod store;

pub use error::{Result, SqliteError};
pub use schema::{generate_drop_sql, generate_schema_sql};
pub use store::{SqliteStore, StoreStatus};
