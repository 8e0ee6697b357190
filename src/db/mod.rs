pub mod connection;
pub mod listings;

pub use connection::{init_db, Database, SCHEMA_SQL};
pub use listings::SqliteListingStore;
