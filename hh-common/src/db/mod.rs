//! Database initialization, migrations and models

pub mod init;
pub mod migrations;
pub mod models;

pub use init::*;
pub use migrations::{get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION};
pub use models::*;
