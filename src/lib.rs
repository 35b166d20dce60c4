//! moundmusic: REST backend for a music catalog and record marketplace.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod record;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{init_tracing, Settings};
pub use dispatch::{Call, MethodTable, Verb};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use record::{FieldValue, Fields, Record};
pub use response::Reply;
pub use routes::{app, catalog_routes, common_routes};
pub use state::AppState;
pub use store::{ensure_database_exists, InMemoryStore, PgStore, Store, StoreError};
