//! Postgres persistence for the chairside scheduling service.

pub mod db;
pub mod error;
pub mod model;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Schema migrations, embedded so deployments can apply them with the
/// diesel harness without shipping the SQL separately.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
