//! schema_tidy: utilities for a Prisma schema definition workflow
//!
//! Two small tools behind one CLI: a casing rewriter that converts a
//! snake_case Prisma schema to the casing Prisma recommends (pinning every
//! rename to its stored name with map directives), and a seed loader that
//! inserts the initial committee logos and access policies.

pub mod config;
pub mod db;
pub mod error;
pub mod rewrite;
pub mod utils;

// Re-export main types for easier access
pub use config::Config;
pub use db::connection::DatabaseConnection;
pub use error::{Error, Result};
pub use rewrite::engine::{RewriteStats, SchemaRewriter};

/// Rewrite the configured schema file in place and report what changed.
pub fn rewrite_schema(config: &Config) -> Result<RewriteStats> {
    let rewriter = SchemaRewriter::new();
    let stats = rewriter.rewrite_file(&config.schema.path)?;

    tracing::info!(
        path = config.schema.path.as_str(),
        renamed_models = stats.renamed_models.len(),
        dropped_models = stats.dropped_models,
        remapped_fields = stats.remapped_fields,
        "Schema rewrite complete"
    );

    Ok(stats)
}

/// Connect to the database, run the seed routines, and disconnect.
///
/// The connection is constructed here and passed into the routines; it is
/// closed on the success and failure paths alike before the outcome
/// propagates.
pub async fn seed_database(config: &Config) -> Result<()> {
    let database = config
        .database
        .as_ref()
        .ok_or_else(|| Error::ConfigError("seeding requires a [database] section".to_string()))?;
    let seed = config
        .seed
        .as_ref()
        .ok_or_else(|| Error::ConfigError("seeding requires a [seed] section".to_string()))?;

    let connection = DatabaseConnection::connect(database).await?;
    let outcome = db::seed::run_seed(&connection, seed).await;
    connection.close().await;

    outcome
}
