//! Seed data loading
//!
//! Inserts the initial committee logos and access policies. The two routines
//! are independent of each other and run concurrently; the first failure
//! aborts the whole run. There is no retry logic.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::fs;
use uuid::Uuid;

use crate::config::SeedConfig;
use crate::db::connection::DatabaseConnection;
use crate::error::{Error, Result};

/// A committee logo row from the seed file
#[derive(Debug, Clone, Deserialize)]
pub struct CommitteeLogo {
    pub committee: String,
    pub logo_url: String,
}

/// An access policy row from the seed file
#[derive(Debug, Clone, Deserialize)]
pub struct AccessPolicy {
    pub role: String,
    pub resource: String,
}

/// One independent seed insertion routine
#[async_trait]
pub trait SeedRoutine: Send + Sync {
    /// Routine name, used in logs
    fn name(&self) -> &'static str;

    /// Insert this routine's rows through the given connection
    async fn insert(&self, connection: &DatabaseConnection) -> Result<()>;
}

/// Seed routine for committee logos
pub struct CommitteeLogos {
    rows: Vec<CommitteeLogo>,
}

impl CommitteeLogos {
    /// Load committee logo rows from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let rows: Vec<CommitteeLogo> = serde_json::from_str(&raw)?;
        Ok(Self { rows })
    }
}

#[async_trait]
impl SeedRoutine for CommitteeLogos {
    fn name(&self) -> &'static str {
        "committee_logos"
    }

    async fn insert(&self, connection: &DatabaseConnection) -> Result<()> {
        for row in &self.rows {
            connection.execute(&committee_insert_sql(row)).await?;
        }
        tracing::info!(rows = self.rows.len(), "Inserted committee logos");
        Ok(())
    }
}

/// Seed routine for access policies
pub struct AccessPolicies {
    rows: Vec<AccessPolicy>,
}

impl AccessPolicies {
    /// Load access policy rows from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let rows: Vec<AccessPolicy> = serde_json::from_str(&raw)?;
        Ok(Self { rows })
    }
}

#[async_trait]
impl SeedRoutine for AccessPolicies {
    fn name(&self) -> &'static str {
        "access_policies"
    }

    async fn insert(&self, connection: &DatabaseConnection) -> Result<()> {
        for row in &self.rows {
            connection.execute(&access_policy_insert_sql(row)).await?;
        }
        tracing::info!(rows = self.rows.len(), "Inserted access policies");
        Ok(())
    }
}

/// Load both seed files and run their insertions concurrently.
///
/// The routines have no ordering dependency and share no mutable state; the
/// connection is borrowed by both for the duration of the run.
pub async fn run_seed(connection: &DatabaseConnection, config: &SeedConfig) -> Result<()> {
    let committees = CommitteeLogos::from_file(&config.committees_file)?;
    let policies = AccessPolicies::from_file(&config.access_policies_file)?;

    tracing::info!("Start seeding");
    futures::try_join!(
        run_routine(&committees, connection),
        run_routine(&policies, connection),
    )?;
    tracing::info!("Seeding finished");

    Ok(())
}

async fn run_routine(routine: &dyn SeedRoutine, connection: &DatabaseConnection) -> Result<()> {
    tracing::debug!(routine = routine.name(), "Running seed routine");
    routine
        .insert(connection)
        .await
        .map_err(|e| Error::SeedError(format!("{} failed: {}", routine.name(), e)))
}

fn committee_insert_sql(row: &CommitteeLogo) -> String {
    format!(
        "INSERT INTO committees (id, name, logo_url, created_at) VALUES ('{}', '{}', '{}', '{}')",
        Uuid::new_v4(),
        escape(&row.committee),
        escape(&row.logo_url),
        Utc::now().to_rfc3339(),
    )
}

fn access_policy_insert_sql(row: &AccessPolicy) -> String {
    format!(
        "INSERT INTO access_policies (id, role, resource, created_at) VALUES ('{}', '{}', '{}', '{}')",
        Uuid::new_v4(),
        escape(&row.role),
        escape(&row.resource),
        Utc::now().to_rfc3339(),
    )
}

/// Double single quotes so a value can sit inside a quoted SQL literal
fn escape(value: &str) -> String {
    value.replace('\'', "''")
}
