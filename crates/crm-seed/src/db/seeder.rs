//! Database seeding utilities.

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::ConfigError;
use crate::generators::{
    GenerateError, GeneratedCase, GeneratedLink, GeneratedOpportunity, GeneratedPartner,
};
use crate::store::{Row, SeedStore, Stage};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Cannot reach database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),
    #[error("Invalid schema name: {0:?}")]
    InvalidSchema(String),
    #[error("Store rejected row {row} of {stage}")]
    Rejected { stage: Stage, row: usize },
    #[error("{actual} row sent to the {expected} batch")]
    StageMismatch { expected: Stage, actual: Stage },
    #[error("Seeding {stage} failed during {operation}: {source}")]
    Stage {
        stage: Stage,
        operation: Operation,
        #[source]
        source: Box<SeedError>,
    },
}

impl SeedError {
    /// Attaches the failing stage and operation.
    pub fn in_stage(self, stage: Stage, operation: Operation) -> Self {
        SeedError::Stage {
            stage,
            operation,
            source: Box::new(self),
        }
    }

    /// The stage that failed, if the error came from a stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SeedError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Step of a stage's batch that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Begin,
    /// 1-based row number within the stage.
    Insert { row: usize },
    Commit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Begin => f.write_str("begin"),
            Operation::Insert { row } => write!(f, "insert of row {row}"),
            Operation::Commit => f.write_str("commit"),
        }
    }
}

/// Writes generated records into a [`SeedStore`], one atomic batch per stage.
pub struct Seeder<'s> {
    store: &'s dyn SeedStore,
    progress_interval: usize,
}

impl<'s> Seeder<'s> {
    /// Creates a new seeder over the given store.
    pub fn new(store: &'s dyn SeedStore) -> Self {
        Self {
            store,
            progress_interval: 100_000,
        }
    }

    /// Sets how many rows pass between progress log lines.
    pub fn with_progress_interval(mut self, rows: usize) -> Self {
        self.progress_interval = rows.max(1);
        self
    }

    /// Seeds business partners.
    pub async fn seed_partners(&self, partners: &[GeneratedPartner]) -> Result<(), SeedError> {
        self.seed_stage(Stage::Partners, partners).await
    }

    /// Seeds opportunities.
    pub async fn seed_opportunities(
        &self,
        opportunities: &[GeneratedOpportunity],
    ) -> Result<(), SeedError> {
        self.seed_stage(Stage::Opportunities, opportunities).await
    }

    /// Seeds opportunity-partner links.
    pub async fn seed_links(&self, links: &[GeneratedLink]) -> Result<(), SeedError> {
        self.seed_stage(Stage::Links, links).await
    }

    /// Seeds cases.
    pub async fn seed_cases(&self, cases: &[GeneratedCase]) -> Result<(), SeedError> {
        self.seed_stage(Stage::Cases, cases).await
    }

    /// Inserts all rows of one stage inside a single batch.
    ///
    /// The first failure drops the batch, discarding every row of the stage.
    async fn seed_stage<'a, T>(&self, stage: Stage, rows: &'a [T]) -> Result<(), SeedError>
    where
        &'a T: Into<Row<'a>>,
    {
        info!("Seeding {} {}...", rows.len(), stage);

        let mut batch = self
            .store
            .begin(stage)
            .await
            .map_err(|e| e.in_stage(stage, Operation::Begin))?;

        for (i, row) in rows.iter().enumerate() {
            if let Err(e) = batch.insert(row.into()).await {
                warn!("Rolling back {} after {} of {} rows", stage, i, rows.len());
                return Err(e.in_stage(stage, Operation::Insert { row: i + 1 }));
            }

            if (i + 1) % self.progress_interval == 0 {
                info!("  Seeded {}/{} {}", i + 1, rows.len(), stage);
            }
        }

        batch
            .commit()
            .await
            .map_err(|e| e.in_stage(stage, Operation::Commit))?;

        info!("Seeded {} {}", rows.len(), stage);
        Ok(())
    }
}
