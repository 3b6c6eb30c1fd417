//! Persistence backends for seed data.
//!
//! A [`SeedStore`] hands out one [`StageBatch`] per stage. Rows inserted into
//! a batch become visible only once the batch commits; dropping the batch
//! discards them.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::db::SeedError;
use crate::generators::{GeneratedCase, GeneratedLink, GeneratedOpportunity, GeneratedPartner};

pub use memory::{FailurePoint, MemoryStore, MemoryTables};
pub use postgres::PgStore;

/// One of the four sequential seeding stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Partners,
    Opportunities,
    Links,
    Cases,
}

impl Stage {
    /// Stages in dependency order.
    pub const ALL: [Stage; 4] = [
        Stage::Partners,
        Stage::Opportunities,
        Stage::Links,
        Stage::Cases,
    ];

    /// Human-readable entity name for log lines.
    pub fn entity(&self) -> &'static str {
        match self {
            Stage::Partners => "business partners",
            Stage::Opportunities => "opportunities",
            Stage::Links => "opportunity-partner links",
            Stage::Cases => "cases",
        }
    }

    /// Unqualified table the stage writes to.
    pub fn table(&self) -> &'static str {
        match self {
            Stage::Partners => "business_partners",
            Stage::Opportunities => "opportunities",
            Stage::Links => "opportunity_partners",
            Stage::Cases => "cases",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity())
    }
}

/// A borrowed row headed for one of the stage tables.
#[derive(Debug, Clone, Copy)]
pub enum Row<'a> {
    Partner(&'a GeneratedPartner),
    Opportunity(&'a GeneratedOpportunity),
    Link(&'a GeneratedLink),
    Case(&'a GeneratedCase),
}

impl Row<'_> {
    /// The stage this row belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Row::Partner(_) => Stage::Partners,
            Row::Opportunity(_) => Stage::Opportunities,
            Row::Link(_) => Stage::Links,
            Row::Case(_) => Stage::Cases,
        }
    }
}

impl<'a> From<&'a GeneratedPartner> for Row<'a> {
    fn from(partner: &'a GeneratedPartner) -> Self {
        Row::Partner(partner)
    }
}

impl<'a> From<&'a GeneratedOpportunity> for Row<'a> {
    fn from(opportunity: &'a GeneratedOpportunity) -> Self {
        Row::Opportunity(opportunity)
    }
}

impl<'a> From<&'a GeneratedLink> for Row<'a> {
    fn from(link: &'a GeneratedLink) -> Self {
        Row::Link(link)
    }
}

impl<'a> From<&'a GeneratedCase> for Row<'a> {
    fn from(case: &'a GeneratedCase) -> Self {
        Row::Case(case)
    }
}

/// A backing store that accepts seed data in per-stage atomic batches.
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Opens the atomic batch for `stage`.
    async fn begin<'a>(&'a self, stage: Stage) -> Result<Box<dyn StageBatch + 'a>, SeedError>;
}

/// An open, uncommitted batch of inserts for one stage.
#[async_trait]
pub trait StageBatch: Send {
    /// Inserts one row. The row must belong to the batch's stage.
    async fn insert(&mut self, row: Row<'_>) -> Result<(), SeedError>;

    /// Makes every inserted row visible at once.
    async fn commit(self: Box<Self>) -> Result<(), SeedError>;
}
