//! Synthetic data seeding for the loan CRM.
//!
//! This crate generates business partners, loan opportunities, the links
//! between them and support cases, then loads each of the four stages into
//! the database as a single transaction.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use crm_seed::prelude::*;
//!
//! let config = SeedConfig::load()?;
//! let store = PgStore::connect(&config).await?;
//!
//! let result = ScenarioBuilder::from_config(&config)
//!     .build(&store, &mut rng)
//!     .await?;
//! ```

pub mod builders;
pub mod config;
pub mod db;
pub mod generators;
pub mod store;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{ScenarioBuilder, ScenarioMetrics, ScenarioResult};
    pub use crate::config::{ConfigError, CountRatios, SeedConfig};
    pub use crate::db::{Operation, SeedError, Seeder};
    pub use crate::generators::{
        CaseGenerator, CaseStatus, CaseType, GenerateError, LinkGenerator, OpportunityGenerator,
        OpportunityStatus, PartnerGenerator, PartnerRole, ProcessType,
    };
    pub use crate::store::{MemoryStore, PgStore, SeedStore, Stage};
}
