//! Fluent builder APIs for seeding runs.
//!
//! The [`ScenarioBuilder`] sizes a run, generates each stage and hands it to
//! the [`Seeder`](crate::db::Seeder).

mod scenario;

pub use scenario::{ScenarioBuilder, ScenarioMetrics, ScenarioResult};
