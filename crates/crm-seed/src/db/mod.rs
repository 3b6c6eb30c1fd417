//! Database integration for seeding.
//!
//! The [`Seeder`] writes each generated stage into a
//! [`SeedStore`](crate::store::SeedStore) as one atomic batch.

mod seeder;

pub use seeder::{Operation, SeedError, Seeder};
