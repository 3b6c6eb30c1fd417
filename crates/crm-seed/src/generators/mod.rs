//! Entity generators for seed data.
//!
//! Each generator produces one stage of a run:
//! - [`PartnerGenerator`]: business partners with unique contact details
//! - [`OpportunityGenerator`]: loan opportunities with amounts and dates
//! - [`LinkGenerator`]: main and co-borrower links between the two
//! - [`CaseGenerator`]: support cases referencing partners and opportunities

pub mod case;
pub mod link;
pub mod opportunity;
pub mod partner;

use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

pub use case::{CaseGenConfig, CaseGenerator, CaseStatus, CaseType, GeneratedCase};
pub use link::{GeneratedLink, LinkGenerator, PartnerRole};
pub use opportunity::{
    GeneratedOpportunity, OpportunityGenConfig, OpportunityGenerator, OpportunityStatus,
    ProcessType,
};
pub use partner::{GeneratedPartner, PartnerGenerator};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{stage} need at least {required} partner(s), got {available}")]
    NotEnoughPartners {
        stage: &'static str,
        required: usize,
        available: usize,
    },
}

/// Draws a v4 UUID from `rng` so seeded runs reproduce their identifiers.
pub fn random_id(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid()
}
