//! Opportunity-partner link generation.

use rand::Rng;
use uuid::Uuid;

use super::GenerateError;

/// Role a partner plays on an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartnerRole {
    MainBorrower,
    CoBorrower,
}

impl PartnerRole {
    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerRole::MainBorrower => "Main Borrower",
            PartnerRole::CoBorrower => "Co-Borrower",
        }
    }

    /// Main borrowers are the primary partner on an opportunity.
    pub fn is_primary(&self) -> bool {
        matches!(self, PartnerRole::MainBorrower)
    }
}

/// Generated link row ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedLink {
    pub opportunity_id: Uuid,
    pub partner_id: Uuid,
    pub role: PartnerRole,
    pub is_primary: bool,
}

/// Attaches partners to opportunities.
///
/// Every opportunity gets one main borrower. With `co_borrower_probability`
/// it also gets a co-borrower drawn from the remaining partners, so the two
/// are always distinct.
pub struct LinkGenerator {
    co_borrower_probability: f64,
}

impl LinkGenerator {
    /// Creates a generator with the default 40% co-borrower rate.
    pub fn new() -> Self {
        Self {
            co_borrower_probability: 0.4,
        }
    }

    /// Creates a generator with a custom co-borrower probability.
    pub fn with_co_borrower_probability(probability: f64) -> Self {
        Self {
            co_borrower_probability: probability,
        }
    }

    /// Smallest partner pool this generator can draw from.
    pub fn min_partners(&self) -> usize {
        if self.co_borrower_probability > 0.0 { 2 } else { 1 }
    }

    /// Generates the links for a single opportunity.
    ///
    /// `partner_ids` must hold at least [`min_partners`](Self::min_partners) entries.
    pub fn generate_for_opportunity(
        &self,
        opportunity_id: Uuid,
        partner_ids: &[Uuid],
        rng: &mut impl Rng,
    ) -> Vec<GeneratedLink> {
        let pool = partner_ids.len();
        let main_idx = rng.gen_range(0..pool);

        let mut links = vec![GeneratedLink {
            opportunity_id,
            partner_id: partner_ids[main_idx],
            role: PartnerRole::MainBorrower,
            is_primary: true,
        }];

        if pool > 1 && rng.r#gen::<f64>() < self.co_borrower_probability {
            // Offset into the other pool - 1 slots, wrapping past the main borrower
            let co_idx = (main_idx + rng.gen_range(1..pool)) % pool;
            links.push(GeneratedLink {
                opportunity_id,
                partner_id: partner_ids[co_idx],
                role: PartnerRole::CoBorrower,
                is_primary: false,
            });
        }

        links
    }

    /// Generates links for every opportunity.
    pub fn generate_batch(
        &self,
        opportunity_ids: &[Uuid],
        partner_ids: &[Uuid],
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedLink>, GenerateError> {
        if opportunity_ids.is_empty() {
            return Ok(Vec::new());
        }

        if partner_ids.len() < self.min_partners() {
            return Err(GenerateError::NotEnoughPartners {
                stage: "links",
                required: self.min_partners(),
                available: partner_ids.len(),
            });
        }

        let mut links = Vec::with_capacity(opportunity_ids.len() * 3 / 2);
        for &opportunity_id in opportunity_ids {
            links.extend(self.generate_for_opportunity(opportunity_id, partner_ids, rng));
        }

        Ok(links)
    }
}

impl Default for LinkGenerator {
    fn default() -> Self {
        Self::new()
    }
}
