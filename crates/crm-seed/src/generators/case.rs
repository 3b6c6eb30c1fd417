//! Support case generation.

use rand::Rng;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::{GenerateError, random_id};

/// Case category matching the stored text values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseType {
    PaymentInquiry,
    Complaint,
    DocumentRequest,
}

impl CaseType {
    pub const ALL: [CaseType; 3] = [
        CaseType::PaymentInquiry,
        CaseType::Complaint,
        CaseType::DocumentRequest,
    ];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::PaymentInquiry => "Payment Inquiry",
            CaseType::Complaint => "Complaint",
            CaseType::DocumentRequest => "Document Request",
        }
    }
}

/// Case status matching the stored text values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    Open,
    Resolved,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 2] = [CaseStatus::Open, CaseStatus::Resolved];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "Open",
            CaseStatus::Resolved => "Resolved",
        }
    }
}

/// Agents cases get assigned to.
pub const ASSIGNEES: [&str; 3] = ["Susan Miller", "John Davis", "Lisa White"];

/// Generated case ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedCase {
    pub id: Uuid,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub summary: String,
    pub assigned_to: &'static str,
    pub created_at: OffsetDateTime,
    /// Set only for resolved cases.
    pub closed_at: Option<OffsetDateTime>,
    pub partner_id: Uuid,
    pub opportunity_id: Option<Uuid>,
}

/// Configuration for case generation.
#[derive(Debug, Clone)]
pub struct CaseGenConfig {
    /// Probability that a case references an opportunity.
    pub opportunity_probability: f64,
    /// Created dates fall up to this many days before the base time (exclusive).
    pub created_window_days: i64,
    /// Resolved cases close up to this many days after creation (exclusive).
    pub resolution_window_days: i64,
}

impl Default for CaseGenConfig {
    fn default() -> Self {
        Self {
            opportunity_probability: 0.6,
            created_window_days: 365,
            resolution_window_days: 15,
        }
    }
}

/// Generates support cases tied to partners and, sometimes, opportunities.
pub struct CaseGenerator {
    config: CaseGenConfig,
}

impl CaseGenerator {
    /// Creates a new case generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: CaseGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: CaseGenConfig) -> Self {
        Self { config }
    }

    /// Generates a single case. `partner_ids` must not be empty.
    pub fn generate(
        &self,
        partner_ids: &[Uuid],
        opportunity_ids: &[Uuid],
        base_time: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> GeneratedCase {
        let case_type = CaseType::ALL[rng.gen_range(0..CaseType::ALL.len())];
        let status = CaseStatus::ALL[rng.gen_range(0..CaseStatus::ALL.len())];
        let assigned_to = ASSIGNEES[rng.gen_range(0..ASSIGNEES.len())];

        let created_at =
            base_time - Duration::days(rng.gen_range(0..self.config.created_window_days));
        let closed_at = match status {
            CaseStatus::Resolved => Some(
                created_at + Duration::days(rng.gen_range(0..self.config.resolution_window_days)),
            ),
            CaseStatus::Open => None,
        };

        let partner_id = partner_ids[rng.gen_range(0..partner_ids.len())];
        let opportunity_id = if !opportunity_ids.is_empty()
            && rng.r#gen::<f64>() < self.config.opportunity_probability
        {
            Some(opportunity_ids[rng.gen_range(0..opportunity_ids.len())])
        } else {
            None
        };

        GeneratedCase {
            id: random_id(rng),
            case_type,
            status,
            summary: summary_for(case_type),
            assigned_to,
            created_at,
            closed_at,
            partner_id,
            opportunity_id,
        }
    }

    /// Generates `count` cases.
    pub fn generate_batch(
        &self,
        count: usize,
        partner_ids: &[Uuid],
        opportunity_ids: &[Uuid],
        base_time: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedCase>, GenerateError> {
        if count > 0 && partner_ids.is_empty() {
            return Err(GenerateError::NotEnoughPartners {
                stage: "cases",
                required: 1,
                available: 0,
            });
        }

        Ok((0..count)
            .map(|_| self.generate(partner_ids, opportunity_ids, base_time, rng))
            .collect())
    }
}

impl Default for CaseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary text for a case of the given type.
pub fn summary_for(case_type: CaseType) -> String {
    format!("Generated summary for {}.", case_type.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn ids(count: usize) -> Vec<Uuid> {
        (0..count).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_closed_iff_resolved() {
        let mut rng = StdRng::seed_from_u64(10);
        let cases = CaseGenerator::new()
            .generate_batch(
                1000,
                &ids(30),
                &ids(20),
                OffsetDateTime::now_utc(),
                &mut rng,
            )
            .unwrap();

        assert_eq!(cases.len(), 1000);
        for case in &cases {
            match case.status {
                CaseStatus::Resolved => {
                    let closed_at = case.closed_at.expect("resolved case without close date");
                    assert!(closed_at >= case.created_at);
                    assert!(closed_at - case.created_at < Duration::days(15));
                }
                CaseStatus::Open => assert!(case.closed_at.is_none()),
            }
            assert!(ASSIGNEES.contains(&case.assigned_to));
            assert_eq!(case.summary, summary_for(case.case_type));
        }
    }

    #[test]
    fn test_references_come_from_pools() {
        let mut rng = StdRng::seed_from_u64(11);
        let partners = ids(15);
        let opportunities = ids(12);
        let cases = CaseGenerator::new()
            .generate_batch(
                800,
                &partners,
                &opportunities,
                OffsetDateTime::now_utc(),
                &mut rng,
            )
            .unwrap();

        let partner_set: HashSet<_> = partners.iter().copied().collect();
        let opportunity_set: HashSet<_> = opportunities.iter().copied().collect();

        for case in &cases {
            assert!(partner_set.contains(&case.partner_id));
            if let Some(opp) = case.opportunity_id {
                assert!(opportunity_set.contains(&opp));
            }
        }

        // Binomial(800, 0.6): mean 480, sd ~13.9
        let linked = cases.iter().filter(|c| c.opportunity_id.is_some()).count();
        assert!((410..=550).contains(&linked), "linked cases: {linked}");
    }

    #[test]
    fn test_no_opportunities_means_no_reference() {
        let mut rng = StdRng::seed_from_u64(12);
        let cases = CaseGenerator::new()
            .generate_batch(50, &ids(3), &[], OffsetDateTime::now_utc(), &mut rng)
            .unwrap();

        assert!(cases.iter().all(|c| c.opportunity_id.is_none()));
    }

    #[test]
    fn test_requires_partners() {
        let mut rng = StdRng::seed_from_u64(13);
        let generator = CaseGenerator::new();

        let err = generator
            .generate_batch(1, &[], &ids(2), OffsetDateTime::now_utc(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, GenerateError::NotEnoughPartners { .. }));

        let cases = generator
            .generate_batch(0, &[], &[], OffsetDateTime::now_utc(), &mut rng)
            .unwrap();
        assert!(cases.is_empty());
    }

    #[test]
    fn test_summary_template() {
        assert_eq!(
            summary_for(CaseType::DocumentRequest),
            "Generated summary for Document Request."
        );
    }
}
