//! Loan opportunity generation.

use rand::Rng;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::random_id;

/// Loan process type matching the stored text values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessType {
    Mortgage,
    AutoLoan,
    PersonalLoan,
}

impl ProcessType {
    pub const ALL: [ProcessType; 3] = [
        ProcessType::Mortgage,
        ProcessType::AutoLoan,
        ProcessType::PersonalLoan,
    ];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Mortgage => "Mortgage",
            ProcessType::AutoLoan => "Auto Loan",
            ProcessType::PersonalLoan => "Personal Loan",
        }
    }
}

/// Opportunity lifecycle status matching the stored text values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpportunityStatus {
    InProgress,
    Approved,
    Rejected,
}

impl OpportunityStatus {
    pub const ALL: [OpportunityStatus; 3] = [
        OpportunityStatus::InProgress,
        OpportunityStatus::Approved,
        OpportunityStatus::Rejected,
    ];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStatus::InProgress => "In Progress",
            OpportunityStatus::Approved => "Approved",
            OpportunityStatus::Rejected => "Rejected",
        }
    }
}

/// Generated opportunity ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedOpportunity {
    pub id: Uuid,
    pub process_type: ProcessType,
    pub status: OpportunityStatus,
    pub requested_amount: f64,
    pub created_at: OffsetDateTime,
    pub closing_at: OffsetDateTime,
}

/// Configuration for opportunity generation.
#[derive(Debug, Clone)]
pub struct OpportunityGenConfig {
    /// Requested amount range, upper bound exclusive.
    pub amount_range: (u32, u32),
    /// Created dates fall up to this many days before the base time (exclusive).
    pub created_window_days: i64,
    /// Closing dates fall up to this many days after creation (exclusive).
    pub closing_window_days: i64,
}

impl Default for OpportunityGenConfig {
    fn default() -> Self {
        Self {
            amount_range: (1_000, 1_000_000),
            created_window_days: 365,
            closing_window_days: 60,
        }
    }
}

/// Generates loan opportunities.
///
/// Status and dates are drawn independently, so a rejected opportunity can
/// still carry a closing date.
pub struct OpportunityGenerator {
    config: OpportunityGenConfig,
}

impl OpportunityGenerator {
    /// Creates a new opportunity generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: OpportunityGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: OpportunityGenConfig) -> Self {
        Self { config }
    }

    /// Generates a single opportunity created before `base_time`.
    pub fn generate(&self, base_time: OffsetDateTime, rng: &mut impl Rng) -> GeneratedOpportunity {
        let process_type = ProcessType::ALL[rng.gen_range(0..ProcessType::ALL.len())];
        let status = OpportunityStatus::ALL[rng.gen_range(0..OpportunityStatus::ALL.len())];

        let (min_amount, max_amount) = self.config.amount_range;
        let requested_amount = f64::from(rng.gen_range(min_amount..max_amount));

        let created_at =
            base_time - Duration::days(rng.gen_range(0..self.config.created_window_days));
        let closing_at =
            created_at + Duration::days(rng.gen_range(0..self.config.closing_window_days));

        GeneratedOpportunity {
            id: random_id(rng),
            process_type,
            status,
            requested_amount,
            created_at,
            closing_at,
        }
    }

    /// Generates `count` opportunities.
    pub fn generate_batch(
        &self,
        count: usize,
        base_time: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedOpportunity> {
        (0..count).map(|_| self.generate(base_time, rng)).collect()
    }
}

impl Default for OpportunityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_batch() {
        let mut rng = StdRng::seed_from_u64(3);
        let base_time = OffsetDateTime::now_utc();
        let opportunities =
            OpportunityGenerator::new().generate_batch(1000, base_time, &mut rng);

        assert_eq!(opportunities.len(), 1000);

        for opp in &opportunities {
            assert!(opp.closing_at >= opp.created_at);
            assert!(opp.created_at <= base_time);
            assert!(opp.created_at > base_time - Duration::days(365));
            assert!(opp.closing_at - opp.created_at < Duration::days(60));
            assert!(opp.requested_amount >= 1_000.0);
            assert!(opp.requested_amount < 1_000_000.0);
            assert_eq!(opp.requested_amount.fract(), 0.0);
        }
    }

    #[test]
    fn test_all_enum_values_drawn() {
        let mut rng = StdRng::seed_from_u64(4);
        let opportunities =
            OpportunityGenerator::new().generate_batch(300, OffsetDateTime::now_utc(), &mut rng);

        for process_type in ProcessType::ALL {
            assert!(opportunities.iter().any(|o| o.process_type == process_type));
        }
        for status in OpportunityStatus::ALL {
            assert!(opportunities.iter().any(|o| o.status == status));
        }
    }

    #[test]
    fn test_db_strings() {
        assert_eq!(ProcessType::AutoLoan.as_str(), "Auto Loan");
        assert_eq!(OpportunityStatus::InProgress.as_str(), "In Progress");
    }
}
