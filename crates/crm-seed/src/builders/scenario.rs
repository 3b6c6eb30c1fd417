//! Fluent builder for seeding runs.

use std::time::{Duration, Instant};

use rand::Rng;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::config::{CountRatios, SeedConfig, derive_count};
use crate::db::{SeedError, Seeder};
use crate::generators::{
    CaseGenConfig, CaseGenerator, GenerateError, GeneratedCase, GeneratedLink,
    GeneratedOpportunity, GeneratedPartner, LinkGenerator, OpportunityGenerator, PartnerGenerator,
    PartnerRole,
};
use crate::store::SeedStore;

/// Result of building (and possibly seeding) a scenario.
#[derive(Debug)]
pub struct ScenarioResult {
    pub partners: Vec<GeneratedPartner>,
    pub opportunities: Vec<GeneratedOpportunity>,
    pub links: Vec<GeneratedLink>,
    pub cases: Vec<GeneratedCase>,
    /// Metrics from the run (populated if metrics tracking enabled).
    pub metrics: Option<ScenarioMetrics>,
}

impl ScenarioResult {
    /// Links with the main-borrower role.
    pub fn main_borrower_count(&self) -> usize {
        self.role_count(PartnerRole::MainBorrower)
    }

    /// Links with the co-borrower role.
    pub fn co_borrower_count(&self) -> usize {
        self.role_count(PartnerRole::CoBorrower)
    }

    fn role_count(&self, role: PartnerRole) -> usize {
        self.links.iter().filter(|l| l.role == role).count()
    }
}

/// Timing and count metrics from a run.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Time spent generating data (milliseconds).
    pub generation_time_ms: u64,
    /// Time spent seeding the store (milliseconds, 0 if build_data used).
    pub seeding_time_ms: u64,
    pub partner_count: usize,
    pub opportunity_count: usize,
    pub link_count: usize,
    pub co_borrower_count: usize,
    pub case_count: usize,
}

/// Builder for a complete seeding run.
///
/// # Example
///
/// ```rust,ignore
/// let result = ScenarioBuilder::new()
///     .with_opportunities(10_000)
///     .with_co_borrower_probability(0.4)
///     .with_metrics(true)
///     .build(&store, &mut rng)
///     .await?;
/// ```
pub struct ScenarioBuilder {
    opportunity_count: usize,
    ratios: CountRatios,
    partner_count: Option<usize>,
    case_count: Option<usize>,
    co_borrower_probability: f64,
    case_opportunity_probability: f64,
    base_time: Option<OffsetDateTime>,
    progress_interval: usize,
    track_metrics: bool,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            opportunity_count: 1_000,
            ratios: CountRatios::default(),
            partner_count: None,
            case_count: None,
            co_borrower_probability: 0.4,
            case_opportunity_probability: 0.6,
            base_time: None,
            progress_interval: 100_000,
            track_metrics: false,
        }
    }

    /// Creates a builder mirroring a loaded configuration.
    pub fn from_config(config: &SeedConfig) -> Self {
        Self::new()
            .with_opportunities(config.opportunity_count)
            .with_ratios(config.ratios)
            .with_co_borrower_probability(config.co_borrower_probability)
            .with_case_opportunity_probability(config.case_opportunity_probability)
            .with_progress_interval(config.progress_interval)
            .with_metrics(true)
    }

    /// Sets the number of opportunities. Partner and case counts derive from it.
    pub fn with_opportunities(mut self, count: usize) -> Self {
        self.opportunity_count = count;
        self
    }

    /// Sets the ratios used to derive partner and case counts.
    pub fn with_ratios(mut self, ratios: CountRatios) -> Self {
        self.ratios = ratios;
        self
    }

    /// Overrides the derived partner count.
    pub fn with_partners(mut self, count: usize) -> Self {
        self.partner_count = Some(count);
        self
    }

    /// Overrides the derived case count.
    pub fn with_cases(mut self, count: usize) -> Self {
        self.case_count = Some(count);
        self
    }

    pub fn with_co_borrower_probability(mut self, probability: f64) -> Self {
        self.co_borrower_probability = probability;
        self
    }

    pub fn with_case_opportunity_probability(mut self, probability: f64) -> Self {
        self.case_opportunity_probability = probability;
        self
    }

    /// Fixes "now" for date generation. Defaults to the current time.
    pub fn with_base_time(mut self, base_time: OffsetDateTime) -> Self {
        self.base_time = Some(base_time);
        self
    }

    /// Sets how many rows pass between progress log lines while seeding.
    pub fn with_progress_interval(mut self, rows: usize) -> Self {
        self.progress_interval = rows;
        self
    }

    /// Enables timing and count metrics on the result.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.track_metrics = enabled;
        self
    }

    pub fn opportunity_count(&self) -> usize {
        self.opportunity_count
    }

    /// Partner count: the override, or `round(ratio × opportunities)`.
    pub fn partner_count(&self) -> usize {
        self.partner_count.unwrap_or_else(|| {
            derive_count(self.opportunity_count, self.ratios.partners_per_opportunity)
        })
    }

    /// Case count: the override, or `round(ratio × opportunities)`.
    pub fn case_count(&self) -> usize {
        self.case_count.unwrap_or_else(|| {
            derive_count(self.opportunity_count, self.ratios.cases_per_opportunity)
        })
    }

    /// Checks that the partner pool can satisfy the link and case stages.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let partners = self.partner_count();

        let link_gen = self.link_generator();
        if self.opportunity_count > 0 && partners < link_gen.min_partners() {
            return Err(GenerateError::NotEnoughPartners {
                stage: "links",
                required: link_gen.min_partners(),
                available: partners,
            });
        }

        if self.case_count() > 0 && partners == 0 {
            return Err(GenerateError::NotEnoughPartners {
                stage: "cases",
                required: 1,
                available: 0,
            });
        }

        Ok(())
    }

    /// Generates all four stages without touching a store.
    pub fn build_data(&self, rng: &mut impl Rng) -> Result<ScenarioResult, GenerateError> {
        self.validate()?;
        let start = Instant::now();
        let base_time = self.base_time.unwrap_or_else(OffsetDateTime::now_utc);

        let partners = PartnerGenerator::new().generate_batch(self.partner_count(), rng);
        let opportunities =
            OpportunityGenerator::new().generate_batch(self.opportunity_count, base_time, rng);

        let partner_ids: Vec<Uuid> = partners.iter().map(|p| p.id).collect();
        let opportunity_ids: Vec<Uuid> = opportunities.iter().map(|o| o.id).collect();

        let links = self
            .link_generator()
            .generate_batch(&opportunity_ids, &partner_ids, rng)?;
        let cases = self.case_generator().generate_batch(
            self.case_count(),
            &partner_ids,
            &opportunity_ids,
            base_time,
            rng,
        )?;

        let mut result = ScenarioResult {
            partners,
            opportunities,
            links,
            cases,
            metrics: None,
        };
        if self.track_metrics {
            result.metrics = Some(collect_metrics(&result, start.elapsed(), Duration::ZERO));
        }

        Ok(result)
    }

    /// Generates and seeds each stage in dependency order.
    ///
    /// A stage is generated only after the previous one committed. The first
    /// error stops the run; stages committed before it stay in the store.
    pub async fn build(
        self,
        store: &dyn SeedStore,
        rng: &mut impl Rng,
    ) -> Result<ScenarioResult, SeedError> {
        self.validate()?;
        let base_time = self.base_time.unwrap_or_else(OffsetDateTime::now_utc);
        let seeder = Seeder::new(store).with_progress_interval(self.progress_interval);

        let mut generation = Duration::ZERO;
        let mut seeding = Duration::ZERO;

        let started = Instant::now();
        let partners = PartnerGenerator::new().generate_batch(self.partner_count(), rng);
        generation += started.elapsed();
        let started = Instant::now();
        seeder.seed_partners(&partners).await?;
        seeding += started.elapsed();

        let started = Instant::now();
        let opportunities =
            OpportunityGenerator::new().generate_batch(self.opportunity_count, base_time, rng);
        generation += started.elapsed();
        let started = Instant::now();
        seeder.seed_opportunities(&opportunities).await?;
        seeding += started.elapsed();

        let partner_ids: Vec<Uuid> = partners.iter().map(|p| p.id).collect();
        let opportunity_ids: Vec<Uuid> = opportunities.iter().map(|o| o.id).collect();

        let started = Instant::now();
        let links = self
            .link_generator()
            .generate_batch(&opportunity_ids, &partner_ids, rng)?;
        generation += started.elapsed();
        let started = Instant::now();
        seeder.seed_links(&links).await?;
        seeding += started.elapsed();

        let started = Instant::now();
        let cases = self.case_generator().generate_batch(
            self.case_count(),
            &partner_ids,
            &opportunity_ids,
            base_time,
            rng,
        )?;
        generation += started.elapsed();
        let started = Instant::now();
        seeder.seed_cases(&cases).await?;
        seeding += started.elapsed();

        let mut result = ScenarioResult {
            partners,
            opportunities,
            links,
            cases,
            metrics: None,
        };
        if self.track_metrics {
            let metrics = collect_metrics(&result, generation, seeding);
            info!(
                generation_ms = metrics.generation_time_ms,
                seeding_ms = metrics.seeding_time_ms,
                "Scenario timings"
            );
            result.metrics = Some(metrics);
        }

        Ok(result)
    }

    fn link_generator(&self) -> LinkGenerator {
        LinkGenerator::with_co_borrower_probability(self.co_borrower_probability)
    }

    fn case_generator(&self) -> CaseGenerator {
        CaseGenerator::with_config(CaseGenConfig {
            opportunity_probability: self.case_opportunity_probability,
            ..Default::default()
        })
    }
}

/// Preset scenarios.
impl ScenarioBuilder {
    /// Ten opportunities: 13 partners, 10 main borrowers, about 4 co-borrowers, 4 cases.
    pub fn smoke_test() -> Self {
        Self::new().with_opportunities(10).with_metrics(true)
    }

    /// Full-size run matching the production load test (one million opportunities).
    pub fn full_load() -> Self {
        Self::new()
            .with_opportunities(1_000_000)
            .with_progress_interval(100_000)
            .with_metrics(true)
    }
}

fn collect_metrics(
    result: &ScenarioResult,
    generation: Duration,
    seeding: Duration,
) -> ScenarioMetrics {
    ScenarioMetrics {
        generation_time_ms: generation.as_millis() as u64,
        seeding_time_ms: seeding.as_millis() as u64,
        partner_count: result.partners.len(),
        opportunity_count: result.opportunities.len(),
        link_count: result.links.len(),
        co_borrower_count: result.co_borrower_count(),
        case_count: result.cases.len(),
    }
}
