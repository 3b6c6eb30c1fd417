//! In-process store used for dry runs and tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Row, SeedStore, Stage, StageBatch};
use crate::db::SeedError;
use crate::generators::{GeneratedCase, GeneratedLink, GeneratedOpportunity, GeneratedPartner};

/// Committed contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub partners: Vec<GeneratedPartner>,
    pub opportunities: Vec<GeneratedOpportunity>,
    pub links: Vec<GeneratedLink>,
    pub cases: Vec<GeneratedCase>,
}

impl MemoryTables {
    /// Number of committed rows for a stage.
    pub fn len(&self, stage: Stage) -> usize {
        match stage {
            Stage::Partners => self.partners.len(),
            Stage::Opportunities => self.opportunities.len(),
            Stage::Links => self.links.len(),
            Stage::Cases => self.cases.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Stage::ALL.iter().all(|&stage| self.len(stage) == 0)
    }

    fn push(&mut self, row: Row<'_>) {
        match row {
            Row::Partner(p) => self.partners.push(p.clone()),
            Row::Opportunity(o) => self.opportunities.push(o.clone()),
            Row::Link(l) => self.links.push(l.clone()),
            Row::Case(c) => self.cases.push(c.clone()),
        }
    }

    fn append(&mut self, other: MemoryTables) {
        self.partners.extend(other.partners);
        self.opportunities.extend(other.opportunities);
        self.links.extend(other.links);
        self.cases.extend(other.cases);
    }
}

/// Makes the `row`-th insert (1-based) of `stage` fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePoint {
    pub stage: Stage,
    pub row: usize,
}

/// Transactional in-memory store.
///
/// Each batch stages its rows privately and publishes them on commit, so an
/// abandoned batch leaves no trace.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
    fail_at: Option<FailurePoint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects the `row`-th insert of `stage`.
    pub fn failing_at(stage: Stage, row: usize) -> Self {
        Self {
            tables: Mutex::default(),
            fail_at: Some(FailurePoint { stage, row }),
        }
    }

    /// Copies the committed rows.
    pub fn snapshot(&self) -> MemoryTables {
        self.tables.lock().clone()
    }

    /// Number of committed rows for a stage.
    pub fn row_count(&self, stage: Stage) -> usize {
        self.tables.lock().len(stage)
    }
}

#[async_trait]
impl SeedStore for MemoryStore {
    async fn begin<'a>(&'a self, stage: Stage) -> Result<Box<dyn StageBatch + 'a>, SeedError> {
        Ok(Box::new(MemoryBatch {
            store: self,
            stage,
            staged: MemoryTables::default(),
            inserted: 0,
        }))
    }
}

struct MemoryBatch<'a> {
    store: &'a MemoryStore,
    stage: Stage,
    staged: MemoryTables,
    inserted: usize,
}

#[async_trait]
impl StageBatch for MemoryBatch<'_> {
    async fn insert(&mut self, row: Row<'_>) -> Result<(), SeedError> {
        if row.stage() != self.stage {
            return Err(SeedError::StageMismatch {
                expected: self.stage,
                actual: row.stage(),
            });
        }

        self.inserted += 1;
        if self.store.fail_at
            == Some(FailurePoint {
                stage: self.stage,
                row: self.inserted,
            })
        {
            return Err(SeedError::Rejected {
                stage: self.stage,
                row: self.inserted,
            });
        }

        self.staged.push(row);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), SeedError> {
        let MemoryBatch { store, staged, .. } = *self;
        store.tables.lock().append(staged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::PartnerGenerator;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test]
    async fn test_rows_visible_after_commit() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(20);
        let partners = PartnerGenerator::new().generate_batch(3, &mut rng);

        let mut batch = store.begin(Stage::Partners).await.unwrap();
        for partner in &partners {
            batch.insert(partner.into()).await.unwrap();
        }
        assert_eq!(store.row_count(Stage::Partners), 0);

        batch.commit().await.unwrap();
        assert_eq!(store.row_count(Stage::Partners), 3);
    }

    #[tokio::test]
    async fn test_dropped_batch_discards_rows() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(21);
        let partners = PartnerGenerator::new().generate_batch(2, &mut rng);

        {
            let mut batch = store.begin(Stage::Partners).await.unwrap();
            batch.insert((&partners[0]).into()).await.unwrap();
        }

        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_failure_point() {
        let store = MemoryStore::failing_at(Stage::Partners, 2);
        let mut rng = StdRng::seed_from_u64(22);
        let partners = PartnerGenerator::new().generate_batch(3, &mut rng);

        let mut batch = store.begin(Stage::Partners).await.unwrap();
        batch.insert((&partners[0]).into()).await.unwrap();
        let err = batch.insert((&partners[1]).into()).await.unwrap_err();

        assert!(matches!(
            err,
            SeedError::Rejected {
                stage: Stage::Partners,
                row: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_stage_mismatch() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(23);
        let partner = PartnerGenerator::new().generate(0, &mut rng);

        let mut batch = store.begin(Stage::Cases).await.unwrap();
        let err = batch.insert((&partner).into()).await.unwrap_err();
        assert!(matches!(err, SeedError::StageMismatch { .. }));
    }
}
