//! Business partner generation.

use rand::Rng;
use uuid::Uuid;

use super::random_id;

/// First names partners are drawn from.
pub const FIRST_NAMES: [&str; 6] = ["John", "Jane", "Robert", "Susan", "Michael", "Linda"];

/// Last names partners are drawn from.
pub const LAST_NAMES: [&str; 6] = ["Smith", "Johnson", "Williams", "Jones", "Brown", "Davis"];

/// Generated business partner ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedPartner {
    pub id: Uuid,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: String,
    pub phone_number: String,
}

/// Generates business partners with synthetic contact details.
///
/// Names collide freely; the email and phone number embed the partner's
/// position in the run so both stay unique.
#[derive(Debug, Default)]
pub struct PartnerGenerator;

impl PartnerGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates the partner at position `index` of the run.
    pub fn generate(&self, index: usize, rng: &mut impl Rng) -> GeneratedPartner {
        let first_name = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
        let last_name = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];

        GeneratedPartner {
            id: random_id(rng),
            first_name,
            last_name,
            email: format!("{first_name}.{last_name}{index}@example.com"),
            phone_number: format!("555-{}", 10_000_000 + index),
        }
    }

    /// Generates `count` partners.
    pub fn generate_batch(&self, count: usize, rng: &mut impl Rng) -> Vec<GeneratedPartner> {
        (0..count).map(|i| self.generate(i, rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_generate_partner() {
        let mut rng = StdRng::seed_from_u64(1);
        let partner = PartnerGenerator::new().generate(7, &mut rng);

        assert!(FIRST_NAMES.contains(&partner.first_name));
        assert!(LAST_NAMES.contains(&partner.last_name));
        assert_eq!(
            partner.email,
            format!("{}.{}7@example.com", partner.first_name, partner.last_name)
        );
        assert_eq!(partner.phone_number, "555-10000007");
    }

    #[test]
    fn test_contact_details_unique() {
        let mut rng = StdRng::seed_from_u64(2);
        let partners = PartnerGenerator::new().generate_batch(500, &mut rng);

        assert_eq!(partners.len(), 500);

        let ids: HashSet<_> = partners.iter().map(|p| p.id).collect();
        let emails: HashSet<_> = partners.iter().map(|p| p.email.as_str()).collect();
        let phones: HashSet<_> = partners.iter().map(|p| p.phone_number.as_str()).collect();
        assert_eq!(ids.len(), 500);
        assert_eq!(emails.len(), 500);
        assert_eq!(phones.len(), 500);

        // 36 name pairs across 500 partners must collide
        let names: HashSet<_> = partners
            .iter()
            .map(|p| (p.first_name, p.last_name))
            .collect();
        assert!(names.len() <= FIRST_NAMES.len() * LAST_NAMES.len());
    }
}
