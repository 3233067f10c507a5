//! Perches - fixed landing spots a bird can claim
//!
//! A perch is handed to at most one bird at a time. The orchestrator
//! decides when a vacated perch becomes available again.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Vec2;

/// Index of a perch within its [`PerchSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerchId(pub usize);

/// A landing spot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perch {
    pub id: PerchId,
    pub position: Vec2,
    pub available: bool,
}

/// All configured perches and their availability
#[derive(Debug, Clone)]
pub struct PerchSet {
    perches: Vec<Perch>,
}

impl PerchSet {
    pub fn new(positions: &[Vec2]) -> Self {
        let perches = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Perch { id: PerchId(i), position, available: true })
            .collect();
        Self { perches }
    }

    pub fn len(&self) -> usize {
        self.perches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perches.is_empty()
    }

    pub fn get(&self, id: PerchId) -> Option<&Perch> {
        self.perches.get(id.0)
    }

    pub fn position(&self, id: PerchId) -> Option<Vec2> {
        self.get(id).map(|p| p.position)
    }

    pub fn is_available(&self, id: PerchId) -> bool {
        self.get(id).is_some_and(|p| p.available)
    }

    pub fn available_count(&self) -> usize {
        self.perches.iter().filter(|p| p.available).count()
    }

    pub fn has_available(&self) -> bool {
        self.perches.iter().any(|p| p.available)
    }

    /// Ids of every currently free perch
    pub fn available_ids(&self) -> Vec<PerchId> {
        self.perches.iter().filter(|p| p.available).map(|p| p.id).collect()
    }

    /// Take a uniformly random free perch, marking it unavailable
    pub fn claim_random(&mut self, rng: &mut impl Rng) -> Option<PerchId> {
        let free = self.available_ids();
        if free.is_empty() {
            return None;
        }
        let id = free[rng.gen_range(0..free.len())];
        self.perches[id.0].available = false;
        Some(id)
    }

    /// Make one perch available again
    pub fn restore(&mut self, id: PerchId) {
        if let Some(perch) = self.perches.get_mut(id.0) {
            perch.available = true;
        }
    }

    /// Mark every perch available
    pub fn restore_all(&mut self) {
        for perch in &mut self.perches {
            perch.available = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn three_perches() -> PerchSet {
        PerchSet::new(&[Vec2::new(-2.0, 1.0), Vec2::new(0.0, 2.0), Vec2::new(3.0, -1.0)])
    }

    #[test]
    fn test_claim_until_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut perches = three_perches();

        let mut claimed = Vec::new();
        while let Some(id) = perches.claim_random(&mut rng) {
            assert!(!claimed.contains(&id), "perch handed out twice");
            claimed.push(id);
        }

        assert_eq!(claimed.len(), 3);
        assert!(!perches.has_available());
        assert_eq!(perches.claim_random(&mut rng), None);
    }

    #[test]
    fn test_restore_single_and_all() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut perches = three_perches();
        let a = perches.claim_random(&mut rng).unwrap();
        let _b = perches.claim_random(&mut rng).unwrap();

        perches.restore(a);
        assert!(perches.is_available(a));
        assert_eq!(perches.available_count(), 2);

        perches.restore_all();
        assert_eq!(perches.available_count(), 3);
    }
}
