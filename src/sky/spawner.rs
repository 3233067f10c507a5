//! Spawn orchestration
//!
//! Decides *when* something should appear. The [`Sky`](super::Sky) does the
//! actual creation and reports despawns back here, so the spawner only
//! ever deals in handles, perches and timers.

use hecs::Entity;
use rand::Rng;

use super::timer::SpawnTimer;
use crate::config::{Interval, PerchPolicy, SkyConfig};
use crate::world::{PerchId, PerchSet};

/// Something the spawner wants created this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnRequest {
    Cloud,
    Star,
    /// A bird heading for this (already claimed) perch
    Bird(PerchId),
    Roamer,
}

/// Outcome of one spawner tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnPlan {
    pub requests: Vec<SpawnRequest>,
    /// The bird cooldown ran out this tick
    pub bird_cooldown_elapsed: bool,
}

/// Per-kind timers plus bird and roamer bookkeeping
#[derive(Debug, Clone)]
pub struct Spawner {
    cloud_timer: Option<SpawnTimer>,
    star_timer: Option<SpawnTimer>,
    roamer_timer: Option<SpawnTimer>,

    perches: PerchSet,
    /// Perches held by departed birds, waiting for the cooldown
    pending_perches: Vec<PerchId>,
    birds: Vec<Entity>,
    can_spawn_bird: bool,
    /// Seconds until birds may spawn again
    bird_cooldown: Option<f32>,

    roamer: Option<Entity>,
}

impl Spawner {
    pub fn new(config: &SkyConfig, rng: &mut impl Rng) -> Self {
        let cloud_timer = config
            .clouds
            .enabled
            .then(|| SpawnTimer::new(config.clouds.spawn_interval, rng));
        let star_timer = config
            .stars
            .enabled
            .then(|| SpawnTimer::new(config.stars.spawn_interval, rng));
        let roamer_timer = config.roamer.enabled.then(|| {
            let repeat = config.roamer.repeat_interval.unwrap_or(config.roamer.first_delay);
            SpawnTimer::with_first_delay(Interval::Fixed(repeat), config.roamer.first_delay)
        });

        let perches = if config.birds.enabled {
            PerchSet::new(&config.birds.perches)
        } else {
            PerchSet::new(&[])
        };

        Self {
            cloud_timer,
            star_timer,
            roamer_timer,
            perches,
            pending_perches: Vec::new(),
            birds: Vec::new(),
            can_spawn_bird: false,
            bird_cooldown: config.birds.enabled.then_some(config.birds.initial_delay),
            roamer: None,
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance all timers and decide what to spawn.
    ///
    /// A bird request has already claimed its perch; the caller must follow
    /// up with [`Spawner::bird_spawned`].
    pub fn update(&mut self, dt: f32, config: &SkyConfig, rng: &mut impl Rng) -> SpawnPlan {
        let mut plan = SpawnPlan::default();

        if let Some(timer) = &mut self.cloud_timer {
            if timer.update(dt, rng) {
                plan.requests.push(SpawnRequest::Cloud);
            }
        }

        if let Some(timer) = &mut self.star_timer {
            if timer.update(dt, rng) {
                plan.requests.push(SpawnRequest::Star);
            }
        }

        if let Some(cooldown) = &mut self.bird_cooldown {
            *cooldown -= dt;
            if *cooldown <= 0.0 {
                self.bird_cooldown = None;
                self.finish_bird_cooldown(config.birds.perch_policy);
                plan.bird_cooldown_elapsed = true;
            }
        }

        if self.bird_spawn_allowed(config.birds.single_bird) {
            if let Some(perch) = self.perches.claim_random(rng) {
                self.can_spawn_bird = false;
                if !config.birds.single_bird {
                    self.bird_cooldown = Some(config.birds.spawn_delay);
                }
                plan.requests.push(SpawnRequest::Bird(perch));
            }
        }

        if self.roamer.is_none() {
            if let Some(timer) = &mut self.roamer_timer {
                if timer.update(dt, rng) {
                    timer.pause();
                    plan.requests.push(SpawnRequest::Roamer);
                }
            }
        }

        plan
    }

    fn bird_spawn_allowed(&self, single_bird: bool) -> bool {
        self.can_spawn_bird && (!single_bird || self.birds.is_empty()) && self.perches.has_available()
    }

    fn finish_bird_cooldown(&mut self, policy: PerchPolicy) {
        self.can_spawn_bird = true;
        match policy {
            PerchPolicy::ReturnAssigned => {
                for perch in self.pending_perches.drain(..) {
                    self.perches.restore(perch);
                }
            }
            PerchPolicy::ResetAll => {
                self.pending_perches.clear();
                self.perches.restore_all();
            }
        }
        log::debug!(
            "Bird cooldown over, {} perch(es) available",
            self.perches.available_count()
        );
    }

    // ========================================================================
    // Notifications from the sky
    // ========================================================================

    pub fn bird_spawned(&mut self, entity: Entity) {
        self.birds.push(entity);
    }

    /// A bird left the sky. Its perch comes back once the cooldown is over.
    pub fn bird_despawned(&mut self, entity: Entity, perch: PerchId, spawn_delay: f32) {
        let Some(index) = self.birds.iter().position(|&e| e == entity) else {
            log::warn!("Despawn reported for unknown bird {:?}", entity);
            return;
        };
        self.birds.swap_remove(index);
        self.pending_perches.push(perch);
        self.can_spawn_bird = false;
        self.bird_cooldown = Some(spawn_delay);
    }

    pub fn roamer_spawned(&mut self, entity: Entity) {
        self.roamer = Some(entity);
    }

    /// The roamer left. Schedules the next visit if repeats are configured.
    pub fn roamer_despawned(&mut self, entity: Entity, repeat_interval: Option<f32>) {
        if self.roamer != Some(entity) {
            log::warn!("Despawn reported for unknown roamer {:?}", entity);
            return;
        }
        self.roamer = None;
        if let (Some(timer), Some(delay)) = (&mut self.roamer_timer, repeat_interval) {
            timer.restart(delay);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn perches(&self) -> &PerchSet {
        &self.perches
    }

    pub fn pending_perches(&self) -> &[PerchId] {
        &self.pending_perches
    }

    pub fn live_birds(&self) -> &[Entity] {
        &self.birds
    }

    pub fn can_spawn_bird(&self) -> bool {
        self.can_spawn_bird
    }

    pub fn bird_cooldown(&self) -> Option<f32> {
        self.bird_cooldown
    }

    /// The live roamer, if any
    pub fn roamer(&self) -> Option<Entity> {
        self.roamer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Vec2;
    use hecs::World;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DT: f32 = 0.25;

    fn birds_only() -> SkyConfig {
        let mut config = SkyConfig::default();
        config.clouds.enabled = false;
        config.stars.enabled = false;
        config.roamer.enabled = false;
        config.birds.initial_delay = 1.0;
        config.birds.spawn_delay = 5.0;
        config
    }

    fn bird_requests(plan: &SpawnPlan) -> Vec<PerchId> {
        plan.requests
            .iter()
            .filter_map(|r| match r {
                SpawnRequest::Bird(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_initial_delay_blocks_birds() {
        let config = birds_only();
        let mut rng = StdRng::seed_from_u64(1);
        let mut spawner = Spawner::new(&config, &mut rng);
        assert!(!spawner.can_spawn_bird());

        for _ in 0..3 {
            let plan = spawner.update(DT, &config, &mut rng);
            assert!(bird_requests(&plan).is_empty());
        }
        let plan = spawner.update(DT, &config, &mut rng);
        assert!(plan.bird_cooldown_elapsed);
        assert_eq!(bird_requests(&plan).len(), 1);
    }

    #[test]
    fn test_single_bird_respawn_waits_for_delay() {
        let config = birds_only();
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(2);
        let mut spawner = Spawner::new(&config, &mut rng);

        let mut first = None;
        for _ in 0..4 {
            let plan = spawner.update(DT, &config, &mut rng);
            first = first.or(bird_requests(&plan).first().copied());
        }
        let perch = first.unwrap();
        let bird = world.spawn(());
        spawner.bird_spawned(bird);

        // While the bird lives nothing else spawns, even with free perches
        for _ in 0..40 {
            let plan = spawner.update(DT, &config, &mut rng);
            assert!(bird_requests(&plan).is_empty());
        }

        spawner.bird_despawned(bird, perch, config.birds.spawn_delay);
        assert!(!spawner.perches().is_available(perch));
        assert_eq!(spawner.pending_perches(), &[perch]);

        // 5 second cooldown: 19 quiet ticks, then a new bird on the 20th
        for _ in 0..19 {
            let plan = spawner.update(DT, &config, &mut rng);
            assert!(bird_requests(&plan).is_empty());
        }
        let plan = spawner.update(DT, &config, &mut rng);
        assert!(plan.bird_cooldown_elapsed);
        assert_eq!(bird_requests(&plan).len(), 1);
        assert!(spawner.pending_perches().is_empty());
    }

    #[test]
    fn test_return_assigned_restores_only_pending_perch() {
        let mut config = birds_only();
        config.birds.perches = vec![Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)];
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut spawner = Spawner::new(&config, &mut rng);

        // Two birds in a row, each after its own cooldown
        let mut claimed = Vec::new();
        let mut birds = Vec::new();
        while claimed.len() < 1 {
            claimed.extend(bird_requests(&spawner.update(DT, &config, &mut rng)));
        }
        birds.push(world.spawn(()));
        spawner.bird_spawned(birds[0]);
        spawner.bird_despawned(birds[0], claimed[0], config.birds.spawn_delay);

        while claimed.len() < 2 {
            claimed.extend(bird_requests(&spawner.update(DT, &config, &mut rng)));
        }
        // The first perch came back before the second claim, so either may be taken
        assert_eq!(spawner.perches().available_count(), 1);
    }

    #[test]
    fn test_reset_all_restores_every_perch() {
        let mut config = birds_only();
        config.birds.perch_policy = PerchPolicy::ResetAll;
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut spawner = Spawner::new(&config, &mut rng);

        let mut perch = None;
        while perch.is_none() {
            perch = bird_requests(&spawner.update(DT, &config, &mut rng)).first().copied();
        }
        let bird = world.spawn(());
        spawner.bird_spawned(bird);
        spawner.bird_despawned(bird, perch.unwrap(), config.birds.spawn_delay);

        let mut elapsed = false;
        while !elapsed {
            let plan = spawner.update(DT, &config, &mut rng);
            elapsed = plan.bird_cooldown_elapsed;
            // The new bird claims one perch right away
            if elapsed {
                assert_eq!(bird_requests(&plan).len(), 1);
            }
        }
        assert_eq!(spawner.perches().available_count(), config.birds.perches.len() - 1);
    }

    #[test]
    fn test_multi_bird_perches_are_exclusive() {
        let mut config = birds_only();
        config.birds.single_bird = false;
        config.birds.spawn_delay = 0.5;
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut spawner = Spawner::new(&config, &mut rng);

        let mut claimed = Vec::new();
        for _ in 0..100 {
            for perch in bird_requests(&spawner.update(DT, &config, &mut rng)) {
                assert!(!claimed.contains(&perch), "perch {:?} assigned twice", perch);
                claimed.push(perch);
                spawner.bird_spawned(world.spawn(()));
            }
        }
        // Every perch is held by a live bird and nothing more was spawned
        assert_eq!(claimed.len(), config.birds.perches.len());
        assert_eq!(spawner.live_birds().len(), claimed.len());
        assert!(!spawner.perches().has_available());
    }

    #[test]
    fn test_roamer_single_instance_and_repeat() {
        let mut config = SkyConfig::default();
        config.birds.enabled = false;
        config.clouds.enabled = false;
        config.stars.enabled = false;
        config.roamer.first_delay = 1.0;
        config.roamer.repeat_interval = Some(2.0);
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(6);
        let mut spawner = Spawner::new(&config, &mut rng);

        let roamer_count = |plan: &SpawnPlan| {
            plan.requests.iter().filter(|r| **r == SpawnRequest::Roamer).count()
        };

        let mut spawned = 0;
        for _ in 0..4 {
            spawned += roamer_count(&spawner.update(DT, &config, &mut rng));
        }
        assert_eq!(spawned, 1);
        let roamer = world.spawn(());
        spawner.roamer_spawned(roamer);

        // Never a second roamer while one is live
        for _ in 0..100 {
            assert_eq!(roamer_count(&spawner.update(DT, &config, &mut rng)), 0);
        }

        spawner.roamer_despawned(roamer, config.roamer.repeat_interval);
        assert_eq!(spawner.roamer(), None);
        let mut again = 0;
        for _ in 0..8 {
            again += roamer_count(&spawner.update(DT, &config, &mut rng));
        }
        assert_eq!(again, 1);
    }

    #[test]
    fn test_roamer_without_repeat_visits_once() {
        let mut config = SkyConfig::default();
        config.birds.enabled = false;
        config.roamer.first_delay = 0.5;
        config.roamer.repeat_interval = None;
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut spawner = Spawner::new(&config, &mut rng);

        let mut total = 0;
        for _ in 0..400 {
            let plan = spawner.update(DT, &config, &mut rng);
            for request in plan.requests {
                if request == SpawnRequest::Roamer {
                    total += 1;
                    let roamer = world.spawn(());
                    spawner.roamer_spawned(roamer);
                    spawner.roamer_despawned(roamer, config.roamer.repeat_interval);
                }
            }
        }
        assert_eq!(total, 1);
    }

    #[test]
    fn test_unknown_despawn_is_ignored() {
        let config = birds_only();
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(8);
        let mut spawner = Spawner::new(&config, &mut rng);

        let stranger = world.spawn(());
        spawner.bird_despawned(stranger, PerchId(0), config.birds.spawn_delay);
        assert!(spawner.pending_perches().is_empty());
        assert_eq!(spawner.bird_cooldown(), Some(config.birds.initial_delay));
    }
}
