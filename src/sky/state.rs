//! The sky simulation
//!
//! Owns the ECS world and every collaborator the entities need, runs one
//! tick per frame, and reports what appeared and disappeared.

use std::fmt;
use std::time::Duration;

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::pool::Pool;
use super::spawner::{SpawnRequest, Spawner};
use super::timer::FadeIn;
use crate::config::{ConfigError, SkyConfig};
use crate::entities::{Appearance, Bird, Cloud, DroppedItem, EntityKind, Roamer, Star, Step};
use crate::render::Presenter;
use crate::world::{Boundary, Edge, PerchId, Vec2, Viewport};

/// How far outside a side edge new birds appear
const SPAWN_OUTSET: f32 = 0.5;
/// Clouds appear this share of the largest cloud size past the edge, which
/// keeps them inside the margin they are released beyond
const CLOUD_OUTSET_FRACTION: f32 = 0.5;

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyEvent {
    Spawned { entity: Entity, kind: EntityKind },
    /// Destroyed, or returned to the pool for clouds
    Released { entity: Entity, kind: EntityKind },
    /// A cloud was due but every pooled cloud is in use
    PoolExhausted,
    /// Birds may spawn again
    BirdCooldownElapsed,
}

/// Live entity counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    pub birds: usize,
    pub clouds: usize,
    pub stars: usize,
    pub roamers: usize,
    pub items: usize,
    pub pool_capacity: usize,
}

impl Census {
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Bird => self.birds,
            EntityKind::Cloud => self.clouds,
            EntityKind::Star => self.stars,
            EntityKind::Roamer => self.roamers,
            EntityKind::DroppedItem => self.items,
        }
    }

    pub fn total(&self) -> usize {
        EntityKind::ALL.iter().map(|&k| self.count(k)).sum()
    }
}

impl fmt::Display for Census {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "birds {} | clouds {}/{} | stars {} | roamer {} | items {}",
            self.birds, self.clouds, self.pool_capacity, self.stars, self.roamers, self.items
        )
    }
}

/// The whole ambient scene
pub struct Sky {
    config: SkyConfig,
    viewport: Viewport,
    /// ECS world containing all entities
    world: World,
    clouds: Pool<Entity>,
    spawner: Spawner,
    /// Random number generator (seeded for reproducibility)
    rng: StdRng,
    music: FadeIn,
    /// Simulated seconds since start
    elapsed: f32,
}

impl Sky {
    /// Validate the config and build an empty sky.
    ///
    /// Every pooled cloud is created here, dormant.
    pub fn new(config: SkyConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        config.validate()?;
        check_viewport(&viewport)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut world = World::new();
        let capacity = if config.clouds.enabled { config.clouds.pool_capacity } else { 0 };
        let members: Vec<Entity> = (0..capacity).map(|_| world.spawn((Cloud::dormant(),))).collect();
        let clouds = Pool::new(members);

        let spawner = Spawner::new(&config, &mut rng);
        let music = FadeIn::new(config.music.fade_in_time);

        log::info!(
            "Sky created: {:.1}x{:.1} viewport, {} pooled clouds, {} perches",
            viewport.half_width * 2.0,
            viewport.half_height * 2.0,
            capacity,
            spawner.perches().len()
        );

        Ok(Self {
            config,
            viewport,
            world,
            clouds,
            spawner,
            rng,
            music,
            elapsed: 0.0,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SkyConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Change the visible area, e.g. after a terminal resize.
    ///
    /// An invalid viewport is rejected and the current one kept.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), ConfigError> {
        check_viewport(&viewport)?;
        log::debug!("Viewport resized to {:?}", viewport);
        self.viewport = viewport;
        Ok(())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn cloud_pool(&self) -> &Pool<Entity> {
        &self.clouds
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Background music volume in `[0, 1]`
    pub fn music_volume(&self) -> f32 {
        self.music.level()
    }

    pub fn census(&self) -> Census {
        Census {
            birds: self.world.query::<&Bird>().iter().count(),
            clouds: self.clouds.active_count(),
            stars: self.world.query::<&Star>().iter().count(),
            roamers: self.world.query::<&Roamer>().iter().count(),
            items: self.world.query::<&DroppedItem>().iter().count(),
            pool_capacity: self.clouds.capacity(),
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Run one simulation tick
    pub fn update(&mut self, delta: Duration) -> Vec<SkyEvent> {
        let dt = delta.as_secs_f32();
        self.elapsed += dt;
        self.music.update(dt);

        let mut events = Vec::new();

        let plan = self.spawner.update(dt, &self.config, &mut self.rng);
        if plan.bird_cooldown_elapsed {
            events.push(SkyEvent::BirdCooldownElapsed);
        }
        for request in plan.requests {
            self.fulfil(request, &mut events);
        }

        let roamer = self.live_roamer();
        self.update_birds(dt, roamer, &mut events);
        self.update_clouds(dt, &mut events);
        self.update_stars(dt, roamer.map(|(e, _)| e), &mut events);
        self.update_roamer(dt, &mut events);
        self.update_items(dt, &mut events);

        events
    }

    /// Handle and position of the roamer, if one is alive
    fn live_roamer(&self) -> Option<(Entity, Vec2)> {
        let entity = self.spawner.roamer()?;
        let roamer = self.world.get::<&Roamer>(entity).ok()?;
        Some((entity, roamer.position()))
    }

    fn random_side(&mut self) -> Edge {
        if self.rng.gen_bool(0.5) {
            Edge::Left
        } else {
            Edge::Right
        }
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    fn fulfil(&mut self, request: SpawnRequest, events: &mut Vec<SkyEvent>) {
        let spawned = match request {
            SpawnRequest::Cloud => self.spawn_cloud(),
            SpawnRequest::Star => Some(self.spawn_star()),
            SpawnRequest::Bird(perch) => self.spawn_bird(perch),
            SpawnRequest::Roamer => Some(self.spawn_roamer()),
        };

        match spawned {
            Some((entity, kind)) => {
                log::info!("{} spawned ({:?})", kind.name(), entity);
                events.push(SkyEvent::Spawned { entity, kind });
            }
            None if request == SpawnRequest::Cloud => events.push(SkyEvent::PoolExhausted),
            None => {}
        }
    }

    fn spawn_cloud(&mut self) -> Option<(Entity, EntityKind)> {
        let Some(entity) = self.clouds.acquire() else {
            log::trace!("Cloud pool exhausted, skipping spawn");
            return None;
        };

        let edge = self.random_side();
        let along = self.config.clouds.spawn_band.sample(&mut self.rng);
        let outset = self.config.clouds.size.max * CLOUD_OUTSET_FRACTION;
        let position = self.viewport.edge_point(edge, along, outset);

        match self.world.get::<&mut Cloud>(entity) {
            Ok(mut cloud) => {
                cloud.activate(position, &self.config.clouds, &mut self.rng);
                Some((entity, EntityKind::Cloud))
            }
            Err(e) => {
                log::warn!("Pooled cloud {:?} has no cloud component: {}", entity, e);
                self.clouds.release(entity);
                None
            }
        }
    }

    /// Stars appear anywhere across the upper half of the sky
    fn spawn_star(&mut self) -> (Entity, EntityKind) {
        let ext = self.viewport.extents();
        let position = Vec2::new(
            self.rng.gen_range(-ext.x..=ext.x),
            self.rng.gen_range(0.0..=ext.y),
        );

        let mut star = Star::new(position, &self.config.stars, &mut self.rng);
        star.set_shooting_trigger(self.spawner.roamer());
        (self.world.spawn((star,)), EntityKind::Star)
    }

    fn spawn_bird(&mut self, perch: PerchId) -> Option<(Entity, EntityKind)> {
        let Some(perch_position) = self.spawner.perches().position(perch) else {
            log::warn!("Bird requested for unknown perch {:?}", perch);
            return None;
        };

        let edge = self.random_side();
        let along = self.config.birds.spawn_band.sample(&mut self.rng);
        let position = self.viewport.edge_point(edge, along, SPAWN_OUTSET);

        let mut bird = Bird::new(
            position,
            perch,
            perch_position,
            &self.config.birds,
            &self.viewport,
            &mut self.rng,
        );
        bird.set_chase_target(self.spawner.roamer());

        let entity = self.world.spawn((bird,));
        self.spawner.bird_spawned(entity);
        Some((entity, EntityKind::Bird))
    }

    /// Spawn the roamer and make sure every bird and star knows about it
    fn spawn_roamer(&mut self) -> (Entity, EntityKind) {
        let roamer = Roamer::new(&self.config.roamer, &self.viewport, &mut self.rng);
        let entity = self.world.spawn((roamer,));
        self.spawner.roamer_spawned(entity);

        for (_, bird) in self.world.query_mut::<&mut Bird>() {
            bird.set_chase_target(Some(entity));
        }
        for (_, star) in self.world.query_mut::<&mut Star>() {
            star.set_shooting_trigger(Some(entity));
        }

        (entity, EntityKind::Roamer)
    }

    // ========================================================================
    // Per-kind updates
    // ========================================================================

    fn update_birds(&mut self, dt: f32, roamer: Option<(Entity, Vec2)>, events: &mut Vec<SkyEvent>) {
        let mut departed: Vec<(Entity, PerchId)> = Vec::new();

        for (entity, bird) in self.world.query_mut::<&mut Bird>() {
            let target = match (bird.chase_target(), roamer) {
                (Some(t), Some((r, pos))) if t == r => Some(pos),
                _ => None,
            };
            let step = bird.update(dt, target, &self.config.birds, &self.viewport, &mut self.rng);
            if step == Step::Release {
                departed.push((entity, bird.perch()));
            }
        }

        for (entity, perch) in departed {
            self.despawn(entity, EntityKind::Bird, events);
            self.spawner.bird_despawned(entity, perch, self.config.birds.spawn_delay);
        }
    }

    fn update_clouds(&mut self, dt: f32, events: &mut Vec<SkyEvent>) {
        let bird_positions: Vec<Vec2> = self
            .world
            .query::<&Bird>()
            .iter()
            .map(|(_, bird)| bird.position())
            .collect();
        let radius = self.config.birds.disturb_radius;
        let active: Vec<Entity> = self.clouds.active().collect();

        for entity in active {
            let step = match self.world.get::<&mut Cloud>(entity) {
                Ok(mut cloud) => {
                    let nearby = bird_positions
                        .iter()
                        .any(|&p| p.distance(cloud.position()) <= radius);
                    cloud.set_bird_nearby(nearby, &self.config.clouds);
                    cloud.update(dt, &self.config.clouds, &self.viewport, &mut self.rng)
                }
                Err(_) => Step::Release,
            };

            if step == Step::Release {
                self.clouds.release(entity);
                log::info!("Cloud returned to pool ({:?})", entity);
                events.push(SkyEvent::Released { entity, kind: EntityKind::Cloud });
            }
        }
    }

    fn update_stars(&mut self, dt: f32, roamer: Option<Entity>, events: &mut Vec<SkyEvent>) {
        let mut finished = Vec::new();

        for (entity, star) in self.world.query_mut::<&mut Star>() {
            let trigger_present = roamer.is_some() && star.shooting_trigger() == roamer;
            if star.update(dt, trigger_present, &self.config.stars, &self.viewport) == Step::Release {
                finished.push(entity);
            }
        }

        for entity in finished {
            self.despawn(entity, EntityKind::Star, events);
        }
    }

    fn update_roamer(&mut self, dt: f32, events: &mut Vec<SkyEvent>) {
        let Some(entity) = self.spawner.roamer() else {
            return;
        };

        let outcome = match self.world.get::<&mut Roamer>(entity) {
            Ok(mut roamer) => roamer.update(dt, &self.config.roamer, &mut self.rng),
            Err(_) => (Step::Release, None),
        };

        if let (_, Some(drop)) = outcome {
            let item = DroppedItem::new(drop.position, drop.size, &self.config.items);
            let item_entity = self.world.spawn((item,));
            log::debug!("Item dropped at {:?}", drop.position);
            events.push(SkyEvent::Spawned { entity: item_entity, kind: EntityKind::DroppedItem });
        }

        if outcome.0 == Step::Release {
            self.despawn(entity, EntityKind::Roamer, events);
            self.spawner.roamer_despawned(entity, self.config.roamer.repeat_interval);
        }
    }

    fn update_items(&mut self, dt: f32, events: &mut Vec<SkyEvent>) {
        let mut landed = Vec::new();

        for (entity, item) in self.world.query_mut::<&mut DroppedItem>() {
            if item.update(dt, &self.config.items, &self.viewport) == Step::Release {
                landed.push(entity);
            }
        }

        for entity in landed {
            self.despawn(entity, EntityKind::DroppedItem, events);
        }
    }

    fn despawn(&mut self, entity: Entity, kind: EntityKind, events: &mut Vec<SkyEvent>) {
        match self.world.despawn(entity) {
            Ok(()) => {
                if kind != EntityKind::DroppedItem {
                    log::info!("{} released ({:?})", kind.name(), entity);
                }
                events.push(SkyEvent::Released { entity, kind });
            }
            Err(e) => log::warn!("Failed to despawn {} {:?}: {}", kind.name(), entity, e),
        }
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Push the appearance of every live entity into `sink`
    pub fn present(&self, sink: &mut impl Presenter) {
        sink.begin_frame();

        for entity in self.clouds.active() {
            if let Ok(cloud) = self.world.get::<&Cloud>(entity) {
                push(sink, entity, EntityKind::Cloud, cloud.appearance());
            }
        }
        for (entity, star) in self.world.query::<&Star>().iter() {
            push(sink, entity, EntityKind::Star, star.appearance(&self.config.stars));
        }
        for (entity, bird) in self.world.query::<&Bird>().iter() {
            push(sink, entity, EntityKind::Bird, bird.appearance());
        }
        for (entity, roamer) in self.world.query::<&Roamer>().iter() {
            push(sink, entity, EntityKind::Roamer, roamer.appearance());
        }
        for (entity, item) in self.world.query::<&DroppedItem>().iter() {
            push(sink, entity, EntityKind::DroppedItem, item.appearance());
        }
    }
}

/// Random spawn positions need a non-empty range on both axes
fn check_viewport(viewport: &Viewport) -> Result<(), ConfigError> {
    if viewport.half_width > 0.0 && viewport.half_height > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidViewport {
            half_width: viewport.half_width,
            half_height: viewport.half_height,
        })
    }
}

fn push(
    sink: &mut impl Presenter,
    entity: Entity,
    kind: EntityKind,
    appearance: Appearance,
) {
    sink.set_position(entity, kind, appearance.position);
    sink.set_facing(entity, appearance.facing);
    sink.set_opacity(entity, appearance.opacity);
    sink.set_scale(entity, appearance.scale);
}
