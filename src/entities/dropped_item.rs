//! Items falling out of the sky

use super::common::{Appearance, Facing, Step};
use crate::config::DroppedItemConfig;
use crate::world::{Boundary, Vec2};

#[derive(Debug, Clone)]
pub struct DroppedItem {
    position: Vec2,
    size: f32,
    life_timer: f32,
}

impl DroppedItem {
    pub fn new(position: Vec2, size: f32, cfg: &DroppedItemConfig) -> Self {
        Self {
            position,
            size,
            life_timer: cfg.max_life,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn appearance(&self) -> Appearance {
        Appearance::new(self.position, Facing::Right, 1.0, self.size)
    }

    pub fn update(&mut self, dt: f32, cfg: &DroppedItemConfig, boundary: &impl Boundary) -> Step {
        self.position.y -= cfg.fall_speed * dt;
        self.life_timer -= dt;

        let bottom = -boundary.extents().y;
        if self.position.y < bottom - self.size || self.life_timer <= 0.0 {
            Step::Release
        } else {
            Step::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Viewport;

    #[test]
    fn test_falls_until_below_screen() {
        let cfg = DroppedItemConfig { fall_speed: 1.0, max_life: 100.0 };
        let vp = Viewport::new(8.0, 5.0);
        let mut item = DroppedItem::new(Vec2::new(0.0, 0.0), 1.0, &cfg);

        let mut ticks = 0;
        while item.update(0.5, &cfg, &vp) == Step::Continue {
            ticks += 1;
            assert!(ticks < 100);
        }
        // Released once y < -6.0, i.e. at y = -6.5
        assert_eq!(item.position().y, -6.5);
    }

    #[test]
    fn test_safety_timer_releases() {
        let cfg = DroppedItemConfig { fall_speed: 0.0, max_life: 1.0 };
        let vp = Viewport::new(8.0, 5.0);
        let mut item = DroppedItem::new(Vec2::ZERO, 1.0, &cfg);

        assert_eq!(item.update(0.5, &cfg, &vp), Step::Continue);
        assert_eq!(item.update(0.5, &cfg, &vp), Step::Release);
    }
}
