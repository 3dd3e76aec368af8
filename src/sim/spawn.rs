//! Obstacle spawning
//!
//! One obstacle per spawn, picked uniformly from the zone's templates and
//! placed just past the right edge of the viewport.

use glam::Vec2;
use rand::Rng;

use super::state::Obstacle;
use super::zones::{HeightClass, ZoneDescriptor};
use crate::Viewport;
use crate::consts::*;

/// Build one obstacle for `zone` at game time `time`
pub fn spawn_obstacle<R: Rng>(
    zone: &ZoneDescriptor,
    viewport: &Viewport,
    time: f32,
    rng: &mut R,
) -> Obstacle {
    let ground_y = viewport.ground_y();
    let template = &zone.obstacles[rng.random_range(0..zone.obstacles.len())];

    let w = OBSTACLE_MIN_WIDTH + rng.random::<f32>() * OBSTACLE_WIDTH_SPREAD;
    let h = OBSTACLE_MIN_HEIGHT + rng.random::<f32>() * OBSTACLE_HEIGHT_SPREAD;

    let y = if zone.is_safe_zone && template.height == HeightClass::Any {
        // Scatter collectibles over a wider band
        ground_y - h - rng.random::<f32>() * (viewport.height * SAFE_SCATTER_RATIO)
    } else if template.height.floats() {
        ground_y - h - FLOAT_BASE_LIFT - rng.random::<f32>() * FLOAT_LIFT_SPREAD
    } else {
        ground_y - h
    };

    Obstacle {
        pos: Vec2::new(viewport.width + SPAWN_MARGIN, y),
        size: Vec2::new(w, h),
        kind: template.kind.clone(),
        is_collectible: zone.is_safe_zone || template.collectible,
        gives_life: template.gives_life,
        points: template.points.unwrap_or(DEFAULT_COLLECT_POINTS),
        collected: false,
        spawn_time: time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::zones::{ObstacleTemplate, ZoneCatalog, ZoneTheme};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn single_template_zone(height: HeightClass, safe: bool) -> ZoneDescriptor {
        ZoneDescriptor {
            id: 1,
            name: "test".into(),
            audio: "test.wav".into(),
            obstacles: vec![ObstacleTemplate {
                kind: "crate".into(),
                height,
                collectible: false,
                gives_life: false,
                points: None,
            }],
            is_safe_zone: safe,
            speed: 1.0,
            obstacle_interval: 1.0,
            theme: ZoneTheme::default(),
        }
    }

    #[test]
    fn test_spawn_at_right_edge_within_size_ranges() {
        let vp = Viewport::new(1000.0, 500.0);
        let catalog = ZoneCatalog::builtin();
        let mut rng = Pcg32::seed_from_u64(7);
        for i in 0..200 {
            let zone = catalog.get(i % catalog.len());
            let obs = spawn_obstacle(zone, &vp, 3.0, &mut rng);
            assert_eq!(obs.pos.x, 1020.0);
            assert!((35.0..=50.0).contains(&obs.size.x));
            assert!((40.0..=60.0).contains(&obs.size.y));
            assert!(obs.pos.y + obs.size.y <= vp.ground_y() + 1e-3);
            assert_eq!(obs.spawn_time, 3.0);
            assert!(zone.obstacles.iter().any(|t| t.kind == obs.kind));
        }
    }

    #[test]
    fn test_ground_templates_sit_on_ground() {
        let vp = Viewport::new(1000.0, 500.0);
        let zone = single_template_zone(HeightClass::Ground, false);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            let obs = spawn_obstacle(&zone, &vp, 0.0, &mut rng);
            assert!((obs.pos.y + obs.size.y - vp.ground_y()).abs() < 1e-3);
            assert!(!obs.is_collectible);
        }
    }

    #[test]
    fn test_floating_band() {
        let vp = Viewport::new(1000.0, 500.0);
        let zone = single_template_zone(HeightClass::Medium, false);
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..50 {
            let obs = spawn_obstacle(&zone, &vp, 0.0, &mut rng);
            let lift = vp.ground_y() - (obs.pos.y + obs.size.y);
            assert!((19.99..=60.01).contains(&lift), "lift {lift}");
        }
    }

    #[test]
    fn test_safe_zone_scatters_any_height_and_makes_collectibles() {
        let vp = Viewport::new(1000.0, 500.0);
        let zone = single_template_zone(HeightClass::Any, true);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut max_lift: f32 = 0.0;
        for _ in 0..200 {
            let obs = spawn_obstacle(&zone, &vp, 0.0, &mut rng);
            let lift = vp.ground_y() - (obs.pos.y + obs.size.y);
            assert!((-0.01..=150.01).contains(&lift));
            max_lift = max_lift.max(lift);
            assert!(obs.is_collectible);
            assert!(!obs.gives_life);
            assert_eq!(obs.points, DEFAULT_COLLECT_POINTS);
        }
        // Wider than the 60px floating band
        assert!(max_lift > 60.0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let vp = Viewport::default();
        let zone = ZoneCatalog::builtin().get(0).clone();
        let mut a = Pcg32::seed_from_u64(99);
        let mut b = Pcg32::seed_from_u64(99);
        for _ in 0..20 {
            let oa = spawn_obstacle(&zone, &vp, 0.0, &mut a);
            let ob = spawn_obstacle(&zone, &vp, 0.0, &mut b);
            assert_eq!(oa.kind, ob.kind);
            assert_eq!(oa.pos, ob.pos);
            assert_eq!(oa.size, ob.size);
        }
    }
}
