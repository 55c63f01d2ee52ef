use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::settings::TrailSettings;
use crate::trail::Symbol;

/// Minimum centre distance between random targets, in radii.
pub const MIN_SEPARATION_RADII: f64 = 2.5;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedItem {
    pub symbol: Symbol,
    pub position: Point,
}

/// Assign every symbol of the trail a position on the surface.
///
/// Custom positions covering the whole trail are used as-is, in trail order.
/// Otherwise the draw order is shuffled and each symbol gets a random
/// position at least [`MIN_SEPARATION_RADII`] radii away from those already
/// placed; after [`MAX_PLACEMENT_ATTEMPTS`] rejected samples the last one is
/// kept even if it overlaps.
pub fn place_items<R: Rng + ?Sized>(
    trail: &[Symbol],
    settings: &TrailSettings,
    surface: Surface,
    rng: &mut R,
) -> Vec<PlacedItem> {
    if let Some(positions) = settings.covering_positions() {
        return trail
            .iter()
            .zip(positions)
            .map(|(&symbol, p)| PlacedItem {
                symbol,
                position: Point::new(p.x / 100.0 * surface.width, p.y / 100.0 * surface.height),
            })
            .collect();
    }

    let mut order = trail.to_vec();
    order.shuffle(rng);

    let radius = settings.radius();
    let mut placed: Vec<PlacedItem> = Vec::with_capacity(order.len());
    for symbol in order {
        let position = random_position(&placed, radius, surface, rng);
        placed.push(PlacedItem { symbol, position });
    }
    placed
}

fn random_position<R: Rng + ?Sized>(
    placed: &[PlacedItem],
    radius: f64,
    surface: Surface,
    rng: &mut R,
) -> Point {
    let min_distance = radius * MIN_SEPARATION_RADII;
    let mut candidate = Point::default();

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        candidate = Point::new(
            sample_axis(surface.width, radius, rng),
            sample_axis(surface.height, radius, rng),
        );
        if !placed
            .iter()
            .any(|item| item.position.distance(&candidate) < min_distance)
        {
            return candidate;
        }
    }

    tracing::debug!(
        x = candidate.x,
        y = candidate.y,
        "placement attempts exhausted, accepting overlapping position"
    );
    candidate
}

/// Uniform in `[radius, extent - radius]`; the centre when the surface is too small.
fn sample_axis<R: Rng + ?Sized>(extent: f64, radius: f64, rng: &mut R) -> f64 {
    let (lo, hi) = (radius, extent - radius);
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        extent / 2.0
    }
}

/// First item whose marker contains `point`, in placement order.
pub fn hit_test<'a>(items: &'a [PlacedItem], point: Point, radius: f64) -> Option<&'a PlacedItem> {
    items
        .iter()
        .find(|item| item.position.distance(&point) <= radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PercentPosition;
    use crate::trail::generate_trail;
    use itertools::Itertools;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(trail_length: usize) -> TrailSettings {
        TrailSettings {
            trail_length,
            ..TrailSettings::default()
        }
    }

    #[test]
    fn random_placement_keeps_every_symbol_inside_bounds() {
        let s = settings(10);
        let trail = generate_trail(&s);
        let surface = Surface::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(7);

        let items = place_items(&trail, &s, surface, &mut rng);

        assert_eq!(items.len(), trail.len());
        let placed: Vec<Symbol> = items.iter().map(|i| i.symbol).sorted_by_key(|s| s.label().parse::<u32>().unwrap()).collect();
        assert_eq!(placed, trail);
        for item in &items {
            assert!(item.position.x >= 30.0 && item.position.x <= 770.0);
            assert!(item.position.y >= 30.0 && item.position.y <= 570.0);
        }
    }

    #[test]
    fn random_placement_respects_separation_when_room_allows() {
        let s = settings(10);
        let trail = generate_trail(&s);
        let mut rng = StdRng::seed_from_u64(42);

        let items = place_items(&trail, &s, Surface::new(1920.0, 1080.0), &mut rng);

        for (a, b) in items.iter().tuple_combinations() {
            assert!(a.position.distance(&b.position) >= 75.0);
        }
    }

    #[test]
    fn crowded_surface_still_places_everything() {
        let s = settings(30);
        let trail = generate_trail(&s);
        let mut rng = StdRng::seed_from_u64(1);

        let items = place_items(&trail, &s, Surface::new(200.0, 200.0), &mut rng);
        assert_eq!(items.len(), 30);
    }

    #[test]
    fn tiny_surface_pins_to_centre() {
        let s = settings(1);
        let trail = generate_trail(&s);
        let mut rng = StdRng::seed_from_u64(3);

        let items = place_items(&trail, &s, Surface::new(40.0, 40.0), &mut rng);
        assert_eq!(items[0].position, Point::new(20.0, 20.0));
    }

    #[test]
    fn custom_positions_scale_in_trail_order() {
        let s = TrailSettings {
            trail_length: 3,
            custom_positions: Some(vec![
                PercentPosition { x: 0.0, y: 0.0 },
                PercentPosition { x: 50.0, y: 25.0 },
                PercentPosition { x: 100.0, y: 100.0 },
            ]),
            ..TrailSettings::default()
        };
        let trail = generate_trail(&s);
        let mut rng = StdRng::seed_from_u64(9);

        let items = place_items(&trail, &s, Surface::new(400.0, 200.0), &mut rng);

        assert_eq!(
            items,
            vec![
                PlacedItem { symbol: Symbol::Number(1), position: Point::new(0.0, 0.0) },
                PlacedItem { symbol: Symbol::Number(2), position: Point::new(200.0, 50.0) },
                PlacedItem { symbol: Symbol::Number(3), position: Point::new(400.0, 200.0) },
            ]
        );
    }

    #[test]
    fn short_custom_positions_fall_back_to_random() {
        let s = TrailSettings {
            trail_length: 3,
            custom_positions: Some(vec![PercentPosition { x: 0.0, y: 0.0 }]),
            ..TrailSettings::default()
        };
        let trail = generate_trail(&s);
        let mut rng = StdRng::seed_from_u64(9);

        let items = place_items(&trail, &s, Surface::new(400.0, 400.0), &mut rng);
        assert!(items.iter().all(|i| i.position.x >= 30.0 && i.position.y >= 30.0));
    }

    #[test]
    fn hit_test_takes_first_match_not_nearest() {
        let items = vec![
            PlacedItem { symbol: Symbol::Number(1), position: Point::new(100.0, 100.0) },
            PlacedItem { symbol: Symbol::Number(2), position: Point::new(110.0, 100.0) },
        ];

        let hit = hit_test(&items, Point::new(109.0, 100.0), 30.0).unwrap();
        assert_eq!(hit.symbol, Symbol::Number(1));
    }

    #[test]
    fn hit_test_boundary_is_inclusive() {
        let items = vec![PlacedItem { symbol: Symbol::Letter('A'), position: Point::new(0.0, 0.0) }];

        assert!(hit_test(&items, Point::new(30.0, 0.0), 30.0).is_some());
        assert!(hit_test(&items, Point::new(30.1, 0.0), 30.0).is_none());
    }
}
