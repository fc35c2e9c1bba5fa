//! Movement system - units with nothing in range close on the world origin

use hecs::{Entity, World};
use crate::components::{Position, ORIGIN_EPSILON};

/// Move a unit one step toward the origin. Returns true if it moved.
pub fn move_toward_origin(world: &mut World, entity: Entity, speed: f64, delta_seconds: f64) -> bool {
    let Ok(mut pos) = world.get::<&mut Position>(entity) else {
        return false;
    };
    let next = step_toward_origin(*pos, speed, delta_seconds);
    let moved = next != *pos;
    *pos = next;
    moved
}

/// Position after travelling `speed * delta_seconds` along the straight line
/// to the origin. Never overshoots: a step that would pass the origin lands on it.
///
/// A step that would leave the unit within [`ORIGIN_EPSILON`] of the origin on
/// both axes also lands exactly on it, so the post-move distance can undershoot
/// `max(0, d - step)` by at most `ORIGIN_EPSILON * sqrt(2)`. Units that have
/// arrived sit exactly on the origin, so two melee units (range 0) meet.
pub fn step_toward_origin(pos: Position, speed: f64, delta_seconds: f64) -> Position {
    if pos.is_at_origin() {
        return pos;
    }
    let distance = pos.length();
    if distance < ORIGIN_EPSILON {
        return pos;
    }

    let step = speed * delta_seconds;
    if step >= distance {
        return Position::ORIGIN;
    }
    let next = pos - pos * (step / distance);
    // A unit never comes to rest inside the epsilon without being exactly on the origin
    if next.is_at_origin() {
        Position::ORIGIN
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_step_partial() {
        let next = step_toward_origin(Position::new(10.0, 0.0), 2.0, 1.0);
        assert!((next.x - 8.0).abs() < 1e-12);
        assert_eq!(next.y, 0.0);
    }

    #[test]
    fn test_step_keeps_direction() {
        let start = Position::new(3.0, 4.0);
        let next = step_toward_origin(start, 1.0, 1.0);
        assert!((next.length() - 4.0).abs() < 1e-12);
        // Still on the ray from the origin through the start point
        assert!((next.x / next.y - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_step_snaps_instead_of_overshooting() {
        let next = step_toward_origin(Position::new(0.01, -0.01), 60.0, DT);
        assert_eq!(next, Position::ORIGIN);
    }

    #[test]
    fn test_post_move_distance() {
        for &(x, y, speed) in &[(5.0, 5.0, 3.0), (0.02, 0.0, 6.0), (-7.5, 2.0, 0.5)] {
            let start = Position::new(x, y);
            let next = step_toward_origin(start, speed, DT);
            let expected = (start.length() - speed * DT).max(0.0);
            assert!((next.length() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_near_miss_snaps_exactly() {
        let speed = 1.0;
        let start = Position::new(speed * DT + 1e-9, 0.0);
        assert_eq!(step_toward_origin(start, speed, DT), Position::ORIGIN);
    }

    #[test]
    fn test_snap_undershoots_by_at_most_epsilon() {
        for &offset in &[0.0, 1e-9, 5e-7, 9.9e-7] {
            let start = Position::new(0.3 + offset, 0.0);
            let next = step_toward_origin(start, 18.0, DT);
            let expected = (start.length() - 18.0 * DT).max(0.0);
            assert!(next.length() <= expected + 1e-12);
            assert!(expected - next.length() < ORIGIN_EPSILON * 2f64.sqrt());
        }

        // On the diagonal: would stop 1.05e-6 out, both axes inside the epsilon
        let start = Position::new(0.3, 0.3);
        let next = step_toward_origin(start, (start.length() - 1.05e-6) / DT, DT);
        assert_eq!(next, Position::ORIGIN);
        // Far from the origin the step is exact
        let next = step_toward_origin(Position::new(0.3 + 2e-6, 0.0), 18.0, DT);
        assert!((next.x - 2e-6).abs() < 1e-12);
    }

    #[test]
    fn test_melee_pair_meets_exactly_on_origin() {
        let mut a = Position::new(-4.0, 3.0);
        let mut b = Position::new(4.0, -3.0);
        for _ in 0..200 {
            a = step_toward_origin(a, 2.0, DT);
            b = step_toward_origin(b, 2.0, DT);
        }
        assert_eq!(a, Position::ORIGIN);
        assert_eq!(a.distance(&b), 0.0);
    }

    #[test]
    fn test_at_origin_stays() {
        let start = Position::new(5e-7, 0.0);
        assert_eq!(step_toward_origin(start, 10.0, 1.0), start);
    }

    #[test]
    fn test_move_toward_origin_in_world() {
        let mut world = World::new();
        let entity = world.spawn((Position::new(0.0, 2.0),));

        assert!(move_toward_origin(&mut world, entity, 1.0, 1.0));
        let pos = *world.get::<&Position>(entity).unwrap();
        assert!((pos.y - 1.0).abs() < 1e-12);

        assert!(move_toward_origin(&mut world, entity, 5.0, 1.0));
        assert!(!move_toward_origin(&mut world, entity, 5.0, 1.0));
    }
}
