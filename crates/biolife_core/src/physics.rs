//! Kinematics shared by cells and plants.
//!
//! Collision and border corrections never move an entity directly. They are
//! summed into `pending_displacement` and folded into the position once per
//! tick by [`KinematicsLogic::commit_displacement`].

use biolife_data::{Bounds, Kinematics, Vec2};

pub trait KinematicsLogic {
    /// Divides the velocity by `strength`; values above one damp it.
    fn apply_friction(&mut self, strength: f32);
    /// Rescales the velocity to `max` if it is faster.
    fn speed_limit(&mut self, max: f32);
    fn integrate(&mut self);
    /// Circle overlap test and correction against `other`.
    ///
    /// Returns `true` when the circles overlapped and a correction was queued.
    fn collide(&mut self, other: &mut Kinematics) -> bool;
    /// Queues the correction that keeps the circle inside `border`.
    fn contain_to_border(&mut self, border: &Bounds);
    /// Applies the pending displacement, clamps to `border` again, clears the
    /// accumulator and publishes the new position. Returns the net delta.
    fn commit_displacement(&mut self, border: &Bounds) -> Vec2;
    /// Movement since the renderer last saw this entity.
    fn publish(&mut self) -> Vec2;
    /// Moves the entity without velocity, e.g. into the dead zone.
    fn teleport(&mut self, position: Vec2);
    fn velocity_by_difference(&self) -> Vec2;
    fn overlaps(&self, other: &Kinematics) -> bool;
}

impl KinematicsLogic for Kinematics {
    #[inline]
    fn apply_friction(&mut self, strength: f32) {
        if strength > 0.0 && strength.is_finite() {
            self.velocity /= strength;
        }
    }

    #[inline]
    fn speed_limit(&mut self, max: f32) {
        let max = max.max(0.0);
        let speed_sq = self.velocity.length_squared();
        if speed_sq > max * max {
            self.velocity *= max / speed_sq.sqrt();
        }
    }

    #[inline]
    fn integrate(&mut self) {
        self.position_previous = self.position;
        self.position += self.velocity;
    }

    fn collide(&mut self, other: &mut Kinematics) -> bool {
        let sum = self.radius + other.radius;
        let offset = other.position - self.position;
        let dist_sq = offset.length_squared();
        // Stacked centres have no normal.
        if dist_sq >= sum * sum || dist_sq <= 0.0 {
            return false;
        }
        let dist = dist_sq.sqrt();
        let normal = offset / dist;
        let correction = normal * (sum - dist);
        self.pending_displacement -= correction * (other.radius / sum);
        other.pending_displacement += correction * (self.radius / sum);
        true
    }

    fn contain_to_border(&mut self, border: &Bounds) {
        let desired = self.position + self.pending_displacement;
        let clamped = border.clamp_circle(desired, self.radius);
        self.pending_displacement += clamped - desired;
    }

    fn commit_displacement(&mut self, border: &Bounds) -> Vec2 {
        self.position += self.pending_displacement;
        self.position = border.clamp_circle(self.position, self.radius);
        self.pending_displacement = Vec2::ZERO;
        self.publish()
    }

    fn publish(&mut self) -> Vec2 {
        let delta = self.position - self.published;
        self.published = self.position;
        self.last_delta = delta;
        delta
    }

    fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.position_previous = position;
        self.velocity = Vec2::ZERO;
        self.pending_displacement = Vec2::ZERO;
    }

    #[inline]
    fn velocity_by_difference(&self) -> Vec2 {
        self.position - self.position_previous
    }

    #[inline]
    fn overlaps(&self, other: &Kinematics) -> bool {
        let sum = self.radius + other.radius;
        self.position.distance_squared(other.position) < sum * sum
    }
}

/// Kinematics at rest at `position`.
#[must_use]
pub fn at_rest(position: Vec2, radius: f32) -> Kinematics {
    Kinematics {
        position,
        position_previous: position,
        radius,
        ..Kinematics::default()
    }
}

/// Drag grows with the square of speed and shrinks with body size.
#[inline]
#[must_use]
pub fn drag_resistance(coefficient: f32, velocity: Vec2, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    coefficient * velocity.length_squared() / radius
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_collision_split_five_and_ten() {
        let mut a = at_rest(Vec2::new(0.0, 0.0), 5.0);
        let mut b = at_rest(Vec2::new(12.0, 0.0), 10.0);
        assert!(a.collide(&mut b));
        assert!((a.pending_displacement - Vec2::new(-2.0, 0.0)).length() < EPS);
        assert!((b.pending_displacement - Vec2::new(1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_touching_and_stacked_do_not_collide() {
        let mut a = at_rest(Vec2::ZERO, 5.0);
        let mut b = at_rest(Vec2::new(10.0, 0.0), 5.0);
        assert!(!a.collide(&mut b));

        let mut c = at_rest(Vec2::ZERO, 5.0);
        assert!(!a.collide(&mut c));
        assert_eq!(a.pending_displacement, Vec2::ZERO);
        assert_eq!(c.pending_displacement, Vec2::ZERO);
    }

    #[test]
    fn test_speed_limit_rescales() {
        let mut k = at_rest(Vec2::ZERO, 1.0);
        k.velocity = Vec2::new(3.0, 4.0);
        k.speed_limit(1.0);
        assert!((k.velocity.length() - 1.0).abs() < EPS);
        assert!((k.velocity - Vec2::new(0.6, 0.8)).length() < EPS);

        k.velocity = Vec2::new(0.1, 0.0);
        k.speed_limit(1.0);
        assert_eq!(k.velocity, Vec2::new(0.1, 0.0));
    }

    #[test]
    fn test_friction_divides_velocity() {
        let mut k = at_rest(Vec2::ZERO, 1.0);
        k.velocity = Vec2::new(2.0, -4.0);
        k.apply_friction(2.0);
        assert_eq!(k.velocity, Vec2::new(1.0, -2.0));
        k.apply_friction(0.0);
        assert_eq!(k.velocity, Vec2::new(1.0, -2.0));
    }

    #[test]
    fn test_integrate_tracks_previous() {
        let mut k = at_rest(Vec2::new(1.0, 1.0), 1.0);
        k.velocity = Vec2::new(0.5, -0.5);
        k.integrate();
        assert_eq!(k.position, Vec2::new(1.5, 0.5));
        assert_eq!(k.velocity_by_difference(), Vec2::new(0.5, -0.5));
    }

    #[test]
    fn test_border_goes_through_accumulator() {
        let border = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let mut k = at_rest(Vec2::new(2.0, 50.0), 5.0);
        k.contain_to_border(&border);
        assert_eq!(k.position, Vec2::new(2.0, 50.0));
        assert_eq!(k.pending_displacement, Vec2::new(3.0, 0.0));

        let delta = k.commit_displacement(&border);
        assert_eq!(k.position, Vec2::new(5.0, 50.0));
        assert_eq!(k.pending_displacement, Vec2::ZERO);
        assert_eq!(delta, Vec2::new(5.0, 50.0));
        assert_eq!(k.last_delta, delta);
    }

    #[test]
    fn test_commit_reclamps_after_displacement() {
        let border = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let mut k = at_rest(Vec2::new(90.0, 50.0), 5.0);
        k.published = k.position;
        k.pending_displacement = Vec2::new(20.0, 0.0);
        let delta = k.commit_displacement(&border);
        assert_eq!(k.position, Vec2::new(95.0, 50.0));
        assert_eq!(delta, Vec2::new(5.0, 0.0));
    }
}
