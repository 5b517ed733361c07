use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default marker radius bounds at the reference size.
pub const MIN_ITEM_RADIUS: f64 = 8.0;
pub const MAX_ITEM_RADIUS: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle of `self` as seen from `origin`, in `(-PI, PI]`.
    pub fn angle_from(&self, origin: Point) -> f64 {
        (self.y - origin.y).atan2(self.x - origin.x)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Maps `value` linearly from `[min_value, max_value]` onto
/// `[min_radius, max_radius]`. Values outside the domain are not clamped.
pub fn value_to_radius(
    value: f64,
    min_value: f64,
    max_value: f64,
    min_radius: f64,
    max_radius: f64,
) -> f64 {
    if max_value == min_value {
        return (min_radius + max_radius) / 2.0;
    }
    let normalized = (value - min_value) / (max_value - min_value);
    min_radius + normalized * (max_radius - min_radius)
}

/// Angle 0 points along +x; callers offset by `-PI / 2` to start at the top.
pub fn polar_to_cartesian(center_x: f64, center_y: f64, radius: f64, angle: f64) -> Point {
    Point::new(
        center_x + radius * angle.cos(),
        center_y + radius * angle.sin(),
    )
}

pub fn angle_difference(a: f64, b: f64) -> f64 {
    // Normalize the difference to [-PI, PI] to find the shortest path around the circle
    ((a - b + PI).rem_euclid(2.0 * PI) - PI).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_value_to_radius_endpoints() {
        assert_eq!(value_to_radius(10.0, 10.0, 40.0, 8.0, 32.0), 8.0);
        assert_eq!(value_to_radius(40.0, 10.0, 40.0, 8.0, 32.0), 32.0);
        assert_eq!(value_to_radius(25.0, 10.0, 40.0, 8.0, 32.0), 20.0);
    }

    #[test]
    fn test_value_to_radius_degenerate_range_uses_midpoint() {
        for v in [-5.0, 0.0, 7.0, 1e9] {
            assert_eq!(
                value_to_radius(v, 7.0, 7.0, MIN_ITEM_RADIUS, MAX_ITEM_RADIUS),
                20.0
            );
        }
    }

    #[test]
    fn test_value_to_radius_is_monotonic() {
        let radii: Vec<f64> = (0..=100)
            .map(|i| value_to_radius(i as f64 * 0.37, 0.0, 37.0, 8.0, 32.0))
            .collect();
        assert!(radii.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_value_to_radius_does_not_clamp() {
        assert!(value_to_radius(50.0, 10.0, 40.0, 8.0, 32.0) > 32.0);
        assert!(value_to_radius(0.0, 10.0, 40.0, 8.0, 32.0) < 8.0);
    }

    #[test]
    fn test_polar_to_cartesian() {
        let p = polar_to_cartesian(100.0, 50.0, 10.0, 0.0);
        assert!((p.x - 110.0).abs() < EPS && (p.y - 50.0).abs() < EPS);

        let p = polar_to_cartesian(100.0, 50.0, 10.0, -PI / 2.0);
        assert!((p.x - 100.0).abs() < EPS && (p.y - 40.0).abs() < EPS);
    }

    #[test]
    fn test_angle_difference_wraps() {
        assert!((angle_difference(0.1, 2.0 * PI - 0.1) - 0.2).abs() < EPS);
        assert!((angle_difference(PI, -PI)).abs() < EPS);
    }
}
