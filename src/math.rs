//! Pure computation helpers extracted for testability.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! on plain numeric / `Vec3` inputs, making them straightforward to unit-test.

use bevy::prelude::Vec3;

/// Maps a noise value from the standard `[-1, 1]` range into `[min, max]`.
///
/// Noise generators (e.g. `Fbm<Perlin>`) produce values centred around zero.
/// This linearly rescales to an arbitrary output range.
///
/// # Examples
/// ```
/// # use hex_terraces::math::map_noise_to_range;
/// assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
/// assert_eq!(map_noise_to_range( 1.0, 0.0, 10.0), 10.0);
/// assert_eq!(map_noise_to_range( 0.0, 2.0, 6.0),  4.0);
/// ```
pub fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    min + ((noise_val as f32 + 1.0) / 2.0) * (max - min)
}

/// Maps a noise value onto the integer elevations `min..=max`.
///
/// The range is split into equally wide bands so both extremes are reachable;
/// values outside `[-1, 1]` clamp to the nearest end. An inverted range
/// collapses to `min`.
pub fn noise_to_elevation(noise_val: f64, min: i32, max: i32) -> i32 {
    let span = (i64::from(max) - i64::from(min)).max(0);
    let band = map_noise_to_range(noise_val, 0.0, (span + 1) as f32).floor() as i64;
    (i64::from(min) + band.clamp(0, span)) as i32
}

/// Scales a camera distance by scroll input and clamps it to `[min, max]`.
///
/// Positive `scroll_lines` zoom in; each line covers `zoom_speed` of the
/// current distance.
pub fn zoom_distance(current: f32, scroll_lines: f32, zoom_speed: f32, min: f32, max: f32) -> f32 {
    (current * (1.0 - scroll_lines * zoom_speed)).clamp(min, max)
}

/// Computes the face normal of a triangle defined by three vertices.
///
/// Uses the cross product of edges `(v1 - v0)` and `(v2 - v0)`.
/// Returns `Vec3::ZERO` if the triangle is degenerate (collinear points).
pub fn compute_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    edge1.cross(edge2).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── map_noise_to_range ──────────────────────────────────────────

    #[test]
    fn noise_min_maps_to_range_min() {
        assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn noise_max_maps_to_range_max() {
        assert_eq!(map_noise_to_range(1.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn noise_zero_maps_to_midpoint() {
        let result = map_noise_to_range(0.0, 2.0, 6.0);
        assert!((result - 4.0).abs() < 1e-6);
    }

    #[test]
    fn noise_works_with_negative_range() {
        let result = map_noise_to_range(0.0, -10.0, 10.0);
        assert!((result - 0.0).abs() < 1e-6);
    }

    // ── noise_to_elevation ──────────────────────────────────────────

    #[test]
    fn elevation_extremes_are_reachable() {
        assert_eq!(noise_to_elevation(-1.0, 0, 4), 0);
        assert_eq!(noise_to_elevation(1.0, 0, 4), 4);
        assert_eq!(noise_to_elevation(0.0, 0, 4), 2);
    }

    #[test]
    fn elevation_clamps_overshoot() {
        assert_eq!(noise_to_elevation(1.7, -2, 2), 2);
        assert_eq!(noise_to_elevation(-3.0, -2, 2), -2);
    }

    #[test]
    fn single_band_is_constant() {
        assert_eq!(noise_to_elevation(0.3, 5, 5), 5);
    }

    #[test]
    fn elevation_handles_full_and_inverted_ranges() {
        assert_eq!(noise_to_elevation(-1.0, i32::MIN, i32::MAX), i32::MIN);
        assert_eq!(noise_to_elevation(1.0, i32::MIN, i32::MAX), i32::MAX);
        assert_eq!(noise_to_elevation(0.5, 3, 1), 3);
    }

    // ── zoom_distance ───────────────────────────────────────────────

    #[test]
    fn scrolling_up_zooms_in() {
        let d = zoom_distance(100.0, 1.0, 0.1, 10.0, 500.0);
        assert!((d - 90.0).abs() < 1e-4);
        let d = zoom_distance(100.0, -2.0, 0.1, 10.0, 500.0);
        assert!((d - 120.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_stays_within_limits() {
        assert_eq!(zoom_distance(20.0, 50.0, 0.1, 10.0, 500.0), 10.0);
        assert_eq!(zoom_distance(400.0, -10.0, 0.1, 10.0, 500.0), 500.0);
    }

    // ── compute_normal ──────────────────────────────────────────────

    #[test]
    fn normal_of_xy_plane_triangle() {
        let n = compute_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
        // Cross of X × Y = Z
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn normal_of_xz_plane_triangle() {
        let n = compute_normal(Vec3::ZERO, Vec3::X, Vec3::Z);
        // Cross of X × Z = -Y
        assert!((n - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn degenerate_triangle_returns_zero() {
        // Collinear points
        let n = compute_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert_eq!(n, Vec3::ZERO);
    }
}
