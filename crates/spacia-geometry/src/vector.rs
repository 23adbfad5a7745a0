//! 3-D vector primitives.
//!
//! Spacia's world frame is right-handed with **+x right, +y up, +z ahead**;
//! distances are metres and angles radians.  Objects only ever rotate about
//! the vertical axis (yaw), so the rotation helpers here are specialised to
//! that case instead of carrying a full quaternion.
//!
//! # Example
//!
//! ```rust
//! use spacia_geometry::vector::Vec3;
//! use std::f32::consts::FRAC_PI_2;
//!
//! // A point one metre to the right, yawed 90° counter-clockwise, ends up
//! // one metre ahead.
//! let p = Vec3::new(1.0, 0.0, 0.0).rotated_y(FRAC_PI_2);
//! assert!(p.x.abs() < 1e-5);
//! assert!((p.z - 1.0).abs() < 1e-5);
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D point or vector (metres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Distance to another point.
    pub fn distance(self, other: Self) -> f32 {
        self.sub(other).length()
    }

    /// Length of the footprint-plane projection (y dropped).
    pub fn length_xz(self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// Rotate counter-clockwise (seen from above) about the vertical axis
    /// through the origin.
    pub fn rotated_y(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            self.x * cos - self.z * sin,
            self.y,
            self.x * sin + self.z * cos,
        )
    }

    /// Rotate counter-clockwise about the vertical axis through `pivot`.
    pub fn rotated_about(self, pivot: Self, angle: f32) -> Self {
        self.sub(pivot).rotated_y(angle).add(pivot)
    }

    /// Transform a world point into the local frame anchored at `origin`
    /// with yaw `angle`: translate by `-origin`, then rotate by `-angle`.
    pub fn to_local(self, origin: Self, angle: f32) -> Self {
        self.sub(origin).rotated_y(-angle)
    }

    /// Inverse of [`to_local`][Self::to_local]: express a local point in
    /// world coordinates.
    pub fn to_world(self, origin: Self, angle: f32) -> Self {
        self.rotated_y(angle).add(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-5
    }

    // ── arithmetic ──────────────────────────────────────────────────────────

    #[test]
    fn add_sub_are_inverse() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-0.5, 4.0, 1.5);
        assert!(close(a.add(b).sub(b), a));
    }

    #[test]
    fn length_of_unit_axes() {
        assert!((Vec3::new(1.0, 0.0, 0.0).length() - 1.0).abs() < 1e-6);
        assert!((Vec3::new(0.0, -1.0, 0.0).length() - 1.0).abs() < 1e-6);
        assert!((Vec3::new(3.0, 4.0, 0.0).length() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        let b = Vec3::new(2.0, 3.0, 1.0);
        assert!((a.distance(b) - b.distance(a)).abs() < 1e-6);
    }

    #[test]
    fn length_xz_ignores_height() {
        let v = Vec3::new(3.0, 99.0, 4.0);
        assert!((v.length_xz() - 5.0).abs() < 1e-6);
    }

    // ── rotation ────────────────────────────────────────────────────────────

    #[test]
    fn quarter_turn_maps_right_to_ahead() {
        let p = Vec3::new(1.0, 0.0, 0.0).rotated_y(FRAC_PI_2);
        assert!(close(p, Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn half_turn_negates_footprint_axes() {
        let p = Vec3::new(1.0, 2.0, 3.0).rotated_y(PI);
        assert!(close(p, Vec3::new(-1.0, 2.0, -3.0)));
    }

    #[test]
    fn rotation_preserves_height() {
        let p = Vec3::new(0.3, 7.0, -0.4).rotated_y(1.234);
        assert!((p.y - 7.0).abs() < 1e-6);
    }

    #[test]
    fn rotated_about_pivot() {
        // Rotating (2,0,0) about (1,0,0) by 180° lands on the origin.
        let p = Vec3::new(2.0, 0.0, 0.0).rotated_about(Vec3::new(1.0, 0.0, 0.0), PI);
        assert!(close(p, Vec3::zero()));
    }

    // ── frame transforms ────────────────────────────────────────────────────

    #[test]
    fn local_world_roundtrip() {
        let origin = Vec3::new(1.0, 0.5, -2.0);
        let angle = 0.7;
        let p = Vec3::new(0.2, 1.1, 3.0);
        let back = p.to_local(origin, angle).to_world(origin, angle);
        assert!(close(back, p));
    }

    #[test]
    fn to_local_of_origin_is_zero() {
        let origin = Vec3::new(4.0, 1.0, 2.0);
        assert!(close(origin.to_local(origin, 1.3), Vec3::zero()));
    }

    #[test]
    fn to_local_undoes_frame_yaw() {
        // A point one metre ahead of a frame yawed 90° CCW sits at world
        // (-1, 0, 0) relative to the frame origin.
        let origin = Vec3::zero();
        let world = Vec3::new(-1.0, 0.0, 0.0);
        let local = world.to_local(origin, FRAC_PI_2);
        assert!(close(local, Vec3::new(0.0, 0.0, 1.0)));
    }
}
