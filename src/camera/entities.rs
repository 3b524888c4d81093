use bevy::prelude::*;

/// Marker component for the terrain camera entity.
#[derive(Component, Reflect)]
pub struct TerrainCamera;

/// Where the camera looks and from how far.
#[derive(Component, Clone, Debug, Reflect)]
pub struct CameraRig {
    /// Point on the ground the camera looks at.
    pub focus: Vec3,
    /// Distance from the focus point.
    pub distance: f32,
}

impl CameraRig {
    /// Camera transform looking down at `focus` from `pitch` radians above
    /// the horizon, on the +z side so +x points right on screen.
    pub fn transform(&self, pitch: f32) -> Transform {
        let offset = Vec3::new(0.0, pitch.sin(), pitch.cos()) * self.distance;
        Transform::from_translation(self.focus + offset).looking_at(self.focus, Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_keeps_distance_and_looks_at_focus() {
        let rig = CameraRig {
            focus: Vec3::new(30.0, 0.0, -10.0),
            distance: 50.0,
        };
        let transform = rig.transform(0.8);
        assert!((transform.translation.distance(rig.focus) - 50.0).abs() < 1e-3);
        let to_focus = (rig.focus - transform.translation).normalize();
        assert!(transform.forward().dot(to_focus) > 0.999);
        assert!(transform.right().x > 0.999);
    }
}
