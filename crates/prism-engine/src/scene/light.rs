use glam::{Mat4, Vec3};

use crate::paint::Color;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LightKind {
    /// Uniform light from all directions.
    Ambient,
    /// Parallel light along the holding node's local -Z axis.
    Directional,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    /// Scales `color`; 1.0 is nominal.
    pub intensity: f32,
    /// Directional lights only: occluded surfaces lose this light's
    /// contribution and take on `shadow_color`.
    pub casts_shadow: bool,
    /// Tint of shadowed areas; alpha is the shadow's strength.
    pub shadow_color: Color,
}

/// Half-strength black, the usual default for shadow tints.
const DEFAULT_SHADOW_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.5);

impl Light {
    pub fn ambient(color: Color) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity: 1.0,
            casts_shadow: false,
            shadow_color: DEFAULT_SHADOW_COLOR,
        }
    }

    pub fn directional(color: Color) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            intensity: 1.0,
            casts_shadow: false,
            shadow_color: DEFAULT_SHADOW_COLOR,
        }
    }

    /// Enables shadow casting with the given tint.
    pub fn with_shadow(self, shadow_color: Color) -> Self {
        Self {
            casts_shadow: true,
            shadow_color,
            ..self
        }
    }

    /// True when this light should render a shadow map.
    pub fn shadows_enabled(&self) -> bool {
        self.casts_shadow && self.kind == LightKind::Directional && self.shadow_color.a > 0.0
    }

    /// Linear RGB radiance (color * intensity).
    pub fn radiance(&self) -> Vec3 {
        Vec3::new(self.color.r, self.color.g, self.color.b) * self.intensity
    }
}

/// A light resolved into world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneLight {
    pub light: Light,
    /// Unit direction the light travels in. Zero for ambient lights.
    pub direction: Vec3,
}

impl SceneLight {
    pub fn resolve(light: Light, world: Mat4) -> Self {
        let direction = match light.kind {
            LightKind::Ambient => Vec3::ZERO,
            LightKind::Directional => world.transform_vector3(Vec3::NEG_Z).normalize_or(Vec3::NEG_Z),
        };
        Self { light, direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;

    #[test]
    fn directional_light_points_down_local_neg_z() {
        let world = Transform::IDENTITY.with_euler_degrees(-90.0, 0.0, 0.0).matrix();
        let resolved = SceneLight::resolve(Light::directional(Color::WHITE), world);
        assert!((resolved.direction - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn ambient_light_has_no_direction() {
        let resolved = SceneLight::resolve(Light::ambient(Color::WHITE), Mat4::IDENTITY);
        assert_eq!(resolved.direction, Vec3::ZERO);
    }

    #[test]
    fn only_directional_lights_cast_shadows() {
        let black = Color::new(0.0, 0.0, 0.0, 0.8);
        assert!(Light::directional(Color::WHITE).with_shadow(black).shadows_enabled());
        assert!(!Light::ambient(Color::WHITE).with_shadow(black).shadows_enabled());
        assert!(!Light::directional(Color::WHITE).shadows_enabled());
        assert!(!Light::directional(Color::WHITE).with_shadow(Color::TRANSPARENT).shadows_enabled());
    }

    #[test]
    fn radiance_scales_with_intensity() {
        let mut light = Light::ambient(Color::new(0.5, 0.25, 1.0, 1.0));
        light.intensity = 2.0;
        assert_eq!(light.radiance(), Vec3::new(1.0, 0.5, 2.0));
    }
}
