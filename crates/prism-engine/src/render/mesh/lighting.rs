use glam::{Mat4, Vec3};

use crate::paint::Color;
use crate::scene::{Bounds, LightKind, PointOfView, SceneLight};

/// Directional lights beyond this count are ignored.
pub const MAX_LIGHTS: usize = 4;

/// Ambient level added by default lighting.
const DEFAULT_AMBIENT: f32 = 0.1;

/// Lights reduced to what the shader consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSet {
    pub ambient: Vec3,
    /// `(travel direction, radiance)` pairs.
    pub directional: Vec<(Vec3, Vec3)>,
    /// The directional light that renders a shadow map, if any.
    pub shadow: Option<ShadowCaster>,
}

/// First shadow-casting directional light of a scene.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowCaster {
    /// Index into `LightSet::directional`.
    pub light_index: usize,
    pub direction: Vec3,
    pub color: Color,
}

/// Reduces scene lights to a `LightSet`.
///
/// A scene without lights is lit by a white headlight along the view
/// direction (plus a faint ambient) when `auto_default` is set, and stays
/// black otherwise. Only the first shadow-casting directional light gets a
/// shadow.
pub fn collect_lights(lights: &[SceneLight], pov: &PointOfView, auto_default: bool) -> LightSet {
    if lights.is_empty() {
        if auto_default {
            return LightSet {
                ambient: Vec3::splat(DEFAULT_AMBIENT),
                directional: vec![(pov.forward(), Vec3::ONE)],
                shadow: None,
            };
        }
        return LightSet {
            ambient: Vec3::ZERO,
            directional: Vec::new(),
            shadow: None,
        };
    }

    let mut set = LightSet {
        ambient: Vec3::ZERO,
        directional: Vec::with_capacity(MAX_LIGHTS),
        shadow: None,
    };
    for l in lights {
        match l.light.kind {
            LightKind::Ambient => set.ambient += l.light.radiance(),
            LightKind::Directional if set.directional.len() < MAX_LIGHTS => {
                if set.shadow.is_none() && l.light.shadows_enabled() {
                    set.shadow = Some(ShadowCaster {
                        light_index: set.directional.len(),
                        direction: l.direction,
                        color: l.light.shadow_color,
                    });
                }
                set.directional.push((l.direction, l.light.radiance()));
            }
            LightKind::Directional => {
                log::trace!("directional light dropped: more than {MAX_LIGHTS} in scene");
            }
        }
    }
    set
}

/// Orthographic light-space transform whose volume encloses `bounds`, looking
/// along `direction`. Depth maps to `[0, 1]`.
pub fn shadow_view_projection(direction: Vec3, bounds: &Bounds) -> Mat4 {
    let dir = direction.normalize_or(Vec3::NEG_Y);
    let center = bounds.center();
    let radius = bounds.radius().max(0.01);

    // `look_at_rh` needs an up vector that is not parallel to the view axis.
    let up = if dir.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let eye = center - dir * (radius * 2.0);
    let view = Mat4::look_at_rh(eye, center, up);
    let proj = Mat4::orthographic_rh(-radius, radius, -radius, radius, radius, radius * 3.0);
    proj * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    use crate::paint::Color;
    use crate::scene::{Camera, Light};

    fn pov() -> PointOfView {
        PointOfView::new(Camera::default(), Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0)))
    }

    #[test]
    fn default_light_follows_view_when_enabled() {
        let set = collect_lights(&[], &pov(), true);
        assert_eq!(set.directional, vec![(Vec3::NEG_Z, Vec3::ONE)]);
        assert!(set.ambient.x > 0.0);
    }

    #[test]
    fn no_default_light_when_disabled() {
        let set = collect_lights(&[], &pov(), false);
        assert!(set.directional.is_empty());
        assert_eq!(set.ambient, Vec3::ZERO);
    }

    #[test]
    fn scene_lights_replace_default_light() {
        let lights = [
            SceneLight::resolve(Light::ambient(Color::white(0.5, 1.0)), Mat4::IDENTITY),
            SceneLight::resolve(Light::directional(Color::RED), Mat4::IDENTITY),
        ];
        let set = collect_lights(&lights, &pov(), true);
        assert_eq!(set.ambient, Vec3::splat(0.5));
        assert_eq!(set.directional, vec![(Vec3::NEG_Z, Vec3::X)]);
        assert_eq!(set.shadow, None);
    }

    #[test]
    fn first_shadow_caster_is_picked() {
        let tint = Color::new(0.0, 0.0, 0.0, 0.8);
        let lights = [
            SceneLight::resolve(Light::ambient(Color::WHITE).with_shadow(tint), Mat4::IDENTITY),
            SceneLight::resolve(Light::directional(Color::RED), Mat4::IDENTITY),
            SceneLight::resolve(Light::directional(Color::WHITE).with_shadow(tint), Mat4::IDENTITY),
            SceneLight::resolve(Light::directional(Color::GREEN).with_shadow(tint), Mat4::IDENTITY),
        ];
        let shadow = collect_lights(&lights, &pov(), false).shadow.unwrap();
        assert_eq!(shadow.light_index, 1);
        assert_eq!(shadow.color, tint);
        assert_eq!(shadow.direction, Vec3::NEG_Z);
    }

    #[test]
    fn default_light_casts_no_shadow() {
        assert_eq!(collect_lights(&[], &pov(), true).shadow, None);
    }

    #[test]
    fn shadow_volume_encloses_bounds() {
        let bounds = Bounds {
            min: Vec3::new(-50.0, 0.0, -50.0),
            max: Vec3::new(50.0, 10.0, 50.0),
        };
        let direction = Vec3::new(-0.866, -0.5, 0.0);
        let vp = shadow_view_projection(direction, &bounds);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { bounds.min.x } else { bounds.max.x },
                if i & 2 == 0 { bounds.min.y } else { bounds.max.y },
                if i & 4 == 0 { bounds.min.z } else { bounds.max.z },
            );
            let p = vp.project_point3(corner);
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 1.0, "{p:?}");
            assert!((0.0..=1.0).contains(&p.z), "{p:?}");
        }
    }

    #[test]
    fn shadow_depth_grows_along_light_direction() {
        let bounds = Bounds {
            min: Vec3::splat(-5.0),
            max: Vec3::splat(5.0),
        };
        let vp = shadow_view_projection(Vec3::NEG_Y, &bounds);
        let top = vp.project_point3(Vec3::new(0.0, 5.0, 0.0));
        let bottom = vp.project_point3(Vec3::new(0.0, -5.0, 0.0));
        assert!(top.z < bottom.z);
    }

    #[test]
    fn directional_lights_are_capped() {
        let lights: Vec<_> = (0..6)
            .map(|_| SceneLight::resolve(Light::directional(Color::WHITE), Mat4::IDENTITY))
            .collect();
        assert_eq!(collect_lights(&lights, &pov(), false).directional.len(), MAX_LIGHTS);
    }
}
