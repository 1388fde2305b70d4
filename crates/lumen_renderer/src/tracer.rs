//! Recursive Whitted shading.
//!
//! A `Tracer` borrows one pass's scene and options and shades rays against
//! them. Direct light is Phong with optional hard or sampled shadows;
//! reflective and transparent materials recurse until the bounce budget
//! runs out.

use lumen_core::{Color, Light, Material, RenderOptions, RenderSettings, ShadingMode};
use lumen_math::{Mat4, Ray, Vec3};
use rand::RngCore;

use crate::color::clamp_color;
use crate::scene::Scene;
use crate::triangle::Triangle;

/// Offset of reflected ray origins along the surface normal.
pub const REFLECT_BIAS: f32 = 0.001;

/// Offset of shadow ray origins along the surface normal.
pub const SHADOW_BIAS: f32 = 0.01;

/// A light with its deterministic position in view space.
#[derive(Debug, Clone)]
struct ViewLight {
    light: Light,
    center: Vec3,
}

/// Shades rays against a scene.
pub struct Tracer<'a> {
    scene: &'a Scene,
    options: &'a RenderOptions,
    lights: Vec<ViewLight>,
    modelview: Mat4,
    #[cfg(test)]
    traced: std::sync::atomic::AtomicU64,
}

impl<'a> Tracer<'a> {
    /// Prepare to shade `scene` with the lights and toggles in `settings`.
    ///
    /// Light centers are moved into view space with the scene's modelview.
    pub fn new(scene: &'a Scene, settings: &'a RenderSettings) -> Self {
        let modelview = scene.modelview();
        let lights = settings
            .lights
            .iter()
            .map(|light| ViewLight {
                light: light.clone(),
                center: modelview.transform_point3(light.position_center()),
            })
            .collect();

        Self {
            scene,
            options: &settings.options,
            lights,
            modelview,
            #[cfg(test)]
            traced: Default::default(),
        }
    }

    /// Number of `trace_and_shade` calls so far.
    #[cfg(test)]
    fn traced_rays(&self) -> u64 {
        self.traced.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Color of one primary ray in the given mode.
    pub fn shade_pixel(&self, mode: ShadingMode, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        match mode {
            ShadingMode::Phong => self.trace_and_shade(ray, self.options.bounces, 1.0, 1.0, rng),
            ShadingMode::Normals => self.first_hit(ray, |tri, bc| tri.interpolated_normal(bc).abs()),
            ShadingMode::Flat => self.first_hit(ray, |_, _| Color::ONE),
            ShadingMode::Unlit => self.first_hit(ray, |tri, _| clamp_color(tri.material().diffuse)),
        }
    }

    fn first_hit(&self, ray: &Ray, shade: impl Fn(&Triangle, Vec3) -> Color) -> Color {
        let hit = self.scene.closest_triangle(ray);
        match hit.hit() {
            Some(triangle) => shade(triangle, triangle.barycentric(ray.at(hit.t))),
            None => Color::ZERO,
        }
    }

    /// Shade the nearest hit along `ray`.
    ///
    /// `bounces` is the remaining recursion budget, `energy` the weight the
    /// caller gives this path and `current_ior` the index of refraction of
    /// the medium the ray travels in. Misses are black and the result is
    /// clamped to [0, 1].
    pub fn trace_and_shade(
        &self,
        ray: &Ray,
        bounces: u32,
        energy: f32,
        current_ior: f32,
        rng: &mut dyn RngCore,
    ) -> Color {
        #[cfg(test)]
        self.traced.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let hit = self.scene.closest_triangle(ray);
        let Some(triangle) = hit.hit() else {
            return Color::ZERO;
        };

        let bc = triangle.barycentric(ray.at(hit.t));
        let normal = triangle.interpolated_normal(bc);
        let point = triangle.interpolated_position(bc);
        let material = triangle.material();

        let mut color = material.emissive;

        for light in &self.lights {
            color += self.direct_light(triangle, light, point, normal, bc, rng);

            if self.options.reflection && material.reflectivity > 0.0 {
                color = if bounces > 0 {
                    let reflected = self.trace_and_shade(
                        &reflect_ray(ray, normal, point),
                        bounces - 1,
                        energy * material.reflectivity,
                        current_ior,
                        rng,
                    );
                    (color * (1.0 - material.reflectivity) + reflected) * energy
                } else {
                    Color::ZERO
                };
            }

            if self.options.refraction && material.transparency > 0.0 && bounces > 0 {
                let transmitted =
                    self.transmitted(ray, point, normal, material, bounces, energy, current_ior, rng);
                color = (color * (1.0 - material.transparency) + transmitted) * energy;
            }
        }

        clamp_color(color)
    }

    /// Light carried through a transparent surface, Fresnel-weighted
    /// against the reflection when enabled.
    #[allow(clippy::too_many_arguments)]
    fn transmitted(
        &self,
        ray: &Ray,
        point: Vec3,
        normal: Vec3,
        material: &Material,
        bounces: u32,
        energy: f32,
        current_ior: f32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let next_ior = material.index_of_refraction;
        let next_energy = energy * material.transparency;

        let (refracted, did_refract) = refract_ray(ray, point, normal, current_ior / next_ior);
        let refracted_color = self.trace_and_shade(&refracted, bounces - 1, next_energy, next_ior, rng);

        if !self.options.fresnel || !did_refract {
            return refracted_color;
        }

        let reflected_color = self.trace_and_shade(
            &reflect_ray(ray, normal, point),
            bounces - 1,
            next_energy,
            current_ior,
            rng,
        );
        let cos_i = ray.direction.normalize_or_zero().dot(normal).abs();
        let r = schlick(cos_i, current_ior, next_ior);
        reflected_color * r + refracted_color * (1.0 - r)
    }

    fn direct_light(
        &self,
        triangle: &Triangle,
        light: &ViewLight,
        point: Vec3,
        normal: Vec3,
        bc: Vec3,
        rng: &mut dyn RngCore,
    ) -> Color {
        let color = light.light.color;
        let lit = || triangle.phong_shading(light.center, color, bc);

        if !self.options.shadows {
            return lit();
        }

        if self.options.monte_carlo {
            let samples = self.options.light_samples.max(1);
            let visible = (0..samples)
                .filter(|_| {
                    let sample = self
                        .modelview
                        .transform_point3(light.light.sample_position(&mut *rng));
                    !self.occluded(point, normal, sample)
                })
                .count();
            let fraction = visible as f32 / samples as f32;
            return lit() * fraction + triangle.shadow_shading(color) * (1.0 - fraction);
        }

        if self.occluded(point, normal, light.center) {
            triangle.shadow_shading(color)
        } else {
            lit()
        }
    }

    /// Whether a non-emissive triangle lies between `point` and the light.
    fn occluded(&self, point: Vec3, normal: Vec3, light_position: Vec3) -> bool {
        let origin = point + normal * SHADOW_BIAS;
        let to_light = light_position - origin;
        let distance = to_light.length();
        let Some(direction) = to_light.try_normalize() else {
            return false;
        };

        let hit = self.scene.closest_triangle(&Ray::secondary(origin, direction));
        match hit.hit() {
            Some(blocker) => {
                hit.t < distance && blocker.is_valid() && !blocker.material().is_light()
            }
            None => false,
        }
    }
}

/// Mirror `ray` about `normal` at `point`.
///
/// The origin is nudged off the surface toward the side the ray came from.
pub fn reflect_ray(ray: &Ray, normal: Vec3, point: Vec3) -> Ray {
    let d = ray.direction;
    let reflected = d - 2.0 * d.dot(normal) * normal;
    let side = if d.dot(normal) > 0.0 { -normal } else { normal };
    Ray::secondary(point + side * REFLECT_BIAS, reflected)
}

/// Bend `ray` through the surface at `point` by Snell's law.
///
/// `eta` is the ratio of the incident to the transmitted index. When the
/// ray leaves through the back of the surface the normal is flipped and
/// the ratio inverted. On total internal reflection the mirrored ray is
/// returned with `false`.
pub fn refract_ray(ray: &Ray, point: Vec3, normal: Vec3, eta: f32) -> (Ray, bool) {
    let d = ray.direction.normalize_or_zero();
    let (n, eta) = if d.dot(normal) > 0.0 {
        (-normal, 1.0 / eta)
    } else {
        (normal, eta)
    };

    let cos_i = -d.dot(n);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        let reflected = d - 2.0 * d.dot(n) * n;
        return (Ray::secondary(point + n * REFLECT_BIAS, reflected), false);
    }

    let direction = eta * d + (eta * cos_i - k.sqrt()) * n;
    (
        Ray::secondary(point - n * REFLECT_BIAS, direction.normalize_or_zero()),
        true,
    )
}

/// Schlick's approximation of Fresnel reflectance.
pub fn schlick(cos_i: f32, n1: f32, n2: f32) -> f32 {
    let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_i.clamp(0.0, 1.0)).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn quad(z: f32, normal: Vec3, material: Arc<Material>) -> Vec<Triangle> {
        let a = Vec3::new(-10.0, -10.0, z);
        let b = Vec3::new(10.0, -10.0, z);
        let c = Vec3::new(10.0, 10.0, z);
        let d = Vec3::new(-10.0, 10.0, z);
        vec![
            Triangle::new([a, b, c], [normal; 3], [Vec2::ZERO; 3], Arc::clone(&material)),
            Triangle::new([a, c, d], [normal; 3], [Vec2::ZERO; 3], material),
        ]
    }

    fn settings(options: RenderOptions, lights: Vec<Light>) -> RenderSettings {
        RenderSettings::new(options, lights)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_flat_mode() {
        let scene = Scene::from_triangles(quad(2.0, -Vec3::Z, Arc::new(Material::default())));
        let settings = settings(RenderOptions::default(), vec![]);
        let tracer = Tracer::new(&scene, &settings);
        let mut rng = rng();

        let hit = tracer.shade_pixel(ShadingMode::Flat, &Ray::primary(Vec3::ZERO, Vec3::new(0.1, 0.2, 1.0)), &mut rng);
        assert_eq!(hit, Color::ONE);
        let miss = tracer.shade_pixel(ShadingMode::Flat, &Ray::primary(Vec3::ZERO, -Vec3::Z), &mut rng);
        assert_eq!(miss, Color::ZERO);
    }

    #[test]
    fn test_normals_and_unlit_modes() {
        let material = Arc::new(Material::phong(
            Color::ZERO,
            Color::new(0.2, 0.4, 0.6),
            Color::ZERO,
            Color::ZERO,
            1.0,
        ));
        let scene = Scene::from_triangles(quad(2.0, -Vec3::Z, material));
        let settings = settings(RenderOptions::default(), vec![]);
        let tracer = Tracer::new(&scene, &settings);
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(0.1, 0.2, 1.0));
        let mut rng = rng();

        let normal = tracer.shade_pixel(ShadingMode::Normals, &ray, &mut rng);
        assert!((normal - Vec3::Z).length() < 1e-6);
        let unlit = tracer.shade_pixel(ShadingMode::Unlit, &ray, &mut rng);
        assert!((unlit - Color::new(0.2, 0.4, 0.6)).length() < 1e-6);
    }

    #[test]
    fn test_no_lights_shows_only_emission() {
        let scene = Scene::from_triangles(quad(2.0, -Vec3::Z, Arc::new(Material::default())));
        let settings = settings(RenderOptions::default(), vec![]);
        let tracer = Tracer::new(&scene, &settings);
        let color = tracer.trace_and_shade(&Ray::primary(Vec3::ZERO, Vec3::new(0.1, 0.2, 1.0)), 10, 1.0, 1.0, &mut rng());
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_empty_scene_is_black() {
        let scene = Scene::new();
        let settings = settings(
            RenderOptions::default(),
            vec![Light::point(Vec3::new(0.0, 1.0, 0.0), Color::ONE)],
        );
        let tracer = Tracer::new(&scene, &settings);
        let ray = Ray::primary(Vec3::ZERO, Vec3::Z);
        assert!(!scene.closest_triangle(&ray).is_hit());
        assert_eq!(tracer.trace_and_shade(&ray, 10, 1.0, 1.0, &mut rng()), Color::ZERO);
    }

    #[test]
    fn test_lambertian_under_point_light() {
        let matte = Arc::new(Material::phong(
            Color::splat(0.1),
            Color::new(0.6, 0.4, 0.2),
            Color::ZERO,
            Color::ZERO,
            1.0,
        ));
        let scene = Scene::from_triangles(quad(2.0, -Vec3::Z, matte));
        let settings = settings(
            RenderOptions::default(),
            vec![Light::point(Vec3::new(0.1, 0.2, 1.0), Color::ONE)],
        );
        let tracer = Tracer::new(&scene, &settings);

        // The light sits straight in front of the hit point
        let color = tracer.trace_and_shade(&Ray::primary(Vec3::ZERO, Vec3::new(0.05, 0.1, 1.0)), 10, 1.0, 1.0, &mut rng());
        let expected = Color::splat(0.1) + Color::new(0.6, 0.4, 0.2);
        assert!((color - expected).length() < 1e-5);
        assert_eq!(tracer.traced_rays(), 1);
    }

    #[test]
    fn test_blocker_casts_shadow() {
        // Floor at z = 5 facing the camera, blocker halfway to the light
        let mut triangles = vec![Triangle::new(
            [
                Vec3::new(-1.0, -1.0, 3.0),
                Vec3::new(1.0, -1.0, 3.0),
                Vec3::new(0.0, 1.0, 3.0),
            ],
            [-Vec3::Z; 3],
            [Vec2::ZERO; 3],
            Arc::new(Material::default()),
        )];
        triangles.extend(quad(5.0, -Vec3::Z, Arc::new(Material::default())));
        let scene = Scene::from_triangles(triangles);

        // The floor point is hidden from the light but not from the camera
        let light = Light::point(Vec3::new(4.0, 0.0, 1.0), Color::ONE);
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(-4.0, 0.0, 5.0));

        let shadowed = settings(
            RenderOptions {
                shadows: true,
                ..Default::default()
            },
            vec![light.clone()],
        );
        let lit = settings(RenderOptions::default(), vec![light]);

        let with_shadow = Tracer::new(&scene, &shadowed).trace_and_shade(&ray, 0, 1.0, 1.0, &mut rng());
        let without = Tracer::new(&scene, &lit).trace_and_shade(&ray, 0, 1.0, 1.0, &mut rng());

        assert!((with_shadow - Color::splat(0.5)).length() < 1e-5);
        assert!(without.x > with_shadow.x);
    }

    #[test]
    fn test_emissive_blocker_casts_no_shadow() {
        let mut scene_triangles = vec![Triangle::new(
            [
                Vec3::new(-1.0, -1.0, 3.0),
                Vec3::new(1.0, -1.0, 3.0),
                Vec3::new(0.0, 1.0, 3.0),
            ],
            [-Vec3::Z; 3],
            [Vec2::ZERO; 3],
            Arc::new(Material::emitter("lamp", Color::ONE)),
        )];
        scene_triangles.extend(quad(5.0, -Vec3::Z, Arc::new(Material::default())));
        let scene = Scene::from_triangles(scene_triangles);

        let light = Light::point(Vec3::new(4.0, 0.0, 1.0), Color::ONE);
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(-4.0, 0.0, 5.0));
        let shadowed = settings(
            RenderOptions {
                shadows: true,
                ..Default::default()
            },
            vec![light.clone()],
        );
        let lit = settings(RenderOptions::default(), vec![light]);

        let a = Tracer::new(&scene, &shadowed).trace_and_shade(&ray, 0, 1.0, 1.0, &mut rng());
        let b = Tracer::new(&scene, &lit).trace_and_shade(&ray, 0, 1.0, 1.0, &mut rng());
        assert!((a - b).length() < 1e-6);
    }

    #[test]
    fn test_soft_shadow_is_between_lit_and_shadowed() {
        let scene = Scene::from_triangles(quad(5.0, -Vec3::Z, Arc::new(Material::default())));
        let light = Light::point(Vec3::new(0.0, 0.0, 1.0), Color::ONE);
        let options = RenderOptions {
            shadows: true,
            monte_carlo: true,
            light_samples: 8,
            ..Default::default()
        };
        let settings = settings(options, vec![light]);
        let tracer = Tracer::new(&scene, &settings);
        let color = tracer.trace_and_shade(&Ray::primary(Vec3::ZERO, Vec3::new(0.1, 0.2, 1.0)), 0, 1.0, 1.0, &mut rng());

        // Nothing blocks the light, so every sample is visible
        assert!(color.x > 0.5);
    }

    #[test]
    fn test_perfect_mirror_shows_reflected_surface() {
        // Mirror at z = 2 facing the camera, red wall behind the camera
        let mirror = Arc::new(
            Material::phong(Color::ZERO, Color::ZERO, Color::ZERO, Color::ZERO, 1.0).with_reflectivity(1.0),
        );
        let red = Arc::new(Material::phong(
            Color::ZERO,
            Color::ZERO,
            Color::ZERO,
            Color::new(1.0, 0.0, 0.0),
            1.0,
        ));
        let mut triangles = quad(2.0, -Vec3::Z, mirror);
        triangles.extend(quad(-2.0, Vec3::Z, red));
        let scene = Scene::from_triangles(triangles);

        let light = Light::point(Vec3::new(0.0, 5.0, 0.0), Color::ONE);
        let options = RenderOptions {
            reflection: true,
            ..Default::default()
        };
        let settings = settings(options, vec![light]);
        let tracer = Tracer::new(&scene, &settings);

        let color = tracer.trace_and_shade(&Ray::primary(Vec3::ZERO, Vec3::new(0.1, 0.2, 1.0)), 3, 1.0, 1.0, &mut rng());
        assert!((color - Color::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_clear_pane_shows_what_is_behind() {
        let glass = Arc::new(
            Material::phong(Color::ZERO, Color::ZERO, Color::ZERO, Color::ZERO, 1.0).with_refraction(1.0, 1.0),
        );
        let red = Arc::new(Material::emitter("red", Color::new(1.0, 0.0, 0.0)));
        let mut triangles = quad(2.0, -Vec3::Z, glass);
        triangles.extend(quad(4.0, -Vec3::Z, red));
        let scene = Scene::from_triangles(triangles);

        let light = Light::point(Vec3::new(0.0, 5.0, 0.0), Color::ONE);
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(0.1, 0.2, 1.0));

        let opaque = settings(RenderOptions::default(), vec![light.clone()]);
        let color = Tracer::new(&scene, &opaque).trace_and_shade(&ray, 3, 1.0, 1.0, &mut rng());
        assert_eq!(color, Color::ZERO);

        for fresnel in [false, true] {
            let options = RenderOptions {
                refraction: true,
                fresnel,
                ..Default::default()
            };
            let settings = settings(options, vec![light.clone()]);
            let color = Tracer::new(&scene, &settings).trace_and_shade(&ray, 3, 1.0, 1.0, &mut rng());
            // Matched indices reflect next to nothing
            assert!((color - Color::new(1.0, 0.0, 0.0)).length() < 1e-5);
        }
    }

    #[test]
    fn test_recursion_stops_at_bounce_budget() {
        // Two facing mirrors with the camera between them
        let mirror = Arc::new(Material::default().with_reflectivity(1.0));
        let mut triangles = quad(1.0, -Vec3::Z, Arc::clone(&mirror));
        triangles.extend(quad(-1.0, Vec3::Z, mirror));
        let scene = Scene::from_triangles(triangles);

        let options = RenderOptions {
            reflection: true,
            ..Default::default()
        };
        let settings = settings(options, vec![Light::point(Vec3::new(0.0, 5.0, 0.0), Color::ONE)]);

        for bounces in [0, 1, 4, 10] {
            let tracer = Tracer::new(&scene, &settings);
            tracer.trace_and_shade(&Ray::primary(Vec3::new(0.3, 0.1, 0.0), Vec3::Z), bounces, 1.0, 1.0, &mut rng());
            assert_eq!(tracer.traced_rays(), bounces as u64 + 1);
        }
    }

    #[test]
    fn test_facing_mirrors_without_bounces_are_black() {
        let mirror = Arc::new(Material::default().with_reflectivity(1.0));
        let mut triangles = quad(1.0, -Vec3::Z, Arc::clone(&mirror));
        triangles.extend(quad(-1.0, Vec3::Z, mirror));
        let scene = Scene::from_triangles(triangles);
        let options = RenderOptions {
            reflection: true,
            ..Default::default()
        };
        let settings = settings(options, vec![Light::point(Vec3::new(0.0, 0.5, 0.0), Color::ONE)]);
        let tracer = Tracer::new(&scene, &settings);

        let color = tracer.trace_and_shade(&Ray::primary(Vec3::new(0.3, 0.1, 0.0), Vec3::Z), 0, 1.0, 1.0, &mut rng());
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_results_are_clamped() {
        let hot = Arc::new(Material::emitter("hot", Color::splat(10.0)));
        let scene = Scene::from_triangles(quad(2.0, -Vec3::Z, hot));
        let lights = vec![
            Light::point(Vec3::new(0.0, 0.0, 1.0), Color::splat(5.0)),
            Light::point(Vec3::new(1.0, 0.0, 1.0), Color::splat(5.0)),
        ];
        let settings = settings(RenderOptions::default(), lights);
        let tracer = Tracer::new(&scene, &settings);
        let color = tracer.trace_and_shade(&Ray::primary(Vec3::ZERO, Vec3::new(0.1, 0.2, 1.0)), 10, 1.0, 1.0, &mut rng());
        assert_eq!(color, Color::ONE);
    }

    #[test]
    fn test_reflect_ray() {
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        let reflected = reflect_ray(&ray, -Vec3::Z, Vec3::new(1.0, 0.0, 1.0));
        assert!((reflected.direction - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-6);
        assert!(reflected.origin.z < 1.0);
        assert!(!reflected.is_primary());
    }

    #[test]
    fn test_refract_straight_through() {
        let ray = Ray::primary(Vec3::ZERO, Vec3::Z);
        let (refracted, ok) = refract_ray(&ray, Vec3::new(0.0, 0.0, 1.0), -Vec3::Z, 1.0 / 1.5);
        assert!(ok);
        assert!((refracted.direction - Vec3::Z).length() < 1e-6);
        assert!(refracted.origin.z > 1.0);
    }

    #[test]
    fn test_refract_bends_toward_normal() {
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        let (refracted, ok) = refract_ray(&ray, Vec3::new(1.0, 0.0, 1.0), -Vec3::Z, 1.0 / 1.5);
        assert!(ok);
        let sin_t = refracted.direction.x / refracted.direction.length();
        assert!((sin_t - std::f32::consts::FRAC_1_SQRT_2 / 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_total_internal_reflection() {
        // Leaving glass at 60 degrees exceeds the critical angle
        let direction = Vec3::new(60f32.to_radians().sin(), 0.0, 60f32.to_radians().cos());
        let ray = Ray::secondary(Vec3::ZERO, direction);
        let (reflected, ok) = refract_ray(&ray, direction, Vec3::Z, 1.0 / 1.5);
        assert!(!ok);
        assert!(reflected.direction.z < 0.0);
    }

    #[test]
    fn test_schlick() {
        assert!((schlick(1.0, 1.0, 1.5) - 0.04).abs() < 1e-6);
        assert!((schlick(0.0, 1.0, 1.5) - 1.0).abs() < 1e-6);
        assert_eq!(schlick(1.0, 1.0, 1.0), 0.0);
    }
}
