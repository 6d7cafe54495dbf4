use std::f32::INFINITY;
use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::bounds::Bounds2f;
use crate::bvh::{Bvh, TriangleRef};
use crate::camera::PinholeCamera;
use crate::interaction::{geometry_term, InteractionKind, PointGeometry, SceneInteraction};
use crate::light::{AreaLight, EnvLight, Light};
use crate::material::{Material, TransDir};
use crate::medium::Medium;
use crate::mesh::TriangleMesh;
use crate::ray::Ray;
use crate::rng::Rng;
use crate::spectrum::Spectrum;
use crate::texture::Texture;
use crate::{Error, Point2f, Point3f, Vector3f, RAY_EPSILON};

/// Full sample of the next ray on a path: the vertex it leaves from,
/// the sampled lobe, the outgoing direction and `contribution / pdf`.
#[derive(Debug, Copy, Clone)]
pub struct RaySample {
    pub sp: SceneInteraction,
    pub comp: i32,
    pub wo: Vector3f,
    pub weight: Spectrum,
}

impl RaySample {
    pub fn ray(&self) -> Ray {
        Ray::new(self.sp.geom.p, self.wo)
    }
}

/// Direction-only sample (no new interaction is constructed).
#[derive(Debug, Copy, Clone)]
pub struct DirectionSample {
    pub wo: Vector3f,
    pub comp: i32,
    pub weight: Spectrum,
}

/// Next-vertex sample along a ray: either a medium event or the next
/// surface, with any analytic transmittance division folded into the
/// weight.
#[derive(Debug, Copy, Clone)]
pub struct DistanceSample {
    pub sp: SceneInteraction,
    pub weight: Spectrum,
}

/// Scene node tying a mesh to the components attached to it. Handles
/// are indices into the scene's asset arrays.
#[derive(Debug, Default, Copy, Clone)]
pub struct Primitive {
    pub mesh: Option<usize>,
    pub material: Option<usize>,
    pub light: Option<usize>,
    pub medium: Option<usize>,
    pub camera: bool,
}

/// Composed scene: assets, primitives and the acceleration structure,
/// exposing the sampling contract the integrators are written against.
/// Immutable during rendering and shared freely across workers.
///
/// Measure conventions: densities around non-degenerate geometry are in
/// projected solid angle, around degenerate geometry in plain solid
/// angle, and direct-sampling densities fold in the uniform light
/// selection probability. Delta components report zero density unless
/// `eval_delta` is requested.
pub struct Scene {
    camera: Option<PinholeCamera>,
    camera_prim: usize,
    meshes: Vec<Arc<TriangleMesh>>,
    materials: Vec<Arc<Material>>,
    mediums: Vec<Arc<Medium>>,
    lights: Vec<Light>,
    /// Primitive handle per light, aligned with `lights`.
    light_prims: Vec<usize>,
    env_light: Option<usize>,
    /// Primitive whose medium fills the whole scene, if any.
    global_medium_prim: Option<usize>,
    primitives: Vec<Primitive>,
    accel: Bvh,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// Fails with `Unsupported` when an element every render needs is
    /// missing.
    pub fn require_renderable(&self) -> Result<()> {
        if self.camera.is_none() {
            return Err(Error::Unsupported("scene has no camera".into()).into());
        }
        if self.primitives.is_empty() {
            return Err(Error::Unsupported("scene has no primitives".into()).into());
        }
        if self.lights.is_empty() {
            return Err(Error::Unsupported("scene has no light".into()).into());
        }
        Ok(())
    }

    pub fn primitive(&self, id: usize) -> &Primitive {
        &self.primitives[id]
    }

    /// Pre-order visit of every primitive node.
    pub fn traverse_primitives<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &Primitive),
    {
        for (id, prim) in self.primitives.iter().enumerate() {
            visit(id, prim);
        }
    }

    fn camera(&self) -> &PinholeCamera {
        self.camera.as_ref().expect("camera checked at render start")
    }

    fn world_radius(&self) -> f32 {
        let b = self.accel.world_bounds();
        let d = b.diagonal();
        if d.x.is_finite() && d.x >= 0.0 {
            (d.length() * 0.5).max(1.0)
        } else {
            1.0
        }
    }

    // --- Camera interface -------------------------------------------------

    /// Terminator starting an eye path through the given raster window.
    pub fn camera_terminator(&self, window: Bounds2f, aspect: f32) -> SceneInteraction {
        SceneInteraction::new(
            InteractionKind::CameraEndpoint { window, aspect },
            self.camera_prim,
            PointGeometry::degenerated(self.camera().position()),
        )
    }

    pub fn primary_ray(&self, rp: &Point2f, aspect: f32) -> Ray {
        self.camera().primary_ray(rp, aspect)
    }

    pub fn raster_position(&self, wo: &Vector3f, aspect: f32) -> Option<Point2f> {
        self.camera().raster_position(wo, aspect)
    }

    // --- Queries ----------------------------------------------------------

    /// Closest hit in [tmin, tmax]. An unbounded miss lands on the
    /// environment light when the scene has one.
    pub fn intersect(&self, ray: &Ray, tmin: f32, tmax: f32) -> Option<SceneInteraction> {
        if let Some(hit) = self.accel.intersect(ray, tmin, tmax) {
            let mesh = &self.meshes[hit.mesh];
            let geom = PointGeometry::on_surface(
                ray.at(hit.t),
                mesh.shading_normal(hit.face, hit.b1, hit.b2),
                mesh.uv(hit.face, hit.b1, hit.b2),
            );
            return Some(SceneInteraction::new(
                InteractionKind::SurfacePoint,
                hit.primitive,
                geom,
            ));
        }
        if tmax.is_infinite() {
            if let Some(env) = self.env_light {
                return Some(SceneInteraction::new(
                    InteractionKind::InfiniteEnv,
                    self.light_prims[env],
                    PointGeometry::infinite_direction(-ray.d.normalize()),
                ));
            }
        }
        None
    }

    /// Mutual visibility. The shadow ray range is shortened by a small
    /// ε on both ends; a connection to an infinite endpoint is cast
    /// with a finite extent so the environment itself never occludes.
    pub fn visible(&self, sp1: &SceneInteraction, sp2: &SceneInteraction) -> bool {
        if sp1.geom.infinite && sp2.geom.infinite {
            return false;
        }
        let (ray, tmax) = if sp1.geom.infinite || sp2.geom.infinite {
            let (finite, inf) = if sp1.geom.infinite {
                (sp2, sp1)
            } else {
                (sp1, sp2)
            };
            let d = -inf.geom.wo.normalize();
            (Ray::new(finite.geom.p, d), 2.0 * self.world_radius())
        } else {
            let d = sp2.geom.p - sp1.geom.p;
            if d.length_squared() == 0.0 {
                return false;
            }
            (Ray::new(sp1.geom.p, d), 1.0 - RAY_EPSILON)
        };

        !self.accel.intersect_p(&ray, RAY_EPSILON, tmax)
    }

    pub fn is_light(&self, sp: &SceneInteraction) -> bool {
        self.primitives[sp.primitive].light.is_some()
    }

    pub fn is_specular(&self, sp: &SceneInteraction, comp: i32) -> bool {
        match sp.kind {
            InteractionKind::SurfacePoint => match self.material_at(sp) {
                Some(material) => material.is_specular(&sp.geom, comp),
                None => false,
            },
            _ => false,
        }
    }

    fn material_at(&self, sp: &SceneInteraction) -> Option<&Material> {
        self.primitives[sp.primitive]
            .material
            .map(|m| &*self.materials[m])
    }

    fn medium_at(&self, prim: usize) -> Option<&Medium> {
        self.primitives[prim].medium.map(|m| &*self.mediums[m])
    }

    fn light_at_primitive(&self, prim: usize) -> Option<&Light> {
        self.primitives[prim].light.map(|l| &self.lights[l])
    }

    // --- Path sampling ----------------------------------------------------

    /// Unified ray sampling: terminator endpoints emit a primary ray
    /// (ignoring `wi`), scattering vertices sample a direction from the
    /// material or phase function.
    pub fn sample_ray(
        &self,
        rng: &mut Rng,
        sp: &SceneInteraction,
        wi: &Vector3f,
    ) -> Option<RaySample> {
        match sp.kind {
            InteractionKind::CameraEndpoint { window, aspect } => {
                let (u1, u2) = rng.uniform_2d();
                let rp = window.lerp(u1, u2);
                let ray = self.primary_ray(&rp, aspect);
                // Raster-uniform sampling has density exactly We.
                Some(RaySample {
                    sp: *sp,
                    comp: 0,
                    wo: ray.d,
                    weight: Spectrum::white(),
                })
            }
            InteractionKind::LightEndpoint => {
                let n = self.lights.len();
                if n == 0 {
                    return None;
                }
                let i = ((rng.uniform_f32() * n as f32) as usize).min(n - 1);
                let b = self.accel.world_bounds();
                let center = if self.accel.is_empty() {
                    Point3f::new(0.0, 0.0, 0.0)
                } else {
                    b.centroid()
                };
                let s = self.lights[i].sample_ray(rng, center, self.world_radius())?;
                Some(RaySample {
                    sp: SceneInteraction::new(
                        InteractionKind::LightEndpoint,
                        self.light_prims[i],
                        s.geom,
                    ),
                    comp: 0,
                    wo: s.wo,
                    weight: s.weight * n as f32,
                })
            }
            InteractionKind::SurfacePoint => {
                let material = self.material_at(sp)?;
                let s = material.sample_direction(rng, &sp.geom, wi, TransDir::EL)?;
                Some(RaySample {
                    sp: *sp,
                    comp: s.comp,
                    wo: s.wo,
                    weight: s.weight,
                })
            }
            InteractionKind::MediumPoint => {
                let medium = self.medium_at(sp.primitive)?;
                let s = medium.phase().sample(rng, wi);
                Some(RaySample {
                    sp: *sp,
                    comp: 0,
                    wo: s.wo,
                    weight: Spectrum::grey(s.weight),
                })
            }
            InteractionKind::InfiniteEnv => None,
        }
    }

    /// Direction-only variant of `sample_ray`.
    pub fn sample_direction(
        &self,
        rng: &mut Rng,
        sp: &SceneInteraction,
        wi: &Vector3f,
    ) -> Option<DirectionSample> {
        let s = self.sample_ray(rng, sp, wi)?;
        Some(DirectionSample {
            wo: s.wo,
            comp: s.comp,
            weight: s.weight,
        })
    }

    /// Density of `sample_direction`: projected solid angle around
    /// non-degenerate geometry, plain solid angle otherwise.
    pub fn pdf_direction(&self, sp: &SceneInteraction, comp: i32, wi: &Vector3f, wo: &Vector3f) -> f32 {
        match sp.kind {
            InteractionKind::CameraEndpoint { aspect, .. } => self.camera().importance(wo, aspect),
            InteractionKind::SurfacePoint => match self.material_at(sp) {
                Some(material) => material.pdf_direction(&sp.geom, comp, wi, wo, false),
                None => 0.0,
            },
            InteractionKind::MediumPoint => match self.medium_at(sp.primitive) {
                Some(medium) => medium.phase().pdf(wi, wo),
                None => 0.0,
            },
            InteractionKind::LightEndpoint => match self.light_at_primitive(sp.primitive) {
                // Cosine-distributed emission off the front face.
                Some(Light::Area(_)) => {
                    if sp.geom.n.dot(wo) > 0.0 {
                        std::f32::consts::FRAC_1_PI
                    } else {
                        0.0
                    }
                }
                _ => 0.0,
            },
            InteractionKind::InfiniteEnv => 0.0,
        }
    }

    /// Sample a point on a light and the direction from it toward `sp`.
    /// The returned `wo` points from the light endpoint to `sp`;
    /// callers shade with `-wo`. The weight folds the uniform light
    /// selection in.
    pub fn sample_direct_light(&self, rng: &mut Rng, sp: &SceneInteraction) -> Option<RaySample> {
        let n = self.lights.len();
        if n == 0 {
            return None;
        }
        let i = ((rng.uniform_f32() * n as f32) as usize).min(n - 1);
        let s = self.lights[i].sample_direct(rng, &sp.geom)?;
        let pdf = s.pdf / n as f32;
        if pdf == 0.0 {
            return None;
        }

        Some(RaySample {
            sp: SceneInteraction::new(InteractionKind::LightEndpoint, self.light_prims[i], s.geom),
            comp: 0,
            wo: s.wo,
            weight: s.le / pdf,
        })
    }

    /// Dual of `sample_direct_light` for light tracing: the (delta)
    /// camera position and the direction from it toward `sp`.
    pub fn sample_direct_camera(
        &self,
        _rng: &mut Rng,
        sp: &SceneInteraction,
        aspect: f32,
    ) -> Option<RaySample> {
        let camera = self.camera.as_ref()?;
        let d = sp.geom.p - camera.position();
        if d.length_squared() == 0.0 {
            return None;
        }
        let wo = d.normalize();
        let importance = camera.importance(&wo, aspect);
        if importance == 0.0 {
            return None;
        }
        let geom = PointGeometry::degenerated(camera.position());
        let g = geometry_term(&sp.geom, &geom);
        if g == 0.0 {
            return None;
        }

        Some(RaySample {
            sp: SceneInteraction::new(
                InteractionKind::CameraEndpoint {
                    window: Bounds2f::unit(),
                    aspect,
                },
                self.camera_prim,
                geom,
            ),
            comp: 0,
            wo,
            weight: Spectrum::grey(importance * g),
        })
    }

    /// Density the direct-sampling strategies would have produced this
    /// endpoint connection with, in the projected solid angle measure
    /// at `sp`.
    pub fn pdf_direct(
        &self,
        sp: &SceneInteraction,
        sp_endpoint: &SceneInteraction,
        _comp_endpoint: i32,
        wo: &Vector3f,
    ) -> f32 {
        match sp_endpoint.kind {
            InteractionKind::CameraEndpoint { aspect, .. } => {
                if self.camera().importance(wo, aspect) == 0.0 {
                    return 0.0;
                }
                let g = geometry_term(&sp.geom, &sp_endpoint.geom);
                if g == 0.0 {
                    0.0
                } else {
                    1.0 / g
                }
            }
            _ => match self.light_at_primitive(sp_endpoint.primitive) {
                Some(light) => {
                    light.pdf_direct(&sp.geom, &sp_endpoint.geom, wo) / self.lights.len() as f32
                }
                None => 0.0,
            },
        }
    }

    // --- Volumetric sampling ----------------------------------------------

    /// Sample the next vertex along the ray from `sp` in direction
    /// `wo`: either a medium event or the next surface. An escaped ray
    /// lands on the environment (an `infinite` interaction) when the
    /// scene has one, otherwise the sample is empty.
    pub fn sample_distance(
        &self,
        rng: &mut Rng,
        sp: &SceneInteraction,
        wo: &Vector3f,
    ) -> Option<DistanceSample> {
        let ray = Ray::new(sp.geom.p, *wo);
        let hit = self.intersect(&ray, RAY_EPSILON, INFINITY);
        let t_surf = match hit {
            Some(ref h) if h.is_surface() => sp.geom.p.distance(&h.geom.p),
            _ => INFINITY,
        };
        let mut weight = Spectrum::white();
        if let Some(prim) = self.global_medium_prim {
            if let Some(medium) = self.medium_at(prim) {
                let md = medium.sample_distance(rng, &ray, RAY_EPSILON, t_surf);
                if md.scattered {
                    let geom = PointGeometry::in_medium(ray.at(md.t));
                    return Some(DistanceSample {
                        sp: SceneInteraction::new(InteractionKind::MediumPoint, prim, geom),
                        weight: md.weight,
                    });
                }
                weight = md.weight;
            }
        }

        hit.map(|sp_next| DistanceSample {
            sp: sp_next,
            weight,
        })
    }

    /// Unbiased transmittance between two mutually visible points:
    /// zero when occluded, the medium transmittance estimate otherwise.
    pub fn eval_transmittance(
        &self,
        rng: &mut Rng,
        sp1: &SceneInteraction,
        sp2: &SceneInteraction,
    ) -> Spectrum {
        if !self.visible(sp1, sp2) {
            return Spectrum::black();
        }
        let medium = match self.global_medium_prim.and_then(|p| self.medium_at(p)) {
            Some(m) => m,
            None => return Spectrum::white(),
        };
        if sp1.geom.infinite || sp2.geom.infinite {
            let (finite, inf) = if sp1.geom.infinite {
                (sp2, sp1)
            } else {
                (sp1, sp2)
            };
            let d = -inf.geom.wo.normalize();
            let ray = Ray::new(finite.geom.p, d);
            return medium.eval_transmittance(rng, &ray, 0.0, 2.0 * self.world_radius());
        }
        let d = sp2.geom.p - sp1.geom.p;
        let dist = d.length();
        if dist == 0.0 {
            return Spectrum::white();
        }
        let ray = Ray::new(sp1.geom.p, d / dist);

        medium.eval_transmittance(rng, &ray, 0.0, dist)
    }

    // --- Evaluation -------------------------------------------------------

    /// BSDF / phase / emission / importance at `sp` depending on its
    /// tag. Delta components need `eval_delta` through the material
    /// interface and are reported as zero here.
    pub fn eval_contrb(
        &self,
        sp: &SceneInteraction,
        comp: i32,
        wi: &Vector3f,
        wo: &Vector3f,
    ) -> Spectrum {
        match sp.kind {
            InteractionKind::SurfacePoint => match self.material_at(sp) {
                Some(material) => material.eval(&sp.geom, comp, wi, wo, TransDir::EL, false),
                None => Spectrum::black(),
            },
            InteractionKind::MediumPoint => match self.medium_at(sp.primitive) {
                Some(medium) => Spectrum::grey(medium.phase().eval(wi, wo)),
                None => Spectrum::black(),
            },
            InteractionKind::CameraEndpoint { aspect, .. } => {
                Spectrum::grey(self.camera().importance(wo, aspect))
            }
            InteractionKind::LightEndpoint | InteractionKind::InfiniteEnv => {
                self.eval_contrb_endpoint(sp, wo)
            }
        }
    }

    /// Emission (or importance) at `sp`, regardless of how the
    /// interaction is tagged. `wo` points from the endpoint toward the
    /// receiver.
    pub fn eval_contrb_endpoint(&self, sp: &SceneInteraction, wo: &Vector3f) -> Spectrum {
        if let Some(light) = self.light_at_primitive(sp.primitive) {
            return light.eval(&sp.geom, wo);
        }
        if self.primitives[sp.primitive].camera {
            if let InteractionKind::CameraEndpoint { aspect, .. } = sp.kind {
                return Spectrum::grey(self.camera().importance(wo, aspect));
            }
        }
        Spectrum::black()
    }

    /// Diffuse albedo at `sp` when the material exposes one.
    pub fn reflectance(&self, sp: &SceneInteraction, _comp: i32) -> Option<Spectrum> {
        self.material_at(sp)
            .and_then(|material| material.reflectance(&sp.geom))
    }
}

/// Programmatic scene assembly; `build` freezes the assets, constructs
/// the lights and the BVH.
#[derive(Default)]
pub struct SceneBuilder {
    camera: Option<PinholeCamera>,
    meshes: Vec<Arc<TriangleMesh>>,
    materials: Vec<Arc<Material>>,
    mediums: Vec<Arc<Medium>>,
    primitives: Vec<Primitive>,
    /// (primitive, mesh, Ke) triples resolved into area lights at build.
    area_lights: Vec<(usize, usize, Spectrum)>,
    env: Option<(Spectrum, Option<Arc<Texture>>)>,
    global_medium: Option<usize>,
}

impl SceneBuilder {
    pub fn add_mesh(&mut self, mesh: TriangleMesh) -> usize {
        self.meshes.push(Arc::new(mesh));
        self.meshes.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(Arc::new(material));
        self.materials.len() - 1
    }

    pub fn add_medium(&mut self, medium: Medium) -> usize {
        self.mediums.push(Arc::new(medium));
        self.mediums.len() - 1
    }

    pub fn set_camera(&mut self, camera: PinholeCamera) {
        self.camera = Some(camera);
    }

    /// Geometry node; returns the primitive handle.
    pub fn add_primitive(&mut self, mesh: usize, material: Option<usize>) -> usize {
        self.primitives.push(Primitive {
            mesh: Some(mesh),
            material,
            ..Primitive::default()
        });
        self.primitives.len() - 1
    }

    /// Attach a diffuse emitter to an existing geometry primitive.
    pub fn make_area_light(&mut self, primitive: usize, ke: Spectrum) {
        let mesh = self.primitives[primitive]
            .mesh
            .expect("area light requires geometry");
        self.area_lights.push((primitive, mesh, ke));
    }

    pub fn set_env_light(&mut self, le: Spectrum, map: Option<Arc<Texture>>) {
        self.env = Some((le, map));
    }

    /// Medium filling the whole scene.
    pub fn set_global_medium(&mut self, medium: usize) {
        self.global_medium = Some(medium);
    }

    pub fn build(mut self) -> Scene {
        // Camera primitive.
        let camera_prim = self.primitives.len();
        self.primitives.push(Primitive {
            camera: true,
            ..Primitive::default()
        });

        let mut lights = Vec::new();
        let mut light_prims = Vec::new();
        for (prim, mesh, ke) in &self.area_lights {
            self.primitives[*prim].light = Some(lights.len());
            lights.push(Light::Area(AreaLight::new(
                *ke,
                Arc::clone(&self.meshes[*mesh]),
            )));
            light_prims.push(*prim);
        }
        let env_light = self.env.take().map(|(le, map)| {
            let prim = self.primitives.len();
            self.primitives.push(Primitive {
                light: Some(lights.len()),
                ..Primitive::default()
            });
            lights.push(Light::Envmap(EnvLight::new(le, map)));
            light_prims.push(prim);
            lights.len() - 1
        });

        let global_medium_prim = self.global_medium.map(|medium| {
            self.primitives.push(Primitive {
                medium: Some(medium),
                ..Primitive::default()
            });
            self.primitives.len() - 1
        });

        let mut tris = Vec::new();
        for (id, prim) in self.primitives.iter().enumerate() {
            if let Some(mesh) = prim.mesh {
                for face in 0..self.meshes[mesh].n_triangles() {
                    tris.push(TriangleRef {
                        primitive: id,
                        mesh,
                        face,
                    });
                }
            }
        }
        let accel = Bvh::build(self.meshes.clone(), tris);
        info!(
            "Scene built: {} primitives, {} lights, env: {}, medium: {}",
            self.primitives.len(),
            lights.len(),
            env_light.is_some(),
            global_medium_prim.is_some()
        );

        Scene {
            camera: self.camera,
            camera_prim,
            meshes: self.meshes,
            materials: self.materials,
            mediums: self.mediums,
            lights,
            light_prims,
            env_light,
            global_medium_prim,
            primitives: self.primitives,
            accel,
        }
    }
}
