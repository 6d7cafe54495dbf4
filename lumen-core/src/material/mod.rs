use crate::interaction::PointGeometry;
use crate::rng::Rng;
use crate::spectrum::Spectrum;
use crate::Vector3f;

mod diffuse;
mod glass;
mod glossy;
mod mask;
mod mirror;
mod mixture;

pub use self::diffuse::DiffuseMaterial;
pub use self::glass::GlassMaterial;
pub use self::glossy::GlossyMaterial;
pub use self::mask::MaskMaterial;
pub use self::mirror::MirrorMaterial;
pub use self::mixture::MixtureMaterial;

/// Transport direction of the path carrying the evaluation: eye-to-light
/// (radiance) or light-to-eye (importance). Only variants with a
/// direction-dependent Jacobian care (the η² factor in Glass).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TransDir {
    EL,
    LE,
}

/// Direction sampled from a material lobe.
#[derive(Debug, Copy, Clone)]
pub struct MaterialDirectionSample {
    pub wo: Vector3f,
    /// Lobe index inside a composite; see `Material::pdf_direction`.
    pub comp: i32,
    /// Contribution over pdf for the sampled strategy.
    pub weight: Spectrum,
}

/// Scattering model attached to a surface primitive.
///
/// Directions `wi`/`wo` both point away from the surface. `eval`
/// returns the bare BSDF value; densities are reported in the projected
/// solid angle measure, so `weight = eval / pdf` holds without explicit
/// cosine factors. Delta lobes report zero value and density unless
/// `eval_delta` is set.
///
/// A component index selects a lobe inside a composite material; `-1`
/// marginalizes over the non-delta lobes.
#[derive(Debug)]
pub enum Material {
    Diffuse(DiffuseMaterial),
    Glossy(GlossyMaterial),
    Mirror(MirrorMaterial),
    Glass(GlassMaterial),
    Mask(MaskMaterial),
    Mixture(MixtureMaterial),
}

impl Material {
    pub fn is_specular(&self, geom: &PointGeometry, comp: i32) -> bool {
        match self {
            Material::Diffuse(_) | Material::Glossy(_) => false,
            Material::Mirror(_) | Material::Glass(_) | Material::Mask(_) => true,
            Material::Mixture(m) => m.is_specular(geom, comp),
        }
    }

    pub fn sample_direction(
        &self,
        rng: &mut Rng,
        geom: &PointGeometry,
        wi: &Vector3f,
        trans_dir: TransDir,
    ) -> Option<MaterialDirectionSample> {
        match self {
            Material::Diffuse(m) => m.sample(rng, geom, wi),
            Material::Glossy(m) => m.sample(rng, geom, wi),
            Material::Mirror(m) => m.sample(geom, wi),
            Material::Glass(m) => m.sample(rng, geom, wi, trans_dir),
            Material::Mask(m) => m.sample(wi),
            Material::Mixture(m) => m.sample(rng, geom, wi, trans_dir),
        }
    }

    /// Density of `sample_direction` in the projected solid angle
    /// measure, conditioned on `comp` where it names a lobe.
    pub fn pdf_direction(
        &self,
        geom: &PointGeometry,
        comp: i32,
        wi: &Vector3f,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> f32 {
        match self {
            Material::Diffuse(m) => m.pdf(geom, wi, wo),
            Material::Glossy(m) => m.pdf(geom, wi, wo),
            Material::Mirror(m) => m.pdf(eval_delta),
            Material::Glass(m) => m.pdf(geom, comp, wi, wo, eval_delta),
            Material::Mask(m) => m.pdf(eval_delta),
            Material::Mixture(m) => m.pdf(geom, comp, wi, wo, eval_delta),
        }
    }

    pub fn eval(
        &self,
        geom: &PointGeometry,
        comp: i32,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransDir,
        eval_delta: bool,
    ) -> Spectrum {
        match self {
            Material::Diffuse(m) => m.eval(geom, wi, wo),
            Material::Glossy(m) => m.eval(geom, wi, wo),
            Material::Mirror(m) => m.eval(eval_delta),
            Material::Glass(m) => m.eval(geom, comp, wi, wo, trans_dir, eval_delta),
            Material::Mask(m) => m.eval(eval_delta),
            Material::Mixture(m) => m.eval(geom, comp, wi, wo, trans_dir, eval_delta),
        }
    }

    /// Diffuse albedo when the material has a meaningful one; used by
    /// lobe-selection heuristics.
    pub fn reflectance(&self, geom: &PointGeometry) -> Option<Spectrum> {
        match self {
            Material::Diffuse(m) => Some(m.reflectance(geom)),
            Material::Mixture(m) => Some(m.reflectance(geom)),
            _ => None,
        }
    }
}
