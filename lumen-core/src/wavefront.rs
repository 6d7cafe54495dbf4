use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{info, warn};

use crate::material::{
    DiffuseMaterial, GlassMaterial, GlossyMaterial, MaskMaterial, Material, MirrorMaterial,
    MixtureMaterial,
};
use crate::mesh::TriangleMesh;
use crate::scene::SceneBuilder;
use crate::spectrum::Spectrum;
use crate::texture::{BitmapTexture, Texture};
use crate::{Error, Normal3f, Point2f, Point3f};

#[derive(Debug, Default, Copy, Clone)]
pub struct ObjOptions {
    /// Replace mirror/glass (illum 5/7) materials with a zero-albedo
    /// diffuse and build the remaining mixtures without the alpha lobe.
    pub skip_specular_mat: bool,
}

/// Load an OBJ file and its MTL materials into the builder. Faces with
/// a non-zero `Ke` become area lights.
pub fn load_obj(builder: &mut SceneBuilder, path: &Path, opts: &ObjOptions) -> Result<()> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .with_context(|| Error::Io(format!("failed to load {}", path.display())))?;
    let materials =
        materials.with_context(|| Error::Io(format!("failed to load materials of {}", path.display())))?;
    info!(
        "Loaded {}: {} models, {} materials",
        path.display(),
        models.len(),
        materials.len()
    );

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut handles = Vec::with_capacity(materials.len());
    let mut emissions = Vec::with_capacity(materials.len());
    for m in &materials {
        let (material, ke) = convert_material(m, base_dir, opts);
        handles.push(builder.add_material(material));
        emissions.push(ke);
    }
    // Fallback material for faces without one.
    let default_material =
        builder.add_material(Material::Diffuse(DiffuseMaterial::new(Spectrum::grey(0.5), None)));

    for model in &models {
        let mesh = &model.mesh;
        if mesh.indices.is_empty() {
            continue;
        }
        let positions: Vec<Point3f> = mesh
            .positions
            .iter()
            .tuples()
            .map(|(x, y, z)| Point3f::new(*x, *y, *z))
            .collect();
        let normals: Vec<Normal3f> = mesh
            .normals
            .iter()
            .tuples()
            .map(|(x, y, z)| Normal3f::new(*x, *y, *z))
            .collect();
        let uvs: Vec<Point2f> = mesh
            .texcoords
            .iter()
            .tuples()
            .map(|(u, v)| Point2f::new(*u, *v))
            .collect();
        let mesh_id = builder.add_mesh(TriangleMesh::new(
            positions,
            normals,
            uvs,
            mesh.indices.clone(),
        ));
        let (material, ke) = match mesh.material_id {
            Some(mid) => (handles[mid], emissions[mid]),
            None => (default_material, Spectrum::black()),
        };
        let prim = builder.add_primitive(mesh_id, Some(material));
        if !ke.is_black() {
            builder.make_area_light(prim, ke);
        }
    }

    Ok(())
}

/// MTL record to material, per the illum convention: 5 → mirror,
/// 7 → glass(Ni), anything else a diffuse+glossy mixture with the
/// roughness derived from Ns and the `aniso` extension.
fn convert_material(m: &tobj::Material, base_dir: &Path, opts: &ObjOptions) -> (Material, Spectrum) {
    let ke = parse_spectrum(m.unknown_param.get("Ke"));
    let illum = m.illumination_model.unwrap_or(2);

    match illum {
        // Diagnostic mode: mirror/glass entries become plain black
        // diffuse, dropping their specular lobes entirely.
        5 | 7 if opts.skip_specular_mat => {
            return (
                Material::Diffuse(DiffuseMaterial::new(Spectrum::black(), None)),
                ke,
            );
        }
        5 => return (Material::Mirror(MirrorMaterial::new()), ke),
        7 => {
            let ni = if m.optical_density > 0.0 {
                m.optical_density
            } else {
                1.5
            };
            return (Material::Glass(GlassMaterial::new(ni)), ke);
        }
        _ => {}
    }

    let kd = Spectrum::rgb(m.diffuse[0], m.diffuse[1], m.diffuse[2]);
    let ks = Spectrum::rgb(m.specular[0], m.specular[1], m.specular[2]);
    let an = m
        .unknown_param
        .get("aniso")
        .and_then(|v| v.trim().parse::<f32>().ok())
        .unwrap_or(0.0);
    let r = 2.0 / (2.0 + m.shininess);
    let aniso_scale = (1.0 - 0.9 * an).sqrt();
    let ax = (r / aniso_scale).max(1e-3);
    let ay = (r * aniso_scale).max(1e-3);

    let map = if m.diffuse_texture.is_empty() {
        None
    } else {
        match BitmapTexture::from_file(base_dir.join(&m.diffuse_texture)) {
            Ok(tex) => Some(Arc::new(Texture::Bitmap(tex))),
            Err(err) => {
                warn!(
                    "Failed to load texture {} for material {}: {}",
                    m.diffuse_texture, m.name, err
                );
                None
            }
        }
    };
    let with_alpha = !opts.skip_specular_mat && map.as_ref().map_or(false, |t| t.has_alpha());
    let mixture = MixtureMaterial::new(
        DiffuseMaterial::new(kd, map),
        GlossyMaterial::new(ks, ax, ay),
        if with_alpha {
            Some(MaskMaterial::new())
        } else {
            None
        },
    );

    (Material::Mixture(mixture), ke)
}

fn parse_spectrum(value: Option<&String>) -> Spectrum {
    let value = match value {
        Some(v) => v,
        None => return Spectrum::black(),
    };
    let parts: Vec<f32> = value
        .split_whitespace()
        .filter_map(|p| p.parse().ok())
        .collect();
    match parts.len() {
        1 => Spectrum::grey(parts[0]),
        3 => Spectrum::rgb(parts[0], parts[1], parts[2]),
        _ => Spectrum::black(),
    }
}
