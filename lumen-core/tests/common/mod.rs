#![allow(dead_code)]

use lumen_core::camera::PinholeCamera;
use lumen_core::material::{DiffuseMaterial, Material};
use lumen_core::mesh::TriangleMesh;
use lumen_core::scene::{Scene, SceneBuilder};
use lumen_core::spectrum::Spectrum;
use lumen_core::{Normal3f, Point2f, Point3f, Vector3f};

/// Quad spanning `half×half` around `center`, facing along `n`.
pub fn quad_mesh(center: Point3f, half: f32, n: Vector3f) -> TriangleMesh {
    let n = n.normalize();
    let (u, v) = lumen_core::geometry::coordinate_system(&n);
    let p = |su: f32, sv: f32| center + u * (su * half) + v * (sv * half);
    let normal = Normal3f::from(n);
    TriangleMesh::new(
        vec![p(-1.0, -1.0), p(1.0, -1.0), p(1.0, 1.0), p(-1.0, 1.0)],
        vec![normal; 4],
        vec![
            Point2f::new(0.0, 0.0),
            Point2f::new(1.0, 0.0),
            Point2f::new(1.0, 1.0),
            Point2f::new(0.0, 1.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

pub fn grey_diffuse(builder: &mut SceneBuilder, albedo: f32) -> usize {
    builder.add_material(Material::Diffuse(DiffuseMaterial::new(
        Spectrum::grey(albedo),
        None,
    )))
}

pub fn colored_diffuse(builder: &mut SceneBuilder, color: Spectrum) -> usize {
    builder.add_material(Material::Diffuse(DiffuseMaterial::new(color, None)))
}

/// A camera staring straight at a single emissive quad that fills the
/// whole field of view. Every primary ray sees radiance `le`.
pub fn single_light_scene(le: Spectrum) -> Scene {
    let mut builder = Scene::builder();
    let light_mesh = quad_mesh(Point3f::new(0.0, 0.0, -1.0), 4.0, Vector3f::new(0.0, 0.0, 1.0));
    let mesh = builder.add_mesh(light_mesh);
    let black = colored_diffuse(&mut builder, Spectrum::black());
    let prim = builder.add_primitive(mesh, Some(black));
    builder.make_area_light(prim, le);
    builder.set_camera(PinholeCamera::new(
        Point3f::new(0.0, 0.0, 1.0),
        Point3f::new(0.0, 0.0, -1.0),
        Vector3f::new(0.0, 1.0, 0.0),
        30.0,
    ));
    builder.build()
}

/// Closed 2×2×2 box around the origin with a ceiling light, a red wall
/// on -x and grey everything else. The camera sits inside looking at
/// the red wall.
pub fn box_scene(light_half: f32, ke: f32) -> Scene {
    let mut builder = Scene::builder();
    let grey = grey_diffuse(&mut builder, 0.6);
    let red = colored_diffuse(&mut builder, Spectrum::rgb(0.7, 0.08, 0.08));

    let mut wall = |b: &mut SceneBuilder, center: Point3f, n: Vector3f, mat: usize| {
        let mesh = b.add_mesh(quad_mesh(center, 1.0, n));
        b.add_primitive(mesh, Some(mat));
    };
    // Red wall on -x, the rest grey; normals point inward.
    wall(&mut builder, Point3f::new(-1.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), red);
    wall(&mut builder, Point3f::new(1.0, 0.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0), grey);
    wall(&mut builder, Point3f::new(0.0, -1.0, 0.0), Vector3f::new(0.0, 1.0, 0.0), grey);
    wall(&mut builder, Point3f::new(0.0, 1.0, 0.0), Vector3f::new(0.0, -1.0, 0.0), grey);
    wall(&mut builder, Point3f::new(0.0, 0.0, -1.0), Vector3f::new(0.0, 0.0, 1.0), grey);
    wall(&mut builder, Point3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), grey);

    // Ceiling light slightly below the ceiling.
    let black = colored_diffuse(&mut builder, Spectrum::black());
    let light_mesh = builder.add_mesh(quad_mesh(
        Point3f::new(0.0, 0.95, 0.0),
        light_half,
        Vector3f::new(0.0, -1.0, 0.0),
    ));
    let light_prim = builder.add_primitive(light_mesh, Some(black));
    builder.make_area_light(light_prim, Spectrum::grey(ke));

    builder.set_camera(PinholeCamera::new(
        Point3f::new(0.7, 0.0, 0.0),
        Point3f::new(-1.0, 0.0, 0.0),
        Vector3f::new(0.0, 1.0, 0.0),
        60.0,
    ));
    builder.build()
}

/// Mean value over every film pixel.
pub fn film_mean(film: &lumen_core::film::Film) -> Spectrum {
    let pixels = film.to_vec();
    let mut sum = Spectrum::black();
    for p in &pixels {
        sum += *p;
    }
    sum / pixels.len() as f32
}
