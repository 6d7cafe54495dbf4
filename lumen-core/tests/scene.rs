mod common;

use lumen_core::interaction::{InteractionKind, PointGeometry, SceneInteraction};
use lumen_core::rng::Rng;
use lumen_core::spectrum::Spectrum;
use lumen_core::{Normal3f, Point2f, Point3f, Vector3f};

fn surface_point(p: Point3f, n: Normal3f) -> SceneInteraction {
    // Primitive 0 exists in every test scene.
    SceneInteraction::new(
        InteractionKind::SurfacePoint,
        0,
        PointGeometry::on_surface(p, n, Point2f::new(0.0, 0.0)),
    )
}

#[test]
fn visibility_is_symmetric() {
    let scene = common::box_scene(0.3, 1.0);
    let mut rng = Rng::seeded(101);
    for _ in 0..500 {
        let a = surface_point(
            Point3f::new(
                rng.uniform_f32() * 1.8 - 0.9,
                rng.uniform_f32() * 1.8 - 0.9,
                rng.uniform_f32() * 1.8 - 0.9,
            ),
            Normal3f::new(0.0, 1.0, 0.0),
        );
        let b = surface_point(
            Point3f::new(
                rng.uniform_f32() * 1.8 - 0.9,
                rng.uniform_f32() * 1.8 - 0.9,
                rng.uniform_f32() * 1.8 - 0.9,
            ),
            Normal3f::new(0.0, 1.0, 0.0),
        );
        assert_eq!(scene.visible(&a, &b), scene.visible(&b, &a));
    }
}

#[test]
fn visibility_blocked_by_walls() {
    let scene = common::box_scene(0.3, 1.0);
    let inside = surface_point(Point3f::new(0.0, 0.0, 0.0), Normal3f::new(0.0, 1.0, 0.0));
    let outside = surface_point(Point3f::new(3.0, 0.0, 0.0), Normal3f::new(0.0, 1.0, 0.0));
    assert!(!scene.visible(&inside, &outside));
    let near = surface_point(Point3f::new(0.2, 0.2, 0.2), Normal3f::new(0.0, 1.0, 0.0));
    assert!(scene.visible(&inside, &near));
}

#[test]
fn direct_light_weight_times_pdf_recovers_emission() {
    let scene = common::box_scene(0.4, 3.0);
    let sp = surface_point(Point3f::new(0.0, -0.5, 0.0), Normal3f::new(0.0, 1.0, 0.0));
    let mut rng = Rng::seeded(102);
    let mut checked = 0;
    for _ in 0..500 {
        if let Some(sl) = scene.sample_direct_light(&mut rng, &sp) {
            let pdf = scene.pdf_direct(&sp, &sl.sp, sl.comp, &sl.wo);
            assert!(pdf > 0.0);
            let le = scene.eval_contrb_endpoint(&sl.sp, &sl.wo);
            let recovered = sl.weight * pdf;
            assert!(
                (recovered.r - le.r).abs() < 1e-3 * le.r.max(1.0),
                "{} vs {}",
                recovered.r,
                le.r
            );
            checked += 1;
        }
    }
    assert!(checked > 400);
}

#[test]
fn primary_ray_raster_round_trip() {
    let scene = common::box_scene(0.3, 1.0);
    let aspect = 1.5;
    let mut rng = Rng::seeded(103);
    for _ in 0..300 {
        let rp = Point2f::new(rng.uniform_f32(), rng.uniform_f32());
        let ray = scene.primary_ray(&rp, aspect);
        let back = scene.raster_position(&ray.d, aspect).expect("inside film");
        assert!((back.x - rp.x).abs() < 1e-4);
        assert!((back.y - rp.y).abs() < 1e-4);
    }
}

#[test]
fn unbounded_miss_reaches_environment() {
    let mut builder = lumen_core::scene::Scene::builder();
    let mesh = builder.add_mesh(common::quad_mesh(
        Point3f::new(0.0, 0.0, -5.0),
        0.5,
        Vector3f::new(0.0, 0.0, 1.0),
    ));
    let mat = common::grey_diffuse(&mut builder, 0.5);
    builder.add_primitive(mesh, Some(mat));
    builder.set_env_light(Spectrum::grey(2.0), None);
    builder.set_camera(lumen_core::camera::PinholeCamera::new(
        Point3f::new(0.0, 0.0, 1.0),
        Point3f::new(0.0, 0.0, -1.0),
        Vector3f::new(0.0, 1.0, 0.0),
        40.0,
    ));
    let scene = builder.build();

    let ray = lumen_core::ray::Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0));
    let hit = scene.intersect(&ray, 1e-4, f32::INFINITY).expect("env hit");
    assert!(hit.geom.infinite);
    assert!(scene.is_light(&hit));
    // The interaction carries the propagation direction toward the scene.
    assert!((hit.geom.wo + ray.d).length() < 1e-5);
    // Bounded queries exclude the environment.
    assert!(scene.intersect(&ray, 1e-4, 100.0).is_none());

    let spl = hit.as_type(InteractionKind::LightEndpoint);
    assert_eq!(scene.eval_contrb_endpoint(&spl, &hit.geom.wo).r, 2.0);
}

#[test]
fn missing_elements_are_unsupported() {
    let builder = lumen_core::scene::Scene::builder();
    let scene = builder.build();
    let err = scene.require_renderable().unwrap_err();
    match err.downcast_ref::<lumen_core::Error>() {
        Some(lumen_core::Error::Unsupported(_)) => {}
        other => panic!("expected Unsupported, got {:?}", other),
    }
}
