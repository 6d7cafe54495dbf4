mod common;

use lumen_core::film::Film;
use lumen_core::integrator::{self, Integrator};
use lumen_core::medium::{HomogeneousMedium, Medium};
use lumen_core::paramset::Props;
use lumen_core::scene::Scene;
use lumen_core::spectrum::Spectrum;

fn pt_props(mode: &str, spp: i64, max_length: i64, seed: i64) -> Props {
    let mut props = Props::new();
    props
        .set_str("mode", mode)
        .set_int("spp", spp)
        .set_int("max_length", max_length)
        .set_int("seed", seed);
    props
}

fn render(scene: &Scene, name: &str, props: &Props, w: usize, h: usize) -> Film {
    let film = Film::new(w, h);
    let integrator = integrator::create(name, props).unwrap();
    let stats = integrator.render(scene, &film).unwrap();
    assert!(stats.processed > 0);
    film
}

#[test]
fn emissive_probe_converges_to_emission() {
    // A 1×1 film staring at a uniform emitter: the pixel must converge
    // to the emitted radiance.
    let scene = common::single_light_scene(Spectrum::white());
    let film = render(&scene, "pt", &pt_props("mis", 1024, 6, 42), 1, 1);
    let p = film.pixel(0, 0);
    assert!((p.r - 1.0).abs() < 0.05, "pixel {}", p);
    assert!((p.g - 1.0).abs() < 0.05);
    assert!((p.b - 1.0).abs() < 0.05);
}

#[test]
fn emissive_probe_image_mode_matches_pixel_mode() {
    let scene = common::single_light_scene(Spectrum::grey(2.0));
    let pixel = render(&scene, "pt", &pt_props("mis", 512, 6, 7), 2, 2);
    let mut props = pt_props("mis", 0, 6, 7);
    props.set_str("image_sample_mode", "image").set_int("spi", 2048);
    let image = render(&scene, "pt", &props, 2, 2);
    let (a, b) = (common::film_mean(&pixel), common::film_mean(&image));
    assert!((a.r - 2.0).abs() < 0.1, "pixel-mode mean {}", a);
    assert!((b.r - 2.0).abs() < 0.15, "image-mode mean {}", b);
}

#[test]
fn estimator_modes_agree_in_closed_box() {
    let scene = common::box_scene(0.5, 4.0);
    let mis = common::film_mean(&render(&scene, "pt", &pt_props("mis", 384, 6, 11), 8, 8));
    let nee = common::film_mean(&render(&scene, "pt", &pt_props("nee", 384, 6, 12), 8, 8));
    let naive = common::film_mean(&render(&scene, "pt", &pt_props("naive", 768, 6, 13), 8, 8));

    let rel = |a: f32, b: f32| (a - b).abs() / b.max(1e-6);
    assert!(rel(nee.y(), mis.y()) < 0.08, "nee {} vs mis {}", nee.y(), mis.y());
    assert!(
        rel(naive.y(), mis.y()) < 0.2,
        "naive {} vs mis {}",
        naive.y(),
        mis.y()
    );
}

#[test]
fn red_wall_dominates_facing_view() {
    let scene = common::box_scene(0.5, 4.0);
    let mean = common::film_mean(&render(&scene, "pt", &pt_props("mis", 256, 6, 21), 8, 8));
    assert!(
        mean.r > mean.g * 1.2,
        "expected red dominance, got {}",
        mean
    );
}

#[test]
fn independent_seeds_agree() {
    let scene = common::box_scene(0.5, 4.0);
    let a = common::film_mean(&render(&scene, "pt", &pt_props("mis", 256, 8, 31), 8, 8));
    let b = common::film_mean(&render(&scene, "pt", &pt_props("mis", 256, 8, 32), 8, 8));
    assert!((a.y() - b.y()).abs() / a.y() < 0.08, "{} vs {}", a.y(), b.y());
}

#[test]
fn volpt_matches_pt_in_vacuum() {
    let scene = common::single_light_scene(Spectrum::white());
    let mut props = Props::new();
    props
        .set_int("spp", 512)
        .set_int("max_verts", 6)
        .set_int("seed", 51);
    let film = render(&scene, "volpt", &props, 1, 1);
    let p = film.pixel(0, 0);
    assert!((p.r - 1.0).abs() < 0.05, "pixel {}", p);
}

#[test]
fn volpt_attenuates_through_absorbing_medium() {
    // Pure absorber between camera and emitter: the pixel converges to
    // Le·e^{-σa·d} with d = 2 (camera at z=1, emitter at z=-1).
    let scene = absorbing_scene_builder(1.0, 0.0).build();
    let mut props = Props::new();
    props
        .set_int("spp", 4096)
        .set_int("max_verts", 8)
        .set_int("seed", 52);
    let film = render(&scene, "volpt", &props, 1, 1);
    let expected = (-2.0f32).exp();
    let p = film.pixel(0, 0);
    assert!(
        (p.r - expected).abs() < 0.02,
        "pixel {} expected {}",
        p,
        expected
    );
}

#[test]
fn transmittance_through_unit_scattering_medium() {
    // σa = 0, σs = 1: mean transmittance of a unit segment is e^{-1}.
    let scene = absorbing_scene_builder(0.0, 1.0).build();
    use lumen_core::interaction::{InteractionKind, PointGeometry, SceneInteraction};
    use lumen_core::{Normal3f, Point2f, Point3f};
    let a = SceneInteraction::new(
        InteractionKind::SurfacePoint,
        0,
        PointGeometry::on_surface(
            Point3f::new(0.0, 0.0, 0.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Point2f::new(0.0, 0.0),
        ),
    );
    let b = SceneInteraction::new(
        InteractionKind::SurfacePoint,
        0,
        PointGeometry::on_surface(
            Point3f::new(0.0, 1.0, 0.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Point2f::new(0.0, 0.0),
        ),
    );
    let mut rng = lumen_core::rng::Rng::seeded(53);
    let n = 100_000;
    let mut sum = 0.0f64;
    for _ in 0..n {
        sum += f64::from(scene.eval_transmittance(&mut rng, &a, &b).r);
    }
    let mean = sum / n as f64;
    let expected = f64::from((-1.0f32).exp());
    assert!((mean - expected).abs() < 0.01, "mean transmittance {}", mean);
}

fn absorbing_scene_builder(sigma_a: f32, sigma_s: f32) -> lumen_core::scene::SceneBuilder {
    use lumen_core::{Point3f, Vector3f};
    let mut builder = Scene::builder();
    let light_mesh = common::quad_mesh(
        Point3f::new(0.0, 0.0, -1.0),
        4.0,
        Vector3f::new(0.0, 0.0, 1.0),
    );
    let mesh = builder.add_mesh(light_mesh);
    let black = common::colored_diffuse(&mut builder, Spectrum::black());
    let prim = builder.add_primitive(mesh, Some(black));
    builder.make_area_light(prim, Spectrum::white());
    builder.set_camera(lumen_core::camera::PinholeCamera::new(
        Point3f::new(0.0, 0.0, 1.0),
        Point3f::new(0.0, 0.0, -1.0),
        Vector3f::new(0.0, 1.0, 0.0),
        30.0,
    ));
    let medium = builder.add_medium(Medium::Homogeneous(HomogeneousMedium::new(
        Spectrum::grey(sigma_a),
        Spectrum::grey(sigma_s),
        0.0,
    )));
    builder.set_global_medium(medium);
    builder
}
