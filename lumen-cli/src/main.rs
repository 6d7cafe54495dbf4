mod argparse;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use log::info;

use lumen_core::film::Film;
use lumen_core::integrator;
use lumen_core::medium::{HomogeneousMedium, Medium};
use lumen_core::paramset::Props;
use lumen_core::scene::Scene;
use lumen_core::spectrum::Spectrum;
use lumen_core::texture::{BitmapTexture, Texture};
use lumen_core::wavefront::{self, ObjOptions};
use lumen_core::{Point3f, Vector3f};

fn main() {
    let matches = argparse::parse_args();
    let level = if matches.is_present("verbose") {
        "debug"
    } else {
        "info"
    };
    let _logger = flexi_logger::Logger::try_with_env_or_str(level)
        .unwrap()
        .start()
        .unwrap_or_else(|e| panic!("Failed to initialize logger: {}", e));

    println!("Lumen 0.1 [Detected {} cores]", num_cpus::get());
    if let Err(ref e) = run(&matches) {
        eprintln!("Application error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches<'_>) -> Result<()> {
    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("output").unwrap();
    let width: usize = parse(matches, "width")?;
    let height: usize = parse(matches, "height")?;

    // Assemble the scene.
    let mut builder = Scene::builder();
    let obj_opts = ObjOptions {
        skip_specular_mat: matches.is_present("skip-specular"),
    };
    wavefront::load_obj(&mut builder, Path::new(input), &obj_opts)?;
    builder.set_camera(lumen_core::camera::PinholeCamera::new(
        parse_point(matches.value_of("eye").unwrap())?,
        parse_point(matches.value_of("lookat").unwrap())?,
        parse_vector(matches.value_of("up").unwrap())?,
        parse(matches, "fov")?,
    ));
    if let Some(env) = matches.value_of("env") {
        if env.contains(',') {
            let v = parse_vector(env)?;
            builder.set_env_light(Spectrum::rgb(v.x, v.y, v.z), None);
        } else {
            let map = BitmapTexture::from_file(Path::new(env))?;
            builder.set_env_light(Spectrum::white(), Some(Arc::new(Texture::Bitmap(map))));
        }
    }
    if let Some(spec) = matches.value_of("medium") {
        let v = parse_vector(spec)?;
        let medium = builder.add_medium(Medium::Homogeneous(HomogeneousMedium::new(
            Spectrum::grey(v.x),
            Spectrum::grey(v.y),
            v.z,
        )));
        builder.set_global_medium(medium);
    }
    let scene = builder.build();

    // Integrator configuration.
    let mut props = Props::new();
    props
        .set_str("mode", matches.value_of("mode").unwrap())
        .set_str(
            "image_sample_mode",
            matches.value_of("image-sample-mode").unwrap(),
        )
        .set_int("max_length", parse::<i64>(matches, "max-length")?)
        .set_int("max_verts", parse::<i64>(matches, "max-length")?)
        .set_int("spp", parse::<i64>(matches, "spp")?)
        .set_int("workers", parse::<i64>(matches, "threads")?);
    if let Some(spi) = matches.value_of("spi") {
        props.set_int("spi", spi.parse().context("invalid --spi")?);
    }
    if let Some(seed) = matches.value_of("seed") {
        props.set_int("seed", seed.parse().context("invalid --seed")?);
    }

    let integrator = integrator::create(matches.value_of("integrator").unwrap(), &props)?;
    let film = Film::new(width, height);
    let stats = integrator.render(&scene, &film)?;
    info!("Render finished: {} samples processed", stats.processed);

    film.save(Path::new(output))?;
    println!("Wrote {}", output);

    Ok(())
}

fn parse<T: std::str::FromStr>(matches: &ArgMatches<'_>, name: &str) -> Result<T> {
    matches
        .value_of(name)
        .unwrap()
        .parse()
        .map_err(|_| anyhow!("invalid --{}", name))
}

fn parse_triplet(s: &str) -> Result<(f32, f32, f32)> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid triplet '{}'", s))?;
    if parts.len() != 3 {
        return Err(anyhow!("expected 3 comma-separated values in '{}'", s));
    }
    Ok((parts[0], parts[1], parts[2]))
}

fn parse_point(s: &str) -> Result<Point3f> {
    let (x, y, z) = parse_triplet(s)?;
    Ok(Point3f::new(x, y, z))
}

fn parse_vector(s: &str) -> Result<Vector3f> {
    let (x, y, z) = parse_triplet(s)?;
    Ok(Vector3f::new(x, y, z))
}
