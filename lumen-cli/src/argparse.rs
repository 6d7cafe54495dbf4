use clap::{App, Arg, ArgMatches};

pub fn parse_args<'a>() -> ArgMatches<'a> {
    App::new("lumen")
        .version("0.1")
        .about("Monte Carlo path tracer over OBJ scenes")
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .help("Output image (.png or .hdr)")
                .default_value("image.png"),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .help("Film width in pixels")
                .default_value("640"),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .help("Film height in pixels")
                .default_value("480"),
        )
        .arg(
            Arg::with_name("integrator")
                .long("integrator")
                .help("Integrator: pt or volpt")
                .default_value("pt"),
        )
        .arg(
            Arg::with_name("mode")
                .long("mode")
                .help("Path tracing mode: naive, nee or mis")
                .default_value("mis"),
        )
        .arg(
            Arg::with_name("image-sample-mode")
                .long("image-sample-mode")
                .help("Image sampling strategy: pixel or image")
                .default_value("pixel"),
        )
        .arg(
            Arg::with_name("spp")
                .long("spp")
                .help("Samples per pixel (pixel mode)")
                .default_value("16"),
        )
        .arg(
            Arg::with_name("spi")
                .long("spi")
                .help("Samples per image (image mode)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("max-length")
                .long("max-length")
                .help("Maximum path length")
                .default_value("6"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .help("Base RNG seed; omit for system entropy")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .short("t")
                .help("Number of worker threads (0 = all cores)")
                .default_value("0"),
        )
        .arg(
            Arg::with_name("eye")
                .long("eye")
                .help("Camera position as x,y,z")
                .default_value("0,1,5"),
        )
        .arg(
            Arg::with_name("lookat")
                .long("lookat")
                .help("Camera target as x,y,z")
                .default_value("0,1,0"),
        )
        .arg(
            Arg::with_name("up")
                .long("up")
                .help("Camera up vector as x,y,z")
                .default_value("0,1,0"),
        )
        .arg(
            Arg::with_name("fov")
                .long("fov")
                .help("Vertical field of view in degrees")
                .default_value("40"),
        )
        .arg(
            Arg::with_name("env")
                .long("env")
                .help("Environment light: an .hdr/.png map path or r,g,b")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("medium")
                .long("medium")
                .help("Global homogeneous medium as sigma_a,sigma_s,g")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("skip-specular")
                .long("skip-specular")
                .help("Replace mirror/glass MTL materials with black diffuse"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .help("Log debug information"),
        )
        .arg(
            Arg::with_name("INPUT")
                .required(true)
                .index(1)
                .help("OBJ scene file to render"),
        )
        .get_matches()
}
