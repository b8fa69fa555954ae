//! Locate tiles on the unit sphere.
//!
//! Run with: cargo run --release --bin tile_lookup -- --tiles 10000 --print-stats
//!
//! Usage:
//!   tile_lookup --tiles 1000 --print-coords             Table of tile centers
//!   tile_lookup --tiles 1000 --print-stats              Nearest-neighbor distance statistics
//!   tile_lookup --tiles 1000 --print-distance 30,45     Tiles sorted by distance from lon 30, lat 45
//!   tile_lookup --tiles 1000 --scheme abrate --locate -120.5,33
//!
//! Set RUST_LOG=debug for construction and timing details.

use std::error::Error;
use std::io::{self, BufWriter, Write};

use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser, ValueEnum};
use sphere_tiles::util::Timed;
use sphere_tiles::{FibonacciSphere, LatLon, Scheme, SphericalTessellation, Tessellation};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliScheme {
    Fibonacci,
    Abrate,
}

impl From<CliScheme> for Scheme {
    fn from(value: CliScheme) -> Self {
        match value {
            CliScheme::Fibonacci => Scheme::Fibonacci,
            CliScheme::Abrate => Scheme::Abrate,
        }
    }
}

/// Parse "lon,lat" in degrees.
fn parse_lon_lat(s: &str) -> Result<LatLon, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LON,LAT in degrees, got '{}'", s))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{}': {}", lon.trim(), e))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{}': {}", lat.trim(), e))?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {} outside [-90, 90]", lat));
    }
    Ok(LatLon::from_degrees(lat, lon))
}

#[derive(Parser, Debug)]
#[command(name = "tile_lookup", version, about = "Locate tiles on the unit sphere")]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["print_coords", "print_stats", "print_distance", "locate"]),
))]
struct Cli {
    /// Number of tiles covering the sphere
    #[arg(long)]
    tiles: usize,

    /// Tessellation scheme
    #[arg(long, value_enum, default_value_t = CliScheme::Fibonacci)]
    scheme: CliScheme,

    /// Print every tile with its center longitude [0, 360) and latitude
    #[arg(long)]
    print_coords: bool,

    /// Print statistics on the distance (degrees) from each tile to its nearest neighbor
    #[arg(long)]
    print_stats: bool,

    /// Print all tiles sorted by distance from LON,LAT (degrees)
    #[arg(long, value_name = "LON,LAT", value_parser = parse_lon_lat, allow_hyphen_values = true)]
    print_distance: Option<LatLon>,

    /// Print the tile containing LON,LAT (degrees)
    #[arg(long, value_name = "LON,LAT", value_parser = parse_lon_lat, allow_hyphen_values = true)]
    locate: Option<LatLon>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let scheme = Scheme::from(cli.scheme);
    if scheme != Scheme::Fibonacci && (cli.print_stats || cli.print_distance.is_some()) {
        Cli::command()
            .error(
                ErrorKind::ArgumentConflict,
                "--print-stats and --print-distance require --scheme fibonacci",
            )
            .exit();
    }

    if let Err(e) = run(&cli, scheme) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, scheme: Scheme) -> Result<(), Box<dyn Error>> {
    let tess = {
        let _t = Timed::info("Build tessellation", cli.tiles);
        Tessellation::build(scheme, cli.tiles)?
    };
    log::info!("{} tessellation with {} tiles", tess.scheme(), tess.num_tiles());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if cli.print_coords {
        print_coords(&mut out, &tess)?;
    } else if cli.print_stats {
        if let Some(fs) = tess.as_fibonacci() {
            writeln!(
                out,
                "Statistics on distances between each point and its nearest neighbor (degrees):"
            )?;
            writeln!(out, "{}", fs.distance_stats())?;
        }
    } else if let Some(from) = cli.print_distance {
        if let Some(fs) = tess.as_fibonacci() {
            print_distances(&mut out, fs, from)?;
        }
    } else if let Some(point) = cli.locate {
        let tile = tess.tile_index_latlon(point);
        let (lat, lon) = tess.tile_center_latlon(tile)?.to_degrees();
        writeln!(out, "{:7}, {:10.5}, {:9.5}", tile, wrap_degrees(lon), lat)?;
    }

    out.flush()?;
    Ok(())
}

/// Longitude in degrees folded into `[0, 360)`.
fn wrap_degrees(lon: f64) -> f64 {
    if lon < 0.0 {
        lon + 360.0
    } else {
        lon
    }
}

fn print_coords<W: Write>(out: &mut W, tess: &Tessellation) -> Result<(), Box<dyn Error>> {
    writeln!(out, "{:>7}, {:>10}, {:>9}", "# index", "longitude", "latitude")?;
    for i in 0..tess.num_tiles() {
        let (lat, lon) = tess.tile_center_latlon(i)?.to_degrees();
        writeln!(out, "{:7}, {:10.5}, {:9.5}", i, wrap_degrees(lon), lat)?;
    }
    Ok(())
}

fn print_distances<W: Write>(
    out: &mut W,
    fs: &FibonacciSphere,
    from: LatLon,
) -> Result<(), Box<dyn Error>> {
    writeln!(out, "{:>11}, {:>5}, {:>10}, {:>9}", "#  distance", "index", "longitude", "latitude")?;
    writeln!(out, "{:>11}, {:>5}, {:>10}, {:>9}", "# (degrees)", "", "(degrees)", "(degrees)")?;
    for (distance, index) in fs.distance_map(from.to_unit()) {
        let (lat, lon) = fs.tile_center_latlon(index)?.to_degrees();
        writeln!(
            out,
            "{:11.5}, {:5}, {:10.5}, {:9.5}",
            distance.to_degrees(),
            index,
            lon,
            lat
        )?;
    }
    Ok(())
}
