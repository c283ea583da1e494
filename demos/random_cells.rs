//! Example that builds an Apollonius diagram for random weighted sites and compares the analytic
//! construction with a brute-force per-pixel classification of the same rectangle.
//!
//! Run with: `cargo run --release --example random_cells`
//!
//! The number of sites, the maximal weight and the segment density can optionally be given as
//! command line arguments: `cargo run --release --example random_cells -- [n] [w] [d]`
//!
//! Their default values are:
//! - `n`: 200
//! - `w`: 3
//! - `d`: 0.1

extern crate apollonius_voronoi;
extern crate glam;
extern crate rand;

use apollonius_voronoi::{closest_site, Bounds, Diagram, DiagramOptions, Site};
use glam::DVec2;
use rand::{distributions::Uniform, prelude::*};
use std::env;

macro_rules! log_time {
    ($msg:expr, $x:expr) => {{
        let t0 = std::time::Instant::now();
        let result = $x;
        println!("{}: {:?}", $msg, t0.elapsed());
        result
    }};
}

fn random_sites(bounds: &Bounds, count: usize, max_weight: f64) -> Vec<Site> {
    let mut rng = thread_rng();
    let unit = Uniform::new(0., 1.);
    let weight = Uniform::new_inclusive(1., max_weight);
    (0..count)
        .map(|_| {
            let loc = bounds.anchor()
                + bounds.width() * DVec2::new(rng.sample(unit), rng.sample(unit));
            Site::new(loc, rng.sample(weight))
        })
        .collect()
}

fn main() {
    let mut args = env::args().skip(1);
    let count = match args.next() {
        Some(n) => n
            .parse::<usize>()
            .expect("The first argument should be an integer denoting the number of sites!"),
        None => 200,
    };
    let max_weight = match args.next() {
        Some(w) => w
            .parse::<f64>()
            .expect("The second argument should be a number >= 1 denoting the maximal weight!"),
        None => 3.,
    };
    let density = match args.next() {
        Some(d) => d
            .parse::<f64>()
            .expect("The third argument should be a positive number denoting the segment density!"),
        None => 0.1,
    };

    let bounds = Bounds::new(0., 0., 800., 600.);
    let sites = random_sites(&bounds, count, max_weight);
    let options = DiagramOptions::default().with_segment_density(density);

    let diagram = log_time!(
        "Diagram::build",
        Diagram::build(&bounds, &sites, &options).expect("Random sites should be valid!")
    );
    let points = diagram
        .polygons()
        .iter()
        .map(|p| p.points().len())
        .sum::<usize>();
    println!(
        "{} polygons ({} points) for {} sites",
        diagram.polygons().len(),
        points,
        sites.len()
    );

    let width = bounds.width().x as usize;
    let height = bounds.width().y as usize;
    let pixels = log_time!("Brute force classification", {
        (0..width * height)
            .map(|n| {
                let pixel = bounds.anchor() + DVec2::new((n % width) as f64, (n / width) as f64) + 0.5;
                closest_site(&sites, pixel)
            })
            .collect::<Vec<_>>()
    });

    // Compare the brute force classification of a subset of the pixels with the polygons,
    // drawn in order.
    let mismatches = (0..width * height)
        .step_by(97)
        .filter(|&n| {
            let pixel = bounds.anchor() + DVec2::new((n % width) as f64, (n / width) as f64) + 0.5;
            let painted = diagram
                .polygons()
                .iter()
                .rev()
                .find(|polygon| polygon.contains(pixel))
                .map(|polygon| polygon.site());
            painted != pixels[n]
        })
        .count();
    println!("{mismatches} mismatching pixels (expected only along boundaries)");
}
