//! **Apollonius diagrams (multiplicatively weighted Voronoi diagrams) in the
//! plane, as renderable polygons.**
//!
//! Every site has a position and a positive weight, and claims the points `p`
//! for which its weighted distance `|p - site| * weight` is the smallest. With
//! equal weights this is the ordinary
//! [Voronoi diagram](https://en.wikipedia.org/wiki/Voronoi_diagram). With
//! different weights, the boundary between two sites is an
//! [Apollonius circle](https://en.wikipedia.org/wiki/Circles_of_Apollonius)
//! around the heavier site, so that regions can be curved, disconnected or
//! completely enclosed by another region.
//!
//! The diagram is computed analytically and clipped to a rectangle: first the
//! pairs of sites sharing a boundary are determined, then the vertices where
//! three regions (or two regions and a wall) meet are computed, and finally
//! the boundary pieces between those vertices are stitched into closed
//! polygons. Circular arcs are subdivided into line segments according to a
//! configurable density.
//!
//! The polygons are returned sorted by increasing weight. A region that
//! encloses other regions is returned as its outer boundary only, so the
//! polygons should be drawn in order (later polygons on top).
//!
//! ```
//! use apollonius_voronoi::{compute_diagram, Bounds, DiagramOptions, Site};
//! use glam::DVec2;
//!
//! let sites = [
//!     Site::new(DVec2::new(20., 50.), 1.),
//!     Site::new(DVec2::new(60., 50.), 1.5),
//! ];
//! let bounds = Bounds::new(0., 0., 100., 100.);
//! let polygons = compute_diagram(&bounds, &sites, &DiagramOptions::default()).unwrap();
//! assert_eq!(polygons.len(), 2);
//! assert_eq!(polygons[0].0, 0);
//! ```
//!
//! # Features
//!
//! - Construction of weighted and unweighted diagrams, including degenerate
//!   configurations (collinear or co-circular sites, enclosed regions).
//!
//! - Parallel construction of the diagram.
//!
//! - Access to the neighbour relation and the vertices of the diagram.
//!
//! # Cargo Features
#![doc = document_features::document_features!()]

mod apollonius;
mod error;
pub mod geometry;
mod rtree;

use glam::DVec2;

pub use apollonius::{
    closest_site, Bounds, CellPolygon, Diagram, DiagramOptions, Owner, Side, Site, Vertex,
};
pub use error::DiagramError;

/// Compute the polygons of the Apollonius diagram of `sites`, clipped to
/// `bounds`.
///
/// Returns `(site index, polygon points)` pairs in drawing order. A site may
/// own several polygons, or none if its region does not intersect the bounds.
/// See [`Diagram::build`] for details.
pub fn compute_diagram(
    bounds: &Bounds,
    sites: &[Site],
    options: &DiagramOptions,
) -> Result<Vec<(usize, Vec<DVec2>)>, DiagramError> {
    let diagram = Diagram::build(bounds, sites, options)?;
    Ok(diagram
        .into_polygons()
        .into_iter()
        .map(|polygon| (polygon.site(), polygon.into_points()))
        .collect())
}
