// #![deny(warnings)]
#![deny(clippy::cast_lossless)]
#![doc(test(no_crate_inject))]
//! Planar graph topology with a force-directed embedding.
//!
//! [`PlanarGraph`](data::PlanarGraph) keeps a connected planar graph as vertices, directed edge
//! records and face boundaries, and only exposes mutations that leave it in a valid state.
//! [`EmbeddedGraph`](algorithms::EmbeddedGraph) derives and relaxes 2D coordinates for any
//! [`Graph`](data::Graph) so it can be drawn.

pub mod algorithms;
pub mod data;
mod utils;

use data::{FaceId, VertexId};

/// Reasons a mutation may be refused even though every id it names exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Precondition {
  /// Both endpoints of an edge are the same vertex.
  #[error("edge endpoints are the same vertex")]
  SameVertex,
  /// The two vertices are already adjacent.
  #[error("vertices are already adjacent")]
  EdgeExists,
  /// A vertex does not lie on the boundary of the given face.
  #[error("{0:?} is not on {1:?}")]
  NotOnFace(VertexId, FaceId),
  /// The faces on either side of the edge share more than its two endpoints.
  #[error("adjacent faces share more than two vertices")]
  SharedVertices,
  /// The outer face cannot be stellated or deleted.
  #[error("the outer face is protected")]
  OuterFaceProtected,
  /// The outer face is not to the right of the edge.
  #[error("edge does not border the outer face")]
  NotOuterEdge,
  /// The faces on either side of the edge are not both triangles.
  #[error("edge is not shared by two triangles")]
  NotTriangles,
  /// The vertex does not have exactly two neighbors.
  #[error("vertex does not have exactly two neighbors")]
  NotDegreeTwo,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  #[error("no such vertex: {0:?}")]
  NoSuchVertex(VertexId),
  #[error("no edge between {0:?} and {1:?}")]
  NoSuchEdge(VertexId, VertexId),
  #[error("no such face: {0:?}")]
  NoSuchFace(FaceId),
  #[error("precondition failed: {0}")]
  Precondition(#[from] Precondition),
  /// Found by [`PlanarGraph::check`](data::PlanarGraph::check). Always a bug.
  #[error("invariant violated: {0}")]
  InvariantViolation(String),
  /// A bounded random search ran out of attempts. Callers may retry.
  #[error("gave up after {attempts} attempts")]
  Exhausted { attempts: usize },
}

#[cfg(test)]
pub mod testing;
