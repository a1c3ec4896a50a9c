//! Randomized mutation drivers.
//!
//! These pick candidates from the current topology and apply the curvature-scored operations
//! greedily. Every driver takes the random source as an argument so runs can be replayed from a
//! seed.
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use tracing::{debug, trace};

use crate::data::{FaceId, PlanarGraph, VertexId};
use crate::utils::pairs;
use crate::Error;

/// The change made by [`PlanarGraph::randomly_mutate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
  /// The edge `from` was flipped to the diagonal `to`.
  Rotated {
    from: (VertexId, VertexId),
    to: (VertexId, VertexId),
  },
  /// The edge was removed and its faces merged into `face`.
  Removed {
    edge: (VertexId, VertexId),
    face: FaceId,
  },
  /// The edge was added, splitting off `face`.
  Added {
    edge: (VertexId, VertexId),
    face: FaceId,
  },
  /// `face` was replaced by a fan around `vertex`.
  Stellated { face: FaceId, vertex: VertexId },
}

impl Mutation {
  /// The edge this mutation created or removed, lowest vertex first.
  pub fn touched(&self) -> Option<(VertexId, VertexId)> {
    match *self {
      Mutation::Rotated { to: (a, b), .. } => Some(undirected(a, b)),
      Mutation::Removed { edge: (a, b), .. } | Mutation::Added { edge: (a, b), .. } => {
        Some(undirected(a, b))
      }
      Mutation::Stellated { .. } => None,
    }
  }
}

fn undirected(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
  if a < b {
    (a, b)
  } else {
    (b, a)
  }
}

impl PlanarGraph {
  /// A uniformly chosen undirected edge, as `(v1, v2)` with `v1 < v2`.
  pub fn random_edge<R>(&self, rng: &mut R) -> (VertexId, VertexId)
  where
    R: Rng + ?Sized,
  {
    match self.edges().into_iter().choose(rng) {
      Some(edge) => edge,
      None => panic!("a planar graph always has edges"),
    }
  }

  /// A uniformly chosen inner face.
  pub fn random_face<R>(&self, rng: &mut R) -> FaceId
  where
    R: Rng + ?Sized,
  {
    match self.inner_faces().choose(rng) {
      Some(face) => face,
      None => panic!("a planar graph always has an inner face"),
    }
  }

  /// Splits a random edge with a new vertex.
  pub fn add_random_vertex<R>(&mut self, rng: &mut R) -> Result<VertexId, Error>
  where
    R: Rng + ?Sized,
  {
    let (v1, v2) = self.random_edge(rng);
    self.add_vertex(v1, v2)
  }

  /// Stellates a random inner face.
  pub fn randomly_stellate<R>(&mut self, rng: &mut R) -> Result<(FaceId, VertexId), Error>
  where
    R: Rng + ?Sized,
  {
    let face = self.random_face(rng);
    let vertex = self.stellate(face)?;
    Ok((face, vertex))
  }

  /// Rotates the edge if it can flip and the flip doesn't lower the curvature score. Returns the
  /// new diagonal if the edge was rotated.
  pub fn maybe_rotate_edge(
    &mut self,
    v1: VertexId,
    v2: VertexId,
  ) -> Result<Option<(VertexId, VertexId)>, Error> {
    if !self.has_edge(v1, v2) {
      return Err(Error::NoSuchEdge(v1, v2));
    }
    match self.score_to_rotate_edge(v1, v2) {
      Ok(score) if score >= 0.0 => self.rotate_edge(v1, v2).map(Some),
      Ok(score) => {
        trace!(?v1, ?v2, score, "rotation rejected");
        Ok(None)
      }
      Err(Error::Precondition(_)) => Ok(None),
      Err(err) => Err(err),
    }
  }

  /// Tries the scored tweaks around the directed edge `v1 → v2` in turn: rotating it, removing
  /// it, then cutting the corner at `v2` on the face to its right. Returns the first one taken.
  pub fn mutate_edge(&mut self, v1: VertexId, v2: VertexId) -> Result<Option<Mutation>, Error> {
    self.tweak_edge(v1, v2, None)
  }

  /// Walks the directed edges in random order and applies the first tweak that
  /// [`PlanarGraph::mutate_edge`] accepts. Stellates a random inner face if none is.
  ///
  /// A tweak never touches the edge the previous call created or removed, so two neutral tweaks
  /// can't undo each other forever.
  pub fn randomly_mutate<R>(&mut self, rng: &mut R) -> Result<Mutation, Error>
  where
    R: Rng + ?Sized,
  {
    let settled = self.settled;
    let mut edges: Vec<_> = self.directed_edges().collect();
    edges.shuffle(rng);
    for (v1, v2) in edges {
      if let Some(mutation) = self.tweak_edge(v1, v2, settled)? {
        debug!(?mutation, "mutated");
        self.settled = mutation.touched();
        return Ok(mutation);
      }
    }
    let (face, vertex) = self.randomly_stellate(rng)?;
    let mutation = Mutation::Stellated { face, vertex };
    debug!(?mutation, "no edge tweak accepted");
    self.settled = None;
    Ok(mutation)
  }

  fn tweak_edge(
    &mut self,
    v1: VertexId,
    v2: VertexId,
    settled: Option<(VertexId, VertexId)>,
  ) -> Result<Option<Mutation>, Error> {
    let touches = |a: VertexId, b: VertexId| settled == Some(undirected(a, b));
    if !touches(v1, v2) {
      if let Some(to) = self.maybe_rotate_edge(v1, v2)? {
        return Ok(Some(Mutation::Rotated { from: (v1, v2), to }));
      }
      if self.can_remove_edge(v1, v2)? && self.score_to_remove_edge(v1, v2)? >= 0.0 {
        let face = self.remove_edge(v1, v2)?;
        return Ok(Some(Mutation::Removed {
          edge: (v1, v2),
          face,
        }));
      }
    }
    let face = self.edge(v1, v2)?.right;
    if let Some(w) = self.corner(v1, v2, face)? {
      if touches(v1, w) {
        return Ok(None);
      }
      match self.score_to_add_edge(v1, w, face) {
        Ok(score) if score >= 0.0 => {
          let face = self.add_edge(v1, w, face)?;
          return Ok(Some(Mutation::Added { edge: (v1, w), face }));
        }
        Ok(_) | Err(Error::Precondition(_)) => {}
        Err(err) => return Err(err),
      }
    }
    Ok(None)
  }

  // The vertex two steps after `v1` on `face`, if the face is big enough to cut a corner off.
  fn corner(&self, v1: VertexId, v2: VertexId, face: FaceId) -> Result<Option<VertexId>, Error> {
    let cycle = self.boundary(face)?;
    if cycle.len() < 4 {
      return Ok(None);
    }
    let w = pairs(cycle)
      .map(|(&a, &b)| (a, b))
      .position(|edge| edge == (v1, v2))
      .map(|i| cycle[(i + 2) % cycle.len()]);
    Ok(w)
  }
}
