//! Discrete curvature heuristic.
//!
//! A vertex is "flat" when its pseudodegree is 5 or 6. Vertices on the outer face count as if
//! they had two more neighbours, since the outer face hides the rest of their star. The score of
//! an operation is the change it causes in the summed vertex scores, plus a small bias against
//! faces with fewer than five sides. Greedy drivers take an operation only if its score is
//! non-negative.
use std::collections::{BTreeMap, BTreeSet};

use crate::data::planar_graph::split_cycle;
use crate::data::{FaceId, PlanarGraph, VertexId};
use crate::{Error, Precondition};

/// Bias per side a face falls short of five.
pub const FACE_BIAS: f64 = 0.1;

/// `min(0, d - 5, 6 - d)`: zero for pseudodegrees 5 and 6, the distance to that band otherwise.
///
/// ```rust
/// # use planarium::algorithms::curvature::vertex_score;
/// assert_eq!(vertex_score(5), 0.0);
/// assert_eq!(vertex_score(6), 0.0);
/// assert_eq!(vertex_score(3), -2.0);
/// assert_eq!(vertex_score(8), -2.0);
/// ```
pub fn vertex_score(pseudodegree: usize) -> f64 {
  let d = pseudodegree as isize;
  0.min(d - 5).min(6 - d) as f64
}

fn face_score(size: usize) -> f64 {
  -FACE_BIAS * 5usize.saturating_sub(size) as f64
}

/// What an operation would do to the vertices and faces it touches.
struct Preview {
  degree_delta: BTreeMap<VertexId, isize>,
  touched: BTreeSet<VertexId>,
  // New outer boundary, if the operation reshapes the outer face.
  outer_after: Option<Vec<VertexId>>,
  sizes_before: Vec<usize>,
  sizes_after: Vec<usize>,
}

impl Preview {
  fn new() -> Preview {
    Preview {
      degree_delta: BTreeMap::new(),
      touched: BTreeSet::new(),
      outer_after: None,
      sizes_before: Vec::new(),
      sizes_after: Vec::new(),
    }
  }

  fn degree(&mut self, v: VertexId, delta: isize) {
    *self.degree_delta.entry(v).or_insert(0) += delta;
    self.touched.insert(v);
  }

  fn before(&mut self, cycle: &[VertexId]) {
    self.sizes_before.push(cycle.len());
    self.touched.extend(cycle.iter().copied());
  }

  fn after(&mut self, face: Option<FaceId>, cycle: &[VertexId]) {
    self.sizes_after.push(cycle.len());
    self.touched.extend(cycle.iter().copied());
    if face.map_or(false, FaceId::is_outer) {
      self.outer_after = Some(cycle.to_vec());
    }
  }
}

impl PlanarGraph {
  /// Degree, plus two if the vertex lies on the outer face.
  pub fn pseudodegree(&self, v: VertexId) -> Result<usize, Error> {
    let outer = if self.is_on_outer_face(v) { 2 } else { 0 };
    Ok(self.degree(v)? + outer)
  }

  /// Change in total score if the edge `v1`–`v2` were drawn across `face`.
  pub fn score_to_add_edge(&self, v1: VertexId, v2: VertexId, face: FaceId) -> Result<f64, Error> {
    let split = self.plan_split(v1, v2, face)?;
    let mut preview = Preview::new();
    preview.before(self.boundary(face)?);
    preview.after(Some(face), &split.kept);
    preview.after(None, &split.split);
    preview.degree(v1, 1);
    preview.degree(v2, 1);
    self.score(&preview)
  }

  /// Change in total score if the edge `v1`–`v2` were removed.
  pub fn score_to_remove_edge(&self, v1: VertexId, v2: VertexId) -> Result<f64, Error> {
    let merge = self.plan_merge(v1, v2)?;
    let mut preview = Preview::new();
    preview.before(self.boundary(merge.kept)?);
    preview.before(self.boundary(merge.dropped)?);
    preview.after(Some(merge.kept), &merge.merged);
    preview.degree(v1, -1);
    preview.degree(v2, -1);
    self.score(&preview)
  }

  /// Change in total score if the edge `v1`–`v2` were rotated to the other diagonal.
  pub fn score_to_rotate_edge(&self, v1: VertexId, v2: VertexId) -> Result<f64, Error> {
    let (a, b) = self.flip_partners(v1, v2)?;
    let merge = self.plan_merge(v1, v2)?;
    let split = match split_cycle(&merge.merged, a, b) {
      Some(split) => split,
      None => panic!("{:?} and {:?} are not opposite in {:?}", a, b, merge.merged),
    };
    let mut preview = Preview::new();
    preview.before(self.boundary(merge.kept)?);
    preview.before(self.boundary(merge.dropped)?);
    preview.after(Some(merge.kept), &split.kept);
    preview.after(None, &split.split);
    preview.degree(v1, -1);
    preview.degree(v2, -1);
    preview.degree(a, 1);
    preview.degree(b, 1);
    self.score(&preview)
  }

  /// Change in total score if `face` were stellated. The new centre vertex is scored too.
  pub fn score_to_stellate(&self, face: FaceId) -> Result<f64, Error> {
    if face.is_outer() {
      return Err(Precondition::OuterFaceProtected.into());
    }
    let cycle = self.boundary(face)?;
    let mut preview = Preview::new();
    preview.before(cycle);
    for &v in cycle {
      preview.degree(v, 1);
      preview.sizes_after.push(3);
    }
    // The centre is new, inner, and ends with one neighbour per boundary vertex.
    Ok(self.score(&preview)? + vertex_score(cycle.len()))
  }

  fn score(&self, preview: &Preview) -> Result<f64, Error> {
    let mut delta = 0.0;
    for &v in &preview.touched {
      let degree = self.degree(v)? as isize;
      let on_outer = self.is_on_outer_face(v);
      let on_outer_after = match &preview.outer_after {
        Some(cycle) => cycle.contains(&v),
        None => on_outer,
      };
      let degree_after = degree + preview.degree_delta.get(&v).copied().unwrap_or(0);
      let before = degree as usize + if on_outer { 2 } else { 0 };
      let after = degree_after.max(0) as usize + if on_outer_after { 2 } else { 0 };
      delta += vertex_score(after) - vertex_score(before);
    }
    delta += preview.sizes_after.iter().copied().map(face_score).sum::<f64>();
    delta -= preview.sizes_before.iter().copied().map(face_score).sum::<f64>();
    Ok(delta)
  }
}
