use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

use super::Graph;
use crate::utils::{arc, pairs, Arena};
use crate::{Error, Precondition};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub usize);

impl std::fmt::Debug for VertexId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
    write!(f, "VertexId({})", self.0)
  }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub usize);

impl std::fmt::Debug for FaceId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
    if self.is_outer() {
      write!(f, "OuterFace")
    } else {
      write!(f, "FaceId({})", self.0)
    }
  }
}

impl FaceId {
  /// The unbounded face. It always exists.
  pub const OUTER: FaceId = FaceId(0);

  pub fn is_outer(self) -> bool {
    self == FaceId::OUTER
  }
}

/// The faces on either side of a directed edge `v1 → v2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EdgeFaces {
  pub left: FaceId,
  pub right: FaceId,
}

impl EdgeFaces {
  fn reversed(self) -> EdgeFaces {
    EdgeFaces {
      left: self.right,
      right: self.left,
    }
  }
}

///////////////////////////////////////////////////////////////////////////////
// PlanarGraph

/// A connected planar graph stored as vertices, directed edge records and face boundaries.
///
/// Every undirected edge has two directed records, and each record knows the faces to its left
/// and right. A face boundary lists its vertices so that the face lies to the right of every
/// boundary edge. Face 0 is the outer face.
///
/// The graph starts as a triangle and only changes through mutations that keep it valid:
///
/// * the graph is connected,
/// * every face boundary has at least three vertices and none twice,
/// * there is at most one edge between two vertices,
/// * `V - E + F == 2`,
/// * `edge(v1, v2).left == edge(v2, v1).right` for every edge.
///
/// A mutation whose preconditions fail returns an error and leaves the graph untouched.
#[derive(Clone, Debug)]
pub struct PlanarGraph {
  vertices: Arena<Vec<VertexId>>, // Vertex indexed neighbours
  edges: BTreeMap<(VertexId, VertexId), EdgeFaces>,
  faces: Arena<Vec<VertexId>>, // Face indexed boundaries
  version: u64,
  // Edge the last randomly_mutate tweak created or removed.
  pub(crate) settled: Option<(VertexId, VertexId)>,
}

/// How a face splits when an edge is drawn across it.
#[derive(Clone, Debug)]
pub(crate) struct Split {
  /// Boundary that keeps the face id.
  pub kept: Vec<VertexId>,
  /// Boundary of the new face.
  pub split: Vec<VertexId>,
}

/// How two faces merge when the edge between them is removed.
#[derive(Clone, Debug)]
pub(crate) struct Merge {
  pub kept: FaceId,
  pub dropped: FaceId,
  pub merged: Vec<VertexId>,
}

impl Default for PlanarGraph {
  fn default() -> Self {
    PlanarGraph::new()
  }
}

impl PlanarGraph {
  /// Creates a triangle with vertices:
  ///
  /// ```text
  ///       1
  ///      / \
  ///     2---3
  /// ```
  ///
  /// ```rust
  /// # use planarium::data::{PlanarGraph, FaceId, VertexId};
  /// let pg = PlanarGraph::new();
  /// assert_eq!(pg.boundary(FaceId::OUTER)?, &[VertexId(3), VertexId(2), VertexId(1)]);
  /// assert_eq!(pg.boundary(FaceId(1))?, &[VertexId(1), VertexId(2), VertexId(3)]);
  /// # Ok::<(), planarium::Error>(())
  /// ```
  pub fn new() -> PlanarGraph {
    let mut pg = PlanarGraph {
      vertices: Arena::with_base(1),
      edges: BTreeMap::new(),
      faces: Arena::with_base(0),
      version: 1,
      settled: None,
    };
    let a = pg.new_vertex();
    let b = pg.new_vertex();
    let c = pg.new_vertex();
    let outer = FaceId(pg.faces.insert(vec![c, b, a]));
    let inner = FaceId(pg.faces.insert(vec![a, b, c]));
    debug_assert!(outer.is_outer());
    for (&v1, &v2) in pairs(&[a, b, c]) {
      pg.link(
        v1,
        v2,
        EdgeFaces {
          left: outer,
          right: inner,
        },
      );
    }
    pg
  }

  ///////////////////////////////////////////////////////////////////////////
  // Queries

  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn vertices(&self) -> Vec<VertexId> {
    self.vertices.keys().map(VertexId).collect()
  }

  /// Each undirected edge once, as `(v1, v2)` with `v1 < v2`.
  pub fn edges(&self) -> Vec<(VertexId, VertexId)> {
    self.edges.keys().filter(|(a, b)| a < b).copied().collect()
  }

  /// Both directions of every edge.
  pub fn directed_edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
    self.edges.keys().copied()
  }

  pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
    self.vertices.get(v.0).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn faces(&self) -> impl Iterator<Item = FaceId> + '_ {
    self.faces.keys().map(FaceId)
  }

  pub fn inner_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
    self.faces().filter(|face| !face.is_outer())
  }

  /// The vertices of `face`, with the face to the right of each consecutive pair.
  pub fn boundary(&self, face: FaceId) -> Result<&[VertexId], Error> {
    self
      .faces
      .get(face.0)
      .map(Vec::as_slice)
      .ok_or(Error::NoSuchFace(face))
  }

  pub fn has_vertex(&self, v: VertexId) -> bool {
    self.vertices.contains(v.0)
  }

  pub fn has_edge(&self, v1: VertexId, v2: VertexId) -> bool {
    self.edges.contains_key(&(v1, v2))
  }

  pub fn edge(&self, v1: VertexId, v2: VertexId) -> Result<EdgeFaces, Error> {
    self
      .edges
      .get(&(v1, v2))
      .copied()
      .ok_or(Error::NoSuchEdge(v1, v2))
  }

  pub fn degree(&self, v: VertexId) -> Result<usize, Error> {
    self
      .vertices
      .get(v.0)
      .map(Vec::len)
      .ok_or(Error::NoSuchVertex(v))
  }

  /// Faces with `v` on their boundary, in ascending order.
  pub fn faces_around(&self, v: VertexId) -> Result<Vec<FaceId>, Error> {
    let neighbors = self.vertices.get(v.0).ok_or(Error::NoSuchVertex(v))?;
    let faces: BTreeSet<FaceId> = neighbors
      .iter()
      .filter_map(|&n| self.edges.get(&(v, n)))
      .map(|faces| faces.right)
      .collect();
    Ok(faces.into_iter().collect())
  }

  /// Every other vertex that shares an inner face with `v`.
  pub fn cofacial(&self, v: VertexId) -> Result<Vec<VertexId>, Error> {
    let mut out = BTreeSet::new();
    for face in self.faces_around(v)? {
      if face.is_outer() {
        continue;
      }
      out.extend(self.faces[face.0].iter().copied().filter(|&u| u != v));
    }
    Ok(out.into_iter().collect())
  }

  pub fn is_on_outer_face(&self, v: VertexId) -> bool {
    self.faces[FaceId::OUTER.0].contains(&v)
  }

  pub fn num_vertices(&self) -> usize {
    self.vertices.len()
  }

  /// Undirected edge count.
  pub fn num_edges(&self) -> usize {
    self.edges.len() / 2
  }

  /// Face count, including the outer face.
  pub fn num_faces(&self) -> usize {
    self.faces.len()
  }

  /// `V - E + F`. Always 2.
  pub fn euler_characteristic(&self) -> isize {
    self.num_vertices() as isize - self.num_edges() as isize + self.num_faces() as isize
  }

  /// Whether removing the edge would merge two faces that share only its endpoints.
  pub fn can_remove_edge(&self, v1: VertexId, v2: VertexId) -> Result<bool, Error> {
    let EdgeFaces { left, right } = self.edge(v1, v2)?;
    if left == right {
      return Ok(false);
    }
    let left = &self.faces[left.0];
    let shared = self.faces[right.0]
      .iter()
      .filter(|v| left.contains(v))
      .count();
    Ok(shared == 2)
  }

  ///////////////////////////////////////////////////////////////////////////
  // Mutations

  /// Splits the edge between `v1` and `v2` with a new vertex.
  ///
  /// ```rust
  /// # use planarium::data::{PlanarGraph, FaceId, VertexId};
  /// let mut pg = PlanarGraph::new();
  /// let v = pg.add_vertex(VertexId(1), VertexId(2))?;
  /// assert_eq!(pg.boundary(FaceId(1))?, &[VertexId(1), v, VertexId(2), VertexId(3)]);
  /// assert!(!pg.has_edge(VertexId(1), VertexId(2)));
  /// # Ok::<(), planarium::Error>(())
  /// ```
  pub fn add_vertex(&mut self, v1: VertexId, v2: VertexId) -> Result<VertexId, Error> {
    let EdgeFaces { left, right } = self.edge(v1, v2)?;
    let w = self.new_vertex();
    insert_after(&mut self.faces[right.0], v1, w);
    insert_after(&mut self.faces[left.0], v2, w);
    self.unlink(v1, v2);
    self.link(v1, w, EdgeFaces { left, right });
    self.link(w, v2, EdgeFaces { left, right });
    self.bump();
    debug!(?v1, ?v2, vertex = ?w, "split edge");
    Ok(w)
  }

  /// Draws an edge across `face` between two of its non-adjacent boundary vertices. The longer
  /// half keeps the face id; the shorter half becomes the returned face.
  pub fn add_edge(&mut self, v1: VertexId, v2: VertexId, face: FaceId) -> Result<FaceId, Error> {
    let split = self.plan_split(v1, v2, face)?;
    let new_face = self.apply_split(face, split);
    self.bump();
    debug!(?v1, ?v2, ?face, ?new_face, "split face");
    Ok(new_face)
  }

  /// Removes an edge and merges the faces on either side. The smaller face id survives and is
  /// returned, so the outer face is never deleted.
  pub fn remove_edge(&mut self, v1: VertexId, v2: VertexId) -> Result<FaceId, Error> {
    let merge = self.plan_merge(v1, v2)?;
    let face = self.apply_merge(v1, v2, merge);
    self.bump();
    debug!(?v1, ?v2, ?face, "merged faces");
    Ok(face)
  }

  /// Replaces `face` with a fan of triangles around a new vertex, which is returned. The first
  /// triangle reuses the face id. The outer face cannot be stellated.
  ///
  /// ```rust
  /// # use planarium::data::{PlanarGraph, FaceId};
  /// let mut pg = PlanarGraph::new();
  /// pg.stellate(FaceId(1))?;
  /// assert_eq!((pg.num_vertices(), pg.num_edges(), pg.num_faces()), (4, 6, 4));
  /// # Ok::<(), planarium::Error>(())
  /// ```
  pub fn stellate(&mut self, face: FaceId) -> Result<VertexId, Error> {
    if face.is_outer() {
      return Err(Precondition::OuterFaceProtected.into());
    }
    let cycle = self.boundary(face)?.to_vec();
    let center = self.new_vertex();
    let k = cycle.len();
    let mut fan = Vec::with_capacity(k);
    self.faces[face.0] = vec![cycle[0], cycle[1], center];
    fan.push(face);
    for i in 1..k {
      let id = self.faces.insert(vec![cycle[i], cycle[(i + 1) % k], center]);
      fan.push(FaceId(id));
    }
    for i in 0..k {
      self.set_right(cycle[i], cycle[(i + 1) % k], fan[i]);
      self.link(
        cycle[i],
        center,
        EdgeFaces {
          left: fan[i],
          right: fan[(i + k - 1) % k],
        },
      );
    }
    self.bump();
    debug!(?face, ?center, "stellated face");
    Ok(center)
  }

  /// Grows the outer silhouette with a triangle on the edge `v1 → v2`, whose right face must be
  /// the outer face. The outer boundary then runs `v1, w, v2` where `w` is the returned vertex.
  pub fn add_outer_triangle(&mut self, v1: VertexId, v2: VertexId) -> Result<VertexId, Error> {
    if !self.edge(v1, v2)?.right.is_outer() {
      return Err(Precondition::NotOuterEdge.into());
    }
    let w = self.new_vertex();
    insert_after(&mut self.faces[FaceId::OUTER.0], v1, w);
    let triangle = FaceId(self.faces.insert(vec![v1, v2, w]));
    self.set_right(v1, v2, triangle);
    let faces = EdgeFaces {
      left: triangle,
      right: FaceId::OUTER,
    };
    self.link(v1, w, faces);
    self.link(w, v2, faces);
    self.bump();
    debug!(?v1, ?v2, vertex = ?w, "added outer triangle");
    Ok(w)
  }

  /// Replaces the edge shared by two triangles with the other diagonal of their quadrilateral,
  /// and returns that diagonal.
  pub fn rotate_edge(
    &mut self,
    v1: VertexId,
    v2: VertexId,
  ) -> Result<(VertexId, VertexId), Error> {
    let (a, b) = self.flip_partners(v1, v2)?;
    let merge = self.plan_merge(v1, v2)?;
    let face = self.apply_merge(v1, v2, merge);
    let split = split_cycle(&self.faces[face.0], a, b)
      .unwrap_or_else(|| panic!("{:?} and {:?} are not on the merged {:?}", a, b, face));
    self.apply_split(face, split);
    self.bump();
    debug!(?v1, ?v2, ?a, ?b, "rotated edge");
    Ok((a, b))
  }

  /// Removes a vertex with exactly two non-adjacent neighbours and joins them with an edge. This
  /// undoes [`PlanarGraph::add_vertex`].
  pub fn remove_vertex(&mut self, v: VertexId) -> Result<(), Error> {
    let (a, b) = match self.vertices.get(v.0).map(Vec::as_slice) {
      None => return Err(Error::NoSuchVertex(v)),
      Some(&[a, b]) => (a, b),
      Some(_) => return Err(Precondition::NotDegreeTwo.into()),
    };
    if self.has_edge(a, b) {
      return Err(Precondition::EdgeExists.into());
    }
    let EdgeFaces { left, right } = self.edge(a, v)?;
    self.faces[left.0].retain(|&u| u != v);
    self.faces[right.0].retain(|&u| u != v);
    self.unlink(a, v);
    self.unlink(v, b);
    self.vertices.remove(v.0);
    self.link(a, b, EdgeFaces { left, right });
    self.bump();
    debug!(vertex = ?v, ?a, ?b, "removed vertex");
    Ok(())
  }

  ///////////////////////////////////////////////////////////////////////////
  // Planning. Every precondition is checked here, before anything is touched.

  pub(crate) fn plan_split(
    &self,
    v1: VertexId,
    v2: VertexId,
    face: FaceId,
  ) -> Result<Split, Error> {
    if v1 == v2 {
      return Err(Precondition::SameVertex.into());
    }
    for &v in &[v1, v2] {
      if !self.has_vertex(v) {
        return Err(Error::NoSuchVertex(v));
      }
    }
    if self.has_edge(v1, v2) {
      return Err(Precondition::EdgeExists.into());
    }
    let cycle = self.boundary(face)?;
    for &v in &[v1, v2] {
      if !cycle.contains(&v) {
        return Err(Precondition::NotOnFace(v, face).into());
      }
    }
    // Both vertices are on the cycle and not adjacent, so both halves have 3+ vertices.
    split_cycle(cycle, v1, v2).ok_or_else(|| Precondition::NotOnFace(v1, face).into())
  }

  pub(crate) fn plan_merge(&self, v1: VertexId, v2: VertexId) -> Result<Merge, Error> {
    if !self.can_remove_edge(v1, v2)? {
      return Err(Precondition::SharedVertices.into());
    }
    let EdgeFaces { left, right } = self.edge(v1, v2)?;
    let (right_cycle, left_cycle) = (&self.faces[right.0], &self.faces[left.0]);
    // The right face runs v1 → v2; walk it from v2 back round to v1.
    let mut merged = arc(
      right_cycle,
      position(right_cycle, v2),
      position(right_cycle, v1),
    );
    // The left face runs v2 → v1; walk it from v1 round to v2, dropping both ends.
    let left_arc = arc(
      left_cycle,
      position(left_cycle, v1),
      position(left_cycle, v2),
    );
    merged.extend_from_slice(&left_arc[1..left_arc.len() - 1]);
    let (kept, dropped) = if left < right {
      (left, right)
    } else {
      (right, left)
    };
    Ok(Merge {
      kept,
      dropped,
      merged,
    })
  }

  /// The apexes `(a, b)` of the triangles right and left of `v1 → v2`, if the edge can flip.
  pub(crate) fn flip_partners(
    &self,
    v1: VertexId,
    v2: VertexId,
  ) -> Result<(VertexId, VertexId), Error> {
    let EdgeFaces { left, right } = self.edge(v1, v2)?;
    let apex = |face: FaceId| -> Option<VertexId> {
      let cycle = &self.faces[face.0];
      if cycle.len() != 3 {
        return None;
      }
      cycle.iter().copied().find(|&u| u != v1 && u != v2)
    };
    let (a, b) = match (apex(right), apex(left)) {
      (Some(a), Some(b)) => (a, b),
      _ => return Err(Precondition::NotTriangles.into()),
    };
    if a == b {
      return Err(Precondition::SharedVertices.into());
    }
    if self.has_edge(a, b) {
      return Err(Precondition::EdgeExists.into());
    }
    Ok((a, b))
  }

  fn apply_split(&mut self, face: FaceId, split: Split) -> FaceId {
    let Split { kept, split } = split;
    // kept runs x ..= y and closes with y → x; split runs y ..= x and closes with x → y.
    let x = kept[0];
    let y = kept[kept.len() - 1];
    self.faces[face.0] = kept;
    let new_face = FaceId(self.faces.insert(split.clone()));
    self.link(
      x,
      y,
      EdgeFaces {
        left: face,
        right: new_face,
      },
    );
    self.relabel(&split, new_face);
    new_face
  }

  fn apply_merge(&mut self, v1: VertexId, v2: VertexId, merge: Merge) -> FaceId {
    let Merge {
      kept,
      dropped,
      merged,
    } = merge;
    self.unlink(v1, v2);
    self.faces.remove(dropped.0);
    self.relabel(&merged, kept);
    self.faces[kept.0] = merged;
    kept
  }

  ///////////////////////////////////////////////////////////////////////////
  // Raw updates. These don't maintain vertex/edge/face consistency on their own.

  fn bump(&mut self) {
    self.version += 1;
  }

  fn new_vertex(&mut self) -> VertexId {
    VertexId(self.vertices.insert(Vec::new()))
  }

  fn link(&mut self, v1: VertexId, v2: VertexId, faces: EdgeFaces) {
    self.vertices[v1.0].push(v2);
    self.vertices[v2.0].push(v1);
    self.edges.insert((v1, v2), faces);
    self.edges.insert((v2, v1), faces.reversed());
  }

  fn unlink(&mut self, v1: VertexId, v2: VertexId) {
    self.vertices[v1.0].retain(|&u| u != v2);
    self.vertices[v2.0].retain(|&u| u != v1);
    self.edges.remove(&(v1, v2));
    self.edges.remove(&(v2, v1));
  }

  fn set_right(&mut self, v1: VertexId, v2: VertexId, face: FaceId) {
    match (
      self.edges.get_mut(&(v1, v2)).map(|e| e.right = face),
      self.edges.get_mut(&(v2, v1)).map(|e| e.left = face),
    ) {
      (Some(()), Some(())) => {}
      _ => panic!("no edge record for {:?} -> {:?}", v1, v2),
    }
  }

  fn relabel(&mut self, cycle: &[VertexId], face: FaceId) {
    for (&v1, &v2) in pairs(cycle) {
      self.set_right(v1, v2, face);
    }
  }

  ///////////////////////////////////////////////////////////////////////////
  // Consistency

  /// Walks every vertex, edge record and face and re-verifies the structural invariants.
  /// Meant for tests and debugging.
  pub fn check(&self) -> Result<(), Error> {
    fn fail<T>(msg: String) -> Result<T, Error> {
      Err(Error::InvariantViolation(msg))
    }

    let mut degree_sum = 0;
    for (v, neighbors) in self.vertices.iter() {
      let v = VertexId(v);
      let mut seen = BTreeSet::new();
      for &n in neighbors {
        if n == v {
          return fail(format!("{:?} is its own neighbour", v));
        }
        if !seen.insert(n) {
          return fail(format!("{:?} and {:?} have more than one edge", v, n));
        }
        if !self.neighbors(n).contains(&v) {
          return fail(format!("{:?} lists {:?} but not the other way round", v, n));
        }
        if !self.edges.contains_key(&(v, n)) {
          return fail(format!("no edge record for {:?} -> {:?}", v, n));
        }
      }
      degree_sum += neighbors.len();
    }
    if degree_sum != self.edges.len() {
      return fail(format!(
        "degree sum {} does not match {} edge records",
        degree_sum,
        self.edges.len()
      ));
    }

    for (&(v1, v2), &faces) in self.edges.iter() {
      match self.edges.get(&(v2, v1)) {
        Some(&twin) if twin == faces.reversed() => {}
        Some(twin) => {
          return fail(format!(
            "{:?} -> {:?} is {:?} but its twin is {:?}",
            v1, v2, faces, twin
          ))
        }
        None => return fail(format!("{:?} -> {:?} has no twin", v1, v2)),
      }
      for &face in &[faces.left, faces.right] {
        if !self.faces.contains(face.0) {
          return fail(format!("{:?} -> {:?} borders missing {:?}", v1, v2, face));
        }
      }
    }

    if !self.faces.contains(FaceId::OUTER.0) {
      return fail("the outer face is missing".to_string());
    }
    let mut boundary_edges = 0;
    for (face, cycle) in self.faces.iter() {
      let face = FaceId(face);
      if cycle.len() < 3 {
        return fail(format!("{:?} has only {} vertices", face, cycle.len()));
      }
      let distinct: BTreeSet<&VertexId> = cycle.iter().collect();
      if distinct.len() != cycle.len() {
        return fail(format!("{:?} repeats a vertex: {:?}", face, cycle));
      }
      for (&v1, &v2) in pairs(cycle) {
        match self.edges.get(&(v1, v2)) {
          Some(faces) if faces.right == face => {}
          Some(faces) => {
            return fail(format!(
              "{:?} -> {:?} is on {:?} but records {:?}",
              v1, v2, face, faces
            ))
          }
          None => return fail(format!("{:?} -> {:?} on {:?} is not an edge", v1, v2, face)),
        }
      }
      boundary_edges += cycle.len();
    }
    if boundary_edges != self.edges.len() {
      return fail(format!(
        "face boundaries cover {} of {} edge records",
        boundary_edges,
        self.edges.len()
      ));
    }

    let reached = self.reachable_from_any();
    if reached != self.num_vertices() {
      return fail(format!(
        "only {} of {} vertices are connected",
        reached,
        self.num_vertices()
      ));
    }

    if self.euler_characteristic() != 2 {
      return fail(format!(
        "V - E + F = {} - {} + {} != 2",
        self.num_vertices(),
        self.num_edges(),
        self.num_faces()
      ));
    }
    Ok(())
  }

  fn reachable_from_any(&self) -> usize {
    let start = match self.vertices.keys().next() {
      Some(v) => VertexId(v),
      None => return 0,
    };
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start);
    queue.push_back(start);
    while let Some(v) = queue.pop_front() {
      for &n in self.neighbors(v) {
        if seen.insert(n) {
          queue.push_back(n);
        }
      }
    }
    seen.len()
  }
}

impl Graph for PlanarGraph {
  fn vertices(&self) -> Vec<VertexId> {
    PlanarGraph::vertices(self)
  }

  fn has_vertex(&self, v: VertexId) -> bool {
    PlanarGraph::has_vertex(self, v)
  }

  fn edges(&self) -> Vec<(VertexId, VertexId)> {
    PlanarGraph::edges(self)
  }

  fn neighbors(&self, v: VertexId) -> &[VertexId] {
    PlanarGraph::neighbors(self, v)
  }

  fn version(&self) -> u64 {
    self.version
  }

  fn inner_faces(&self) -> Vec<&[VertexId]> {
    self
      .faces
      .iter()
      .filter(|&(face, _)| !FaceId(face).is_outer())
      .map(|(_, cycle)| cycle.as_slice())
      .collect()
  }

  fn outer_face(&self) -> Option<&[VertexId]> {
    self.faces.get(FaceId::OUTER.0).map(Vec::as_slice)
  }
}

///////////////////////////////////////////////////////////////////////////////
// misc

fn position(cycle: &[VertexId], v: VertexId) -> usize {
  match cycle.iter().position(|&u| u == v) {
    Some(idx) => idx,
    None => panic!("{:?} is not on {:?}", v, cycle),
  }
}

fn insert_after(cycle: &mut Vec<VertexId>, after: VertexId, v: VertexId) {
  let idx = position(cycle, after);
  cycle.insert(idx + 1, v);
}

/// Chops a cycle at `v1` and `v2` into the arcs `v1 ..= v2` and `v2 ..= v1`. The longer arc is
/// kept; ties keep the arc starting at `v1`.
pub(crate) fn split_cycle(cycle: &[VertexId], v1: VertexId, v2: VertexId) -> Option<Split> {
  let i1 = cycle.iter().position(|&u| u == v1)?;
  let i2 = cycle.iter().position(|&u| u == v2)?;
  let forward = arc(cycle, i1, i2);
  let backward = arc(cycle, i2, i1);
  if forward.len() < 3 || backward.len() < 3 {
    return None;
  }
  if forward.len() >= backward.len() {
    Some(Split {
      kept: forward,
      split: backward,
    })
  } else {
    Some(Split {
      kept: backward,
      split: forward,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::any_planar_graph;

  use claims::{assert_err, assert_ok};
  use proptest::prelude::*;
  use test_strategy::proptest;

  fn v(n: usize) -> VertexId {
    VertexId(n)
  }

  fn counts(pg: &PlanarGraph) -> (usize, usize, usize) {
    (pg.num_vertices(), pg.num_edges(), pg.num_faces())
  }

  #[test]
  fn canonical_triangle() {
    let pg = PlanarGraph::new();
    assert_ok!(pg.check());
    assert_eq!(pg.vertices(), vec![v(1), v(2), v(3)]);
    assert_eq!(pg.edges(), vec![(v(1), v(2)), (v(1), v(3)), (v(2), v(3))]);
    assert_eq!(counts(&pg), (3, 3, 2));
    assert_eq!(
      pg.edge(v(1), v(2)),
      Ok(EdgeFaces {
        left: FaceId::OUTER,
        right: FaceId(1)
      })
    );
    assert_eq!(pg.version(), 1);
  }

  #[test]
  fn stellate_inner_face() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    let center = pg.stellate(FaceId(1))?;
    assert_ok!(pg.check());
    assert_eq!(center, v(4));
    assert_eq!(counts(&pg), (4, 6, 4));
    assert_eq!(pg.degree(center)?, 3);
    assert_eq!(pg.boundary(FaceId(1))?, &[v(1), v(2), v(4)]);
    assert_eq!(pg.cofacial(center)?, vec![v(1), v(2), v(3)]);
    Ok(())
  }

  #[test]
  fn stellate_outer_face_is_refused() {
    let mut pg = PlanarGraph::new();
    assert_eq!(
      pg.stellate(FaceId::OUTER),
      Err(Error::Precondition(Precondition::OuterFaceProtected))
    );
    assert_eq!(pg.stellate(FaceId(9)), Err(Error::NoSuchFace(FaceId(9))));
    assert_eq!(pg.version(), 1);
  }

  #[test]
  fn add_vertex_splices_both_faces() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    let w = pg.add_vertex(v(1), v(2))?;
    assert_ok!(pg.check());
    assert_eq!(pg.boundary(FaceId(1))?, &[v(1), w, v(2), v(3)]);
    assert_eq!(pg.boundary(FaceId::OUTER)?, &[v(3), v(2), w, v(1)]);
    assert_eq!(counts(&pg), (4, 4, 2));
    assert_eq!(pg.add_vertex(v(1), v(2)), Err(Error::NoSuchEdge(v(1), v(2))));
    Ok(())
  }

  #[test]
  fn add_vertex_then_remove_vertex_round_trips() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    pg.stellate(FaceId(1))?;
    let before = pg.clone();
    let w = pg.add_vertex(v(1), v(4))?;
    // The two new edges border faces that share v1, w and v4.
    assert_eq!(pg.can_remove_edge(v(1), w), Ok(false));
    assert_err!(pg.remove_edge(v(1), w));
    pg.remove_vertex(w)?;
    assert_ok!(pg.check());
    assert_eq!(pg.edges(), before.edges());
    for face in before.faces() {
      assert_eq!(pg.boundary(face)?, before.boundary(face)?);
    }
    Ok(())
  }

  #[test]
  fn add_edge_then_remove_edge_round_trips() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    let a = pg.add_vertex(v(1), v(2))?;
    let b = pg.add_vertex(v(2), v(3))?;
    let before = pg.clone();
    assert_eq!(pg.boundary(FaceId(1))?.len(), 5);

    let new_face = pg.add_edge(a, b, FaceId(1))?;
    assert_ok!(pg.check());
    assert_eq!(pg.boundary(new_face)?, &[a, v(2), b]);
    assert_eq!(pg.boundary(FaceId(1))?, &[b, v(3), v(1), a]);
    assert_eq!(counts(&pg), (5, 6, 3));

    assert_eq!(pg.remove_edge(a, b)?, FaceId(1));
    assert_ok!(pg.check());
    assert_eq!(counts(&pg), counts(&before));
    assert_eq!(pg.edges(), before.edges());
    let mut cycle = pg.boundary(FaceId(1))?.to_vec();
    let start = position(&cycle, v(1));
    cycle.rotate_left(start);
    assert_eq!(cycle, before.boundary(FaceId(1))?);
    Ok(())
  }

  #[test]
  fn add_edge_preconditions_leave_graph_untouched() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    let center = pg.stellate(FaceId(1))?;
    let a = pg.add_vertex(v(1), v(2))?;
    let version = pg.version();
    assert_eq!(
      pg.add_edge(a, a, FaceId(1)),
      Err(Error::Precondition(Precondition::SameVertex))
    );
    assert_eq!(
      pg.add_edge(a, v(1), FaceId(1)),
      Err(Error::Precondition(Precondition::EdgeExists))
    );
    assert_eq!(
      pg.add_edge(a, center, FaceId(7)),
      Err(Error::NoSuchFace(FaceId(7)))
    );
    assert_eq!(
      pg.add_edge(a, v(42), FaceId(1)),
      Err(Error::NoSuchVertex(v(42)))
    );
    assert_eq!(
      pg.add_edge(a, v(3), FaceId(1)),
      Err(Error::Precondition(Precondition::NotOnFace(v(3), FaceId(1))))
    );
    assert_eq!(pg.version(), version);
    assert_ok!(pg.check());

    assert_eq!(pg.boundary(FaceId(1))?, &[v(1), a, v(2), center]);
    pg.add_edge(a, center, FaceId(1))?;
    assert!(pg.version() > version);
    assert_ok!(pg.check());
    Ok(())
  }

  #[test]
  fn remove_edge_of_triangle_is_refused() {
    let mut pg = PlanarGraph::new();
    assert_eq!(
      pg.remove_edge(v(1), v(2)),
      Err(Error::Precondition(Precondition::SharedVertices))
    );
    assert_ok!(pg.check());
  }

  #[test]
  fn add_outer_triangle_extends_silhouette() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    // Face 1 is right of 1 -> 2, so the outer face is right of 2 -> 1.
    assert_eq!(
      pg.add_outer_triangle(v(1), v(2)),
      Err(Error::Precondition(Precondition::NotOuterEdge))
    );
    let w = pg.add_outer_triangle(v(2), v(1))?;
    assert_ok!(pg.check());
    assert_eq!(pg.boundary(FaceId::OUTER)?, &[v(3), v(2), w, v(1)]);
    assert_eq!(counts(&pg), (4, 5, 3));
    assert!(pg.is_on_outer_face(w));
    Ok(())
  }

  #[test]
  fn rotate_edge_flips_diagonal() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    let w = pg.add_outer_triangle(v(2), v(1))?;
    let before = counts(&pg);
    assert_eq!(pg.rotate_edge(v(1), v(2))?, (v(3), w));
    assert_ok!(pg.check());
    assert_eq!(counts(&pg), before);
    assert!(pg.has_edge(v(3), w));
    assert!(!pg.has_edge(v(1), v(2)));
    // Flipping back restores the original diagonal.
    let (a, b) = pg.rotate_edge(v(3), w)?;
    assert_eq!(BTreeSet::from([a, b]), BTreeSet::from([v(1), v(2)]));
    assert_ok!(pg.check());
    Ok(())
  }

  #[test]
  fn rotate_edge_needs_two_triangles() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    assert_eq!(
      pg.rotate_edge(v(1), v(2)),
      Err(Error::Precondition(Precondition::SharedVertices))
    );
    pg.add_vertex(v(2), v(3))?;
    assert_eq!(
      pg.rotate_edge(v(1), v(2)),
      Err(Error::Precondition(Precondition::NotTriangles))
    );
    Ok(())
  }

  #[test]
  fn remove_vertex_preconditions() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    assert_eq!(
      pg.remove_vertex(v(1)),
      Err(Error::Precondition(Precondition::EdgeExists))
    );
    let center = pg.stellate(FaceId(1))?;
    assert_eq!(
      pg.remove_vertex(center),
      Err(Error::Precondition(Precondition::NotDegreeTwo))
    );
    assert_eq!(pg.remove_vertex(v(99)), Err(Error::NoSuchVertex(v(99))));
    Ok(())
  }

  #[test]
  fn freed_vertex_ids_are_reused() -> Result<(), Error> {
    let mut pg = PlanarGraph::new();
    pg.stellate(FaceId(1))?;
    let w = pg.add_vertex(v(1), v(2))?;
    pg.remove_vertex(w)?;
    assert_eq!(pg.add_vertex(v(2), v(3))?, w);
    assert_ok!(pg.check());
    Ok(())
  }

  #[test]
  fn check_detects_corruption() {
    let mut pg = PlanarGraph::new();
    pg.edges.insert(
      (v(1), v(2)),
      EdgeFaces {
        left: FaceId(1),
        right: FaceId(1),
      },
    );
    assert!(matches!(pg.check(), Err(Error::InvariantViolation(_))));
  }

  #[proptest]
  fn random_graphs_are_valid(#[strategy(any_planar_graph())] pg: PlanarGraph) {
    prop_assert_eq!(pg.check(), Ok(()));
    prop_assert_eq!(pg.euler_characteristic(), 2);
  }

  #[proptest]
  fn degree_sum_is_twice_edge_count(#[strategy(any_planar_graph())] pg: PlanarGraph) {
    let sum: usize = pg.vertices().into_iter().map(|v| pg.neighbors(v).len()).sum();
    prop_assert_eq!(sum, 2 * pg.num_edges());
  }

  #[proptest]
  fn duality_holds_for_every_edge(#[strategy(any_planar_graph())] pg: PlanarGraph) {
    for (v1, v2) in pg.directed_edges() {
      let there = pg.edge(v1, v2).unwrap();
      let back = pg.edge(v2, v1).unwrap();
      prop_assert_eq!(there.left, back.right);
      prop_assert_eq!(there.right, back.left);
    }
  }

  #[proptest]
  fn rotation_preserves_counts(#[strategy(any_planar_graph())] mut pg: PlanarGraph) {
    let before = counts(&pg);
    let edges: Vec<_> = pg.directed_edges().collect();
    for (v1, v2) in edges {
      if pg.rotate_edge(v1, v2).is_ok() {
        prop_assert_eq!(counts(&pg), before);
        prop_assert_eq!(pg.check(), Ok(()));
      }
    }
  }

  #[proptest]
  fn add_edge_remove_edge_restores_counts(#[strategy(any_planar_graph())] mut pg: PlanarGraph) {
    let faces: Vec<FaceId> = pg.faces().collect();
    for face in faces {
      // A round trip may hand the merged face a smaller, recycled id.
      let cycle = match pg.boundary(face) {
        Ok(cycle) => cycle.to_vec(),
        Err(_) => continue,
      };
      if cycle.len() < 4 || pg.has_edge(cycle[0], cycle[2]) {
        continue;
      }
      let before = counts(&pg);
      let edges = pg.edges();
      pg.add_edge(cycle[0], cycle[2], face).unwrap();
      prop_assert_eq!(pg.check(), Ok(()));
      pg.remove_edge(cycle[0], cycle[2]).unwrap();
      prop_assert_eq!(pg.check(), Ok(()));
      prop_assert_eq!(counts(&pg), before);
      prop_assert_eq!(pg.edges(), edges);
    }
  }
}
