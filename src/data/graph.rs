use super::VertexId;

/// Read access an embedder needs from a topology.
///
/// Implementors bump [`Graph::version`] on every mutation so readers can detect staleness
/// without comparing structure.
pub trait Graph {
  fn vertices(&self) -> Vec<VertexId>;

  fn has_vertex(&self, v: VertexId) -> bool;

  /// Each undirected edge once, as `(v1, v2)` with `v1 < v2`, sorted.
  fn edges(&self) -> Vec<(VertexId, VertexId)>;

  /// Adjacent vertices. Empty for a vertex that does not exist.
  fn neighbors(&self, v: VertexId) -> &[VertexId];

  fn version(&self) -> u64;

  /// Boundary cycles of the bounded faces, if the topology tracks faces at all.
  fn inner_faces(&self) -> Vec<&[VertexId]> {
    Vec::new()
  }

  /// Boundary cycle of the unbounded face, with the face on its right.
  fn outer_face(&self) -> Option<&[VertexId]> {
    None
  }
}
