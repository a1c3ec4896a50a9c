use rand::Rng;
use tracing::{debug, warn};

use super::{Graph, VertexId};
use crate::utils::Arena;
use crate::{Error, Precondition};

/// How many vertex pairs [`ArbitraryGraph::add_random_edge`] draws before giving up.
pub const MAX_RANDOM_ATTEMPTS: usize = 1000;

/// A graph without faces or planarity: vertices and edges can be added freely.
///
/// ```rust
/// # use planarium::data::ArbitraryGraph;
/// let mut graph = ArbitraryGraph::new();
/// let a = graph.add_vertex();
/// let b = graph.add_vertex();
/// graph.add_edge(a, b)?;
/// assert!(graph.has_edge(b, a));
/// # Ok::<(), planarium::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct ArbitraryGraph {
  vertices: Arena<Vec<VertexId>>,
  version: u64,
}

impl Default for ArbitraryGraph {
  fn default() -> Self {
    ArbitraryGraph::new()
  }
}

impl ArbitraryGraph {
  pub fn new() -> ArbitraryGraph {
    ArbitraryGraph {
      vertices: Arena::with_base(1),
      version: 1,
    }
  }

  pub fn num_vertices(&self) -> usize {
    self.vertices.len()
  }

  pub fn num_edges(&self) -> usize {
    self.vertices.iter().map(|(_, ns)| ns.len()).sum::<usize>() / 2
  }

  pub fn has_edge(&self, v1: VertexId, v2: VertexId) -> bool {
    self
      .vertices
      .get(v1.0)
      .map_or(false, |neighbors| neighbors.contains(&v2))
  }

  pub fn add_vertex(&mut self) -> VertexId {
    let v = VertexId(self.vertices.insert(Vec::new()));
    self.version += 1;
    v
  }

  pub fn add_edge(&mut self, v1: VertexId, v2: VertexId) -> Result<(), Error> {
    for &v in &[v1, v2] {
      if !self.vertices.contains(v.0) {
        return Err(Error::NoSuchVertex(v));
      }
    }
    if v1 == v2 {
      return Err(Precondition::SameVertex.into());
    }
    if self.has_edge(v1, v2) {
      return Err(Precondition::EdgeExists.into());
    }
    self.vertices[v1.0].push(v2);
    self.vertices[v2.0].push(v1);
    self.version += 1;
    Ok(())
  }

  /// A uniformly chosen vertex, if there are any.
  pub fn choose_vertex<R>(&self, rng: &mut R) -> Option<VertexId>
  where
    R: Rng + ?Sized,
  {
    self.vertices.random(rng).map(VertexId)
  }

  /// Connects a random pair of distinct, non-adjacent vertices. Fails with
  /// [`Error::Exhausted`] after [`MAX_RANDOM_ATTEMPTS`] draws, or immediately if there are fewer
  /// than two vertices.
  pub fn add_random_edge<R>(&mut self, rng: &mut R) -> Result<(VertexId, VertexId), Error>
  where
    R: Rng + ?Sized,
  {
    if self.vertices.len() < 2 {
      return Err(Error::Exhausted { attempts: 0 });
    }
    for _ in 0..MAX_RANDOM_ATTEMPTS {
      let (v1, v2) = match (self.choose_vertex(rng), self.choose_vertex(rng)) {
        (Some(v1), Some(v2)) => (v1, v2),
        _ => break,
      };
      if v1 == v2 || self.has_edge(v1, v2) {
        continue;
      }
      self.add_edge(v1, v2)?;
      debug!(?v1, ?v2, "added random edge");
      return Ok((v1, v2));
    }
    warn!(attempts = MAX_RANDOM_ATTEMPTS, "no random edge found");
    Err(Error::Exhausted {
      attempts: MAX_RANDOM_ATTEMPTS,
    })
  }
}

impl Graph for ArbitraryGraph {
  fn vertices(&self) -> Vec<VertexId> {
    self.vertices.keys().map(VertexId).collect()
  }

  fn has_vertex(&self, v: VertexId) -> bool {
    self.vertices.contains(v.0)
  }

  fn edges(&self) -> Vec<(VertexId, VertexId)> {
    let mut edges: Vec<_> = self
      .vertices
      .iter()
      .flat_map(|(v, neighbors)| {
        neighbors
          .iter()
          .filter(move |n| v < n.0)
          .map(move |&n| (VertexId(v), n))
      })
      .collect();
    edges.sort();
    edges
  }

  fn neighbors(&self, v: VertexId) -> &[VertexId] {
    self.vertices.get(v.0).map(Vec::as_slice).unwrap_or(&[])
  }

  fn version(&self) -> u64 {
    self.version
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use claims::{assert_ok, assert_some};
  use proptest::prelude::*;
  use rand::rngs::SmallRng;
  use rand::SeedableRng;
  use test_strategy::proptest;

  fn complete(n: usize) -> ArbitraryGraph {
    let mut graph = ArbitraryGraph::new();
    let vs: Vec<_> = (0..n).map(|_| graph.add_vertex()).collect();
    for (i, &a) in vs.iter().enumerate() {
      for &b in &vs[i + 1..] {
        graph.add_edge(a, b).unwrap();
      }
    }
    graph
  }

  #[test]
  fn add_edge_preconditions() {
    let mut graph = ArbitraryGraph::new();
    let a = graph.add_vertex();
    let b = graph.add_vertex();
    let version = graph.version();
    assert_eq!(
      graph.add_edge(a, a),
      Err(Error::Precondition(Precondition::SameVertex))
    );
    assert_eq!(
      graph.add_edge(a, VertexId(9)),
      Err(Error::NoSuchVertex(VertexId(9)))
    );
    assert_eq!(graph.version(), version);
    assert_ok!(graph.add_edge(a, b));
    assert_eq!(
      graph.add_edge(b, a),
      Err(Error::Precondition(Precondition::EdgeExists))
    );
    assert_eq!(graph.version(), version + 1);
    assert_eq!(graph.edges(), vec![(a, b)]);
  }

  #[test]
  fn random_edge_needs_two_vertices() {
    let mut rng = SmallRng::seed_from_u64(0);
    let mut graph = ArbitraryGraph::new();
    assert_eq!(graph.choose_vertex(&mut rng), None);
    assert_eq!(
      graph.add_random_edge(&mut rng),
      Err(Error::Exhausted { attempts: 0 })
    );
    let a = graph.add_vertex();
    assert_eq!(assert_some!(graph.choose_vertex(&mut rng)), a);
    assert_eq!(
      graph.add_random_edge(&mut rng),
      Err(Error::Exhausted { attempts: 0 })
    );
  }

  #[test]
  fn random_edges_fill_the_graph_then_give_up() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut graph = ArbitraryGraph::new();
    for _ in 0..5 {
      graph.add_vertex();
    }
    for _ in 0..10 {
      let (a, b) = assert_ok!(graph.add_random_edge(&mut rng));
      assert!(graph.has_edge(a, b));
    }
    assert_eq!(graph.num_edges(), 10);
    let version = graph.version();
    assert_eq!(
      graph.add_random_edge(&mut rng),
      Err(Error::Exhausted {
        attempts: MAX_RANDOM_ATTEMPTS
      })
    );
    assert_eq!(graph.version(), version);
  }

  #[proptest]
  fn complete_graphs_are_exhausted(#[strategy(2usize..12)] n: usize, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut graph = complete(n);
    prop_assert_eq!(graph.num_edges(), n * (n - 1) / 2);
    prop_assert_eq!(
      graph.add_random_edge(&mut rng),
      Err(Error::Exhausted {
        attempts: MAX_RANDOM_ATTEMPTS
      })
    );
  }

  #[test]
  fn edges_are_canonical() {
    let graph = complete(4);
    for (a, b) in graph.edges() {
      assert!(a < b);
      assert!(graph.neighbors(a).contains(&b));
      assert!(graph.neighbors(b).contains(&a));
    }
    assert!(graph.neighbors(VertexId(42)).is_empty());
  }
}
