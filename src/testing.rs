// This module contains strategies for:
//  * planar graphs
// A Strategy is a way to generate a shrinkable value.
use crate::data::{FaceId, PlanarGraph};
use crate::Error;

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};

///////////////////////////////////////////////////////////////////////////////
// Planar graphs

/// Grows the starting triangle with `steps` random mutations. Mutations whose preconditions
/// fail are skipped, so the result is always valid.
pub fn random_planar_graph(seed: u64, steps: usize) -> PlanarGraph {
  let mut rng = SmallRng::seed_from_u64(seed);
  let mut pg = PlanarGraph::new();
  for _ in 0..steps {
    let result = match rng.gen_range(0..6) {
      0 => pg.randomly_stellate(&mut rng).map(drop),
      1 => pg.add_random_vertex(&mut rng).map(drop),
      2 => grow_outer(&mut pg, &mut rng),
      3 => pg.randomly_mutate(&mut rng).map(drop),
      4 => {
        let (v1, v2) = pg.random_edge(&mut rng);
        pg.remove_edge(v1, v2).map(drop)
      }
      _ => add_chord(&mut pg, &mut rng),
    };
    match result {
      Ok(()) | Err(Error::Precondition(_)) => {}
      Err(err) => panic!("random mutation failed: {}", err),
    }
  }
  pg
}

fn grow_outer(pg: &mut PlanarGraph, rng: &mut SmallRng) -> Result<(), Error> {
  let outer = pg.boundary(FaceId::OUTER)?;
  let i = rng.gen_range(0..outer.len());
  let (v1, v2) = (outer[i], outer[(i + 1) % outer.len()]);
  pg.add_outer_triangle(v1, v2).map(drop)
}

fn add_chord(pg: &mut PlanarGraph, rng: &mut SmallRng) -> Result<(), Error> {
  let face = match pg
    .faces()
    .filter(|&face| pg.boundary(face).map_or(false, |cycle| cycle.len() > 3))
    .choose(rng)
  {
    Some(face) => face,
    None => return Ok(()),
  };
  let cycle = pg.boundary(face)?;
  let (v1, v2) = (cycle[0], cycle[2]);
  pg.add_edge(v1, v2, face).map(drop)
}

/// Random valid planar graphs. Shrinks towards fewer mutations.
pub fn any_planar_graph() -> impl Strategy<Value = PlanarGraph> {
  (any::<u64>(), 0..60usize).prop_map(|(seed, steps)| random_planar_graph(seed, steps))
}

#[cfg(test)]
mod tests {
  use super::*;

  use test_strategy::proptest;

  #[proptest]
  fn generated_graphs_are_valid(#[strategy(any_planar_graph())] pg: PlanarGraph) {
    prop_assert_eq!(pg.check(), Ok(()));
  }

  #[test]
  fn same_seed_same_graph() {
    let a = random_planar_graph(11, 50);
    let b = random_planar_graph(11, 50);
    assert_eq!(a.edges(), b.edges());
    assert_eq!(a.version(), b.version());
  }
}
