use rand::Rng;
use std::ops::{Index, IndexMut};

/// Slot storage with stable integer keys. Removed keys go on a free list and are handed out
/// again by later inserts, so ids stay small across long mutation sequences.
#[derive(Debug, Clone)]
pub struct Arena<T> {
  base: usize,
  slots: Vec<Option<T>>,
  free: Vec<usize>,
  dense: DenseCollection,
}

impl<T> Arena<T> {
  /// Keys start at `base`.
  pub fn with_base(base: usize) -> Arena<T> {
    Arena {
      base,
      slots: Vec::new(),
      free: Vec::new(),
      dense: DenseCollection::new(),
    }
  }

  fn slot(&self, key: usize) -> Option<usize> {
    key.checked_sub(self.base)
  }

  pub fn insert(&mut self, elt: T) -> usize {
    let slot = match self.free.pop() {
      Some(slot) => {
        self.slots[slot] = Some(elt);
        slot
      }
      None => {
        self.slots.push(Some(elt));
        self.slots.len() - 1
      }
    };
    self.dense.push(slot);
    slot + self.base
  }

  pub fn remove(&mut self, key: usize) -> Option<T> {
    let slot = self.slot(key)?;
    let elt = self.slots.get_mut(slot)?.take()?;
    self.dense.remove(slot);
    self.free.push(slot);
    Some(elt)
  }

  pub fn get(&self, key: usize) -> Option<&T> {
    self.slots.get(self.slot(key)?)?.as_ref()
  }

  pub fn get_mut(&mut self, key: usize) -> Option<&mut T> {
    let slot = self.slot(key)?;
    self.slots.get_mut(slot)?.as_mut()
  }

  pub fn contains(&self, key: usize) -> bool {
    self.get(key).is_some()
  }

  pub fn len(&self) -> usize {
    self.dense.len()
  }

  /// Live keys in ascending order.
  pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
    let base = self.base;
    self
      .slots
      .iter()
      .enumerate()
      .filter(|(_, slot)| slot.is_some())
      .map(move |(slot, _)| slot + base)
  }

  pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
    let base = self.base;
    self
      .slots
      .iter()
      .enumerate()
      .filter_map(move |(slot, elt)| elt.as_ref().map(|elt| (slot + base, elt)))
  }

  /// Uniformly random live key in O(1).
  pub fn random<R>(&self, rng: &mut R) -> Option<usize>
  where
    R: Rng + ?Sized,
  {
    self.dense.random(rng).map(|slot| slot + self.base)
  }
}

impl<T> Index<usize> for Arena<T> {
  type Output = T;
  fn index(&self, key: usize) -> &T {
    match self.get(key) {
      Some(elt) => elt,
      None => panic!("arena key {} is not live", key),
    }
  }
}

impl<T> IndexMut<usize> for Arena<T> {
  fn index_mut(&mut self, key: usize) -> &mut T {
    match self.get_mut(key) {
      Some(elt) => elt,
      None => panic!("arena key {} is not live", key),
    }
  }
}

type Dense = usize;
type Sparse = usize;
#[derive(Debug, Clone)]
struct DenseCollection {
  dense: Vec<Sparse>,
  dense_rev: Vec<Dense>,
}

impl DenseCollection {
  fn new() -> DenseCollection {
    DenseCollection {
      dense: Vec::new(),
      dense_rev: Vec::new(),
    }
  }

  fn len(&self) -> usize {
    self.dense.len()
  }

  fn push(&mut self, elt: Sparse) {
    let idx = self.dense.len();
    self.dense.push(elt);
    self
      .dense_rev
      .resize(std::cmp::max(self.dense_rev.len(), elt + 1), usize::MAX);
    self.dense_rev[elt] = idx;
  }

  // Swap the dense entry for 'elt' with the last entry.
  // Update reverse mapping for the swapped entry to point to the new idx.
  fn remove(&mut self, elt: Sparse) {
    let elt_dense_idx = self.dense_rev[elt];
    self.dense.swap_remove(elt_dense_idx);
    if let Some(&moved) = self.dense.get(elt_dense_idx) {
      self.dense_rev[moved] = elt_dense_idx;
    }
    self.dense_rev[elt] = usize::MAX;
  }

  fn random<R>(&self, rng: &mut R) -> Option<Sparse>
  where
    R: Rng + ?Sized,
  {
    if self.dense.is_empty() {
      return None;
    }
    let idx = rng.gen_range(0..self.dense.len());
    Some(self.dense[idx])
  }
}

///////////////////////////////////////////////////////////////////////////////
// Cyclic sequences

/// Consecutive pairs of a cycle, wrapping around at the end.
pub fn pairs<E>(slice: &[E]) -> impl Iterator<Item = (&E, &E)> {
  slice
    .iter()
    .zip(slice.iter().skip(1).chain(slice.first()))
}

/// The cycle read forward from index `from` up to and including index `to`.
pub fn arc<E: Copy>(cycle: &[E], from: usize, to: usize) -> Vec<E> {
  let len = cycle.len();
  let steps = (to + len - from) % len;
  (0..=steps).map(|i| cycle[(from + i) % len]).collect()
}
