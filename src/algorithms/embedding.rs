//! Force-directed embedding of a [`Graph`] in the plane.
//!
//! Positions are created lazily and relaxed one [`EmbeddedGraph::tick`] at a time. Every force is
//! the negative gradient of a single energy, summed per vertex into a fresh map before anything
//! moves, so the result never depends on iteration order:
//!
//! * a spring along every edge, pulling it towards its rest length,
//! * a penalty on every corner of a bounded face that is thinner than the face margin,
//! * a weak pull towards the origin balanced by a weaker push away from the centroid.
//!
//! Each vertex moves along its force divided by the local stiffness of the energy. A global step
//! length cools whenever the energy rises and warms up again after a run of improvements, and
//! part of every move is carried into the next one. A move that would turn a bounded face inside
//! out is held back, so a drawing whose faces all run clockwise keeps them that way.
//!
//! A topology seen for the first time is laid out in one go: the outer face on a circle, every
//! other vertex at the average of its neighbours and of the centres of its faces. That is a
//! barycentric drawing of a triangulated disk with a convex boundary, so no face starts folded.
use std::collections::{HashMap, HashSet};
use std::f64::consts::{PI, TAU};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::data::{Graph, Vector, VertexId};
use crate::utils::pairs;
use crate::Error;

pub type Position = Vector<f64, 2>;

// Half-width of the box a vertex placed between its neighbours is nudged within.
const JITTER: f64 = 1e-3;
// Sweeps of the first layout stop once no vertex shifts further than this.
const LAYOUT_TOLERANCE: f64 = 1e-12;
const LAYOUT_SWEEPS: usize = 10_000;
// Step length factor applied when the energy rises, undone after a streak of falls.
const COOLING: f64 = 0.9;
const WARMUP_STREAK: usize = 5;

/// Tuning for [`EmbeddedGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
  /// Rest length of every edge (default: 1.0).
  pub ideal_length: f64,
  /// Spring force per unit of squared stretch (default: 0.5).
  pub spring_strength: f64,
  /// Twice the area, in squared rest lengths, that every vertex of a face should span with each
  /// edge of that face (default: 0.1).
  pub face_margin: f64,
  /// Stiffness of the penalty on corners thinner than the margin (default: 0.5).
  pub face_strength: f64,
  /// Pull towards the origin per unit of distance (default: 0.01).
  pub origin_pull: f64,
  /// Push away from the centroid per unit of distance (default: 0.0005).
  pub centroid_push: f64,
  /// Share of the previous move carried into the next one (default: 0.5).
  pub momentum: f64,
  /// Longest move a vertex can make in one tick (default: 0.5).
  pub force_cap: f64,
  /// Vertices whose force is shorter than this stay put (default: 0.001).
  pub rest_threshold: f64,
  /// Half-width of the box vertices without placed neighbours start in (default: 2.0).
  pub init_extent: f64,
  /// Vertex translated back to the origin after every tick (default: none).
  pub anchor: Option<VertexId>,
  /// Seed for initial placement (default: 0).
  pub seed: u64,
}

impl Default for EmbeddingConfig {
  fn default() -> Self {
    Self {
      ideal_length: 1.0,
      spring_strength: 0.5,
      face_margin: 0.1,
      face_strength: 0.5,
      origin_pull: 0.01,
      centroid_push: 0.0005,
      momentum: 0.5,
      force_cap: 0.5,
      rest_threshold: 0.001,
      init_extent: 2.0,
      anchor: None,
      seed: 0,
    }
  }
}

/// Summary of one relaxation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
  /// The topology changed since the previous tick.
  pub changed: bool,
  /// Total distance moved by all vertices.
  pub displacement: f64,
  /// Number of vertices that moved.
  pub moved: usize,
  /// Number of vertices kept in place because their move would have folded a face.
  pub held: usize,
}

/// A topology together with 2D positions for its vertices.
///
/// The embedding owns the topology. External drivers mutate it through
/// [`EmbeddedGraph::graph_mut`] and the embedding notices through the graph's version counter.
///
/// ```rust
/// # use planarium::algorithms::EmbeddedGraph;
/// # use planarium::data::{PlanarGraph, FaceId};
/// let mut embedding = EmbeddedGraph::new(PlanarGraph::new());
/// embedding.graph_mut().stellate(FaceId(1))?;
/// assert!(embedding.has_changed());
/// for _ in 0..100 {
///   embedding.tick();
/// }
/// assert!(!embedding.has_changed());
/// assert_eq!(embedding.positions().count(), 4);
/// # Ok::<(), planarium::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct EmbeddedGraph<G> {
  graph: G,
  positions: HashMap<VertexId, Position>,
  // Move each vertex made on the previous tick.
  velocities: HashMap<VertexId, Position>,
  schedule: Schedule,
  version: u64,
  config: EmbeddingConfig,
  rng: SmallRng,
}

impl<G: Graph> EmbeddedGraph<G> {
  pub fn new(graph: G) -> EmbeddedGraph<G> {
    EmbeddedGraph::with_config(graph, EmbeddingConfig::default())
  }

  pub fn with_config(graph: G, config: EmbeddingConfig) -> EmbeddedGraph<G> {
    EmbeddedGraph {
      version: graph.version(),
      graph,
      positions: HashMap::new(),
      velocities: HashMap::new(),
      schedule: Schedule::default(),
      rng: SmallRng::seed_from_u64(config.seed),
      config,
    }
  }

  pub fn graph(&self) -> &G {
    &self.graph
  }

  pub fn graph_mut(&mut self) -> &mut G {
    &mut self.graph
  }

  pub fn config(&self) -> &EmbeddingConfig {
    &self.config
  }

  pub fn vertices(&self) -> Vec<VertexId> {
    self.graph.vertices()
  }

  pub fn edges(&self) -> Vec<(VertexId, VertexId)> {
    self.graph.edges()
  }

  /// Whether the topology changed since the last tick. Doesn't reset the flag.
  pub fn has_changed(&self) -> bool {
    self.version != self.graph.version()
  }

  /// Position of `v`, placing it first if it has none yet.
  ///
  /// A vertex with two or more placed neighbours starts at their average, nudged by a tiny
  /// random offset. Any other vertex starts at a random point in the initial box.
  pub fn position(&mut self, v: VertexId) -> Result<Position, Error> {
    if !self.graph.has_vertex(v) {
      return Err(Error::NoSuchVertex(v));
    }
    Ok(self.resolve(v))
  }

  /// Vertices placed so far, in no particular order.
  pub fn positions(&self) -> impl Iterator<Item = (VertexId, Position)> + '_ {
    self.positions.iter().map(|(&v, &p)| (v, p))
  }

  /// Runs one relaxation step.
  ///
  /// If no vertex has been placed yet, the whole topology is laid out first. Otherwise vertices
  /// without a position are placed one at a time as by [`EmbeddedGraph::position`].
  pub fn tick(&mut self) -> Tick {
    let changed = self.has_changed();
    if changed {
      self.version = self.graph.version();
      let live: HashSet<VertexId> = self.graph.vertices().into_iter().collect();
      self.positions.retain(|v, _| live.contains(v));
      self.velocities.clear();
      self.schedule = Schedule::default();
    }

    if self.positions.is_empty() {
      self.positions = lay_out(&self.graph, self.config.ideal_length);
    }
    let vertices = self.graph.vertices();
    for &v in &vertices {
      self.resolve(v);
    }
    self.unmirror();

    let field = self.field(&vertices);
    if self.schedule.update(field.energy) {
      self.velocities.clear();
    }

    let mut moves: HashMap<VertexId, Position> = HashMap::new();
    for &v in &vertices {
      let force = match field.forces.get(&v) {
        Some(&force) if force.length() >= self.config.rest_threshold => force,
        _ => continue,
      };
      let stiffness = field.stiffness.get(&v).copied().unwrap_or(0.0).max(1.0);
      let inertia = self.velocities.get(&v).copied().unwrap_or_else(Vector::zero);
      let step = force * (self.schedule.step / stiffness) + inertia * self.config.momentum;
      moves.insert(v, step.cap(self.config.force_cap));
    }
    let held = self.hold_back(&mut moves);

    let mut displacement = 0.0;
    for (v, step) in &moves {
      if let Some(p) = self.positions.get_mut(v) {
        *p += *step;
        displacement += step.length();
      }
    }
    let moved = moves.len();
    self.velocities = moves;
    if let Some(anchor) = self.config.anchor {
      self.recenter(anchor);
    }

    trace!(changed, displacement, moved, held, energy = field.energy, "tick");
    Tick {
      changed,
      displacement,
      moved,
      held,
    }
  }

  fn resolve(&mut self, v: VertexId) -> Position {
    if let Some(&p) = self.positions.get(&v) {
      return p;
    }
    let placed: Vec<Position> = self
      .graph
      .neighbors(v)
      .iter()
      .filter_map(|n| self.positions.get(n).copied())
      .collect();
    let p = if placed.len() >= 2 {
      mean(&placed) + Vector::random_in_box(JITTER, &mut self.rng)
    } else {
      Vector::random_in_box(self.config.init_extent, &mut self.rng)
    };
    trace!(vertex = ?v, position = ?p.0, "placed vertex");
    self.positions.insert(v, p);
    p
  }

  // Positions of every vertex are resolved by the time forces are computed.
  fn at(&self, v: VertexId) -> Position {
    match self.positions.get(&v) {
      Some(&p) => p,
      None => panic!("{:?} has no position", v),
    }
  }

  // Bounded faces run clockwise in a correct drawing. Reflects a drawing that mostly runs the
  // other way.
  fn unmirror(&mut self) {
    let area: f64 = self
      .graph
      .inner_faces()
      .iter()
      .map(|cycle| signed_area(cycle, |v| self.at(v)))
      .sum();
    if area <= 0.0 {
      return;
    }
    debug!(area, "mirrored drawing");
    for p in self.positions.values_mut() {
      p.0[0] = -p.0[0];
    }
    self.velocities.clear();
  }

  fn field(&self, vertices: &[VertexId]) -> Field {
    let mut field = Field::default();
    self.spring_forces(&mut field);
    self.face_forces(&mut field);
    self.centering_forces(vertices, &mut field);
    field
  }

  fn spring_forces(&self, field: &mut Field) {
    let strength = self.config.spring_strength;
    for (v1, v2) in self.graph.edges() {
      let (p1, p2) = (self.at(v1), self.at(v2));
      let stretch = ((p2 - p1).length() - self.config.ideal_length).abs();
      field.energy += strength / 3.0 * stretch.powi(3);
      field.push(v2, self.spring(p1, p2), 2.0 * strength * stretch);
      field.push(v1, self.spring(p2, p1), 2.0 * strength * stretch);
    }
  }

  // Force on the vertex at `to` from its spring to the vertex at `from`.
  fn spring(&self, from: Position, to: Position) -> Position {
    let target = from + (to - from).scale_to(self.config.ideal_length);
    let delta = target - to;
    delta * (self.config.spring_strength * delta.length())
  }

  // For an edge a->b of a face and another vertex c of it, `(c - a) x (b - a)` is twice the area
  // of the corner abc and positive while c lies on the face's side of the edge. Corners thinner
  // than the margin pay a quadratic penalty.
  fn face_forces(&self, field: &mut Field) {
    let margin = self.config.face_margin * self.config.ideal_length.powi(2);
    let strength = self.config.face_strength;
    for cycle in self.graph.inner_faces() {
      for (&a, &b) in pairs(cycle) {
        let (pa, pb) = (self.at(a), self.at(b));
        for &c in cycle {
          if c == a || c == b {
            continue;
          }
          let pc = self.at(c);
          let depth = (pc - pa).perp_dot(&(pb - pa));
          if depth >= margin {
            continue;
          }
          let shortfall = margin - depth;
          field.energy += strength / 2.0 * shortfall * shortfall;
          for (u, gradient) in [
            (a, (pc - pb).right_normal()),
            (b, (pa - pc).right_normal()),
            (c, (pb - pa).right_normal()),
          ] {
            let stiffness = strength * gradient.squared_length();
            field.push(u, gradient * (strength * shortfall), stiffness);
          }
        }
      }
    }
  }

  // Summed in vertex order so a seed always reproduces the same layout.
  fn centering_forces(&self, vertices: &[VertexId], field: &mut Field) {
    if vertices.is_empty() {
      return;
    }
    let points: Vec<Position> = vertices.iter().map(|&v| self.at(v)).collect();
    let centroid = mean(&points);
    for (&v, &p) in vertices.iter().zip(&points) {
      let spread = p - centroid;
      field.energy += self.config.origin_pull / 2.0 * p.squared_length()
        - self.config.centroid_push / 2.0 * spread.squared_length();
      let force = p * -self.config.origin_pull + spread * self.config.centroid_push;
      field.push(v, force, self.config.origin_pull);
    }
  }

  // Drops the moves of every vertex on a clockwise face that the moves would turn anticlockwise,
  // until no such face is left. Returns how many vertices were held.
  fn hold_back(&self, moves: &mut HashMap<VertexId, Position>) -> usize {
    let proposed = moves.len();
    let faces: Vec<&[VertexId]> = self
      .graph
      .inner_faces()
      .into_iter()
      .filter(|cycle| signed_area(cycle, |v| self.at(v)) < 0.0)
      .collect();
    loop {
      let moved = |v: VertexId| self.at(v) + moves.get(&v).copied().unwrap_or_else(Vector::zero);
      let folded: Vec<&[VertexId]> = faces
        .iter()
        .copied()
        .filter(|cycle| signed_area(cycle, moved) >= 0.0)
        .collect();
      if folded.is_empty() {
        break;
      }
      for cycle in folded {
        for v in cycle {
          moves.remove(v);
        }
      }
    }
    proposed - moves.len()
  }

  fn recenter(&mut self, anchor: VertexId) {
    if let Some(&offset) = self.positions.get(&anchor) {
      for p in self.positions.values_mut() {
        *p -= offset;
      }
    }
  }
}

// Forces and stiffness per vertex, with the energy they descend.
#[derive(Debug, Default)]
struct Field {
  forces: HashMap<VertexId, Position>,
  stiffness: HashMap<VertexId, f64>,
  energy: f64,
}

impl Field {
  fn push(&mut self, v: VertexId, force: Position, stiffness: f64) {
    *self.forces.entry(v).or_insert_with(Vector::zero) += force;
    *self.stiffness.entry(v).or_insert(0.0) += stiffness;
  }
}

// Global step length, after Hu's adaptive cooling for spring embedders.
#[derive(Debug, Clone, PartialEq)]
struct Schedule {
  step: f64,
  energy: Option<f64>,
  streak: usize,
}

impl Default for Schedule {
  fn default() -> Self {
    Schedule {
      step: 1.0,
      energy: None,
      streak: 0,
    }
  }
}

impl Schedule {
  // Returns whether the energy rose since the last update.
  fn update(&mut self, energy: f64) -> bool {
    match self.energy.replace(energy) {
      Some(previous) if energy > previous => {
        self.step *= COOLING;
        self.streak = 0;
        true
      }
      Some(previous) if energy < previous => {
        self.streak += 1;
        if self.streak >= WARMUP_STREAK {
          self.step = (self.step / COOLING).min(1.0);
          self.streak = 0;
        }
        false
      }
      _ => false,
    }
  }
}

/// Positions for every vertex of a topology with a simple outer face, or none at all.
///
/// The outer face goes on a circle, counter-clockwise and with sides of `ideal_length`. Every
/// other vertex settles at the average of its neighbours and of the centres of its bounded faces.
fn lay_out<G: Graph>(graph: &G, ideal_length: f64) -> HashMap<VertexId, Position> {
  let mut positions = HashMap::new();
  let outer = match graph.outer_face() {
    Some(outer) => outer,
    None => return positions,
  };
  let sides = outer.len();
  if sides < 3 || outer.iter().collect::<HashSet<_>>().len() != sides {
    return positions;
  }
  let radius = ideal_length / (2.0 * (PI / sides as f64).sin());
  for (i, &v) in outer.iter().enumerate() {
    let angle = TAU * i as f64 / sides as f64;
    positions.insert(v, Vector::new(radius, 0.0).rotate(angle));
  }

  let faces = graph.inner_faces();
  let mut incident: HashMap<VertexId, Vec<usize>> = HashMap::new();
  for (i, cycle) in faces.iter().enumerate() {
    for &v in cycle.iter() {
      incident.entry(v).or_default().push(i);
    }
  }
  let free: Vec<VertexId> = graph
    .vertices()
    .into_iter()
    .filter(|v| !positions.contains_key(v))
    .collect();
  for &v in &free {
    positions.insert(v, Vector::zero());
  }

  let mut sweeps = 0;
  while sweeps < LAYOUT_SWEEPS {
    sweeps += 1;
    let centres: Vec<Position> = faces
      .iter()
      .map(|cycle| mean(&cycle.iter().map(|v| positions[v]).collect::<Vec<_>>()))
      .collect();
    let mut shift: f64 = 0.0;
    for &v in &free {
      let mut points: Vec<Position> = graph.neighbors(v).iter().map(|n| positions[n]).collect();
      if let Some(faces) = incident.get(&v) {
        points.extend(faces.iter().map(|&i| centres[i]));
      }
      if points.is_empty() {
        continue;
      }
      let p = mean(&points);
      if let Some(old) = positions.insert(v, p) {
        shift = shift.max((p - old).length());
      }
    }
    if shift < LAYOUT_TOLERANCE {
      break;
    }
  }
  debug!(vertices = positions.len(), sweeps, "laid out topology");
  positions
}

fn mean(points: &[Position]) -> Position {
  points.iter().copied().sum::<Position>() / points.len() as f64
}

// Shoelace area, negative for a cycle running clockwise.
fn signed_area(cycle: &[VertexId], at: impl Fn(VertexId) -> Position) -> f64 {
  pairs(cycle)
    .map(|(&a, &b)| at(a).perp_dot(&at(b)))
    .sum::<f64>()
    / 2.0
}
