mod arbitrary_graph;
mod graph;
pub mod planar_graph;
mod vector;

pub use arbitrary_graph::{ArbitraryGraph, MAX_RANDOM_ATTEMPTS};
pub use graph::Graph;
#[doc(inline)]
pub use planar_graph::{EdgeFaces, FaceId, PlanarGraph, VertexId};
pub use vector::Vector;
