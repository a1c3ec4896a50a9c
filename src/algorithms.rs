pub mod curvature;
pub mod embedding;
pub mod mutation;

#[doc(inline)]
pub use curvature::{vertex_score, FACE_BIAS};

#[doc(inline)]
pub use embedding::{EmbeddedGraph, EmbeddingConfig, Position, Tick};

#[doc(inline)]
pub use mutation::Mutation;
