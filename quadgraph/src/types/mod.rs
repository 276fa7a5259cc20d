//! Core data types: values, quads, directions and store references.

pub mod ids;
pub mod quad;
pub mod time;
pub mod value;

pub use ids::{NodeId, QuadId, Ref};
pub use quad::{Direction, Quad, sort_quads};
pub use time::{TimePrecision, normalize_time};
pub use value::{Value, ValueKind};
