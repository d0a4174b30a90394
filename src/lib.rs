pub mod announcement;
pub mod as_graph;
pub mod cli;
pub mod engine;
pub mod error;
pub mod io;
pub mod policy;
pub mod shared;

pub use announcement::Announcement;
pub use as_graph::{AsGraph, AsNode};
pub use engine::PropagationEngine;
pub use error::LoadError;
pub use policy::{Policy, PolicyState};
pub use shared::{RelationshipKind, RelationshipTag, ASN};
