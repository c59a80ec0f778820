//! Model routing for parley.
//!
//! Three pure pieces, no network state:
//! - [`classifier`] maps raw input text to a complexity tier
//! - [`registry`] is the immutable, order-preserving model catalog
//! - [`router`] narrows the catalog by constraints and picks one model

pub mod classifier;
pub mod registry;
pub mod router;

pub use classifier::{TaskComplexity, classify};
pub use registry::{ModelDescriptor, ModelRegistry};
pub use router::{RouteConstraints, select};
