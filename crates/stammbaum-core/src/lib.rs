//! Domain types for Stammbaum, a family tree of persons linked to their
//! father and mother.
//!
//! Holds the person records, the [`store::PersonStore`] abstraction, and the
//! depth-bounded ancestor resolver. No HTTP, database, or rendering code
//! lives here.

pub mod error;
pub mod person;
pub mod store;
pub mod tree;

pub use error::{Error, Result};
pub use person::PersonId;
pub use tree::{AncestorNode, Lineage, Parents, resolve};
