//! Relationship traversal from a parent record to its children

pub mod related;

pub use related::traverse;
