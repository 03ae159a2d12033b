//! Common building blocks shared by messages and topology

pub mod errors;
pub mod identifiers;
