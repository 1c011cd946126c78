//! Consistency propagation over the constraint store.
//!
//! [`local`] keeps a single pair or triple consistent with its sub-states,
//! [`bridge`] transports consistency between two triples through their intermediary
//! triples, and [`fixpoint`] iterates that over ranges of the pair-of-triples space
//! until nothing changes.
pub mod bridge;
pub mod fixpoint;
pub mod local;
