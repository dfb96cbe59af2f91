//! Services layer - operations against the remote record store.

pub mod progress;
pub mod remote;
pub mod vocabulary;
