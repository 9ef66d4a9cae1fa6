//! Storage contracts shared by backends

mod batch;

pub use batch::{AtomicStore, BatchOperation};
