pub mod adapter;
pub mod memory;
pub mod query;
pub mod traits;

pub use adapter::DocStore;
pub use memory::MemoryBackend;
pub use query::{Cond, Query};
pub use traits::DocumentBackend;
