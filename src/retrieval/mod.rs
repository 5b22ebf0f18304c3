pub mod memory;
pub mod ranker;
pub mod store;

pub use memory::MemoryVectorStore;
pub use ranker::{RankedDocument, Ranker};
pub use store::VectorStore;
