pub mod disk;

pub use disk::{DiskVectorStore, DEFAULT_STORE_DIR};
