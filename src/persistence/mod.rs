pub mod files;
pub mod kv;
pub mod metadata;

pub use files::{ensure_data_dir, init_local_data_dir};
pub use kv::{FileKv, KeyValueStore};
pub use metadata::{load_metadata, save_metadata, AppMetadata};
