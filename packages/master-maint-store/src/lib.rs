//! Record stores backing the master maintenance editor.
//!
//! Both stores implement [`master_maint_core::Persistence`]:
//! - [`MemoryPersistence`] keeps everything in process, with optional
//!   latency and failure injection for demos and tests.
//! - [`JsonFilePersistence`] keeps every tab in one checksummed JSON file.

pub mod json_file;
pub mod memory;
pub mod seed;

pub use json_file::{JsonFilePersistence, FORMAT_VERSION};
pub use memory::MemoryPersistence;
pub use seed::mock_dataset;
