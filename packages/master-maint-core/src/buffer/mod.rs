//! Per-tab snapshots, edit buffers, dirty tracking, and id allocation.

mod id_allocator;
mod store;
mod tab_buffer;
mod visible;

pub use id_allocator::IdAllocator;
pub use store::EditBufferStore;
pub use visible::VisibleRecords;
