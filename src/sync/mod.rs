//! Sync Layer
//!
//! Optimistic ordered collections on top of the repository layer.

mod collection_sync;
mod notice;
mod ordered_list;
mod write_back;


pub use collection_sync::{LoadState, OrderedCollectionSync, SyncError};
pub use notice::{ChannelNotifier, Notice, NoticeLevel, Notifier};
pub use ordered_list::{densify, index_of, is_dense, move_item};
pub use write_back::WriteBackPolicy;
