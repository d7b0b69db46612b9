//! Block Store — immutable JSON session records.
//!
//! [`types`] owns the on-disk schema and its validation into [`Block`];
//! [`store`] owns directory loading and the canonical newest-first [`BlockSet`].

pub mod store;
pub mod types;

pub use store::{AccomplishedItem, BlockSet, BlockStore, LoadReport, SkippedBlock};
pub use types::{parse_block, Block, BlockError};
