//! Sync Trees
//!
//! Listing of the source and replica trees and the relative-path key that joins
//! entries between them.

pub mod path;
pub mod walker;

pub use walker::{DirEntry, FileEntry, Walker};
