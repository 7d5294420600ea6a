//! Filesystem traversal primitives.

mod walk;
pub use walk::find_files;

mod search_up;
pub use search_up::search_up;
