//! Pieces shared by every crate in the admin dashboard workspace.

pub mod types;
pub mod utils;
