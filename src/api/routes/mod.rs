//! API Routes
//!
//! Route handlers organized by functionality.

pub mod content;
pub mod health;
pub mod scores;
