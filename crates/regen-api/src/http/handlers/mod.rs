//! Route handlers.

pub mod background;
pub mod image;
