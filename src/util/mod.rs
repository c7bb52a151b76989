//! Shared helpers: aligned IO buffers and time/rate conversions

pub mod buffer;
pub mod time;
