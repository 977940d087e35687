//! ECS systems that operate on the arena world each tick.
//!
//! Systems are plain functions that take `&mut World` (or `&World` for read-only).
//! They do not own state; all state lives in components.

pub mod arrows;
pub mod cleanup;
pub mod motion;
pub mod sampling;
pub mod snapshot;
