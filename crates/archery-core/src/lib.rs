//! Core types and definitions for the archery duel.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, state snapshots, events, ports, configuration and
//! constants. It has no dependency on any engine or runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod params;
pub mod ports;
pub mod state;
pub mod types;
