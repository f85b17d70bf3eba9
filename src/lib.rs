//! Clickdex library crate. Re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the console entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can import game types, systems, and resources headlessly.

pub mod shared;
pub mod config;
pub mod catalog;
pub mod data;
pub mod effects;
pub mod bonuses;
pub mod progression;
pub mod quests;
pub mod random_events;
pub mod items;
pub mod economy;
pub mod collection;
pub mod engine;
pub mod save;
pub mod input;
