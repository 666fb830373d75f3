//! # leaf-core
//!
//! Core types, ID generation, and error types for Leaf.
//!
//! This crate provides the foundational types shared across all Leaf crates:
//! - Entity structs for reading sessions, timer snapshots, and derived stats
//! - The timer status enum with its state machine transitions
//! - ID prefix constants and the session ID generator
//! - The `Clock` abstraction and calendar-day arithmetic
//! - Cross-cutting error types

pub mod calendar;
pub mod clock;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
