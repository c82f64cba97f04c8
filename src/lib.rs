//! Exam seating and timetable planner.
//!
//! Places candidates into hall grids so that no two candidates of the same
//! class share a desk or sit on touching seats of neighbouring desks, and
//! builds exam timetables with invigilator rosters on top of that allocator.

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod parser;
pub mod request;
pub mod schedule;
pub mod web;

pub use config::{EngineConfig, InputLimits, PlacementStrategy, ServerConfig};
pub use error::{LoadError, PlannerError};
