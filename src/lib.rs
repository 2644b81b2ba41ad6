//! Course Teams Library
//!
//! Bulk assignment of course learners to teams from a CSV roster, roster
//! export, and server-side tracking of membership events.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod roster;
pub mod tracking;
