//! # ScoutPlan Core
//!
//! Domain types and the program schedule deriver shared by the API and
//! database crates. Nothing in here performs I/O except through the
//! [`store::ProgramEntryStore`] trait, which the database crate implements.

pub mod editor;
pub mod errors;
pub mod models;
pub mod schedule;
pub mod store;
pub mod time;
