//! trackops: work-breakdown structure, deadlines and opportunities for govcon startups
//!
//! Layers, innermost first: `domain` (pure data and rules), `application`
//! (stores, import/export, services), `infrastructure` (I/O and wiring),
//! `cli` (argument parsing and output).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
