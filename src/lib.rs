//! pgsystat - PostgreSQL statistics viewer in the style of systat.
//!
//! The library holds everything the `pg_systat` binary uses:
//! - `collector` - data sources (PostgreSQL and a scripted mock)
//! - `view` - the generic view engine
//! - `views` - the built-in view catalog
//! - `tui` - interactive and batch front ends

pub mod collector;
pub mod config;
pub mod fmt;
pub mod logging;
pub mod tui;
pub mod view;
pub mod views;
