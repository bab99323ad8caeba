//! Porenet CLI library.
//!
//! Hosts everything around the core pipeline: argument parsing, JSON
//! configuration loading, raw-volume file I/O, output serialization, and
//! logging initialisation. The binary in `main.rs` is a thin shell over
//! [`cli::run_cli`].

pub mod cli;
pub mod config;
pub mod export;
pub mod io;
pub mod logging;
