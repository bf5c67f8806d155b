//! CLI subcommands

pub mod calibrate;
pub mod simulate;
pub mod validate;
