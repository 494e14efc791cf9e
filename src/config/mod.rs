//! JSON configuration for the command-line tools.

pub mod polygon_demo;
