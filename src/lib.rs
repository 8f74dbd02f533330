//! depscope library — concurrent dependency-graph construction and analysis.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod server;
