//! iemocap-cli: inspect IEMOCAP valence/arousal splits from the command line.

pub mod batch;
pub mod cli;
pub mod config;
pub mod item;
pub mod stats;
