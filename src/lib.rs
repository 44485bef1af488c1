//! Core library functions for the transmission network analyzer

pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod network;
pub mod storage;
pub mod transmission;
pub mod viz;

pub use anyhow::{anyhow, Result};
pub use config::{Config, DateConvention, EdgeWeight};
pub use error::TenetError;
