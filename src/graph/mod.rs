//! Graph representation and algorithms module

pub mod algorithms;
pub mod builder;
pub mod centrality;
pub mod compressed;

pub use builder::GraphBuilder;
pub use compressed::{CompressedGraph, NodeAttributes};
