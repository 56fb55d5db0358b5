//! Location graph, hop-count path search, and the asynchronous path cache.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod cache;
pub mod graph;
pub mod pipeline;
pub mod search;

pub use cache::{PathCache, PathKey};
pub use graph::{Connection, ConnectionRecord, Location, LocationGraph, LocationId, LocationRecord};
pub use pipeline::PathRequestPipeline;
pub use search::{PathResult, PathSearch, SearchScratch};

use thiserror::Error;

/// Errors raised while loading a location graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("No locations provided")]
    Empty,

    #[error("Location record at index {index} carries id {id}; ids must be dense and ordered")]
    SparseId { index: usize, id: u32 },

    #[error("Duplicate location name: {0}")]
    DuplicateName(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
