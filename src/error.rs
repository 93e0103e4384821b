/*
 * Error Module
 *
 * Error types for the few fallible operations: inserting boids into a
 * world and reading/writing the persisted debug toggles.
 */

use std::path::PathBuf;

use thiserror::Error;

use crate::boid::BoidTag;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("a boid tagged {0} is already part of this world")]
    DuplicateTag(BoidTag),
    #[error("no unused boid tags left to spawn into")]
    TagSpaceExhausted,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read debug config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write debug config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("debug config {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode debug config: {0}")]
    Encode(#[from] serde_json::Error),
}
