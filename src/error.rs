//! Error type shared by token parsing, session restore, configuration and
//! persistence.
//!
//! The selection engine itself is infallible: malformed coordinates degrade
//! into odd cell indices and an empty token simply means "no selection".

use thiserror::Error;

use crate::data::cell::Cell;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed cell `{0}`: expected X<int>Y<int>C<positive int>")]
    MalformedCell(String),
    #[error("cell {0} appears more than once in the token")]
    DuplicateCell(Cell),
    #[error("token mixes densities {first} and {other}")]
    MixedDensity { first: u32, other: u32 },
    #[error("token density {token} does not match the current density {current}")]
    DensityMismatch { token: u32, current: u32 },
    #[error("session was saved at {saved} cells/degree but the view now uses {current}; zoom to match and load it again")]
    SessionDensity { saved: u32, current: u32 },
    #[error("selection mode is not active")]
    NotSelecting,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
