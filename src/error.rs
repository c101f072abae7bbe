use std::path::PathBuf;
use thiserror::Error;

use crate::step::EventId;

/// A sensitive detector was driven out of its Idle → EventActive → Idle cycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{detector}: step delivered outside of an event")]
    StepWhileIdle { detector: String },

    #[error("{detector}: end of event without a matching begin")]
    EndWhileIdle { detector: String },

    #[error("{detector}: event {requested} started while event {active} is still active")]
    StartWhileActive { detector: String, active: EventId, requested: EventId },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HDF5: {0}")]
    Hdf5(#[from] hdf5::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
