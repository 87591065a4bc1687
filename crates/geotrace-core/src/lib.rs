pub mod app_config;
pub mod config;
pub mod coordinate;
pub mod location;
pub mod maps;
pub mod subject;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use coordinate::Coordinate;
pub use location::{GeoLocation, ParamValue, KEY_CITY, KEY_COUNTRY};
pub use maps::{builtin_presets, load_map_presets, MapPreset, MapsFile, ProjectionKind};
pub use subject::{StringSubject, Subject, SubjectError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read map presets file {path}: {source}")]
    MapsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse map presets file: {0}")]
    MapsFileParse(#[from] serde_yaml::Error),

    #[error("map preset validation failed: {0}")]
    Validation(String),
}
