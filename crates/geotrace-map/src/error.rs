use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("origin percentage {axis}={value} is outside 0..=1")]
    InvalidOrigin { axis: char, value: f64 },

    #[error("scale factors must be positive and finite (got {scale_x}, {scale_y})")]
    InvalidScale { scale_x: f64, scale_y: f64 },

    #[error("map image size must be positive (got {width}x{height})")]
    InvalidSize { width: i64, height: i64 },

    #[error("invalid projection '{definition}': {source}")]
    Projection {
        definition: String,
        #[source]
        source: proj4rs::errors::Error,
    },
}
