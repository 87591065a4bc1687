use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("neither traceroute nor tracepath is installed")]
    NoTracerAvailable,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} did not finish within {timeout_secs}s")]
    TimedOut { program: String, timeout_secs: u64 },

    #[error("I/O error reading tracer output: {0}")]
    Io(#[from] std::io::Error),
}
