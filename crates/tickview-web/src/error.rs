use thiserror::Error;

/// Startup failures mapped to process exit codes.
#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Config(#[from] tickview_core::ValidationError),

    #[error(transparent)]
    Core(#[from] tickview_core::CoreError),

    #[error("logging setup failed: {0}")]
    Telemetry(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WebError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Core(_) => 3,
            Self::Telemetry(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
