//! Error types for plife.
//!
//! Most of the engine is non-failing by construction: random generation always
//! stays inside its configured bounds and growth is capped rather than refused.
//! What remains are contract violations (buffer lengths that do not line up),
//! configuration mistakes, config file I/O and, with the `gpu` feature, device
//! setup and readback failures.

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the simulation engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller handed over data that does not match the current state
    /// (replacement buffer of the wrong length, malformed kernel input).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A [`SimConfig`](crate::SimConfig) value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Failed to read or write a config file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for [`SimConfig`](crate::SimConfig).
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// GPU kernel failure.
    #[cfg(feature = "gpu")]
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}

/// Errors that can occur while setting up or running the GPU kernel.
#[cfg(feature = "gpu")]
#[derive(Debug, Error)]
pub enum GpuError {
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; ensure your system has Vulkan/Metal/DX12 support")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// Failed to map a staging buffer for reading.
    #[error("failed to map GPU buffer: {0}")]
    BufferMapping(String),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_is_informative() {
        let e = Error::invalid_argument("expected 4 positions, got 3");
        let msg = e.to_string();
        assert!(msg.contains("invalid argument"));
        assert!(msg.contains("expected 4 positions"));
    }

    #[test]
    fn test_json_error_converts() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let e: Error = err.into();
        assert!(matches!(e, Error::Json(_)));
    }
}
