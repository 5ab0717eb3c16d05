//! Probe error type.

/// Fatal errors that stop the request loop.
///
/// Non-200 responses are not errors; they are reported and the loop goes on.
#[derive(Debug)]
pub enum ProbeError {
    /// The request never produced a response (DNS, refused connection, timeout).
    Transport(Box<dyn std::error::Error + Send + Sync>),
    /// A 200 response carried a body that is not JSON.
    Decode {
        /// Zero-based iteration at which decoding failed.
        iteration: usize,
        source: serde_json::Error,
    },
    /// Writing an outcome report failed.
    Io(std::io::Error),
    /// The probe could not be set up.
    Config(String),
}

impl ProbeError {
    /// Wrap any transport-level failure.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ProbeError::Transport(err.into())
    }
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Transport(err) => write!(f, "transport error: {}", err),
            ProbeError::Decode { iteration, source } => write!(
                f,
                "iteration {}: response body is not valid JSON: {}",
                iteration, source
            ),
            ProbeError::Io(err) => write!(f, "failed to write report: {}", err),
            ProbeError::Config(message) => write!(f, "invalid probe config: {}", message),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Transport(err) => Some(err.as_ref()),
            ProbeError::Decode { source, .. } => Some(source),
            ProbeError::Io(err) => Some(err),
            ProbeError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::Io(err)
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::Transport(Box::new(err))
    }
}
