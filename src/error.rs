pub type RingletResult<T> = Result<T, RingletError>;

#[derive(thiserror::Error, Debug)]
pub enum RingletError {
    /// A geometric precondition was violated (non-positive radius or font
    /// size, degenerate canvas). These indicate a derivation bug in the
    /// caller, not bad user input, and are never silently swallowed.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Input rejected at the boundary: oversized or empty bitmaps, malformed
    /// color strings, out-of-range parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// The finished surface could not be encoded or written.
    #[error("export error: {0}")]
    Export(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RingletError {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            RingletError::geometry("x")
                .to_string()
                .contains("geometry error:")
        );
        assert!(
            RingletError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            RingletError::export("x")
                .to_string()
                .contains("export error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = RingletError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
