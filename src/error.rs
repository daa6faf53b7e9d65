//! Error types for the scene-graph engine.
//!
//! Structural and registration mistakes (duplicate names, unknown scenes,
//! unregistered signals, bad colour codes) and terminal environment failures
//! share one enum. Nothing in the crate swallows these: they propagate to
//! whoever called into the engine.

use thiserror::Error;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A child with the same name already exists under the parent.
    #[error("node '{parent}' already has child '{name}'")]
    DuplicateName {
        /// Name of the parent node.
        parent: String,
        /// The colliding child name.
        name: String,
    },

    /// A path segment or child name did not resolve.
    #[error("node '{parent}' has no child '{name}'")]
    NoSuchChild {
        /// Name of the node the lookup ran on.
        parent: String,
        /// The missing child name.
        name: String,
    },

    /// The signal was registered twice on the same node.
    #[error("signal '{signal}' already registered in '{node}'")]
    DuplicateSignal {
        /// Node owning the signal table.
        node: String,
        /// Signal name.
        signal: String,
    },

    /// Connect or emit on a signal the node never registered.
    #[error("'{signal}' not registered in '{node}'")]
    UnregisteredSignal {
        /// Node owning the signal table.
        node: String,
        /// Signal name.
        signal: String,
    },

    /// A subscriber or emitter used a payload type other than the registered one.
    #[error("signal '{signal}' in '{node}' carries {expected}, not {found}")]
    SignalPayload {
        /// Node owning the signal table.
        node: String,
        /// Signal name.
        signal: String,
        /// Payload type the signal was registered with.
        expected: &'static str,
        /// Payload type used at the call site.
        found: &'static str,
    },

    /// A scene name was registered twice.
    #[error("scene '{0}' already registered")]
    DuplicateScene(String),

    /// No scene is registered under the name.
    #[error("no such scene '{0}'")]
    SceneNotFound(String),

    /// The terminal cannot display the required colours.
    #[error("terminal supports {colours} colours, {required} required")]
    UnsupportedTerminal {
        /// Colours advertised by the terminal.
        colours: u16,
        /// Minimum colours required.
        required: u16,
    },

    /// Every colour-pair slot the terminal offers is allocated.
    #[error("out of colour pair space ({limit} pairs)")]
    ColourPairExhausted {
        /// Colour-pair limit of the terminal.
        limit: u16,
    },

    /// A colour code outside `-1..=7`.
    #[error("invalid colour code {0}")]
    InvalidColour(i16),

    /// A behaviour hook or signal subscriber failed.
    #[error("{0}")]
    Hook(String),

    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::Hook`] from any message.
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook(message.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::DuplicateName {
            parent: "root".into(),
            name: "menu".into(),
        };
        assert_eq!(err.to_string(), "node 'root' already has child 'menu'");
        assert_eq!(Error::SceneNotFound("x".into()).to_string(), "no such scene 'x'");
        assert_eq!(Error::InvalidColour(9).to_string(), "invalid colour code 9");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::other("gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
