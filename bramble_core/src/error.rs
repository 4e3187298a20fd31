// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the render phase.
//!
//! Only component render functions can fail in normal operation. Structural
//! invariant violations (stale fiber handles, a root without a container)
//! panic instead; see the `# Panics` sections on the affected methods.

use alloc::string::String;

use thiserror::Error;

/// An error returned by a fallible component render function.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ComponentError {
    message: String,
}

impl ComponentError {
    /// Creates an error carrying the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by [`Renderer::work`](crate::Renderer::work).
///
/// When an error is returned the in-flight render cycle has already been
/// aborted: the working tree is discarded and the committed tree and the
/// presentation tree are left exactly as they were.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A component's render function failed.
    #[error("component `{name}` failed to render: {source}")]
    Component {
        /// Name the component was registered with.
        name: &'static str,
        /// The error returned by the render function.
        source: ComponentError,
    },
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn component_error_message_is_displayed() {
        let err = RenderError::Component {
            name: "Clock",
            source: ComponentError::new("time went backwards"),
        };
        assert_eq!(
            err.to_string(),
            "component `Clock` failed to render: time went backwards"
        );
    }
}
