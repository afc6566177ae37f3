//! Configuration for C++ emission.

/// Configuration for C++ emission.
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether to start the header with `#pragma once`
    pub(crate) pragma_once: bool,
    /// Namespace wrapping every declaration
    pub(crate) namespace: Option<String>,
    /// Whether to forward-declare class types. Without them, classes that
    /// point at each other must be ordered too.
    pub(crate) forward_declarations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pragma_once: true,
            namespace: None,
            forward_declarations: true,
        }
    }
}

impl Config {
    /// Create a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to emit `#pragma once`.
    pub fn pragma_once(mut self, value: bool) -> Self {
        self.pragma_once = value;
        self
    }

    /// Set the namespace wrapping the declarations.
    pub fn namespace(mut self, value: impl Into<String>) -> Self {
        self.namespace = Some(value.into());
        self
    }

    /// Set whether to forward-declare class types.
    pub fn forward_declarations(mut self, value: bool) -> Self {
        self.forward_declarations = value;
        self
    }
}
