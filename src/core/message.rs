//! Immutable log message text.

use std::fmt;

/// A single log message.
///
/// The text is fixed at construction. Pushing a message moves it into the
/// queue, and the consumer takes sole ownership when it pops it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Message(Box<str>);

impl Message {
    /// Creates a message from any text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into().into_boxed_str())
    }

    /// The message text exactly as it will be written to the sink.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the message and returns its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0.into_string()
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self(text.into_boxed_str())
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self(Box::from(text))
    }
}

impl AsRef<str> for Message {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
