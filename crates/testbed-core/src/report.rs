//! Error accumulation for the end-of-run summary.

/// Ordered list of errors recorded while processing repositories.
///
/// Recording an error never stops a run; the log is printed once at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLog {
    messages: Vec<String>,
}

impl ErrorLog {
    /// Create an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Append an error message.
    pub fn record(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of recorded errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Recorded messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }
}
