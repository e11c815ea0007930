//! Channel configuration for progress reporting

/// Buffer sizing for the controller -> reporter progress channel
///
/// Events that arrive while the buffer is full are dropped; outcomes are not.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Completion event buffer size
    pub events_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            events_buffer: 1024,
        }
    }
}

impl ChannelConfig {
    /// Set a custom completion event buffer size
    pub fn with_events_buffer(mut self, size: usize) -> Self {
        self.events_buffer = size.max(1);
        self
    }
}
