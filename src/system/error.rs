/// Errors raised while sampling host state.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The OS-statistics provider failed.
    #[error("provider call `{call}` failed: {detail}")]
    Provider { call: &'static str, detail: String },

    /// The call was abandoned because its cancellation token fired.
    #[error("operation was cancelled")]
    Cancelled,

    /// The provider succeeded but returned nothing usable.
    #[error("provider call `{0}` returned no data")]
    EmptyReading(&'static str),

    /// A worker task panicked or was aborted.
    #[error("worker task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// The boot offset does not fit the calendar.
    #[error("uptime of {0} seconds is outside the representable calendar range")]
    UptimeOutOfRange(u64),
}

impl MonitorError {
    pub fn provider(call: &'static str, detail: impl Into<String>) -> Self {
        MonitorError::Provider {
            call,
            detail: detail.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MonitorError::Cancelled)
    }
}
