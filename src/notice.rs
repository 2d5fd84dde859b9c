use tracing::{info, warn};

/// User-facing transient message raised by the event reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Delivery seam for notices; the presentation layer supplies its own sink.
pub trait NoticeSink: Send + Sync {
    fn publish(&self, notice: Notice);
}

/// Default sink that forwards notices to the log stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNoticeSink;

impl NoticeSink for LogNoticeSink {
    fn publish(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Warning | NoticeLevel::Error => {
                warn!(message = %notice.message, "notice")
            }
            _ => info!(message = %notice.message, "notice"),
        }
    }
}
