//! Display enumeration and capture — public API.
//!
//! Owns everything that asks the OS which displays can be shared and what
//! they currently show.
//! External code should only use the items exported here.

mod sources;
mod stream;
mod watch;

pub use sources::MonitorSources;
pub use stream::{encode_frame, Frame, FrameGrabber, FramePipeline, FrameSink, FrameStream};
pub use watch::{watch_displays, TopologySnapshot};

use crate::selection::Source;

/// Enumerates the displays that can be shared.
pub trait SourceProvider: Send {
    /// All capturable displays in enumeration order.
    fn list_sources(&self) -> Result<Vec<Source>, CaptureError>;

    /// Display key of the primary display, if the OS reports one.
    fn primary_display_key(&self) -> Option<String>;
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("Monitor {index} is missing its {field}: {reason}")]
    MonitorAttribute {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Display {0} is no longer connected")]
    DisplayGone(String),

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),

    #[error("Frame encoding failed: {0}")]
    Encode(String),
}
