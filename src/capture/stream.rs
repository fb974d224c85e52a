//! Frame pump: streams one display to the viewport as JPEG frames.
//!
//! Every frame carries the session number of the share that started the
//! pump, so a viewport that already moved on can drop stragglers.

use super::CaptureError;
use crate::selection::Source;
use crate::sync::SurfaceError;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, RgbaImage};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const JPEG_QUALITY: u8 = 80;

/// One encoded frame of the shared display, in native pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub session: u64,
    pub width: u32,
    pub height: u32,
    /// Base64 JPEG, ready for a `data:` URL.
    pub jpeg: String,
}

/// Grabs the current contents of a display.
pub trait FrameGrabber: Send + Sync {
    fn grab(&self, source: &Source) -> Result<RgbaImage, CaptureError>;
}

/// Receives the frames of a running stream.
pub trait FrameSink: Send + Sync {
    fn deliver(&self, frame: Frame) -> Result<(), SurfaceError>;

    /// The stream for `session` ended because capturing failed.
    fn failed(&self, session: u64, reason: String);
}

/// Everything needed to start a stream, minus the display and session.
#[derive(Clone)]
pub struct FramePipeline {
    grabber: Arc<dyn FrameGrabber>,
    sink: Arc<dyn FrameSink>,
    interval: Duration,
}

impl FramePipeline {
    pub fn new(grabber: Arc<dyn FrameGrabber>, sink: Arc<dyn FrameSink>, interval: Duration) -> Self {
        Self {
            grabber,
            sink,
            interval,
        }
    }
}

/// A running frame pump. Dropping it stops the stream.
pub struct FrameStream {
    session: u64,
    task: JoinHandle<()>,
}

impl FrameStream {
    /// Starts pumping frames of `source`. Must be called inside a tokio runtime.
    pub fn spawn(pipeline: &FramePipeline, source: Source, session: u64) -> Self {
        let task = tokio::spawn(pump(pipeline.clone(), source, session));
        Self { session, task }
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn pump(pipeline: FramePipeline, source: Source, session: u64) {
    let mut ticker = tokio::time::interval(pipeline.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut delivered = 0u64;

    loop {
        ticker.tick().await;

        let grabber = pipeline.grabber.clone();
        let target = source.clone();
        let grabbed = tokio::task::spawn_blocking(move || {
            grabber
                .grab(&target)
                .and_then(|image| encode_frame(&image, session))
        })
        .await;

        let frame = match grabbed {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => {
                log::error!("[CAPTURE] Stream {} of {} stopped: {}", session, source.id, e);
                pipeline.sink.failed(session, e.to_string());
                return;
            }
            Err(e) => {
                log::error!("[CAPTURE] Stream {} capture task died: {}", session, e);
                pipeline.sink.failed(session, e.to_string());
                return;
            }
        };

        if delivered == 0 {
            log::info!(
                "[CAPTURE] Stream {} of {} is {}x{}",
                session,
                source.id,
                frame.width,
                frame.height
            );
        }
        if let Err(e) = pipeline.sink.deliver(frame) {
            log::warn!("[CAPTURE] Dropped frame {} of stream {}: {}", delivered, session, e);
        }
        delivered += 1;
    }
}

/// Encodes a captured image as a base64 JPEG frame.
pub fn encode_frame(image: &RgbaImage, session: u64) -> Result<Frame, CaptureError> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    Ok(Frame {
        session,
        width: image.width(),
        height: image.height(),
        jpeg: STANDARD.encode(&bytes),
    })
}
