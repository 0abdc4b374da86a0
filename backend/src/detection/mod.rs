pub mod dispatcher;
pub mod remote;
pub mod simulated;

use futures::future::BoxFuture;
use shared::{DetectionParams, DetectionResult, FrameCount};
use std::path::Path;

pub use dispatcher::{Asset, DetectError, DetectionRequest, Dispatcher};
pub use remote::RemoteBackend;
pub use simulated::SimulatedBackend;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Detector request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Detector returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid detector response: {0}")]
    InvalidResponse(String),
}

/// Entry points of a deepfake detector.
pub trait DetectionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// True when results are fabricated rather than inferred.
    fn is_simulated(&self) -> bool {
        false
    }

    fn process_image<'a>(
        &'a self,
        image: &'a [u8],
        params: &'a DetectionParams,
    ) -> BoxFuture<'a, Result<DetectionResult, BackendError>>;

    fn process_video<'a>(
        &'a self,
        video_path: &'a Path,
        params: &'a DetectionParams,
        frames: FrameCount,
    ) -> BoxFuture<'a, Result<DetectionResult, BackendError>>;
}
