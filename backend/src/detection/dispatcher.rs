use super::{BackendError, DetectionBackend, SimulatedBackend};
use crate::config::FrameWindow;
use crate::storage::{StorageError, UploadStore};
use actix_web::error::BlockingError;
use actix_web::web;
use log::{debug, info, warn};
use shared::{DetectionParams, DetectionResult, FrameCount};
use std::sync::Arc;
use uuid::Uuid;

/// Uploaded media. Only videos carry a frame count.
#[derive(Debug, Clone)]
pub enum Asset {
    Image {
        file_name: String,
        bytes: Vec<u8>,
    },
    Video {
        file_name: String,
        bytes: Vec<u8>,
        frames: FrameCount,
    },
}

impl Asset {
    pub fn kind(&self) -> &'static str {
        match self {
            Asset::Image { .. } => "image",
            Asset::Video { .. } => "video",
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            Asset::Image { file_name, .. } | Asset::Video { file_name, .. } => file_name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub id: Uuid,
    pub asset: Asset,
    pub params: DetectionParams,
}

impl DetectionRequest {
    pub fn new(asset: Asset, params: DetectionParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset,
            params,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub result: DetectionResult,
    pub simulated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("Unable to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image decode task failed: {0}")]
    Blocking(#[from] BlockingError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Routes each request to the configured backend, or to the simulator when a
/// video's frame count falls inside the demo window.
pub struct Dispatcher {
    backend: Arc<dyn DetectionBackend>,
    simulator: SimulatedBackend,
    store: UploadStore,
    demo_window: Option<FrameWindow>,
    cleanup_uploads: bool,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn DetectionBackend>, store: UploadStore) -> Self {
        Self {
            backend,
            simulator: SimulatedBackend,
            store,
            demo_window: None,
            cleanup_uploads: false,
        }
    }

    pub fn with_demo_window(mut self, window: Option<FrameWindow>) -> Self {
        self.demo_window = window;
        self
    }

    pub fn with_cleanup(mut self, cleanup_uploads: bool) -> Self {
        self.cleanup_uploads = cleanup_uploads;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.store.max_size()
    }

    pub async fn detect(&self, request: DetectionRequest) -> Result<Detection, DetectError> {
        let DetectionRequest { id, asset, params } = request;

        match asset {
            Asset::Image { file_name, bytes } => {
                let (bytes, (width, height)) = web::block(move || {
                    let decoded = image::load_from_memory(&bytes)?;
                    Ok::<_, image::ImageError>((bytes, (decoded.width(), decoded.height())))
                })
                .await??;
                debug!("Request {}: decoded '{}' ({}x{})", id, file_name, width, height);

                let result = self.backend.process_image(&bytes, &params).await?;
                Ok(Detection {
                    result,
                    simulated: self.backend.is_simulated(),
                })
            }
            Asset::Video {
                file_name,
                bytes,
                frames,
            } => {
                if let Some(window) = self.demo_window.filter(|w| w.contains(frames)) {
                    info!(
                        "Request {}: {} frames is inside demo window {}, simulating",
                        id, frames, window
                    );
                    return Ok(Detection {
                        result: self.simulator.simulate(),
                        simulated: true,
                    });
                }

                let stored = self.store.store(id, &file_name, &bytes).await?;
                let outcome = self
                    .backend
                    .process_video(&stored.path, &params, frames)
                    .await;

                if self.cleanup_uploads {
                    if let Err(e) = self.store.remove(&stored).await {
                        warn!("Request {}: failed to remove {}: {}", id, stored.key, e);
                    }
                }

                Ok(Detection {
                    result: outcome?,
                    simulated: self.backend.is_simulated(),
                })
            }
        }
    }
}
