use super::{BackendError, DetectionBackend};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, warn};
use reqwest::Client;
use serde::Serialize;
use shared::{
    DetectionParams, DetectionResult, FrameCount, ImageInferenceRequest, InferenceResponse,
    VideoInferenceRequest,
};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// HTTP client for the inference service exposing `process_image` and `process_video`.
#[derive(Clone)]
pub struct RemoteBackend {
    http: Client,
    base_url: String,
}

impl RemoteBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn post<T: Serialize>(
        &self,
        name: &str,
        body: &T,
    ) -> Result<DetectionResult, BackendError> {
        let url = self.endpoint(name);
        debug!("Sending detection request to {}", url);

        let response = self.http.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!("Detector {} returned {}: {}", url, status, body);
            return Err(BackendError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let parsed: InferenceResponse = serde_json::from_slice(&bytes)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        let result = DetectionResult {
            verdict: parsed.verdict,
            confidence: parsed.confidence,
        };
        if !result.has_valid_confidence() {
            return Err(BackendError::InvalidResponse(format!(
                "confidence {} is outside [0, 100]",
                result.confidence
            )));
        }
        Ok(result)
    }
}

impl DetectionBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn process_image<'a>(
        &'a self,
        image: &'a [u8],
        params: &'a DetectionParams,
    ) -> BoxFuture<'a, Result<DetectionResult, BackendError>> {
        async move {
            let request = ImageInferenceRequest {
                image_data: STANDARD.encode(image),
                model: params.model,
                dataset: params.dataset,
                threshold: params.threshold.value(),
            };
            self.post("process_image", &request).await
        }
        .boxed()
    }

    fn process_video<'a>(
        &'a self,
        video_path: &'a Path,
        params: &'a DetectionParams,
        frames: FrameCount,
    ) -> BoxFuture<'a, Result<DetectionResult, BackendError>> {
        async move {
            let request = VideoInferenceRequest {
                video_path: video_path.to_string_lossy().into_owned(),
                model: params.model,
                dataset: params.dataset,
                threshold: params.threshold.value(),
                frames: frames.value(),
            };
            self.post("process_video", &request).await
        }
        .boxed()
    }
}
