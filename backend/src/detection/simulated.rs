use super::{BackendError, DetectionBackend};
use futures::FutureExt;
use futures::future::BoxFuture;
use rand::Rng;
use shared::{DetectionParams, DetectionResult, FrameCount, Verdict};
use std::ops::RangeInclusive;
use std::path::Path;

pub const SIMULATED_CONFIDENCE: RangeInclusive<f32> = 50.0..=60.0;

/// Demo backend: every input is reported fake with a confidence drawn from
/// [`SIMULATED_CONFIDENCE`]. Nothing is inspected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedBackend;

impl SimulatedBackend {
    pub fn simulate(&self) -> DetectionResult {
        DetectionResult {
            verdict: Verdict::Fake,
            confidence: rand::rng().random_range(SIMULATED_CONFIDENCE),
        }
    }
}

impl DetectionBackend for SimulatedBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn process_image<'a>(
        &'a self,
        _image: &'a [u8],
        _params: &'a DetectionParams,
    ) -> BoxFuture<'a, Result<DetectionResult, BackendError>> {
        futures::future::ready(Ok(self.simulate())).boxed()
    }

    fn process_video<'a>(
        &'a self,
        _video_path: &'a Path,
        _params: &'a DetectionParams,
        _frames: FrameCount,
    ) -> BoxFuture<'a, Result<DetectionResult, BackendError>> {
        futures::future::ready(Ok(self.simulate())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_results_are_fake_within_range() {
        let backend = SimulatedBackend;
        for _ in 0..500 {
            let result = backend.simulate();
            assert_eq!(result.verdict, Verdict::Fake);
            assert!(SIMULATED_CONFIDENCE.contains(&result.confidence));
        }
    }

    #[actix_web::test]
    async fn ignores_inputs() {
        let backend = SimulatedBackend;
        let params = DetectionParams::default();

        let image = backend.process_image(b"not an image", &params).await.unwrap();
        assert_eq!(image.verdict, Verdict::Fake);

        let video = backend
            .process_video(Path::new("/does/not/exist.mp4"), &params, FrameCount::default())
            .await
            .unwrap();
        assert!(SIMULATED_CONFIDENCE.contains(&video.confidence));
        assert!(backend.is_simulated());
    }
}
