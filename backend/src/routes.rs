use crate::asset::{self, AssetKind, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::detection::{Asset, DetectionRequest, Dispatcher};
use crate::error::ApiError;
use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::TryStreamExt;
use log::{debug, error, info};
use serde_json::json;
use shared::{
    Dataset, DetectionModel, DetectionOptions, DetectionParams, DetectionResponse, FrameCount,
    MAX_FRAMES, Threshold,
};
use std::path::PathBuf;
use strum::IntoEnumIterator;

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: Option<PathBuf>) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/api/options").route(web::get().to(options)))
        .service(web::resource("/api/detect").route(web::post().to(handle_detect)));

    if let Some(dir) = static_dir {
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn options(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    let to_strings = |exts: &[&str]| exts.iter().map(|e| e.to_string()).collect::<Vec<_>>();
    HttpResponse::Ok().json(DetectionOptions {
        models: DetectionModel::iter().collect(),
        datasets: Dataset::iter().collect(),
        defaults: DetectionParams::default(),
        default_frames: FrameCount::default(),
        max_frames: MAX_FRAMES,
        image_extensions: to_strings(IMAGE_EXTENSIONS),
        video_extensions: to_strings(VIDEO_EXTENSIONS),
        backend: dispatcher.backend_name().to_string(),
    })
}

struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    model: Option<String>,
    dataset: Option<String>,
    threshold: Option<String>,
    frames: Option<String>,
}

fn field_text(name: &str, data: Vec<u8>) -> Result<String, ApiError> {
    String::from_utf8(data)
        .map(|s| s.trim().to_string())
        .map_err(|_| ApiError::bad_request(format!("Field '{}' is not valid UTF-8", name)))
}

async fn read_form(mut payload: Multipart, limit: usize) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if data.len() + chunk.len() > limit {
                return Err(ApiError::PayloadTooLarge(limit));
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => {
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: data,
                })
            }
            "model" => form.model = Some(field_text(&name, data)?),
            "dataset" => form.dataset = Some(field_text(&name, data)?),
            "threshold" => form.threshold = Some(field_text(&name, data)?),
            "frames" => form.frames = Some(field_text(&name, data)?),
            other => debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(form)
}

fn build_request(form: UploadForm) -> Result<DetectionRequest, ApiError> {
    let file = form
        .file
        .ok_or_else(|| ApiError::bad_request("Missing 'file' part"))?;
    if file.bytes.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let kind = asset::classify(file.file_name.as_deref(), file.content_type.as_deref())
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "Unsupported file type; accepted: {}",
                [IMAGE_EXTENSIONS, VIDEO_EXTENSIONS].concat().join(", ")
            ))
        })?;

    let model = match form.model.as_deref().filter(|m| !m.is_empty()) {
        Some(m) => m
            .parse::<DetectionModel>()
            .map_err(|_| ApiError::bad_request(format!("Unknown model '{}'", m)))?,
        None => DetectionModel::default(),
    };
    let dataset = match form.dataset.as_deref().filter(|d| !d.is_empty()) {
        Some(d) => d
            .parse::<Dataset>()
            .map_err(|_| ApiError::bad_request(format!("Unknown dataset '{}'", d)))?,
        None => Dataset::default(),
    };
    let threshold = match form.threshold.as_deref().filter(|t| !t.is_empty()) {
        Some(t) => Threshold::new(
            t.parse::<f32>()
                .map_err(|_| ApiError::bad_request(format!("Invalid threshold '{}'", t)))?,
        )?,
        None => Threshold::default(),
    };

    let file_name = file.file_name.unwrap_or_else(|| "upload".to_string());
    let asset = match kind {
        AssetKind::Image => Asset::Image {
            file_name,
            bytes: file.bytes,
        },
        AssetKind::Video => {
            let frames = match form.frames.as_deref().filter(|f| !f.is_empty()) {
                Some(f) => FrameCount::new(f.parse::<u32>().map_err(|_| {
                    ApiError::bad_request(format!("Invalid frame count '{}'", f))
                })?)?,
                None => FrameCount::default(),
            };
            Asset::Video {
                file_name,
                bytes: file.bytes,
                frames,
            }
        }
    };

    Ok(DetectionRequest::new(
        asset,
        DetectionParams {
            model,
            dataset,
            threshold,
        },
    ))
}

async fn handle_detect(
    dispatcher: web::Data<Dispatcher>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = read_form(payload, dispatcher.max_upload_bytes()).await?;
    let request = build_request(form)?;
    let id = request.id;

    info!(
        "Request {}: {} '{}' with {} on {} (threshold {})",
        id,
        request.asset.kind(),
        request.asset.file_name(),
        request.params.model,
        request.params.dataset,
        request.params.threshold
    );

    match dispatcher.detect(request).await {
        Ok(detection) => {
            let response = DetectionResponse::new(
                id,
                detection.result,
                detection.simulated,
                chrono::Utc::now().to_rfc3339(),
            );
            info!("Request {}: {}", id, response.summary);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            error!("Request {} failed: {}", id, e);
            Err(e.into())
        }
    }
}
