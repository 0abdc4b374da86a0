use shared::FrameCount;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_DETECTOR_URL: &str = "http://localhost:8000";
const DEFAULT_DETECTOR_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;
const DEFAULT_DEMO_FRAME_WINDOW: FrameWindow = FrameWindow { start: 60, end: 70 };

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Simulated,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(BackendKind::Remote),
            "simulated" => Ok(BackendKind::Simulated),
            other => Err(format!("expected 'remote' or 'simulated', got '{}'", other)),
        }
    }
}

/// Inclusive frame-count range whose video requests get a simulated verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    start: u32,
    end: u32,
}

impl FrameWindow {
    pub fn new(start: u32, end: u32) -> Result<Self, String> {
        if start > end {
            return Err(format!("window start {} is after end {}", start, end));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, frames: FrameCount) -> bool {
        (self.start..=self.end).contains(&frames.value())
    }
}

impl std::fmt::Display for FrameWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Parses `off`, `none` and empty as disabled, otherwise `start-end`.
pub fn parse_frame_window(s: &str) -> Result<Option<FrameWindow>, String> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("off") || s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| "expected 'start-end' or 'off'".to_string())?;
    let start = start.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let end = end.trim().parse::<u32>().map_err(|e| e.to_string())?;
    FrameWindow::new(start, end).map(Some)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub backend: BackendKind,
    pub detector_url: Url,
    pub detector_timeout: Duration,
    pub demo_frame_window: Option<FrameWindow>,
    pub max_upload_bytes: usize,
    pub cleanup_uploads: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("PORT", &v, e))?,
            None => DEFAULT_PORT,
        };

        let backend = match get("DETECTION_BACKEND") {
            Some(v) => v
                .parse::<BackendKind>()
                .map_err(|e| ConfigError::invalid("DETECTION_BACKEND", &v, e))?,
            None => BackendKind::Remote,
        };

        let detector_url_raw =
            get("DETECTOR_URL").unwrap_or_else(|| DEFAULT_DETECTOR_URL.to_string());
        let detector_url = Url::parse(detector_url_raw.trim())
            .map_err(|e| ConfigError::invalid("DETECTOR_URL", &detector_url_raw, e))?;
        if !matches!(detector_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "DETECTOR_URL",
                &detector_url_raw,
                "scheme must be http or https",
            ));
        }

        let detector_timeout = match get("DETECTOR_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::invalid("DETECTOR_TIMEOUT_SECS", &v, e))?,
            ),
            None => Duration::from_secs(DEFAULT_DETECTOR_TIMEOUT_SECS),
        };

        let demo_frame_window = match get("DEMO_FRAME_WINDOW") {
            Some(v) => parse_frame_window(&v)
                .map_err(|e| ConfigError::invalid("DEMO_FRAME_WINDOW", &v, e))?,
            None => Some(DEFAULT_DEMO_FRAME_WINDOW),
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::invalid("MAX_UPLOAD_BYTES", &v, e))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let cleanup_uploads = match get("CLEANUP_UPLOADS") {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ConfigError::invalid("CLEANUP_UPLOADS", &v, "expected true or false")
            })?,
            None => false,
        };

        Ok(Self {
            bind_host: get("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            static_dir: get("STATIC_DIR").map(PathBuf::from),
            backend,
            detector_url,
            detector_timeout,
            demo_frame_window,
            max_upload_bytes,
            cleanup_uploads,
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
