use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
}

fn kind_from_extension(file_name: &str) -> Option<AssetKind> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Some(AssetKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Some(AssetKind::Video)
    } else {
        None
    }
}

fn kind_from_content_type(content_type: &str) -> Option<AssetKind> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" | "image/png" => Some(AssetKind::Image),
        "video/mp4" => Some(AssetKind::Video),
        _ => None,
    }
}

/// Extension wins; the part's content type is only consulted when the name has none.
pub fn classify(file_name: Option<&str>, content_type: Option<&str>) -> Option<AssetKind> {
    let has_extension = file_name
        .map(|name| Path::new(name).extension().is_some())
        .unwrap_or(false);
    if has_extension {
        return file_name.and_then(kind_from_extension);
    }
    content_type.and_then(kind_from_content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(classify(Some("face.JPG"), None), Some(AssetKind::Image));
        assert_eq!(classify(Some("face.jpeg"), None), Some(AssetKind::Image));
        assert_eq!(classify(Some("face.png"), Some("video/mp4")), Some(AssetKind::Image));
        assert_eq!(classify(Some("clip.mp4"), None), Some(AssetKind::Video));
        assert_eq!(classify(Some("clip.mov"), Some("video/mp4")), None);
        assert_eq!(classify(Some("face.webp"), None), None);
    }

    #[test]
    fn falls_back_to_content_type() {
        assert_eq!(classify(Some("blob"), Some("video/mp4")), Some(AssetKind::Video));
        assert_eq!(classify(None, Some("image/png")), Some(AssetKind::Image));
        assert_eq!(classify(None, Some("application/pdf")), None);
        assert_eq!(classify(None, None), None);
    }
}
