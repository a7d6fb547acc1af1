//! Synchronous checks run by `process_media` before a job exists.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ValidationConfig;
use crate::error::ValidationError;
use crate::job::model::{AssetDescriptor, ProcessingOptions};

static RE_MIME_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+/[A-Za-z0-9][A-Za-z0-9.+_-]*$").unwrap());
static RE_OUTPUT_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.+-]{0,15}$").unwrap());
// 720p, 1080p, 4K, 1920x1080
static RE_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{3,4}p|[248]K|\d{3,5}x\d{3,5})$").unwrap());

pub fn validate_asset(
    asset: &AssetDescriptor,
    rules: &ValidationConfig,
) -> Result<(), ValidationError> {
    let mime_type = asset.mime_type.trim();
    if mime_type.is_empty() {
        return Err(ValidationError::MissingMimeType);
    }
    if !RE_MIME_TYPE.is_match(mime_type) {
        return Err(ValidationError::MalformedMimeType(mime_type.to_string()));
    }
    if !rules
        .allowed_mime_prefixes
        .iter()
        .any(|prefix| mime_type.starts_with(prefix.as_str()))
    {
        return Err(ValidationError::UnsupportedMimeType(mime_type.to_string()));
    }

    if asset.size_bytes == 0 {
        return Err(ValidationError::EmptyAsset);
    }
    if asset.size_bytes > rules.max_asset_bytes {
        return Err(ValidationError::AssetTooLarge {
            size: asset.size_bytes,
            limit: rules.max_asset_bytes,
        });
    }

    Ok(())
}

pub fn validate_options(options: &ProcessingOptions) -> Result<(), ValidationError> {
    let mut formats = HashSet::new();
    for format in &options.output_formats {
        if !RE_OUTPUT_FORMAT.is_match(format) {
            return Err(ValidationError::InvalidOutputFormat(format.clone()));
        }
        if !formats.insert(format.to_ascii_lowercase()) {
            return Err(ValidationError::Duplicate {
                field: "outputFormats",
                value: format.clone(),
            });
        }
    }

    let mut resolutions = HashSet::new();
    for resolution in &options.resolutions {
        if !RE_RESOLUTION.is_match(resolution) {
            return Err(ValidationError::InvalidResolution(resolution.clone()));
        }
        if !resolutions.insert(resolution.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "resolutions",
                value: resolution.clone(),
            });
        }
    }

    Ok(())
}
