//! # Image Loader
//!
//! Resolves photo, signature and branding references to [`Image`] values.
//! A reference is a `data:image/...;base64,` URI, a file path (relative paths
//! resolve against the asset root), or an http(s) URL when the `http` feature
//! is built and remote fetching is enabled.
//!
//! Loading never fails the report: every error is logged and the caller gets
//! `None`, which renderers treat as "no image".

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::OnceLock;

use base64::Engine;

use crate::config::ReportConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Encoded image bytes with their format resolved once, at load time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

impl ImageFormat {
    pub fn from_mime(mime: &str) -> Option<ImageFormat> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Detect the format from magic bytes.
    pub fn sniff(data: &[u8]) -> Option<ImageFormat> {
        if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(ImageFormat::Png)
        } else {
            None
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

impl Image {
    /// Wrap raw bytes. Magic bytes win over the declared MIME type; the
    /// declaration is only used when the bytes are not recognisable.
    pub fn from_bytes(data: Vec<u8>, declared_mime: Option<&str>) -> Result<Image, String> {
        let format = ImageFormat::sniff(&data)
            .or_else(|| declared_mime.and_then(ImageFormat::from_mime))
            .ok_or_else(|| match declared_mime {
                Some(m) => format!("unsupported image type '{m}' (expected PNG or JPEG)"),
                None => "unsupported image data (expected PNG or JPEG)".to_string(),
            })?;
        Ok(Image { data, format })
    }

    /// Decode the pixels once, so truncated or corrupt data is caught at load
    /// time rather than when the page is written.
    pub fn verify(&self) -> Result<(u32, u32), String> {
        let format = match self.format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        };
        let decoded = image::load_from_memory_with_format(&self.data, format)
            .map_err(|e| format!("decode failed: {e}"))?;
        match (decoded.width(), decoded.height()) {
            (0, _) | (_, 0) => Err("image has no pixels".to_string()),
            dims => Ok(dims),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime(),
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// Decode a pre-encoded image: a data URI or bare base64.
pub fn decode_encoded(encoded: &str) -> Result<Image, String> {
    let encoded = encoded.trim();
    if let Some(rest) = encoded.strip_prefix("data:") {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| "invalid data URI: missing comma".to_string())?;
        let mime = header.split(';').next().unwrap_or("");
        if !header.ends_with(";base64") {
            return Err(format!("data URI for '{mime}' is not base64 encoded"));
        }
        let bytes = base64_decode(payload)?;
        return Image::from_bytes(bytes, Some(mime));
    }
    Image::from_bytes(base64_decode(encoded)?, None)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| format!("base64 decode error: {e}"))
}

/// Where image references are fetched from.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, String>;
}

/// Filesystem (and optionally http) image source.
#[derive(Clone, Debug, Default)]
pub struct AssetSource {
    root: Option<PathBuf>,
    remote: bool,
}

impl AssetSource {
    pub fn new(root: Option<PathBuf>) -> Self {
        AssetSource {
            root,
            remote: false,
        }
    }

    pub fn with_remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        AssetSource::new(config.asset_root.clone()).with_remote(config.remote_images)
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        match &self.root {
            // Server-style references ("/uploads/x.jpg") are relative to the asset root.
            Some(root) => root.join(reference.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(reference),
        }
    }
}

impl ImageSource for AssetSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, String> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            if !self.remote {
                return Err("remote image references are disabled".to_string());
            }
            return fetch_remote(reference);
        }
        let path = self.resolve(reference);
        std::fs::read(&path).map_err(|e| format!("{}: {e}", path.display()))
    }
}

#[cfg(feature = "http")]
fn fetch_remote(url: &str) -> Result<Vec<u8>, String> {
    use std::io::Read;

    let response = ureq::get(url)
        .call()
        .map_err(|e| format!("HTTP request failed: {e}"))?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| format!("failed to read response: {e}"))?;
    Ok(bytes)
}

#[cfg(not(feature = "http"))]
fn fetch_remote(url: &str) -> Result<Vec<u8>, String> {
    Err(format!("cannot fetch {url}: built without the `http` feature"))
}

pub struct ImageLoader<'a> {
    source: &'a dyn ImageSource,
    placeholder: Option<Image>,
}

impl<'a> ImageLoader<'a> {
    pub fn new(source: &'a dyn ImageSource) -> Self {
        ImageLoader {
            source,
            placeholder: default_placeholder().cloned(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: Image) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Resolve a reference, or `None` if it is absent or cannot be loaded.
    pub fn load(&self, reference: &Option<String>) -> Option<Image> {
        let reference = reference.as_deref().map(str::trim).filter(|r| !r.is_empty())?;
        let loaded = if reference.starts_with("data:") {
            decode_encoded(reference)
        } else {
            self.source
                .fetch(reference)
                .and_then(|bytes| Image::from_bytes(bytes, None))
        };
        let result = loaded.and_then(|image| image.verify().map(|_| image));
        match result {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("Image '{}' not loaded: {e}", short_reference(reference));
                None
            }
        }
    }

    /// Like [`load`](Self::load), but a missing or unloadable photo yields the placeholder.
    pub fn load_person_photo(&self, reference: &Option<String>) -> Option<Image> {
        self.load(reference).or_else(|| self.placeholder.clone())
    }

    /// Branding images arrive pre-encoded; plain references are accepted too.
    pub fn load_encoded(&self, encoded: &Option<String>) -> Option<Image> {
        let value = encoded.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        match decode_encoded(value) {
            Ok(image) => match image.verify() {
                Ok(_) => Some(image),
                Err(e) => {
                    log::warn!("Image '{}' not loaded: {e}", short_reference(value));
                    None
                }
            },
            Err(_) => self.load(encoded),
        }
    }
}

/// Keeps log lines readable when the reference is a long data URI.
fn short_reference(reference: &str) -> &str {
    match reference.char_indices().nth(48) {
        Some((idx, _)) => &reference[..idx],
        None => reference,
    }
}

static PLACEHOLDER: OnceLock<Option<Image>> = OnceLock::new();

/// Built-in grey silhouette used for person photos that cannot be loaded.
pub fn default_placeholder() -> Option<&'static Image> {
    PLACEHOLDER
        .get_or_init(|| match silhouette_png() {
            Ok(data) => Some(Image {
                data,
                format: ImageFormat::Png,
            }),
            Err(e) => {
                log::warn!("Could not build placeholder photo: {e}");
                None
            }
        })
        .as_ref()
}

fn silhouette_png() -> Result<Vec<u8>, image::ImageError> {
    let img = image::RgbImage::from_fn(120, 150, |x, y| {
        let (fx, fy) = (x as f32, y as f32);
        let head = (fx - 60.0).powi(2) + (fy - 56.0).powi(2) <= 26.0f32.powi(2);
        let shoulders =
            fy > 92.0 && ((fx - 60.0) / 50.0).powi(2) + ((fy - 150.0) / 56.0).powi(2) <= 1.0;
        if head || shoulders {
            image::Rgb([150, 156, 165])
        } else {
            image::Rgb([228, 230, 234])
        }
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}
