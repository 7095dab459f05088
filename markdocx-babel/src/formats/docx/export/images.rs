//! Loading and sizing images referenced from Markdown.
//!
//! Sources are `data:` URLs (decoded in place), `http(s)` URLs (fetched with a blocking
//! client when the `remote-images` feature is enabled) and everything else, read as a local
//! file. Every bitmap is decoded and re-encoded as PNG before it reaches the package builder.
//! Failures, including payloads that do not decode, are reported to the caller, which degrades
//! the image to literal Markdown.

use crate::formats::docx::options::ImageOptions;
use crate::ir::office::ImageRun;
use base64::Engine;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use url::Url;

/// Raw image bytes plus the media type reported by the source, if any
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedImage {
    pub data: Vec<u8>,
    pub mime: Option<String>,
}

/// Source of image bytes
///
/// The exporter only talks to this trait, so tests can substitute an in-memory fetcher.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage, String>;
}

/// Default fetcher: data URLs, remote URLs and local files
pub struct SourceFetcher {
    fetch_remote: bool,
    timeout_secs: u64,
    base_dir: Option<PathBuf>,
}

impl SourceFetcher {
    pub fn new(options: &ImageOptions) -> Self {
        SourceFetcher {
            fetch_remote: options.fetch_remote,
            timeout_secs: options.timeout_secs,
            base_dir: options.base_dir.clone(),
        }
    }

    fn fetch_local(&self, url: &str) -> Result<FetchedImage, String> {
        let path = match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "file" => parsed
                .to_file_path()
                .map_err(|_| format!("invalid file URL '{url}'"))?,
            _ => PathBuf::from(url),
        };
        let path = match (&self.base_dir, path.is_relative()) {
            (Some(base), true) => base.join(path),
            _ => path,
        };
        let data = std::fs::read(&path).map_err(|e| format!("{}: {e}", path.display()))?;
        Ok(FetchedImage {
            data,
            mime: mime_from_extension(&path).map(str::to_string),
        })
    }

    #[cfg(feature = "remote-images")]
    fn fetch_remote(&self, url: &str) -> Result<FetchedImage, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| e.to_string())?;
        let response = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().map_err(|e| e.to_string())?.to_vec();
        Ok(FetchedImage { data, mime })
    }

    #[cfg(not(feature = "remote-images"))]
    fn fetch_remote(&self, url: &str) -> Result<FetchedImage, String> {
        let _ = self.timeout_secs;
        Err(format!("remote image support is not compiled in: {url}"))
    }
}

impl ImageFetcher for SourceFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage, String> {
        if url.trim().is_empty() {
            return Err("empty image URL".to_string());
        }
        if url.starts_with("data:") {
            return decode_data_url(url);
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            if !self.fetch_remote {
                return Err(format!("remote images are disabled: {url}"));
            }
            return self.fetch_remote(url);
        }
        self.fetch_local(url)
    }
}

/// Decode a `data:[<mime>][;base64],<payload>` URL
pub fn decode_data_url(url: &str) -> Result<FetchedImage, String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URL".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URL without payload".to_string())?;

    let mut params = header.split(';');
    let mime = params
        .next()
        .filter(|mime| !mime.is_empty())
        .map(str::to_string);
    if !params.any(|param| param.eq_ignore_ascii_case("base64")) {
        return Err("only base64 data URLs are supported".to_string());
    }

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64 payload: {e}"))?;
    Ok(FetchedImage { data, mime })
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Decode a fetched bitmap, trusting the reported media type only when sniffing fails.
pub fn decode_bitmap(mime: Option<&str>, data: &[u8]) -> Result<DynamicImage, String> {
    match image::load_from_memory(data) {
        Ok(img) => Ok(img),
        Err(sniffed) => {
            let essence = mime.and_then(|mime| mime.split(';').next()).map(str::trim);
            match essence.and_then(ImageFormat::from_mime_type) {
                Some(format) => image::load_from_memory_with_format(data, format)
                    .map_err(|e| format!("cannot decode {format:?} bitmap: {e}")),
                None => Err(format!("cannot decode bitmap: {sniffed}")),
            }
        }
    }
}

/// Display size in pixels: decoded dimensions clamped per axis.
pub fn display_size(img: &DynamicImage, options: &ImageOptions) -> (u32, u32) {
    let (width, height) = img.dimensions();
    (
        width.clamp(options.min_px, options.max_px),
        height.clamp(options.min_px, options.max_px),
    )
}

/// Fetch, decode and size an image for embedding.
pub fn load_image(
    fetcher: &dyn ImageFetcher,
    url: &str,
    alt: &str,
    options: &ImageOptions,
) -> Result<ImageRun, String> {
    let fetched = fetcher.fetch(url)?;
    if fetched.data.is_empty() {
        return Err(format!("image '{url}' is empty"));
    }
    let img = decode_bitmap(fetched.mime.as_deref(), &fetched.data)?;
    let (width_px, height_px) = display_size(&img, options);

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| format!("cannot re-encode '{url}' as PNG: {e}"))?;

    Ok(ImageRun {
        png,
        width_px,
        height_px,
        alt: alt.to_string(),
    })
}
