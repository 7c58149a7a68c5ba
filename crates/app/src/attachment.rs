//! Image attachment: native file dialog plus read-and-encode, off the UI
//! thread. The send button stays disabled until encoding has finished, so a
//! submission always carries a fully encoded data URL.

use anyhow::{bail, Result};
use providers::data_url;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, TryRecvError};

pub struct AttachmentPicker {
    result_rx: Option<Receiver<Option<String>>>,
}

impl AttachmentPicker {
    pub fn new() -> Self {
        Self { result_rx: None }
    }

    /// Open the native picker on a helper thread. The eventual result is an
    /// encoded data URL, or `None` when the user cancelled or the file could
    /// not be read as an image.
    pub fn open(&mut self) {
        if self.result_rx.is_some() {
            return;
        }
        let (tx, rx) = channel();
        self.result_rx = Some(rx);

        std::thread::spawn(move || {
            let picked = rfd::FileDialog::new()
                .set_title("Upload Image")
                .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
                .pick_file();

            let encoded = picked.and_then(|path| match encode_image_file(&path) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("ignoring unusable image {}: {}", path.display(), e);
                    None
                }
            });
            let _ = tx.send(encoded);
        });
    }

    pub fn is_picking(&self) -> bool {
        self.result_rx.is_some()
    }

    /// Non-blocking: `Some(result)` once the helper thread finished.
    pub fn try_take(&mut self) -> Option<Option<String>> {
        let rx = self.result_rx.as_ref()?;
        match rx.try_recv() {
            Ok(result) => {
                self.result_rx = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.result_rx = None;
                Some(None)
            }
        }
    }
}

impl Default for AttachmentPicker {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a file and produce a `data:<mime>;base64,...` URL. The MIME type is
/// sniffed from the bytes, not the file name.
pub fn encode_image_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let mime = sniff_mime(&bytes)?;
    Ok(data_url::encode(mime, &bytes))
}

fn sniff_mime(bytes: &[u8]) -> Result<&'static str> {
    use image::ImageFormat;
    let format = image::guess_format(bytes)?;
    Ok(match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        other => bail!("unsupported image format: {:?}", other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF";

    #[test]
    fn test_sniff_mime_from_magic_bytes() {
        assert_eq!(sniff_mime(PNG_MAGIC).unwrap(), "image/png");
        assert_eq!(sniff_mime(JPEG_MAGIC).unwrap(), "image/jpeg");
    }

    #[test]
    fn test_sniff_mime_rejects_non_images() {
        assert!(sniff_mime(b"just some text").is_err());
    }

    #[test]
    fn test_encode_image_file_produces_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, PNG_MAGIC).unwrap();

        let url = encode_image_file(&path).unwrap();
        let parsed = data_url::parse(&url).unwrap();
        assert_eq!(parsed.mime_type, "image/png");
    }
}
