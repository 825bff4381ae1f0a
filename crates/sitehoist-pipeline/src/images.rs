//! Lossless image recompression.
//!
//! PNGs are re-encoded with the strongest deflate level and adaptive row
//! filtering; the result is kept only when it is smaller than the original.
//! GIF and JPEG files are deployed byte-for-byte.

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageFormat;
use rayon::prelude::*;

use crate::fs_tasks::{files_under, has_extension};
use crate::pipeline::{io_error, PipelineError};

/// Totals from an image pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageStats {
    /// Images written to the deployment directory
    pub files: usize,
    /// Images replaced by a smaller encoding
    pub recompressed: usize,
    /// Bytes saved across all recompressed images
    pub bytes_saved: u64,
}

/// Re-encode PNG bytes at maximum compression.
pub fn recompress_png(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;

    let mut out = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)?;

    Ok(out)
}

/// Write the best encoding of every matching image under `source` to the
/// same relative path under `dest`.
pub fn compress_images<S: AsRef<str> + Sync>(
    source: &Path,
    dest: &Path,
    extensions: &[S],
) -> Result<ImageStats, PipelineError> {
    let images = files_under(source, |p| has_extension(p, extensions))?;

    // Each image is independent; none of them touch the same output path.
    let results: Vec<Result<Option<u64>, PipelineError>> = images
        .par_iter()
        .map(|path| compress_one(source, dest, path))
        .collect();

    let mut stats = ImageStats::default();
    for result in results {
        stats.files += 1;
        if let Some(saved) = result? {
            stats.recompressed += 1;
            stats.bytes_saved += saved;
        }
    }

    tracing::info!(
        "Compressed {} of {} images, saved {} bytes",
        stats.recompressed,
        stats.files,
        stats.bytes_saved
    );

    Ok(stats)
}

/// Returns the bytes saved, or `None` when the original was kept.
fn compress_one(source: &Path, dest: &Path, path: &Path) -> Result<Option<u64>, PipelineError> {
    let relative = path.strip_prefix(source).unwrap_or(path);
    let target: PathBuf = dest.join(relative);
    let original = fs::read(path).map_err(io_error(path))?;

    let smaller = if has_extension(path, &["png"]) {
        match recompress_png(&original) {
            Ok(bytes) if bytes.len() < original.len() => Some(bytes),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Keeping {} as-is: {}", path.display(), e);
                None
            }
        }
    } else {
        None
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    match smaller {
        Some(bytes) => {
            let saved = (original.len() - bytes.len()) as u64;
            fs::write(&target, bytes).map_err(io_error(&target))?;
            tracing::debug!("Recompressed {} (-{} bytes)", relative.display(), saved);
            Ok(Some(saved))
        }
        None => {
            fs::write(&target, &original).map_err(io_error(&target))?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, Rgb, RgbImage};
    use tempfile::tempdir;

    fn loose_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, _| Rgb([(x % 4) as u8 * 60, 10, 200]));
        let mut buf = Vec::new();
        PngEncoder::new_with_quality(&mut buf, CompressionType::Fast, FilterType::NoFilter)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        buf
    }

    #[test]
    fn recompressed_png_decodes_to_same_size() {
        let png = loose_png(32, 16);

        let out = recompress_png(&png).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[test]
    fn never_grows_deployed_images() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("output");
        let dest = temp.path().join("deploy");
        fs::create_dir_all(src.join("img")).unwrap();
        let png = loose_png(128, 128);
        fs::write(src.join("img/logo.png"), &png).unwrap();

        let stats = compress_images(&src, &dest, &["png", "gif", "jpg"]).unwrap();

        let deployed = fs::read(dest.join("img/logo.png")).unwrap();
        assert!(deployed.len() <= png.len());
        assert_eq!(stats.files, 1);
        assert_eq!(
            stats.bytes_saved,
            (png.len() - deployed.len()) as u64
        );
    }

    #[test]
    fn copies_other_formats_verbatim() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("output");
        let dest = temp.path().join("deploy");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("photo.jpg"), b"not really a jpeg").unwrap();
        fs::write(src.join("readme.txt"), b"skip me").unwrap();

        let stats = compress_images(&src, &dest, &["png", "jpg"]).unwrap();

        assert_eq!(stats, ImageStats { files: 1, recompressed: 0, bytes_saved: 0 });
        assert_eq!(fs::read(dest.join("photo.jpg")).unwrap(), b"not really a jpeg");
        assert!(!dest.join("readme.txt").exists());
    }

    #[test]
    fn corrupt_png_is_kept_with_warning() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("output");
        let dest = temp.path().join("deploy");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("broken.png"), b"\x89PNG garbage").unwrap();

        let stats = compress_images(&src, &dest, &["png"]).unwrap();

        assert_eq!(stats.recompressed, 0);
        assert_eq!(fs::read(dest.join("broken.png")).unwrap(), b"\x89PNG garbage");
    }
}
