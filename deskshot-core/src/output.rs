//! PNG encoding and atomic output-file writing.
//!
//! The canvas is encoded into a temporary file created next to the target
//! and only persisted (renamed) onto the target path once encoding and
//! flushing succeeded.  A failed run therefore never leaves a truncated
//! image at the requested path.
//!
//! Temporary files are created owner-only; on unix the result is widened to
//! `0644` before the rename so screenshots get ordinary file permissions.

use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tempfile::NamedTempFile;

use crate::compositor::Canvas;
use crate::errors::DeskshotError;

/// Mode given to the finished PNG on unix.
#[cfg(unix)]
pub const OUTPUT_MODE: u32 = 0o644;

/// Create the directory that will hold `path`, including missing parents.
///
/// A bare file name (no parent component) needs nothing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), DeskshotError> {
    let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    std::fs::create_dir_all(dir).map_err(|source| DeskshotError::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })
}

/// Encode `image` as PNG in memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, DeskshotError> {
    let mut buf: Vec<u8> = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Encode `canvas` as PNG and place it at `path`.
///
/// The parent directory must already exist (see [`ensure_parent_dir`]).
/// An existing file at `path` is replaced.
pub fn write_png(canvas: &Canvas, path: &Path) -> Result<(), DeskshotError> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(|source| DeskshotError::FileCreate {
        path: path.to_path_buf(),
        source,
    })?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        canvas.image.write_to(&mut writer, ImageFormat::Png)?;
        writer
            .flush()
            .map_err(|e| DeskshotError::Encode(format!("flush {}: {e}", path.display())))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(OUTPUT_MODE))
            .map_err(|source| DeskshotError::FileCreate {
                path: path.to_path_buf(),
                source,
            })?;
    }

    // Dropping `tmp` on any earlier return removes the temporary file.
    tmp.persist(path).map_err(|e| DeskshotError::FileCreate {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    log::debug!(
        "wrote {}x{} PNG to {}",
        canvas.width(),
        canvas.height(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use image::Rgba;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([250, 10, 30, 255])
            } else {
                Rgba([x as u8, y as u8, 200, 255])
            }
        })
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let img = checker(13, 7);
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (13, 7));
        assert_eq!(decoded.as_raw(), img.as_raw());
    }

    #[test]
    fn test_write_png_leaves_only_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("shot.png");
        let canvas = Canvas {
            bounds: Rect::new(-2, -2, 4, 3),
            image: checker(4, 3),
        };

        write_png(&canvas, &target).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary file must not linger");
        let decoded = image::open(&target).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), canvas.image.as_raw());
    }

    #[cfg(unix)]
    #[test]
    fn test_written_png_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("shot.png");
        let canvas = Canvas {
            bounds: Rect::new(0, 0, 2, 2),
            image: checker(2, 2),
        };

        write_png(&canvas, &target).unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_write_png_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("shot.png");
        std::fs::write(&target, b"stale").unwrap();

        let canvas = Canvas {
            bounds: Rect::new(0, 0, 1, 1),
            image: checker(1, 1),
        };
        write_png(&canvas, &target).unwrap();
        assert_eq!(image::open(&target).unwrap().to_rgba8().dimensions(), (1, 1));
    }

    #[test]
    fn test_write_png_missing_dir_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("absent").join("shot.png");
        let canvas = Canvas {
            bounds: Rect::new(0, 0, 1, 1),
            image: checker(1, 1),
        };
        let err = write_png(&canvas, &target).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(!target.exists());
    }

    #[test]
    fn test_write_png_encode_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("shot.png");
        // The PNG encoder rejects zero-sized images.
        let canvas = Canvas {
            bounds: Rect::EMPTY,
            image: RgbaImage::new(0, 0),
        };
        let err = write_png(&canvas, &target).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(!target.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_ensure_parent_dir_nested() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("shot.png");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
        // Idempotent.
        ensure_parent_dir(&target).unwrap();
    }

    #[test]
    fn test_ensure_parent_dir_bare_name() {
        ensure_parent_dir(Path::new("shot.png")).unwrap();
    }

    #[test]
    fn test_ensure_parent_dir_blocked_by_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let err = ensure_parent_dir(&blocker.join("shot.png")).unwrap_err();
        assert!(matches!(err, DeskshotError::DirectoryCreate { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
