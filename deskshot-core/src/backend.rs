//! Display enumeration and capture capability.
//!
//! [`DisplayBackend`] is the seam between the compositor and the OS.  The
//! platform implementation is selected at compile time and re-exported as
//! [`crate::platform::NativeBackend`]; [`MockBackend`] is always compiled so
//! tests on any machine can drive the full pipeline without a display.

use std::cell::Cell;

use image::{Rgba, RgbaImage};
use serde::Serialize;

use crate::errors::BackendError;
use crate::geometry::Rect;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One active display as seen by a single enumeration.
///
/// `index` is only meaningful for the backend instance that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Display {
    pub index: usize,
    pub bounds: Rect,
}

/// Pixels captured from one rectangle of the virtual desktop.
///
/// `image` is RGBA8 and always `bounds.width x bounds.height`.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub index: usize,
    pub bounds: Rect,
    pub image: RgbaImage,
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// A source of displays and their pixels.
///
/// Implementations take a snapshot of the monitor layout when constructed
/// so `count` and `bounds_of` stay consistent for the whole run.
pub trait DisplayBackend {
    /// Number of displays in this enumeration.
    fn count(&self) -> Result<usize, BackendError>;

    /// Bounds of display `index` in virtual desktop coordinates.
    ///
    /// Valid for `index < count()`.
    fn bounds_of(&self, index: usize) -> Result<Rect, BackendError>;

    /// Capture exactly `rect` (virtual desktop coordinates) as RGBA pixels.
    ///
    /// The returned image should be `rect.width x rect.height`; callers
    /// resample otherwise.  Blocks until the capture completes.
    fn capture_rect(&self, rect: Rect) -> Result<RgbaImage, BackendError>;

    /// Short backend name for log lines.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

/// Pixel pattern used by [`MockBackend`] for display `index` at virtual
/// desktop position (`x`, `y`).
///
/// Deterministic and distinct per display so tests can tell which display
/// owns a canvas pixel.
pub fn mock_pixel(index: usize, x: i64, y: i64) -> Rgba<u8> {
    Rgba([
        (index as u8).wrapping_mul(61).wrapping_add(17),
        x.rem_euclid(256) as u8,
        y.rem_euclid(256) as u8,
        255,
    ])
}

/// In-memory backend with synthetic displays.
///
/// Each capture fills the requested rectangle with [`mock_pixel`] for the
/// display whose bounds match it exactly.  Failures can be injected per
/// display index.
#[derive(Debug, Default)]
pub struct MockBackend {
    displays: Vec<Rect>,
    fail_index: Option<usize>,
    fail_enumeration: bool,
    scale: u32,
    captures: Cell<usize>,
}

impl MockBackend {
    pub fn new(displays: Vec<Rect>) -> Self {
        Self {
            displays,
            scale: 1,
            ..Default::default()
        }
    }

    /// A single 1920x1080 display at the origin.
    pub fn single_1080p() -> Self {
        Self::new(vec![Rect::new(0, 0, 1920, 1080)])
    }

    /// A 1920x1080 primary with a 1280x1024 display to its right.
    pub fn side_by_side() -> Self {
        Self::new(vec![
            Rect::new(0, 0, 1920, 1080),
            Rect::new(1920, 0, 1280, 1024),
        ])
    }

    /// Make `capture_rect` fail for the display at `index`.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_index = Some(index);
        self
    }

    /// Make `count` fail.
    pub fn failing_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    /// Return frames `factor` times larger than requested, like a HiDPI
    /// backend reporting physical pixels for a logical rectangle.
    pub fn with_scale(mut self, factor: u32) -> Self {
        self.scale = factor.max(1);
        self
    }

    /// Number of successful `capture_rect` calls so far.
    pub fn capture_count(&self) -> usize {
        self.captures.get()
    }
}

impl DisplayBackend for MockBackend {
    fn count(&self) -> Result<usize, BackendError> {
        if self.fail_enumeration {
            return Err(BackendError::Platform("mock enumeration failure".into()));
        }
        Ok(self.displays.len())
    }

    fn bounds_of(&self, index: usize) -> Result<Rect, BackendError> {
        self.displays
            .get(index)
            .copied()
            .ok_or(BackendError::IndexOutOfRange {
                index,
                count: self.displays.len(),
            })
    }

    fn capture_rect(&self, rect: Rect) -> Result<RgbaImage, BackendError> {
        let index = self
            .displays
            .iter()
            .position(|d| *d == rect)
            .ok_or_else(|| {
                BackendError::Unsupported(format!("{rect} does not match a mock display"))
            })?;

        if self.fail_index == Some(index) {
            return Err(BackendError::Platform(format!(
                "mock capture failure on display {index}"
            )));
        }

        let scale = self.scale.max(1);
        let image = RgbaImage::from_fn(rect.width * scale, rect.height * scale, |px, py| {
            mock_pixel(
                index,
                rect.left() + i64::from(px / scale),
                rect.top() + i64::from(py / scale),
            )
        });
        self.captures.set(self.captures.get() + 1);
        Ok(image)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_enumeration() {
        let backend = MockBackend::side_by_side();
        assert_eq!(backend.count().unwrap(), 2);
        assert_eq!(backend.bounds_of(1).unwrap(), Rect::new(1920, 0, 1280, 1024));
        assert!(matches!(
            backend.bounds_of(2),
            Err(BackendError::IndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_mock_capture_matches_rect() {
        let rect = Rect::new(-4, 2, 3, 2);
        let backend = MockBackend::new(vec![rect]);
        let img = backend.capture_rect(rect).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(*img.get_pixel(0, 0), mock_pixel(0, -4, 2));
        assert_eq!(*img.get_pixel(2, 1), mock_pixel(0, -2, 3));
        assert_eq!(backend.capture_count(), 1);
    }

    #[test]
    fn test_mock_injected_failure() {
        let backend = MockBackend::side_by_side().failing_at(1);
        assert!(backend.capture_rect(Rect::new(0, 0, 1920, 1080)).is_ok());
        let err = backend
            .capture_rect(Rect::new(1920, 0, 1280, 1024))
            .unwrap_err();
        assert!(matches!(err, BackendError::Platform(_)));
        assert_eq!(backend.capture_count(), 1);
    }

    #[test]
    fn test_mock_pixels_distinct_per_display() {
        assert_ne!(mock_pixel(0, 5, 5), mock_pixel(1, 5, 5));
        assert_eq!(mock_pixel(3, -1, -1).0[1], 255);
    }

    #[test]
    fn test_mock_scaled_capture() {
        let rect = Rect::new(0, 0, 4, 3);
        let backend = MockBackend::new(vec![rect]).with_scale(2);
        let img = backend.capture_rect(rect).unwrap();
        assert_eq!(img.dimensions(), (8, 6));
    }

    #[test]
    fn test_display_serialization() {
        let d = Display {
            index: 1,
            bounds: Rect::new(1920, 0, 1280, 1024),
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"index\":1"));
        assert!(json.contains("\"width\":1280"));
    }
}
