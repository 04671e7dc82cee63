//! Virtual screen composition.
//!
//! Turns a [`DisplayBackend`] into one [`Canvas`] covering the whole
//! virtual desktop:
//!
//! 1. Enumerate displays (`count` / `bounds_of`) into a [`Layout`].
//! 2. Fold the display rectangles into their bounding box.
//! 3. Capture every display, in index order.  Any failure aborts the run.
//! 4. Allocate the canvas and blit each frame at its offset from the
//!    canvas origin, later indices overwriting earlier ones.
//!
//! All captures complete before the first blit, so a failed capture never
//! leaves a half-composed canvas behind.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::Serialize;

use crate::backend::{CapturedFrame, Display, DisplayBackend};
use crate::errors::{BackendError, DeskshotError};
use crate::geometry::{bounding_box, Rect};

/// Canvas fill for pixels no display covers (gaps between monitors).
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Largest canvas we are willing to allocate (1 Gi pixels, 4 GiB of RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 30;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Displays from one enumeration plus their bounding box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub displays: Vec<Display>,
    pub bounds: Rect,
}

/// The composed virtual desktop.
///
/// `bounds` is the virtual desktop rectangle the image covers; the image
/// itself is a plain contiguous RGBA buffer with no notion of that origin.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub bounds: Rect,
    pub image: RgbaImage,
}

impl Canvas {
    /// Allocate a canvas for `bounds` filled with [`BACKGROUND`].
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            image: RgbaImage::from_pixel(bounds.width, bounds.height, BACKGROUND),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Copy `frame` into the canvas at its virtual desktop position.
    ///
    /// Source pixels overwrite destination pixels; there is no blending.
    /// The frame must lie entirely inside the canvas.
    pub fn blit(&mut self, frame: &CapturedFrame) -> Result<(), DeskshotError> {
        if !self.bounds.contains_rect(&frame.bounds) {
            return Err(DeskshotError::Capture {
                index: frame.index,
                source: BackendError::Unsupported(format!(
                    "frame {} lies outside canvas {}",
                    frame.bounds, self.bounds
                )),
            });
        }
        if frame.image.dimensions() != (frame.bounds.width, frame.bounds.height) {
            return Err(DeskshotError::Capture {
                index: frame.index,
                source: BackendError::Unsupported(format!(
                    "frame is {}x{} but its bounds are {}",
                    frame.image.width(),
                    frame.image.height(),
                    frame.bounds
                )),
            });
        }

        let (dx, dy) = frame.bounds.offset_from(&self.bounds);
        imageops::replace(&mut self.image, &frame.image, dx, dy);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Enumerate the backend's displays and compute their bounding box.
///
/// Zero-sized displays are skipped.  Fails with
/// [`DeskshotError::NoDisplays`] when nothing capturable remains and with
/// [`DeskshotError::DesktopTooLarge`] when the bounding box cannot be
/// allocated as one canvas.
pub fn enumerate(backend: &dyn DisplayBackend) -> Result<Layout, DeskshotError> {
    let count = backend.count().map_err(DeskshotError::Enumeration)?;
    log::debug!("{} backend reports {count} display(s)", backend.name());

    let mut displays = Vec::with_capacity(count);
    for index in 0..count {
        let bounds = backend
            .bounds_of(index)
            .map_err(DeskshotError::Enumeration)?;
        if bounds.is_empty() {
            log::warn!("skipping display {index}: zero-sized bounds {bounds}");
            continue;
        }
        displays.push(Display { index, bounds });
    }

    if displays.is_empty() {
        return Err(DeskshotError::NoDisplays);
    }

    let bounds = bounding_box(displays.iter().map(|d| &d.bounds)).ok_or_else(|| {
        DeskshotError::DesktopTooLarge("display bounds span more than u32::MAX pixels".into())
    })?;
    if bounds.area() > MAX_CANVAS_PIXELS {
        return Err(DeskshotError::DesktopTooLarge(format!(
            "{bounds} needs {} pixels; limit is {MAX_CANVAS_PIXELS}",
            bounds.area()
        )));
    }

    let layout = Layout { displays, bounds };
    if log::log_enabled!(log::Level::Debug) {
        match serde_json::to_string(&layout) {
            Ok(json) => log::debug!("virtual layout: {json}"),
            Err(e) => log::debug!("virtual layout not serializable: {e}"),
        }
    }
    Ok(layout)
}

/// Capture one display, resampling if the backend returned a different size.
pub fn capture_display(
    backend: &dyn DisplayBackend,
    display: &Display,
) -> Result<CapturedFrame, DeskshotError> {
    let bounds = display.bounds;
    let mut image = backend
        .capture_rect(bounds)
        .map_err(|source| DeskshotError::Capture {
            index: display.index,
            source,
        })?;

    if image.dimensions() != (bounds.width, bounds.height) {
        log::debug!(
            "display {} returned {}x{} for {bounds}; resampling",
            display.index,
            image.width(),
            image.height()
        );
        image = imageops::resize(&image, bounds.width, bounds.height, FilterType::Triangle);
    }

    // Screen captures are opaque; some APIs leave alpha at zero.
    for px in image.pixels_mut() {
        px.0[3] = 255;
    }

    log::debug!("captured display {} ({bounds})", display.index);
    Ok(CapturedFrame {
        index: display.index,
        bounds,
        image,
    })
}

/// Blit `frames` onto a fresh canvas covering `bounds`, in slice order.
pub fn compose(bounds: Rect, frames: &[CapturedFrame]) -> Result<Canvas, DeskshotError> {
    let mut canvas = Canvas::new(bounds);
    for frame in frames {
        canvas.blit(frame)?;
    }
    Ok(canvas)
}

/// Capture every display of `backend` into a single canvas.
///
/// The canvas covers exactly the bounding box of all displays.  Capture
/// runs sequentially in display-index order and the first failure aborts.
pub fn capture_virtual_screen(backend: &dyn DisplayBackend) -> Result<Canvas, DeskshotError> {
    let layout = enumerate(backend)?;

    let frames = layout
        .displays
        .iter()
        .map(|display| capture_display(backend, display))
        .collect::<Result<Vec<_>, _>>()?;

    let canvas = compose(layout.bounds, &frames)?;
    log::info!(
        "composed {} display(s) into {}x{} canvas at ({}, {})",
        frames.len(),
        canvas.width(),
        canvas.height(),
        canvas.bounds.x,
        canvas.bounds.y
    );
    Ok(canvas)
}
