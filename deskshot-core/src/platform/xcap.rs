//! Cross-platform backend built on the `xcap` crate (Linux X11/Wayland, macOS).
//!
//! `xcap` exposes monitors individually, so a capture request is served by
//! the monitor containing it: a whole-monitor rectangle uses
//! `capture_image`, a sub-rectangle uses `capture_region` with
//! monitor-relative coordinates.  Requests spanning several monitors are
//! unsupported, which never happens for per-display capture.

use image::RgbaImage;
use xcap::Monitor;

use crate::backend::DisplayBackend;
use crate::errors::BackendError;
use crate::geometry::Rect;

struct XcapMonitor {
    bounds: Rect,
    monitor: Monitor,
}

/// `xcap` implementation of [`DisplayBackend`].
pub struct XcapBackend {
    monitors: Vec<XcapMonitor>,
}

fn platform_err(context: &str, err: impl std::fmt::Display) -> BackendError {
    BackendError::Platform(format!("{context}: {err}"))
}

impl XcapBackend {
    /// Snapshot the current monitor layout.
    pub fn new() -> Result<Self, BackendError> {
        let all = Monitor::all().map_err(|e| platform_err("Monitor::all failed", e))?;

        let mut monitors = Vec::with_capacity(all.len());
        for monitor in all {
            let bounds = Rect::new(
                monitor.x().map_err(|e| platform_err("monitor x", e))?,
                monitor.y().map_err(|e| platform_err("monitor y", e))?,
                monitor.width().map_err(|e| platform_err("monitor width", e))?,
                monitor.height().map_err(|e| platform_err("monitor height", e))?,
            );
            monitors.push(XcapMonitor { bounds, monitor });
        }

        log::debug!("xcap found {} monitor(s)", monitors.len());
        Ok(Self { monitors })
    }
}

impl DisplayBackend for XcapBackend {
    fn count(&self) -> Result<usize, BackendError> {
        Ok(self.monitors.len())
    }

    fn bounds_of(&self, index: usize) -> Result<Rect, BackendError> {
        self.monitors
            .get(index)
            .map(|m| m.bounds)
            .ok_or(BackendError::IndexOutOfRange {
                index,
                count: self.monitors.len(),
            })
    }

    fn capture_rect(&self, rect: Rect) -> Result<RgbaImage, BackendError> {
        let owner = self
            .monitors
            .iter()
            .find(|m| m.bounds.contains_rect(&rect))
            .ok_or_else(|| {
                BackendError::Unsupported(format!("{rect} is not inside a single monitor"))
            })?;

        let shot = if owner.bounds == rect {
            owner
                .monitor
                .capture_image()
                .map_err(|e| platform_err("capture_image failed", e))?
        } else {
            let (dx, dy) = rect.offset_from(&owner.bounds);
            owner
                .monitor
                .capture_region(dx as u32, dy as u32, rect.width, rect.height)
                .map_err(|e| platform_err("capture_region failed", e))?
        };

        // Rebuild through raw bytes so the buffer type is ours regardless of
        // which `image` release xcap links against.
        let (width, height) = shot.dimensions();
        RgbaImage::from_raw(width, height, shot.into_raw()).ok_or_else(|| {
            BackendError::Platform("xcap returned a truncated pixel buffer".into())
        })
    }

    fn name(&self) -> &'static str {
        "xcap"
    }
}
