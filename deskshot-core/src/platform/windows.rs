//! Windows backend: GDI monitor enumeration and `BitBlt` capture.
//!
//! Monitors are enumerated once with `EnumDisplayMonitors` /
//! `GetMonitorInfoW` when the backend is built.  Capturing a rectangle
//! copies it out of the screen DC, whose coordinate space is the virtual
//! desktop (monitors left of or above the primary have negative origins),
//! into a top-down 32-bit DIB.
//!
//! The process is marked DPI-aware before enumeration so monitor
//! rectangles and `BitBlt` coordinates are in physical pixels rather than
//! the scaled values Windows hands to unaware processes.
//!
//! `BitBlt` runs with `CAPTUREBLT` so layered windows such as tooltips and
//! translucent overlays are part of the image.

use image::RgbaImage;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject,
    EnumDisplayMonitors, GetDC, GetDIBits, GetMonitorInfoW, ReleaseDC, SelectObject, BITMAPINFO,
    BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HDC, HMONITOR, MONITORINFO, ROP_CODE,
    CAPTUREBLT, SRCCOPY,
};
use windows::Win32::UI::WindowsAndMessaging::SetProcessDPIAware;

use crate::backend::DisplayBackend;
use crate::errors::BackendError;
use crate::geometry::Rect;

/// Raster operation for screen copies: plain copy, including layered windows.
pub const CAPTURE_ROP: ROP_CODE = ROP_CODE(SRCCOPY.0 | CAPTUREBLT.0);

/// GDI implementation of [`DisplayBackend`].
pub struct GdiBackend {
    monitors: Vec<Rect>,
}

impl GdiBackend {
    /// Snapshot the current monitor layout.
    pub fn new() -> Result<Self, BackendError> {
        // SAFETY: no preconditions; failure only means we were already aware.
        if !unsafe { SetProcessDPIAware() }.as_bool() {
            log::debug!("SetProcessDPIAware failed; coordinates may be DPI-virtualized");
        }

        let mut monitors: Vec<Rect> = Vec::new();

        // SAFETY: `monitor_enum_proc` has the MONITORENUMPROC signature and
        // `lparam` points at `monitors`, which outlives this synchronous call.
        // A null HDC enumerates every monitor on the virtual desktop.
        let ok = unsafe {
            EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(monitor_enum_proc),
                LPARAM(&mut monitors as *mut Vec<Rect> as isize),
            )
        };
        if !ok.as_bool() {
            return Err(BackendError::Platform("EnumDisplayMonitors failed".into()));
        }

        log::debug!("EnumDisplayMonitors found {} monitor(s)", monitors.len());
        Ok(Self { monitors })
    }
}

/// Win32 monitor enumeration callback.
///
/// # Safety
///
/// Called by Win32 inside `EnumDisplayMonitors`.  `lparam` must point at a
/// live `Vec<Rect>` for the duration of the enumeration.
unsafe extern "system" fn monitor_enum_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let monitors = unsafe { &mut *(lparam.0 as *mut Vec<Rect>) };

    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };

    if unsafe { GetMonitorInfoW(hmonitor, &mut info) }.as_bool() {
        let rc = info.rcMonitor;
        match Rect::from_edges(
            i64::from(rc.left),
            i64::from(rc.top),
            i64::from(rc.right),
            i64::from(rc.bottom),
        ) {
            Some(rect) => monitors.push(rect),
            None => log::warn!(
                "ignoring monitor with invalid rect ({}, {}, {}, {})",
                rc.left,
                rc.top,
                rc.right,
                rc.bottom
            ),
        }
    } else {
        log::warn!("GetMonitorInfoW failed for one monitor; it will not be captured");
    }

    BOOL(1) // continue enumeration
}

impl DisplayBackend for GdiBackend {
    fn count(&self) -> Result<usize, BackendError> {
        Ok(self.monitors.len())
    }

    fn bounds_of(&self, index: usize) -> Result<Rect, BackendError> {
        self.monitors
            .get(index)
            .copied()
            .ok_or(BackendError::IndexOutOfRange {
                index,
                count: self.monitors.len(),
            })
    }

    fn capture_rect(&self, rect: Rect) -> Result<RgbaImage, BackendError> {
        let bgra = capture_gdi(rect)?;

        // GDI hands back BGRA; the image crate wants RGBA.
        let rgba: Vec<u8> = bgra
            .chunks_exact(4)
            .flat_map(|px| [px[2], px[1], px[0], 255])
            .collect();

        RgbaImage::from_raw(rect.width, rect.height, rgba).ok_or_else(|| {
            BackendError::Platform("GetDIBits returned a buffer of the wrong size".into())
        })
    }

    fn name(&self) -> &'static str {
        "gdi"
    }
}

/// Copy `rect` of the virtual desktop into a BGRA buffer via GDI `BitBlt`.
fn capture_gdi(rect: Rect) -> Result<Vec<u8>, BackendError> {
    let (width, height) = match (i32::try_from(rect.width), i32::try_from(rect.height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(BackendError::Unsupported(format!(
                "cannot BitBlt a {rect} rectangle"
            )))
        }
    };

    unsafe {
        let screen_dc = GetDC(HWND(std::ptr::null_mut()));
        if screen_dc.is_invalid() {
            return Err(BackendError::Platform("GetDC(NULL) failed".into()));
        }

        let result = (|| -> Result<Vec<u8>, BackendError> {
            let mem_dc = CreateCompatibleDC(screen_dc);
            if mem_dc.is_invalid() {
                return Err(BackendError::Platform("CreateCompatibleDC failed".into()));
            }
            let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
            if bitmap.is_invalid() {
                let _ = DeleteDC(mem_dc);
                return Err(BackendError::Platform("CreateCompatibleBitmap failed".into()));
            }

            let old_bitmap = SelectObject(mem_dc, bitmap);

            // Source coordinates are virtual desktop coordinates.
            let blit = BitBlt(
                mem_dc, 0, 0, width, height, screen_dc, rect.x, rect.y, CAPTURE_ROP,
            );
            if let Err(e) = blit {
                SelectObject(mem_dc, old_bitmap);
                let _ = DeleteObject(bitmap);
                let _ = DeleteDC(mem_dc);
                return Err(BackendError::Platform(format!("BitBlt failed: {e}")));
            }

            let mut pixels = vec![0u8; rect.area() as usize * 4];

            let mut bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    // Negative height = top-down rows.
                    biHeight: -height,
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                bmiColors: [Default::default()],
            };

            // Deselect before GetDIBits; a selected bitmap may not be read.
            SelectObject(mem_dc, old_bitmap);

            let lines = GetDIBits(
                mem_dc,
                bitmap,
                0,
                rect.height,
                Some(pixels.as_mut_ptr() as *mut _),
                &mut bmi,
                DIB_RGB_COLORS,
            );

            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);

            if lines != height {
                return Err(BackendError::Platform(format!(
                    "GetDIBits copied {lines} of {height} rows"
                )));
            }

            Ok(pixels)
        })();

        ReleaseDC(HWND(std::ptr::null_mut()), screen_dc);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs against the real desktop; CI machines without an interactive
    /// session report zero monitors, which is still a valid snapshot.
    #[test]
    fn test_gdi_backend_enumerates() {
        let backend = GdiBackend::new().expect("EnumDisplayMonitors");
        let count = backend.count().unwrap();
        for index in 0..count {
            assert!(!backend.bounds_of(index).unwrap().is_empty());
        }
        assert!(backend.bounds_of(count).is_err());
    }

    #[test]
    fn test_capture_rop_includes_layered_windows() {
        assert_eq!(CAPTURE_ROP.0 & SRCCOPY.0, SRCCOPY.0);
        assert_eq!(CAPTURE_ROP.0 & CAPTUREBLT.0, CAPTUREBLT.0);
    }

    #[test]
    fn test_gdi_rejects_empty_rect() {
        assert!(matches!(
            capture_gdi(Rect::new(0, 0, 0, 10)),
            Err(BackendError::Unsupported(_))
        ));
    }
}
