//! Platform-specific [`DisplayBackend`](crate::backend::DisplayBackend)
//! implementations.
//!
//! | Module    | OS                | API used                                        |
//! |-----------|-------------------|-------------------------------------------------|
//! | `windows` | Windows           | `EnumDisplayMonitors` + GDI `BitBlt`            |
//! | `xcap`    | Linux, macOS, BSD | `xcap::Monitor` (X11 / Wayland portal / CoreGraphics) |
//!
//! The right one is re-exported as [`NativeBackend`] so callers never
//! branch on the target OS.

#[cfg(windows)]
pub mod windows;

#[cfg(windows)]
pub use self::windows::GdiBackend as NativeBackend;

#[cfg(not(windows))]
pub mod xcap;

#[cfg(not(windows))]
pub use self::xcap::XcapBackend as NativeBackend;
