// Marksync platform abstraction
// Resolves where settings and the database live on each OS.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time. Non-macOS unix targets
// follow the XDG layout.

use std::path::PathBuf;

#[cfg(all(unix, not(target_os = "macos")))]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(all(unix, not(target_os = "macos")))]
use linux as imp;

#[cfg(target_os = "macos")]
use macos as imp;

#[cfg(target_os = "windows")]
use windows as imp;

/// Returns the platform-specific configuration directory for Marksync.
///
/// - **Linux**: `~/.config/marksync` (or `$XDG_CONFIG_HOME/marksync`)
/// - **macOS**: `~/Library/Application Support/Marksync`
/// - **Windows**: `%APPDATA%/Marksync`
pub fn get_config_dir() -> PathBuf {
    imp::get_config_dir()
}

/// Returns the platform-specific data directory for Marksync.
///
/// - **Linux**: `~/.local/share/marksync` (or `$XDG_DATA_HOME/marksync`)
/// - **macOS**: `~/Library/Application Support/Marksync`
/// - **Windows**: `%APPDATA%/Marksync`
pub fn get_data_dir() -> PathBuf {
    imp::get_data_dir()
}
