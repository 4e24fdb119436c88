// Marksync platform paths for Linux and other XDG systems
// Config: ~/.config/marksync
// Data:   ~/.local/share/marksync

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("marksync"),
        _ => fallback
            .iter()
            .fold(home_dir(), |p, part| p.join(part))
            .join("marksync"),
    }
}

/// Uses `$XDG_CONFIG_HOME/marksync` if set, otherwise `~/.config/marksync`.
pub fn get_config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

/// Uses `$XDG_DATA_HOME/marksync` if set, otherwise `~/.local/share/marksync`.
pub fn get_data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}
