//! Locate the game's Client.txt across common install layouts.

use std::path::PathBuf;

const WINDOWS_ROOTS: &[&str] = &[
    r"C:\Program Files (x86)\Steam\steamapps\common\Path of Exile 2",
    r"C:\Program Files\Steam\steamapps\common\Path of Exile 2",
    r"D:\SteamLibrary\steamapps\common\Path of Exile 2",
    r"C:\Program Files (x86)\Grinding Gear Games\Path of Exile 2",
    r"C:\Program Files\Grinding Gear Games\Path of Exile 2",
];

// Joined onto the home directory.
const HOME_ROOTS: &[&str] = &[
    ".steam/steam/steamapps/common/Path of Exile 2",
    ".local/share/Steam/steamapps/common/Path of Exile 2",
    ".local/share/Path of Exile 2",
];

/// First existing `logs/Client.txt` among the candidate install roots,
/// Steam locations first.
pub fn find_client_log() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = WINDOWS_ROOTS.iter().map(PathBuf::from).collect();
    if let Some(home) = dirs::home_dir() {
        candidates.extend(HOME_ROOTS.iter().map(|p| home.join(p)));
    }

    for root in candidates {
        let log = root.join("logs").join("Client.txt");
        if log.exists() {
            tracing::info!("[DISCOVER] found client log at {}", log.display());
            return Some(log);
        }
    }

    tracing::warn!("[DISCOVER] no Path of Exile 2 installation found in known locations");
    None
}
