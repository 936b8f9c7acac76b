//! Configuration file discovery

use std::path::{Path, PathBuf};

/// Configuration file locations (in order of precedence)
pub const CONFIG_LOCATIONS: &[&str] = &[
    "./popquiz.yaml",
    "./popquiz.yml",
    "./.popquiz.yaml",
    "~/.config/popquiz/config.yaml",
];

/// Find configuration file in standard locations
pub fn find_config() -> Option<PathBuf> {
    CONFIG_LOCATIONS
        .iter()
        .map(|location| expand_path(location))
        .find(|path| path.exists())
}

/// Expand ~ to home directory
pub(crate) fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
pub(crate) fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path() {
        let path = expand_path("./test.yaml");
        assert_eq!(path, PathBuf::from("./test.yaml"));
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_path("~/.config/popquiz/config.yaml"),
                home.join(".config/popquiz/config.yaml")
            );
        }
    }

    #[test]
    fn test_is_yaml_file() {
        assert!(is_yaml_file(Path::new("a.yaml")));
        assert!(is_yaml_file(Path::new("a.yml")));
        assert!(!is_yaml_file(Path::new("a.json")));
        assert!(!is_yaml_file(Path::new("a")));
    }
}
