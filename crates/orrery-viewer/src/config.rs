use std::path::PathBuf;

use orrery_engine::culling::CullingKind;
use orrery_engine::scene::LateralMode;
use orrery_engine::DEFAULT_ASSET_DIR;

/// Viewer settings: defaults overridden by `ORRERY_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub asset_dir: PathBuf,
    pub culling: CullingKind,
    pub post_process: bool,
    pub lateral: LateralMode,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "orrery".to_string(),
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            culling: CullingKind::Device,
            post_process: false,
            lateral: LateralMode::Mirrored,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from a variable lookup. Invalid values are logged
    /// and leave the default in place.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("ORRERY_ASSETS").filter(|d| !d.trim().is_empty()) {
            config.asset_dir = PathBuf::from(dir);
        }

        if let Some(value) = lookup("ORRERY_CULLING") {
            match value.parse() {
                Ok(kind) => config.culling = kind,
                Err(e) => log::warn!("ORRERY_CULLING ignored: {e}"),
            }
        }

        if let Some(value) = lookup("ORRERY_POST") {
            match parse_flag(&value) {
                Some(on) => config.post_process = on,
                None => log::warn!("ORRERY_POST ignored: `{value}` is not a boolean"),
            }
        }

        if let Some(value) = lookup("ORRERY_LATERAL") {
            match value.parse() {
                Ok(mode) => config.lateral = mode,
                Err(e) => log::warn!("ORRERY_LATERAL ignored: {e}"),
            }
        }

        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ViewerConfig {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ViewerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        assert_eq!(config(&[]), ViewerConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let c = config(&[
            ("ORRERY_ASSETS", "/tmp/assets"),
            ("ORRERY_CULLING", "host"),
            ("ORRERY_POST", "1"),
            ("ORRERY_LATERAL", "fixed"),
        ]);
        assert_eq!(c.asset_dir, PathBuf::from("/tmp/assets"));
        assert_eq!(c.culling, CullingKind::Host);
        assert!(c.post_process);
        assert_eq!(c.lateral, LateralMode::Fixed);
    }

    #[test]
    fn invalid_values_fall_back() {
        let c = config(&[
            ("ORRERY_ASSETS", "  "),
            ("ORRERY_CULLING", "quantum"),
            ("ORRERY_POST", "maybe"),
            ("ORRERY_LATERAL", "diagonal"),
        ]);
        assert_eq!(c, ViewerConfig::default());
    }
}
