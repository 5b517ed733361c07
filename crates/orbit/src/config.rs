use directories::ProjectDirs;
use orbit_layout::GroupId;
use orbit_layout::LayoutOptions;
use orbit_layout::style::{AnimationConfig, ItemShape, OrbitPathStyle, StyleOptions};
use orbit_layout::theme::{Color, ThemeColors};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutOptions,
    pub orbit_paths: OrbitPathStyle,
    pub animation: AnimationConfig,
    pub colors: ThemeColors,
    pub group_colors: HashMap<GroupId, Color>,
    pub item_shape: ItemShape,
}

impl Config {
    pub fn style(&self) -> StyleOptions {
        StyleOptions {
            orbit_paths: self.orbit_paths.clone(),
            animation: self.animation.clone(),
            colors: self.colors.clone(),
            group_colors: self.group_colors.clone(),
            item_shape: self.item_shape,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "orbit", "orbit").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn defaults() -> config::ConfigBuilder<config::builder::DefaultState> {
    config::Config::builder().add_source(config::File::from_str(
        DEFAULT_CONFIG,
        config::FileFormat::Toml,
    ))
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("ORBIT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Layers the bundled defaults, the user config, `extra` and `ORBIT_*`
/// environment variables, later sources winning.
pub fn load_config(extra: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = defaults();

    match get_config_path() {
        Ok(path) => builder = builder.add_source(config::File::from(path).required(false)),
        Err(e) => log::debug!("Skipping user config: {}", e),
    }
    if let Some(path) = extra {
        builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
    }

    let s = builder.add_source(environment()).build()?;
    Ok(s.try_deserialize()?)
}

/// Parses a TOML document on top of the bundled defaults.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let s = defaults()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;
    Ok(s.try_deserialize()?)
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_layout::SortMode;
    use orbit_layout::style::DataLoadedAnimation;

    #[test]
    fn test_bundled_defaults_match_code_defaults() {
        let config = parse_config("").unwrap();
        let expected = Config::default();

        assert_eq!(config.layout, expected.layout);
        assert_eq!(config.orbit_paths, expected.orbit_paths);
        assert_eq!(config.animation, expected.animation);
        assert_eq!(config.item_shape, expected.item_shape);
        assert!(config.group_colors.is_empty());

        let colors = |c: &ThemeColors| {
            [
                c.background,
                c.ring,
                c.center,
                c.tooltip,
                c.item,
                c.item_stroke,
                c.dial,
                c.dial_selected,
                c.text,
            ]
            .map(|color| color.to_string())
        };
        assert_eq!(colors(&config.colors), colors(&expected.colors));
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r##"
            item_shape = "Diamond"

            [layout]
            width = 1200
            sort = "value"
            orbit_assignment = [["finance", "stack"], ["shadow"]]

            [animation]
            data_loaded = "center"
            orbits = ["finance"]

            [group_colors]
            finance = "#10b981"
            "##,
        )
        .unwrap();

        assert_eq!(config.item_shape, ItemShape::Diamond);
        assert_eq!(config.layout.width, 1200.0);
        assert_eq!(config.layout.height, 800.0);
        assert_eq!(config.layout.sort, SortMode::Value);
        assert_eq!(config.layout.assignment().map(|b| b.len()), Some(2));
        assert_eq!(config.animation.data_loaded, DataLoadedAnimation::Center);
        assert!(config.animation.orbit_rotation);
        assert_eq!(config.orbit_paths.stroke_dasharray, "5,5");

        let style = config.style();
        let green: Color = "#10b981".parse().unwrap();
        assert_eq!(style.ring_color(&GroupId::new("finance"), None), green);
        assert!(style.animation.animates(&GroupId::new("finance")));
        assert!(!style.animation.animates(&GroupId::new("stack")));
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let result = parse_config(
            r#"
            [colors]
            ring = "not-a-color"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Config(_))));
    }
}
