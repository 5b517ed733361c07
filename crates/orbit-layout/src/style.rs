use crate::model::GroupId;
use crate::theme::{Color, ThemeColors};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::collections::HashMap;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemShape {
    #[default]
    Circle,
    Square,
    Diamond,
}

/// How item markers fade in when a dataset is first drawn.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DataLoadedAnimation {
    /// Staggered by item index within its orbit.
    #[default]
    Sides,
    /// Staggered outward by orbit index.
    Center,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitPathStyle {
    pub show: bool,
    pub stroke_width: f64,
    /// SVG dash pattern; `"none"` draws a solid ring.
    pub stroke_dasharray: String,
    pub opacity: f64,
    pub hover_stroke_width: f64,
    pub hover_opacity: f64,
}

impl Default for OrbitPathStyle {
    fn default() -> Self {
        Self {
            show: true,
            stroke_width: 2.0,
            stroke_dasharray: "5,5".to_string(),
            opacity: 0.7,
            hover_stroke_width: 3.0,
            hover_opacity: 0.9,
        }
    }
}

impl OrbitPathStyle {
    pub fn dash_pattern(&self) -> Option<Vec<f64>> {
        let pattern = self.stroke_dasharray.trim();
        if pattern.is_empty() || pattern.eq_ignore_ascii_case("none") {
            return None;
        }
        let dashes: Vec<f64> = pattern
            .split([',', ' '])
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        (!dashes.is_empty()).then_some(dashes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub orbit_rotation: bool,
    /// Seconds per full revolution.
    pub orbit_speed_base: f64,
    pub hover_scale: f64,
    /// Groups whose orbits rotate. `None` rotates every orbit, an empty list
    /// none.
    pub orbits: Option<Vec<GroupId>>,
    pub data_loaded: DataLoadedAnimation,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            orbit_rotation: true,
            orbit_speed_base: 60.0,
            hover_scale: 1.1,
            orbits: None,
            data_loaded: DataLoadedAnimation::Sides,
        }
    }
}

impl AnimationConfig {
    pub fn animates(&self, group: &GroupId) -> bool {
        self.orbit_rotation
            && self
                .orbits
                .as_ref()
                .is_none_or(|ids| ids.iter().any(|id| id == group))
    }
}

/// Presentation options layered on top of a render plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    pub orbit_paths: OrbitPathStyle,
    pub animation: AnimationConfig,
    pub colors: ThemeColors,
    pub group_colors: HashMap<GroupId, Color>,
    pub item_shape: ItemShape,
}

impl StyleOptions {
    /// Ring color falling back from `group_colors` to the group's own color
    /// and then the theme.
    pub fn ring_color(&self, group: &GroupId, own: Option<Color>) -> Color {
        self.group_colors
            .get(group)
            .copied()
            .or(own)
            .unwrap_or(self.colors.ring)
    }
}
