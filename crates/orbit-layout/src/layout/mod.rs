//! Turns a dataset into concrete geometry: one radius per orbit and one angle,
//! point and marker radius per item.
//!
//! Every pixel constant below is given at the 800px reference size and scaled
//! by `min(width, height) / REFERENCE_SIZE`.

mod cache;
mod planner;

pub use cache::PlanCache;
pub use planner::plan;

use crate::geometry::{MAX_ITEM_RADIUS, MIN_ITEM_RADIUS, Point};
use crate::model::{Group, GroupId, Item, ItemKey};
use crate::ordering::SortMode;
use serde::{Deserialize, Serialize};

pub const REFERENCE_SIZE: f64 = 800.0;
pub const CENTER_RADIUS: f64 = 60.0;
pub const DIAL_GAP: f64 = 40.0; // center edge to dial ring
pub const ORBIT_GAP: f64 = 60.0; // dial ring to first orbit
pub const ORBIT_SPACING: f64 = 120.0;
pub const EDGE_PADDING: f64 = 50.0; // room left for markers on the outermost orbit
pub const DIAL_TICK_COUNT: usize = 12;
pub const DIAL_TICK_HALF_LENGTH: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub width: f64,
    pub height: f64,
    pub sort: SortMode,
    /// Confine each orbit's items to its own angular sector.
    pub group_by: bool,
    /// Buckets of group ids sharing one orbit. Empty behaves like `None`.
    pub orbit_assignment: Option<Vec<Vec<GroupId>>>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: REFERENCE_SIZE,
            height: REFERENCE_SIZE,
            sort: SortMode::None,
            group_by: false,
            orbit_assignment: None,
        }
    }
}

impl LayoutOptions {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn assignment(&self) -> Option<&[Vec<GroupId>]> {
        self.orbit_assignment
            .as_deref()
            .filter(|buckets| !buckets.is_empty())
    }
}

/// Scaled sizes for one container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub scale_factor: f64,
    pub center_radius: f64,
    pub dial_radius: f64,
    pub base_orbit_radius: f64,
    pub orbit_spacing: f64,
    pub max_available_radius: f64,
    pub min_item_radius: f64,
    pub max_item_radius: f64,
}

impl Metrics {
    pub fn new(width: f64, height: f64) -> Self {
        let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let min_dimension = clean(width).min(clean(height));
        let s = min_dimension / REFERENCE_SIZE;
        let center_radius = CENTER_RADIUS * s;
        let dial_radius = center_radius + DIAL_GAP * s;

        Self {
            scale_factor: s,
            center_radius,
            dial_radius,
            base_orbit_radius: dial_radius + ORBIT_GAP * s,
            orbit_spacing: ORBIT_SPACING * s,
            max_available_radius: min_dimension / 2.0 - EDGE_PADDING * s,
            min_item_radius: MIN_ITEM_RADIUS * s,
            max_item_radius: MAX_ITEM_RADIUS * s,
        }
    }
}

pub(crate) fn sanitize_dimension(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("Container dimension {} is not a positive number, using 0", value);
        0.0
    }
}

/// One drawn ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Orbit {
    pub index: usize,
    pub radius: f64,
    pub group_ids: Vec<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGroup {
    pub group: Group,
    pub sorted_items: Vec<Item>,
    pub radius: f64,
    pub min_value: f64,
    pub max_value: f64,
    /// Parallel to `sorted_items`.
    pub angles: Vec<f64>,
    pub points: Vec<Point>,
    pub item_radii: Vec<f64>,
    pub orbit_index: usize,
    /// Offset of this group's first item in its orbit's shared sequence.
    pub item_start_index: usize,
}

impl ResolvedGroup {
    pub fn id(&self) -> &GroupId {
        &self.group.id
    }

    pub fn position_of(&self, item: &ItemKey) -> Option<usize> {
        (item.group == self.group.id)
            .then(|| self.sorted_items.iter().position(|i| i.id == item.item))
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub width: f64,
    pub height: f64,
    pub center: Point,
    pub metrics: Metrics,
    pub orbits: Vec<Orbit>,
    pub groups: Vec<ResolvedGroup>,
}

impl RenderPlan {
    pub fn group(&self, id: &GroupId) -> Option<&ResolvedGroup> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn item(&self, key: &ItemKey) -> Option<(&Item, &ResolvedGroup)> {
        let group = self.group(&key.group)?;
        group
            .position_of(key)
            .map(|index| (&group.sorted_items[index], group))
    }

    pub fn orbit(&self, index: usize) -> Option<&Orbit> {
        self.orbits.iter().find(|o| o.index == index)
    }

    pub fn groups_in_orbit(&self, index: usize) -> impl Iterator<Item = &ResolvedGroup> {
        self.groups.iter().filter(move |g| g.orbit_index == index)
    }
}
