//! Data-only draw list. `compose` merges a plan with interaction state and
//! style options; a `Surface` binds the descriptors to concrete primitives.

pub mod motion;
pub mod svg;

pub use motion::{OrbitMotion, OrbitRotation, Spin};
pub use svg::SvgSurface;

use crate::geometry::{Point, polar_to_cartesian};
use crate::interaction::{HitTarget, InteractionState, dial_tick_angle};
use crate::layout::{DIAL_TICK_COUNT, DIAL_TICK_HALF_LENGTH, RenderPlan, ResolvedGroup};
use crate::model::{Center, GroupId, ItemId, ItemKey};
use crate::style::{DataLoadedAnimation, ItemShape, StyleOptions};
use crate::theme::Color;

pub const FADE_IN_SECS: f64 = 0.5;
pub const FADE_STEP_SECS: f64 = 0.05;
pub const ORBIT_FADE_STEP_SECS: f64 = 0.15;
pub const IDLE_ITEM_OPACITY: f64 = 0.85;
pub const CENTER_STROKE_WIDTH: f64 = 3.0;
pub const ITEM_STROKE_WIDTH: f64 = 2.0;
pub const DIAL_STROKE_WIDTH: f64 = 2.0;
pub const DIAL_SELECTED_STROKE_WIDTH: f64 = 3.0;
pub const CENTER_LABEL_SIZE: f64 = 16.0;
pub const CENTER_SUBTITLE_SIZE: f64 = 10.0;
pub const CENTER_SUBTITLE_OFFSET: f64 = 20.0;
pub const ITEM_LABEL_SIZE: f64 = 11.0;
pub const ITEM_LABEL_GAP: f64 = 15.0;
pub const ICON_FILL: f64 = 0.55; // icon half-size relative to marker radius

#[derive(Debug, Clone, PartialEq)]
pub struct RingDescriptor {
    pub orbit_index: usize,
    pub center: Point,
    pub radius: f64,
    pub stroke: Color,
    pub stroke_width: f64,
    pub opacity: f64,
    pub dash: Option<Vec<f64>>,
    pub hovered: bool,
    pub target: HitTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialTick {
    pub index: usize,
    pub angle: f64,
    pub inner: Point,
    pub outer: Point,
    pub color: Color,
    pub width: f64,
    pub selected: bool,
    pub target: HitTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CenterDescriptor {
    pub position: Point,
    pub radius: f64,
    pub fill: Color,
    pub text: Color,
    pub label: String,
    pub label_size: f64,
    pub subtitle: Option<String>,
    pub subtitle_size: f64,
    pub subtitle_offset: f64,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeIn {
    pub delay_secs: f64,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDescriptor {
    pub key: ItemKey,
    pub label: String,
    pub value: f64,
    pub position: Point,
    /// Unscaled marker radius; multiply by `scale` when drawing.
    pub radius: f64,
    pub angle: f64,
    pub scale: f64,
    pub hovered: bool,
    pub group_hovered: bool,
    /// Position in the orbit's shared item sequence.
    pub item_index: usize,
    pub orbit_index: usize,
    pub shape: ItemShape,
    pub fill: Color,
    pub stroke: Color,
    pub opacity: f64,
    pub glow: bool,
    pub icon_url: Option<String>,
    pub fade_in: FadeIn,
    /// Label drawn under the marker while hovered.
    pub label_visible: bool,
    pub label_offset: f64,
    pub label_size: f64,
    pub target: HitTarget,
}

impl ItemDescriptor {
    pub fn drawn_radius(&self) -> f64 {
        self.radius * self.scale
    }

    /// Top-left corner and side of the icon box centered on the marker.
    pub fn icon_box(&self) -> (Point, f64) {
        let half = self.radius * ICON_FILL;
        (self.position.offset(-half, -half), half * 2.0)
    }
}

/// Markers sharing one orbit, rotated together.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitLayer {
    pub orbit_index: usize,
    pub motion: Option<OrbitMotion>,
    pub items: Vec<ItemDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipDescriptor {
    pub position: Point,
    pub title: String,
    pub lines: Vec<String>,
    pub background: Color,
    pub text: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub background: Color,
    pub center: CenterDescriptor,
    pub rings: Vec<RingDescriptor>,
    pub dial_ticks: Vec<DialTick>,
    pub layers: Vec<OrbitLayer>,
    pub tooltip: Option<TooltipDescriptor>,
}

impl Scene {
    pub fn items(&self) -> impl Iterator<Item = &ItemDescriptor> {
        self.layers.iter().flat_map(|layer| layer.items.iter())
    }
}

pub fn compose(
    plan: &RenderPlan,
    interaction: &InteractionState,
    style: &StyleOptions,
    center: &Center,
) -> Scene {
    let composer = Composer {
        plan,
        interaction,
        style,
    };

    Scene {
        width: plan.width,
        height: plan.height,
        background: style.colors.background,
        center: composer.center(center),
        rings: composer.rings(),
        dial_ticks: composer.dial_ticks(),
        layers: composer.layers(),
        tooltip: composer.tooltip(),
    }
}

struct Composer<'a> {
    plan: &'a RenderPlan,
    interaction: &'a InteractionState,
    style: &'a StyleOptions,
}

impl Composer<'_> {
    fn scale(&self) -> f64 {
        self.plan.metrics.scale_factor
    }

    fn is_group_hovered(&self, id: &GroupId) -> bool {
        self.interaction.hovered_group() == Some(id)
    }

    fn is_item_hovered(&self, group: &GroupId, item: &ItemId) -> bool {
        self.interaction
            .hovered_item()
            .is_some_and(|key| &key.group == group && &key.item == item)
    }

    fn rings(&self) -> Vec<RingDescriptor> {
        let paths = &self.style.orbit_paths;
        if !paths.show {
            return Vec::new();
        }

        self.plan
            .orbits
            .iter()
            .filter_map(|orbit| {
                let first = orbit.group_ids.first()?;
                let hovered = orbit.group_ids.iter().any(|id| self.is_group_hovered(id));
                Some(RingDescriptor {
                    orbit_index: orbit.index,
                    center: self.plan.center,
                    radius: orbit.radius,
                    stroke: self
                        .style
                        .ring_color(first, self.plan.group(first).and_then(|g| g.group.color)),
                    stroke_width: if hovered {
                        paths.hover_stroke_width
                    } else {
                        paths.stroke_width
                    },
                    opacity: if hovered {
                        paths.hover_opacity
                    } else {
                        paths.opacity
                    },
                    dash: paths.dash_pattern(),
                    hovered,
                    target: HitTarget::Group(first.clone()),
                })
            })
            .collect()
    }

    fn dial_ticks(&self) -> Vec<DialTick> {
        let c = self.plan.center;
        let dial = self.plan.metrics.dial_radius;
        let half = DIAL_TICK_HALF_LENGTH * self.scale();
        let colors = &self.style.colors;

        (0..DIAL_TICK_COUNT)
            .map(|index| {
                let angle = dial_tick_angle(index);
                let selected = self.interaction.selected_dial() == Some(index);
                let lit = selected || self.interaction.hovered_dial() == Some(index);
                DialTick {
                    index,
                    angle,
                    inner: polar_to_cartesian(c.x, c.y, dial - half, angle),
                    outer: polar_to_cartesian(c.x, c.y, dial + half, angle),
                    color: if lit { colors.dial_selected } else { colors.dial },
                    width: if selected {
                        DIAL_SELECTED_STROKE_WIDTH
                    } else {
                        DIAL_STROKE_WIDTH
                    },
                    selected,
                    target: HitTarget::Dial(index),
                }
            })
            .collect()
    }

    fn center(&self, center: &Center) -> CenterDescriptor {
        let s = self.scale();
        CenterDescriptor {
            position: self.plan.center,
            radius: self.plan.metrics.center_radius,
            fill: self.style.colors.center,
            text: self.style.colors.text,
            label: center.label.clone(),
            label_size: CENTER_LABEL_SIZE * s,
            subtitle: center.subtitle.clone(),
            subtitle_size: CENTER_SUBTITLE_SIZE * s,
            subtitle_offset: CENTER_SUBTITLE_OFFSET * s,
            avatar_url: center.avatar_url.clone(),
        }
    }

    fn layers(&self) -> Vec<OrbitLayer> {
        let mut layers: Vec<OrbitLayer> = Vec::new();
        for group in &self.plan.groups {
            let items = self.items(group);
            match layers.iter_mut().find(|l| l.orbit_index == group.orbit_index) {
                Some(layer) => layer.items.extend(items),
                None => layers.push(OrbitLayer {
                    orbit_index: group.orbit_index,
                    motion: None,
                    items,
                }),
            }
        }

        let animation = &self.style.animation;
        for layer in &mut layers {
            let animated = self
                .plan
                .groups_in_orbit(layer.orbit_index)
                .any(|g| animation.animates(g.id()));
            let paused = layer.items.iter().any(|item| item.hovered);
            layer.motion = animated
                .then(|| OrbitMotion::new(layer.orbit_index, animation, paused))
                .flatten();
        }
        layers
    }

    fn fade_in(&self, item_index: usize, orbit_index: usize) -> FadeIn {
        let delay = match self.style.animation.data_loaded {
            DataLoadedAnimation::Sides => item_index as f64 * FADE_STEP_SECS,
            DataLoadedAnimation::Center => orbit_index as f64 * ORBIT_FADE_STEP_SECS,
            DataLoadedAnimation::None => {
                return FadeIn {
                    delay_secs: 0.0,
                    duration_secs: 0.0,
                };
            }
        };
        FadeIn {
            delay_secs: delay,
            duration_secs: FADE_IN_SECS,
        }
    }

    fn items(&self, group: &ResolvedGroup) -> Vec<ItemDescriptor> {
        let s = self.scale();
        let hover_scale = match self.style.animation.hover_scale {
            v if v.is_finite() && v > 0.0 => v,
            _ => 1.1,
        };
        let group_hovered = self.is_group_hovered(group.id());

        group
            .sorted_items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let orbit_item_index = group.item_start_index + index;
                let hovered = self.is_item_hovered(group.id(), &item.id);
                let radius = group.item_radii[index];
                let key = ItemKey::new(group.id().clone(), item.id.clone());
                ItemDescriptor {
                    target: HitTarget::Item(key.clone()),
                    key,
                    label: item.label.clone(),
                    value: item.value,
                    position: group.points[index],
                    radius,
                    angle: group.angles[index],
                    scale: if hovered || group_hovered {
                        hover_scale
                    } else {
                        1.0
                    },
                    hovered,
                    group_hovered,
                    item_index: orbit_item_index,
                    orbit_index: group.orbit_index,
                    shape: self.style.item_shape,
                    fill: item
                        .color
                        .or(group.group.color)
                        .unwrap_or(self.style.colors.item),
                    stroke: self.style.colors.item_stroke,
                    opacity: if hovered { 1.0 } else { IDLE_ITEM_OPACITY },
                    glow: item.glow,
                    icon_url: item.icon_url.clone(),
                    fade_in: self.fade_in(orbit_item_index, group.orbit_index),
                    label_visible: hovered,
                    label_offset: radius + ITEM_LABEL_GAP * s,
                    label_size: ITEM_LABEL_SIZE * s,
                }
            })
            .collect()
    }

    fn tooltip(&self) -> Option<TooltipDescriptor> {
        let tip = self.interaction.tooltip();
        let content = tip.content.as_ref().filter(|_| tip.visible)?;
        Some(TooltipDescriptor {
            position: Point::new(tip.x, tip.y),
            title: content.title().to_string(),
            lines: content.details(),
            background: self.style.colors.tooltip,
            text: self.style.colors.text,
        })
    }
}

/// A drawing backend. `paint` calls these in back-to-front order.
pub trait Surface {
    type Error;

    fn begin(&mut self, _scene: &Scene) -> Result<(), Self::Error> {
        Ok(())
    }
    fn ring(&mut self, ring: &RingDescriptor) -> Result<(), Self::Error>;
    fn dial_tick(&mut self, tick: &DialTick) -> Result<(), Self::Error>;
    fn center(&mut self, center: &CenterDescriptor) -> Result<(), Self::Error>;
    fn begin_layer(&mut self, _layer: &OrbitLayer, _center: Point) -> Result<(), Self::Error> {
        Ok(())
    }
    fn item(&mut self, item: &ItemDescriptor) -> Result<(), Self::Error>;
    fn end_layer(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn tooltip(&mut self, tooltip: &TooltipDescriptor) -> Result<(), Self::Error>;
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub fn paint<S: Surface>(scene: &Scene, surface: &mut S) -> Result<(), S::Error> {
    surface.begin(scene)?;
    for ring in &scene.rings {
        surface.ring(ring)?;
    }
    for tick in &scene.dial_ticks {
        surface.dial_tick(tick)?;
    }
    surface.center(&scene.center)?;
    for layer in &scene.layers {
        surface.begin_layer(layer, scene.center.position)?;
        for item in &layer.items {
            surface.item(item)?;
        }
        surface.end_layer()?;
    }
    if let Some(tooltip) = &scene.tooltip {
        surface.tooltip(tooltip)?;
    }
    surface.finish()
}
