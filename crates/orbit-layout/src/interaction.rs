//! Hover, selection and tooltip state driven by pointer events.
//!
//! Tooltip precedence: the most recently entered target that is still hovered
//! owns the tooltip. Leaving an item falls back to the hovered group's tooltip
//! and leaving a group falls back to the hovered item's, otherwise the tooltip
//! hides.

use crate::geometry::{Point, angle_difference};
use crate::layout::{DIAL_TICK_COUNT, DIAL_TICK_HALF_LENGTH, RenderPlan};
use crate::model::{Group, GroupId, Item, ItemKey};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;

pub const TOOLTIP_OFFSET: f64 = 15.0;
pub const META_PREVIEW_LEN: usize = 3;
pub const RING_HIT_WIDTH: f64 = 8.0; // either side of the ring, at reference size

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HitTarget {
    Group(GroupId),
    Item(ItemKey),
    Dial(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipContent {
    Group {
        label: String,
        item_count: usize,
    },
    Item {
        label: String,
        value: f64,
        meta: Vec<(String, String)>,
    },
}

impl TooltipContent {
    fn for_group(group: &Group) -> Self {
        Self::Group {
            label: group.label.clone(),
            item_count: group.items.len(),
        }
    }

    fn for_item(item: &Item) -> Self {
        let meta = item
            .meta
            .iter()
            .take(META_PREVIEW_LEN)
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();
        Self::Item {
            label: item.label.clone(),
            value: item.value,
            meta,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Group { label, .. } | Self::Item { label, .. } => label,
        }
    }

    /// Secondary lines under the title.
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::Group { item_count, .. } => vec![format!("{item_count} items")],
            Self::Item { value, meta, .. } => std::iter::once(format!("Value: {value}"))
                .chain(meta.iter().map(|(k, v)| format!("{k}: {v}")))
                .collect(),
        }
    }
}

impl fmt::Display for TooltipContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())?;
        for line in self.details() {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tooltip {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub content: Option<TooltipContent>,
}

impl Tooltip {
    fn at(pointer: Point, content: TooltipContent) -> Self {
        Self {
            visible: true,
            x: pointer.x + TOOLTIP_OFFSET,
            y: pointer.y + TOOLTIP_OFFSET,
            content: Some(content),
        }
    }

    fn hidden() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrbitEvent {
    GroupEnter { group: GroupId, pointer: Point },
    GroupLeave,
    ItemEnter { item: ItemKey, pointer: Point },
    ItemLeave,
    DialEnter(usize),
    DialLeave,
    GroupClick(GroupId),
    ItemClick(ItemKey),
    DialClick(usize),
}

/// Receives selections. Nothing is tracked for groups and items; keeping a
/// selection is up to the implementor.
pub trait SelectionHandler {
    fn on_group_select(&mut self, _group: &Group) {}
    fn on_item_select(&mut self, _item: &Item, _group: &Group) {}
    fn on_dial_select(&mut self, _index: usize) {}
}

impl SelectionHandler for () {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionOutcome {
    pub should_redraw: bool,
}

impl InteractionOutcome {
    fn redraw(should_redraw: bool) -> Self {
        Self { should_redraw }
    }

    fn merge(self, other: Self) -> Self {
        Self::redraw(self.should_redraw || other.should_redraw)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    hovered_group: Option<GroupId>,
    hovered_item: Option<ItemKey>,
    hovered_dial: Option<usize>,
    selected_dial: Option<usize>,
    tooltip: Tooltip,
    group_tooltip: Option<Tooltip>,
    item_tooltip: Option<Tooltip>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered_group(&self) -> Option<&GroupId> {
        self.hovered_group.as_ref()
    }

    pub fn hovered_item(&self) -> Option<&ItemKey> {
        self.hovered_item.as_ref()
    }

    pub fn hovered_dial(&self) -> Option<usize> {
        self.hovered_dial
    }

    pub fn selected_dial(&self) -> Option<usize> {
        self.selected_dial
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn handle(
        &mut self,
        event: OrbitEvent,
        plan: &RenderPlan,
        handler: &mut impl SelectionHandler,
    ) -> InteractionOutcome {
        match event {
            OrbitEvent::GroupEnter { group, pointer } => {
                let Some(resolved) = plan.group(&group) else {
                    return InteractionOutcome::default();
                };
                let tip = Tooltip::at(pointer, TooltipContent::for_group(&resolved.group));
                self.hovered_group = Some(group);
                self.group_tooltip = Some(tip.clone());
                self.tooltip = tip;
                InteractionOutcome::redraw(true)
            }
            OrbitEvent::ItemEnter { item, pointer } => {
                let Some((resolved, _)) = plan.item(&item) else {
                    return InteractionOutcome::default();
                };
                let tip = Tooltip::at(pointer, TooltipContent::for_item(resolved));
                self.hovered_item = Some(item);
                self.item_tooltip = Some(tip.clone());
                self.tooltip = tip;
                InteractionOutcome::redraw(true)
            }
            OrbitEvent::GroupLeave => {
                let changed = self.hovered_group.take().is_some();
                self.group_tooltip = None;
                self.tooltip = self.item_tooltip.clone().unwrap_or_else(Tooltip::hidden);
                InteractionOutcome::redraw(changed)
            }
            OrbitEvent::ItemLeave => {
                let changed = self.hovered_item.take().is_some();
                self.item_tooltip = None;
                self.tooltip = self.group_tooltip.clone().unwrap_or_else(Tooltip::hidden);
                InteractionOutcome::redraw(changed)
            }
            OrbitEvent::DialEnter(index) => {
                let index = index % DIAL_TICK_COUNT;
                let changed = self.hovered_dial != Some(index);
                self.hovered_dial = Some(index);
                InteractionOutcome::redraw(changed)
            }
            OrbitEvent::DialLeave => InteractionOutcome::redraw(self.hovered_dial.take().is_some()),
            OrbitEvent::GroupClick(group) => {
                if let Some(resolved) = plan.group(&group) {
                    handler.on_group_select(&resolved.group);
                }
                InteractionOutcome::default()
            }
            OrbitEvent::ItemClick(item) => {
                if let Some((resolved, group)) = plan.item(&item) {
                    handler.on_item_select(resolved, &group.group);
                }
                InteractionOutcome::default()
            }
            OrbitEvent::DialClick(index) => {
                let index = index % DIAL_TICK_COUNT;
                self.selected_dial = Some(index);
                handler.on_dial_select(index);
                InteractionOutcome::redraw(true)
            }
        }
    }

    fn current_target(&self) -> Option<HitTarget> {
        self.hovered_item
            .clone()
            .map(HitTarget::Item)
            .or_else(|| self.hovered_group.clone().map(HitTarget::Group))
            .or_else(|| self.hovered_dial.map(HitTarget::Dial))
    }

    /// Translates a pointer position into leave/enter events for whatever
    /// target lies under it.
    pub fn pointer_move(
        &mut self,
        plan: &RenderPlan,
        pointer: Point,
        handler: &mut impl SelectionHandler,
    ) -> InteractionOutcome {
        let target = hit_test(plan, pointer);
        if target == self.current_target() {
            return InteractionOutcome::default();
        }

        let mut outcome = InteractionOutcome::default();
        for leave in [OrbitEvent::ItemLeave, OrbitEvent::GroupLeave, OrbitEvent::DialLeave] {
            outcome = outcome.merge(self.handle(leave, plan, handler));
        }

        let enter = match target {
            Some(HitTarget::Item(item)) => OrbitEvent::ItemEnter { item, pointer },
            Some(HitTarget::Group(group)) => OrbitEvent::GroupEnter { group, pointer },
            Some(HitTarget::Dial(index)) => OrbitEvent::DialEnter(index),
            None => return outcome,
        };
        outcome.merge(self.handle(enter, plan, handler))
    }

    pub fn pointer_click(
        &mut self,
        plan: &RenderPlan,
        pointer: Point,
        handler: &mut impl SelectionHandler,
    ) -> InteractionOutcome {
        let click = match hit_test(plan, pointer) {
            Some(HitTarget::Item(item)) => OrbitEvent::ItemClick(item),
            Some(HitTarget::Group(group)) => OrbitEvent::GroupClick(group),
            Some(HitTarget::Dial(index)) => OrbitEvent::DialClick(index),
            None => return InteractionOutcome::default(),
        };
        self.handle(click, plan, handler)
    }
}

/// Angle of dial tick `index`, with tick 0 at the top.
pub fn dial_tick_angle(index: usize) -> f64 {
    index as f64 * TAU / DIAL_TICK_COUNT as f64 - FRAC_PI_2
}

/// Finds the target under `pointer`: item markers first, then dial ticks,
/// then ring bands.
pub fn hit_test(plan: &RenderPlan, pointer: Point) -> Option<HitTarget> {
    hit_item(plan, pointer)
        .or_else(|| hit_dial(plan, pointer))
        .or_else(|| hit_ring(plan, pointer))
}

fn hit_item(plan: &RenderPlan, pointer: Point) -> Option<HitTarget> {
    // later markers are drawn on top
    plan.groups.iter().rev().find_map(|group| {
        group
            .sorted_items
            .iter()
            .zip(&group.points)
            .zip(&group.item_radii)
            .rev()
            .find(|((_, point), radius)| pointer.distance(**point) <= **radius)
            .map(|((item, _), _)| HitTarget::Item(ItemKey::new(group.id().clone(), item.id.clone())))
    })
}

fn hit_dial(plan: &RenderPlan, pointer: Point) -> Option<HitTarget> {
    let m = &plan.metrics;
    let half = DIAL_TICK_HALF_LENGTH * m.scale_factor;
    let dist = pointer.distance(plan.center);
    if half <= 0.0 || (dist - m.dial_radius).abs() > half {
        return None;
    }

    let angle = pointer.angle_from(plan.center);
    (0..DIAL_TICK_COUNT)
        .min_by(|&a, &b| {
            angle_difference(angle, dial_tick_angle(a))
                .total_cmp(&angle_difference(angle, dial_tick_angle(b)))
        })
        .map(HitTarget::Dial)
}

fn hit_ring(plan: &RenderPlan, pointer: Point) -> Option<HitTarget> {
    let tolerance = RING_HIT_WIDTH * plan.metrics.scale_factor;
    let dist = pointer.distance(plan.center);
    plan.orbits
        .iter()
        .map(|orbit| (orbit, (dist - orbit.radius).abs()))
        .filter(|(_, gap)| *gap <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .and_then(|(orbit, _)| orbit.group_ids.first().cloned())
        .map(HitTarget::Group)
}
