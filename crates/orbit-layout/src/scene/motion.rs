use crate::style::AnimationConfig;
use serde::Serialize;
use std::f64::consts::TAU;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

impl Spin {
    /// Even orbits turn clockwise, odd ones the other way.
    pub fn for_orbit(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Clockwise
        } else {
            Self::CounterClockwise
        }
    }

    pub fn sign(&self) -> f64 {
        match self {
            Self::Clockwise => 1.0,
            Self::CounterClockwise => -1.0,
        }
    }
}

/// Cosmetic rotation of one orbit's markers. Purely presentational: the plan
/// geometry is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitMotion {
    pub orbit_index: usize,
    /// Seconds per revolution.
    pub period_secs: f64,
    pub spin: Spin,
    /// Set while a marker on this orbit is hovered.
    pub paused: bool,
}

impl OrbitMotion {
    pub fn new(orbit_index: usize, animation: &AnimationConfig, paused: bool) -> Option<Self> {
        let period = animation.orbit_speed_base;
        (animation.orbit_rotation && period.is_finite() && period > 0.0).then_some(Self {
            orbit_index,
            period_secs: period,
            spin: Spin::for_orbit(orbit_index),
            paused,
        })
    }

    /// Radians per second, zero while paused.
    pub fn angular_velocity(&self) -> f64 {
        if self.paused {
            0.0
        } else {
            self.spin.sign() * TAU / self.period_secs
        }
    }

    /// Offset after `elapsed_secs` of uninterrupted motion, in `[0, TAU)`.
    pub fn rotation_at(&self, elapsed_secs: f64) -> f64 {
        (self.spin.sign() * TAU * elapsed_secs / self.period_secs).rem_euclid(TAU)
    }
}

/// Accumulated rotation for a surface that drives its own clock and honors
/// pauses.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitRotation {
    pub angle: f64,
}

impl OrbitRotation {
    pub fn advance(&mut self, motion: &OrbitMotion, dt_secs: f64) -> f64 {
        self.angle = (self.angle + motion.angular_velocity() * dt_secs).rem_euclid(TAU);
        self.angle
    }
}
