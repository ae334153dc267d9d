//! Presentation helpers: shrink profile, dodge jitter, reveal timing
//!
//! Nothing here feeds back into the controller. Renderers call these with
//! values read from `ControllerOutput`.

use std::time::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::DodgeVector;
use crate::{
    AFFIRM_GROWTH_FACTOR, BUTTONS_DELAY_MS, FADE_SCALE_FLOOR, FIRST_REVEAL_DELAY_MS,
    REVEAL_DELAY_MS,
};

/// Button scales after a number of declines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShrinkProfile {
    /// Decline button scale, 1.0 → 0.0
    pub decline_scale: f64,
    /// Decline button opacity
    pub decline_opacity: f64,
    /// Affirm button scale, grows as the decline button shrinks
    pub affirm_scale: f64,
}

impl ShrinkProfile {
    /// Linear decay to zero at `threshold`
    pub fn for_count(count: u32, threshold: u32) -> Self {
        let scale = if threshold == 0 {
            0.0
        } else {
            1.0 - (count.min(threshold) as f64 / threshold as f64)
        };
        Self::from_scale(scale)
    }

    /// Profile for an explicit decline scale
    pub fn from_scale(scale: f64) -> Self {
        let scale = scale.clamp(0.0, 1.0);
        let opacity = if scale > FADE_SCALE_FLOOR {
            1.0
        } else {
            scale / FADE_SCALE_FLOOR
        };
        Self {
            decline_scale: scale,
            decline_opacity: opacity,
            affirm_scale: 1.0 + (1.0 - scale) * AFFIRM_GROWTH_FACTOR,
        }
    }
}

/// Half-extents of the box the decline button may move in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub half_width: i32,
    pub half_height: i32,
}

impl Bounds {
    pub fn new(half_width: i32, half_height: i32) -> Self {
        Self {
            half_width: half_width.max(0),
            half_height: half_height.max(0),
        }
    }

    /// Pull a point back inside the box
    pub fn clamp(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x.clamp(-self.half_width, self.half_width),
            y.clamp(-self.half_height, self.half_height),
        )
    }
}

/// Deterministic dodge plus up to `spread` pixels of noise, kept inside `bounds`
pub fn jitter<R: Rng + ?Sized>(dodge: DodgeVector, spread: i32, bounds: Bounds, rng: &mut R) -> DodgeVector {
    let spread = spread.max(0);
    let dx = rng.gen_range(-spread..=spread);
    let dy = rng.gen_range(-spread..=spread);
    let (x, y) = bounds.clamp(dodge.x.saturating_add(dx), dodge.y.saturating_add(dy));
    DodgeVector::new(x, y, dodge.rotation)
}

/// How long to wait before showing message `stage`
pub fn reveal_delay(stage: usize) -> Duration {
    if stage == 0 {
        Duration::from_millis(FIRST_REVEAL_DELAY_MS)
    } else {
        Duration::from_millis(REVEAL_DELAY_MS)
    }
}

/// How long to wait after the question before showing buttons
pub fn buttons_delay() -> Duration {
    Duration::from_millis(BUTTONS_DELAY_MS)
}
