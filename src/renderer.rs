// src/renderer.rs

//! Bar-chart layout for snapshots.
//!
//! The renderer turns a `Snapshot` into one `Bar` per element: a height as a
//! percentage of the chart, a role derived from the annotations, and the color
//! for that role. Drawing the bars is left to the consumer.
//!
//! Bar width depends only on the element count, so each `BarChart` remembers
//! the layout it computed for every count it has seen.

use crate::color::{self, Rgb};
use crate::state::Snapshot;
use log::trace;
use serde::Serialize;
use std::collections::HashMap;

/// Horizontal space shared by all bars and the gaps between them.
pub const TOTAL_WIDTH_PX: i64 = 2000;
pub const TOTAL_HEIGHT_PX: u32 = 200;
/// Corner radius, and gap between bars, when there is room for it.
pub const MAX_BORDER_RADIUS: i64 = 16;
/// Heights are relative to at least this value.
const MIN_HEIGHT_SCALE: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarRole {
    Default,
    /// Inside the partition range and not above the pivot value.
    Lesser,
    /// Inside the partition range and above the pivot value.
    Greater,
    Pivot,
    /// One of the pair currently being exchanged.
    Swapping,
    /// One of the pair currently being compared.
    Highlighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bar {
    /// Percentage of `TOTAL_HEIGHT_PX`, in `0..=100`.
    pub height_percent: u32,
    pub role: BarRole,
    pub color: Rgb,
}

/// Width of each bar and the corner radius, which doubles as the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BarLayout {
    pub width_px: i64,
    pub border_radius_px: i64,
}

impl BarLayout {
    /// Halves the radius until a bar is wider than its two rounded corners.
    pub fn compute(count: usize) -> Self {
        let count = count as i64;
        let mut border_radius_px = MAX_BORDER_RADIUS;
        let mut width_px = border_radius_px * 2;
        while width_px <= border_radius_px * 2 {
            border_radius_px /= 2;
            width_px = ((TOTAL_WIDTH_PX - border_radius_px * (count + 2)) / count.max(1)).max(1);
        }
        BarLayout {
            width_px,
            border_radius_px,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub layout: BarLayout,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Default)]
pub struct BarChart {
    layouts: HashMap<usize, BarLayout>,
}

impl BarChart {
    pub fn new() -> Self {
        BarChart::default()
    }

    pub fn layout(&mut self, count: usize) -> BarLayout {
        *self.layouts.entry(count).or_insert_with(|| {
            let layout = BarLayout::compute(count);
            trace!("BarChart: layout for {} bars is {:?}", count, layout);
            layout
        })
    }

    /// Number of element counts with a remembered layout.
    pub fn cached_layouts(&self) -> usize {
        self.layouts.len()
    }

    pub fn chart(&mut self, snapshot: &Snapshot) -> Chart {
        Chart {
            layout: self.layout(snapshot.values.len()),
            bars: bars(snapshot),
        }
    }
}

/// Classifies every element of `snapshot`.
pub fn bars(snapshot: &Snapshot) -> Vec<Bar> {
    let scale = snapshot
        .values
        .iter()
        .copied()
        .max()
        .unwrap_or(MIN_HEIGHT_SCALE)
        .max(MIN_HEIGHT_SCALE) as f64;
    let pivot_value = snapshot
        .pivot_index
        .and_then(|pv| snapshot.values.get(pv).copied());

    snapshot
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let height_percent = ((v.max(0) as f64 / scale) * 100.0) as u32;
            let (role, color) = role_of(snapshot, i, v, pivot_value);
            Bar {
                height_percent,
                role,
                color,
            }
        })
        .collect()
}

fn role_of(snapshot: &Snapshot, i: usize, v: i32, pivot_value: Option<i32>) -> (BarRole, Rgb) {
    let mut base = (BarRole::Default, color::DEFAULT);
    if snapshot.is_partitioning {
        let in_range = i >= snapshot.range_lo && i < snapshot.range_hi;
        match pivot_value {
            Some(pivot) if in_range && pivot < v => base = (BarRole::Greater, color::GREATER),
            Some(_) if in_range => base = (BarRole::Lesser, color::LESSER),
            Some(_) if snapshot.pivot_index == Some(i) => base = (BarRole::Pivot, color::PIVOT),
            _ => {}
        }
    }

    if snapshot.swap_a == Some(i) || snapshot.swap_b == Some(i) {
        if snapshot.is_swapping {
            return (BarRole::Swapping, color::SWAPPING);
        }
        let tinted = base.1.lerp(color::HIGHLIGHT, color::HIGHLIGHT_STRENGTH);
        return (BarRole::Highlighted, tinted);
    }
    base
}
