use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::features::TaskKey;
use crate::models::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Rgba { r, g, b, a }
    }

    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f64,
}

const TASK_STROKE: Rgba = Rgba::new(0, 0, 0, 0.5);

const fn task_style(fill: Rgba) -> Style {
    Style {
        fill,
        stroke: TASK_STROKE,
        stroke_width: 1.0,
    }
}

/// Precomputed styles keyed by task status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleTable {
    styles: HashMap<TaskStatus, Style>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default task map colors, one per known status.
    pub fn task_defaults() -> Self {
        let mut table = StyleTable::new();
        for status in TaskStatus::KNOWN {
            let fill = match status {
                TaskStatus::Ready => Rgba::new(255, 255, 255, 0.3),
                TaskStatus::LockedForMapping => Rgba::new(0, 128, 153, 0.5),
                TaskStatus::Mapped => Rgba::new(173, 230, 239, 0.8),
                TaskStatus::LockedForValidation => Rgba::new(252, 236, 164, 0.8),
                TaskStatus::Validated => Rgba::new(64, 172, 140, 0.8),
                TaskStatus::Invalidated => Rgba::new(215, 63, 62, 0.8),
                TaskStatus::Bad => Rgba::new(216, 218, 228, 0.8),
                TaskStatus::Split => Rgba::new(112, 67, 23, 0.8),
                TaskStatus::Archived | TaskStatus::Unknown(_) => Rgba::new(128, 128, 128, 0.4),
            };
            table.insert(status, task_style(fill));
        }
        table
    }

    pub fn insert(&mut self, status: TaskStatus, style: Style) -> Option<Style> {
        self.styles.insert(status, style)
    }

    pub fn get(&self, status: &TaskStatus) -> Option<&Style> {
        self.styles.get(status)
    }

    /// Style for a feature, looked up by its status alone. A miss is logged
    /// and leaves the host to draw its fallback.
    pub fn style_for(&self, key: &TaskKey) -> Option<&Style> {
        let style = self.styles.get(&key.status);
        if style.is_none() {
            tracing::warn!(task_id = key.id, status = %key.status, "No style for task status");
        }
        style
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Entries in the order of [`TaskStatus::KNOWN`], then any extra statuses by label.
    pub fn entries(&self) -> Vec<(&TaskStatus, &Style)> {
        let mut entries: Vec<_> = self.styles.iter().collect();
        entries.sort_by_key(|(status, _)| {
            let rank = TaskStatus::KNOWN
                .iter()
                .position(|known| known == *status)
                .unwrap_or(TaskStatus::KNOWN.len());
            (rank, status.as_str().to_string())
        });
        entries
    }
}
