use chrono::NaiveDate;
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::parse_iso_date;

/// Fallback bar colors, picked by lane index when a phase has none.
pub const PHASE_COLORS: &[Color32] = &[
    Color32::from_rgb(66, 133, 244),
    Color32::from_rgb(52, 168, 83),
    Color32::from_rgb(171, 71, 188),
    Color32::from_rgb(251, 140, 0),
    Color32::from_rgb(3, 169, 244),
    Color32::from_rgb(229, 57, 53),
    Color32::from_rgb(0, 188, 212),
    Color32::from_rgb(255, 193, 7),
];

/// One plan phase as supplied by the host. Read-only to the engine.
///
/// Dates stay in their ISO string form: the host does not validate them, and
/// a phase whose dates do not parse simply has no bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// `#RRGGBB` or `#RRGGBBAA`.
    #[serde(default)]
    pub color: Option<String>,
}

impl Phase {
    /// A phase with no dates yet: its lane is empty but selectable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date: None,
            end_date: None,
            color: None,
        }
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.set_dates(start, end);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn set_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start_date = Some(start.format("%Y-%m-%d").to_string());
        self.end_date = Some(end.format("%Y-%m-%d").to_string());
    }

    /// Inclusive date range, if both dates are present, parse, and are ordered.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = parse_iso_date(self.start_date.as_deref()?).ok()?;
        let end = parse_iso_date(self.end_date.as_deref()?).ok()?;
        (start <= end).then_some((start, end))
    }

    /// Bar color: the phase's own if it parses, otherwise a palette entry.
    pub fn color_or_palette(&self, lane_index: usize) -> Color32 {
        self.color
            .as_deref()
            .and_then(|c| parse_hex_color(c).ok())
            .unwrap_or(PHASE_COLORS[lane_index % PHASE_COLORS.len()])
    }
}

pub fn parse_hex_color(s: &str) -> Result<Color32, String> {
    let s = s.trim().trim_start_matches('#');
    let channel = |i: usize| {
        s.get(i..i + 2)
            .ok_or_else(|| format!("Invalid hex color '{}'", s))
            .and_then(|c| u8::from_str_radix(c, 16).map_err(|e| e.to_string()))
    };
    match s.len() {
        6 => Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Ok(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => Err(format!("Invalid hex color '{}': expected 6 or 8 hex digits", s)),
    }
}
