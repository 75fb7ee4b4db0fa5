//! BMI scale chart model.
//!
//! Describes the threshold bar shown next to a result: colored bands for the
//! region's table on a fixed 10 to 45 axis, plus a marker at the computed BMI.
//! Frontends receive it as JSON; the CLI draws it as a line of text.

use serde::Serialize;

use crate::domain::Category;
use crate::thresholds::ThresholdTable;

/// Lower end of the chart axis (BMI).
pub const AXIS_MIN: f64 = 10.0;

/// Upper end of the chart axis (BMI).
pub const AXIS_MAX: f64 = 45.0;

/// A colored band clipped to the chart axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSegment {
    pub from: f64,
    pub to: f64,
    pub category: Category,
    pub color: &'static str,
}

/// Renderable BMI chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BmiChart {
    pub axis_min: f64,
    pub axis_max: f64,
    pub segments: Vec<ChartSegment>,
    /// BMI marker, clamped into the axis.
    pub marker: f64,
}

/// Fill color for a category.
pub fn category_color(category: Category) -> &'static str {
    match category {
        Category::Underweight => "#5dade2",
        Category::Normal => "#58d68d",
        Category::Overweight => "#f5b041",
        Category::Obese => "#ec7063",
        Category::Unknown => "#aab7b8",
    }
}

fn category_glyph(category: Category) -> char {
    match category {
        Category::Underweight => '-',
        Category::Normal => '=',
        Category::Overweight => '+',
        Category::Obese => '#',
        Category::Unknown => '?',
    }
}

impl BmiChart {
    /// Builds the chart for a table and a BMI value.
    pub fn build(table: &ThresholdTable, bmi: f64) -> Self {
        let segments = table
            .bands()
            .iter()
            .filter_map(|band| {
                let from = band.low.max(AXIS_MIN);
                let to = band.high.unwrap_or(AXIS_MAX).min(AXIS_MAX);
                (to > from).then(|| ChartSegment {
                    from,
                    to,
                    category: band.category,
                    color: category_color(band.category),
                })
            })
            .collect();

        Self {
            axis_min: AXIS_MIN,
            axis_max: AXIS_MAX,
            segments,
            marker: bmi.clamp(AXIS_MIN, AXIS_MAX),
        }
    }

    /// Draws the chart as a single line of `width` characters, one glyph per
    /// category and `|` at the marker.
    pub fn render_text(&self, width: usize) -> String {
        if width == 0 {
            return String::new();
        }

        let span = self.axis_max - self.axis_min;
        let column_of = |value: f64| {
            let fraction = (value - self.axis_min) / span;
            ((fraction * width as f64) as usize).min(width - 1)
        };

        let mut cells = vec![' '; width];
        for segment in &self.segments {
            let glyph = category_glyph(segment.category);
            let start = column_of(segment.from);
            let end = if segment.to >= self.axis_max {
                width
            } else {
                column_of(segment.to)
            };
            for cell in cells.iter_mut().take(end).skip(start) {
                *cell = glyph;
            }
        }
        cells[column_of(self.marker)] = '|';

        cells.into_iter().collect()
    }

    /// Text legend matching [`render_text`](Self::render_text).
    pub fn legend(&self) -> String {
        self.segments
            .iter()
            .map(|s| {
                format!(
                    "{} {} ({:.1}-{:.1})",
                    category_glyph(s.category),
                    s.category,
                    s.from,
                    s.to
                )
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}
