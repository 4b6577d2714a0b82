//! Chart Plotter Module
//! Renders the three dashboard visualizations using egui_plot.

use chrono::{Datelike, NaiveDate};
use egui::{pos2, vec2, Align2, Color32, FontId, Rect, Sense, Stroke};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, Text, VLine};

use crate::data::LatestSnapshot;
use crate::stats::InflationTable;

/// The index base period value; bars are colored by which side of it they
/// fall on.
pub const BASE_INDEX: f64 = 100.0;

const BELOW_BASE_COLOR: Color32 = Color32::from_rgb(46, 204, 113); // Green
const ABOVE_BASE_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red
const AVERAGE_COLOR: Color32 = Color32::from_rgb(140, 140, 140);

/// Color palette for state lines
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(121, 85, 72),   // Brown
];

/// One state's line on the trend chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub state: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Draws the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn state_color(series_index: usize) -> Color32 {
        PALETTE[series_index % PALETTE.len()]
    }

    /// CPI trend: one line per selected state plus the dashed all-state
    /// average.
    pub fn draw_trend_chart(
        ui: &mut egui::Ui,
        series: &[TrendSeries],
        average: &[(NaiveDate, f64)],
    ) {
        Plot::new("cpi_trend")
            .height(320.0)
            .allow_scroll(false)
            .legend(Legend::default())
            .y_axis_label("CPI Index (Base 2010 = 100)")
            .x_axis_formatter(|mark, _range| month_label(mark.value))
            .show(ui, |plot_ui| {
                for (i, line) in series.iter().enumerate() {
                    let points: PlotPoints = line
                        .points
                        .iter()
                        .map(|&(date, value)| [plot_x(date), value])
                        .collect();
                    plot_ui.line(
                        Line::new(points)
                            .color(Self::state_color(i))
                            .width(2.0)
                            .name(&line.state),
                    );
                }

                if !average.is_empty() {
                    let points: PlotPoints = average
                        .iter()
                        .map(|&(date, value)| [plot_x(date), value])
                        .collect();
                    plot_ui.line(
                        Line::new(points)
                            .color(AVERAGE_COLOR)
                            .width(1.5)
                            .style(LineStyle::dashed_loose())
                            .name("All-State Average"),
                    );
                }
            });
    }

    /// Latest-period comparison: horizontal bars per category, reference
    /// line at the base index, value annotation next to each bar.
    pub fn draw_latest_bar_chart(ui: &mut egui::Ui, snapshot: &LatestSnapshot) {
        if snapshot.is_empty() {
            return;
        }

        let labels: Vec<String> = snapshot.rows.iter().map(|r| r.category.clone()).collect();

        let bars: Vec<Bar> = snapshot
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let color = if row.index < BASE_INDEX {
                    BELOW_BASE_COLOR
                } else {
                    ABOVE_BASE_COLOR
                };
                Bar::new(i as f64, row.index).width(0.6).fill(color)
            })
            .collect();

        Plot::new("latest_by_category")
            .height(360.0)
            .allow_scroll(false)
            .x_axis_label("CPI Index")
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 0.25 && idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal());
                plot_ui.vline(
                    VLine::new(BASE_INDEX)
                        .color(Color32::DARK_GRAY)
                        .style(LineStyle::dashed_dense()),
                );
                for (i, row) in snapshot.rows.iter().enumerate() {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(row.index + 0.5, i as f64),
                            format!("{:.1}", row.index),
                        )
                        .anchor(Align2::LEFT_CENTER),
                    );
                }
            });
    }

    /// Annotated category-by-year heatmap with a diverging scale centered
    /// at zero.
    pub fn draw_heatmap(ui: &mut egui::Ui, table: &InflationTable) {
        if table.is_empty() {
            return;
        }

        let categories = table.categories();
        let years = table.years();
        let (min, max) = table.value_bounds().unwrap_or((0.0, 0.0));
        let limit = min.abs().max(max.abs()).max(0.1);

        let label_width = 250.0_f32;
        let cell_h = 26.0_f32;
        let cell_w =
            ((ui.available_width() - label_width - 10.0) / years.len() as f32).clamp(34.0, 90.0);
        let grid_w = cell_w * years.len() as f32;
        let height = cell_h * categories.len() as f32 + 24.0;

        let (response, painter) =
            ui.allocate_painter(vec2(label_width + grid_w + 10.0, height), Sense::hover());
        let origin = response.rect.left_top();
        let text_color = ui.visuals().text_color();

        for (row, category) in categories.iter().enumerate() {
            let row_y = origin.y + row as f32 * cell_h;
            painter.text(
                pos2(origin.x + label_width - 8.0, row_y + cell_h / 2.0),
                Align2::RIGHT_CENTER,
                category,
                FontId::proportional(11.0),
                text_color,
            );

            for (col, year) in years.iter().enumerate() {
                let rect = Rect::from_min_size(
                    pos2(origin.x + label_width + col as f32 * cell_w, row_y),
                    vec2(cell_w, cell_h),
                )
                .shrink(1.0);

                match table.cell(category, *year) {
                    Some(value) => {
                        painter.rect_filled(rect, 2.0, diverging_color(value, limit));
                        painter.text(
                            rect.center(),
                            Align2::CENTER_CENTER,
                            format!("{:.1}", value),
                            FontId::proportional(10.0),
                            Color32::BLACK,
                        );
                    }
                    None => {
                        // No observation for this pair; the cell stays blank.
                        painter.rect_stroke(
                            rect,
                            2.0,
                            Stroke::new(0.5, ui.visuals().weak_text_color()),
                        );
                    }
                }
            }
        }

        for (col, year) in years.iter().enumerate() {
            painter.text(
                pos2(
                    origin.x + label_width + col as f32 * cell_w + cell_w / 2.0,
                    origin.y + categories.len() as f32 * cell_h + 12.0,
                ),
                Align2::CENTER_CENTER,
                year.to_string(),
                FontId::proportional(11.0),
                text_color,
            );
        }
    }
}

fn plot_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn month_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_default()
}

/// White at zero, saturating toward red for positive values and green for
/// negative ones, scaled by the table's largest magnitude.
fn diverging_color(value: f64, limit: f64) -> Color32 {
    let t = (value / limit).clamp(-1.0, 1.0) as f32;
    let target = if t >= 0.0 {
        ABOVE_BASE_COLOR
    } else {
        BELOW_BASE_COLOR
    };
    let t = t.abs();
    let channel = |base: u8, to: u8| (base as f32 + (to as f32 - base as f32) * t) as u8;
    Color32::from_rgb(
        channel(255, target.r()),
        channel(255, target.g()),
        channel(255, target.b()),
    )
}
