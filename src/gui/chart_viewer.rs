//! Chart Viewer Widget
//! Central scrollable panel with the three dashboard charts and their
//! per-chart state selectors.

use chrono::NaiveDate;
use egui::{Color32, ComboBox, RichText, ScrollArea};

use crate::charts::{ChartPlotter, TrendSeries};
use crate::data::{
    division_rows, heatmap_rows, latest_snapshot, resolve_division, trend_rows, Dataset,
    LatestSnapshot,
};
use crate::gui::control_panel::FilterSettings;
use crate::stats::{annual_inflation_table, average_series, InflationTable};

/// Default state for the heatmap selector.
const DEFAULT_HEATMAP_STATE: &str = "Selangor";

/// Everything the derived charts depend on. The viewer recomputes only when
/// this changes.
#[derive(Debug, Clone, PartialEq)]
struct ChartInputs {
    states: Vec<String>,
    category: String,
    from: NaiveDate,
    to: NaiveDate,
    compare_state: String,
    heatmap_state: String,
}

/// Derived chart data for one set of inputs.
#[derive(Debug, Clone)]
struct ChartBundle {
    series: Vec<TrendSeries>,
    average: Vec<(NaiveDate, f64)>,
    snapshot: LatestSnapshot,
    heatmap: InflationTable,
}

fn build_bundle(dataset: &Dataset, inputs: &ChartInputs) -> ChartBundle {
    let division = resolve_division(&dataset.categories, &inputs.category);

    let rows = trend_rows(
        &dataset.cpi,
        &inputs.states,
        &division,
        inputs.from,
        inputs.to,
    );
    let series = inputs
        .states
        .iter()
        .map(|state| {
            let mut points: Vec<(NaiveDate, f64)> = rows
                .iter()
                .filter(|r| &r.state == state)
                .map(|r| (r.date, r.index))
                .collect();
            points.sort_by_key(|&(date, _)| date);
            TrendSeries {
                state: state.clone(),
                points,
            }
        })
        .collect();

    // The average deliberately spans every state, not just the selection.
    let average = average_series(&division_rows(
        &dataset.cpi,
        &division,
        inputs.from,
        inputs.to,
    ));

    let snapshot = latest_snapshot(&dataset.cpi, &inputs.compare_state);
    let heatmap = annual_inflation_table(&heatmap_rows(&dataset.inflation, &inputs.heatmap_state));

    ChartBundle {
        series,
        average,
        snapshot,
        heatmap,
    }
}

/// Scrollable chart display area.
pub struct ChartViewer {
    compare_state: String,
    heatmap_state: String,
    cached: Option<(ChartInputs, ChartBundle)>,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            compare_state: String::new(),
            heatmap_state: String::new(),
            cached: None,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop cached chart data, e.g. after a new dataset arrives.
    pub fn clear(&mut self) {
        self.cached = None;
    }

    /// Draw all three chart sections.
    pub fn show(&mut self, ui: &mut egui::Ui, dataset: &Dataset, settings: &FilterSettings) {
        let Some((from, to)) = date_range(dataset, settings) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No data").size(20.0));
            });
            return;
        };

        // Compare options follow the selection; with nothing selected every
        // state is offered.
        let compare_options: Vec<String> = if settings.selected_states.is_empty() {
            dataset.states().to_vec()
        } else {
            settings.selected_states.clone()
        };
        if !compare_options.contains(&self.compare_state) {
            self.compare_state = compare_options.first().cloned().unwrap_or_default();
        }
        if !dataset.states().contains(&self.heatmap_state) {
            self.heatmap_state = if dataset.states().iter().any(|s| s == DEFAULT_HEATMAP_STATE) {
                DEFAULT_HEATMAP_STATE.to_string()
            } else {
                dataset.states().first().cloned().unwrap_or_default()
            };
        }

        let inputs = ChartInputs {
            states: settings.selected_states.clone(),
            category: settings.category.clone(),
            from,
            to,
            compare_state: self.compare_state.clone(),
            heatmap_state: self.heatmap_state.clone(),
        };
        let bundle = match &self.cached {
            Some((cached_inputs, bundle)) if cached_inputs == &inputs => bundle.clone(),
            _ => {
                let bundle = build_bundle(dataset, &inputs);
                self.cached = Some((inputs.clone(), bundle.clone()));
                bundle
            }
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.trend_section(ui, &inputs, &bundle);
                ui.add_space(20.0);
                ui.separator();
                ui.add_space(10.0);
                self.latest_section(ui, &compare_options, &bundle);
                ui.add_space(20.0);
                ui.separator();
                ui.add_space(10.0);
                self.heatmap_section(ui, dataset.states(), &bundle);
                ui.add_space(20.0);
            });
    }

    fn trend_section(&self, ui: &mut egui::Ui, inputs: &ChartInputs, bundle: &ChartBundle) {
        ui.label(
            RichText::new(format!("CPI Trend — {}", inputs.category))
                .size(18.0)
                .strong(),
        );
        ui.add_space(8.0);

        let no_lines = bundle.series.iter().all(|s| s.points.is_empty());
        if no_lines && bundle.average.is_empty() {
            Self::no_data_label(ui);
        } else {
            ChartPlotter::draw_trend_chart(ui, &bundle.series, &bundle.average);
        }
    }

    fn latest_section(&mut self, ui: &mut egui::Ui, options: &[String], bundle: &ChartBundle) {
        ui.label(
            RichText::new("Latest CPI by Spending Category")
                .size(18.0)
                .strong(),
        );
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label("Compare state:");
            ComboBox::from_id_salt("compare_state")
                .width(200.0)
                .selected_text(&self.compare_state)
                .show_ui(ui, |ui| {
                    for state in options {
                        if ui
                            .selectable_label(self.compare_state == *state, state)
                            .clicked()
                        {
                            self.compare_state = state.clone();
                        }
                    }
                });
        });
        ui.add_space(5.0);

        match bundle.snapshot.date {
            Some(date) => {
                ui.label(
                    RichText::new(format!(
                        "{} — {}",
                        self.compare_state,
                        date.format("%B %Y")
                    ))
                    .size(13.0)
                    .color(Color32::GRAY),
                );
                ChartPlotter::draw_latest_bar_chart(ui, &bundle.snapshot);
            }
            None => Self::no_data_label(ui),
        }
    }

    fn heatmap_section(&mut self, ui: &mut egui::Ui, states: &[String], bundle: &ChartBundle) {
        ui.label(
            RichText::new("Year-on-Year Inflation Heatmap")
                .size(18.0)
                .strong(),
        );
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label("Select state for heatmap:");
            ComboBox::from_id_salt("heatmap_state")
                .width(200.0)
                .selected_text(&self.heatmap_state)
                .show_ui(ui, |ui| {
                    for state in states {
                        if ui
                            .selectable_label(self.heatmap_state == *state, state)
                            .clicked()
                        {
                            self.heatmap_state = state.clone();
                        }
                    }
                });
        });
        ui.add_space(5.0);

        if bundle.heatmap.is_empty() {
            Self::no_data_label(ui);
        } else {
            ui.label(
                RichText::new(format!(
                    "Average YoY Inflation (%) — {}",
                    self.heatmap_state
                ))
                .size(13.0)
                .color(Color32::GRAY),
            );
            ui.add_space(5.0);
            ChartPlotter::draw_heatmap(ui, &bundle.heatmap);
        }
    }

    fn no_data_label(ui: &mut egui::Ui) {
        ui.label(
            RichText::new("No data for the current selection")
                .size(14.0)
                .color(Color32::GRAY),
        );
    }
}

fn date_range(dataset: &Dataset, settings: &FilterSettings) -> Option<(NaiveDate, NaiveDate)> {
    let months = dataset.months();
    let from = *months.get(settings.range.0)?;
    let to = *months.get(settings.range.1)?;
    Some((from, to))
}
