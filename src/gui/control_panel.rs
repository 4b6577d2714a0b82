//! Control Panel Widget
//! Left side panel with the shared chart filters and load status.

use chrono::NaiveDate;
use egui::{Color32, ComboBox, RichText, ScrollArea};

use crate::data::{Dataset, OVERALL_LABEL};

/// States selected when a freshly loaded dataset contains them.
pub const DEFAULT_STATES: [&str; 2] = ["Selangor", "W.P. Kuala Lumpur"];

/// Filter state shared by all charts.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    pub selected_states: Vec<String>,
    pub category: String,
    /// Inclusive index range into the dataset's sorted month list.
    pub range: (usize, usize),
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            selected_states: Vec::new(),
            category: OVERALL_LABEL.to_string(),
            range: (0, 0),
        }
    }
}

/// Left side control panel with state, category and date range filters.
pub struct ControlPanel {
    pub settings: FilterSettings,
    pub status: String,
    pub is_loading: bool,
    states: Vec<String>,
    state_checked: Vec<bool>,
    categories: Vec<String>,
    months: Vec<NaiveDate>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: FilterSettings::default(),
            status: "Waiting for data".to_string(),
            is_loading: false,
            states: Vec::new(),
            state_checked: Vec::new(),
            categories: Vec::new(),
            months: Vec::new(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the controls from a freshly loaded dataset.
    ///
    /// A still-valid previous selection survives a reload; otherwise the
    /// defaults apply and the date range resets to the full span.
    pub fn bind_dataset(&mut self, dataset: &Dataset) {
        self.states = dataset.states().to_vec();
        self.categories = dataset.category_labels().to_vec();
        self.months = dataset.months().to_vec();

        let wanted: Vec<String> = if self.state_checked.is_empty() {
            DEFAULT_STATES.map(String::from).to_vec()
        } else {
            self.settings.selected_states.clone()
        };
        self.state_checked = self.states.iter().map(|s| wanted.contains(s)).collect();
        self.sync_selected_states();

        if !self.categories.contains(&self.settings.category) {
            self.settings.category = OVERALL_LABEL.to_string();
        }
        self.settings.range = (0, self.months.len().saturating_sub(1));
    }

    fn sync_selected_states(&mut self) {
        self.settings.selected_states = self
            .states
            .iter()
            .zip(&self.state_checked)
            .filter(|(_, &checked)| checked)
            .map(|(state, _)| state.clone())
            .collect();
    }

    fn month_text(&self, index: usize) -> String {
        self.months
            .get(index)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_default()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🇲🇾 Malaysia CPI Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("CPI trends across Malaysia's 16 states (OpenDOSM)")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== State Selection =====
        ui.label(RichText::new("Select States").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(180.0).show(ui, |ui| {
                    for (i, state) in self.states.iter().enumerate() {
                        if i < self.state_checked.len() {
                            ui.checkbox(&mut self.state_checked[i], state);
                        }
                    }
                });
            });
        self.sync_selected_states();

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Category Selection =====
        ui.label(RichText::new("Spending Category").size(14.0).strong());
        ui.add_space(5.0);

        ComboBox::from_id_salt("category")
            .width(240.0)
            .selected_text(&self.settings.category)
            .show_ui(ui, |ui| {
                for category in &self.categories {
                    if ui
                        .selectable_label(self.settings.category == *category, category)
                        .clicked()
                    {
                        self.settings.category = category.clone();
                    }
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range =====
        ui.label(RichText::new("Date Range").size(14.0).strong());
        ui.add_space(5.0);

        if self.months.is_empty() {
            ui.label(
                RichText::new("No dates loaded")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        } else {
            let last = self.months.len() - 1;
            ui.horizontal(|ui| {
                ui.add_sized([40.0, 20.0], egui::Label::new("From:"));
                ui.add(egui::Slider::new(&mut self.settings.range.0, 0..=last).show_value(false));
                ui.label(self.month_text(self.settings.range.0));
            });
            ui.horizontal(|ui| {
                ui.add_sized([40.0, 20.0], egui::Label::new("To:"));
                ui.add(egui::Slider::new(&mut self.settings.range.1, 0..=last).show_value(false));
                ui.label(self.month_text(self.settings.range.1));
            });
            // Keep the range well-formed.
            if self.settings.range.0 > self.settings.range.1 {
                self.settings.range.0 = self.settings.range.1;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Actions & Status =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.is_loading, |ui| {
                let button = egui::Button::new(RichText::new("⟳ Reload Data").size(14.0))
                    .min_size(egui::vec2(160.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Reload;
                }
            });
        });

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if self.is_loading {
                ui.spinner();
            }
            let status_color = if self.status.contains("Error") {
                Color32::from_rgb(220, 53, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        ui.add_space(10.0);
        ui.separator();
        ui.label(
            RichText::new("Data Source: Department of Statistics Malaysia — CC BY 4.0")
                .size(10.0)
                .color(Color32::GRAY),
        );

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Reload,
}
