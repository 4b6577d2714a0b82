//! Dashboard Main Application
//! Main window with control panel and chart viewer; dataset loads run on a
//! background thread and report back over a channel.

use egui::{CentralPanel, RichText, SidePanel};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::error;

use crate::data::{self, Dataset, DatasetCache};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};

/// Load result from the background thread
enum LoadResult {
    Complete(Arc<Dataset>),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    cache: Arc<DatasetCache>,
    dataset: Option<Arc<Dataset>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self {
            cache: Arc::new(DatasetCache::with_default_ttl()),
            dataset: None,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };
        app.start_load();
        app
    }

    /// Kick off a dataset load on a background thread.
    ///
    /// The load goes through the cache, so a reload inside the TTL window
    /// returns the cached dataset without touching the network.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        self.is_loading = true;
        self.control_panel.is_loading = true;
        self.control_panel.set_status("Loading CPI data...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let cache = Arc::clone(&self.cache);
        thread::spawn(move || {
            let result = match cache.get_or_load(data::load).map_err(anyhow::Error::from) {
                Ok(dataset) => LoadResult::Complete(dataset),
                // {:#} keeps the error source chain in the status line.
                Err(e) => LoadResult::Error(format!("{e:#}")),
            };
            let _ = tx.send(result);
        });
    }

    /// Poll the load channel for a finished result.
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(dataset)) => {
                self.control_panel.bind_dataset(&dataset);
                self.chart_viewer.clear();
                self.control_panel.set_status(&format!(
                    "Loaded {} CPI rows, {} inflation rows",
                    dataset.cpi.len(),
                    dataset.inflation.len()
                ));
                self.dataset = Some(dataset);
                self.is_loading = false;
                self.control_panel.is_loading = false;
            }
            Ok(LoadResult::Error(message)) => {
                error!(%message, "dataset load failed");
                self.control_panel
                    .set_status(&format!("Error: {message}"));
                self.is_loading = false;
                self.control_panel.is_loading = false;
            }
            Err(_) => {
                // Still loading; keep polling.
                self.load_rx = Some(rx);
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        if self.is_loading {
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        SidePanel::left("control_panel")
            .min_width(280.0)
            .show(ctx, |ui| {
                if self.control_panel.show(ui) == ControlPanelAction::Reload {
                    self.start_load();
                }
            });

        CentralPanel::default().show(ctx, |ui| match &self.dataset {
            Some(dataset) => {
                let dataset = Arc::clone(dataset);
                self.chart_viewer
                    .show(ui, &dataset, &self.control_panel.settings);
            }
            None => {
                ui.centered_and_justified(|ui| {
                    let text = if self.is_loading {
                        "Loading CPI data..."
                    } else {
                        "No data loaded"
                    };
                    ui.label(RichText::new(text).size(20.0));
                });
            }
        });
    }
}
