use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use callgraph_lens::graph::{Graph, load_payload};
use callgraph_lens::panel::{DetailPanel, PanelManager};
use callgraph_lens::{EngineConfig, GraphEngine, LayoutMode};
use eframe::egui::{self, Context, pos2};

mod canvas;
mod ui;

/// Everything the command line decided before the window opened.
pub struct Startup {
    pub graph_path: PathBuf,
    pub config: EngineConfig,
    pub layout: LayoutMode,
    pub metric: String,
}

pub struct CallgraphApp {
    startup: Startup,
    state: AppState,
    reload_rx: Option<Receiver<Result<Graph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Graph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: GraphEngine,
    search: String,
    selected: Option<String>,
    metric_names: Vec<String>,
    dragging: Option<usize>,
    panels: PanelManager,
    open_panels: Vec<DetailPanel>,
}

impl CallgraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, startup: Startup) -> Self {
        let state = AppState::Loading {
            rx: Self::spawn_load(startup.graph_path.clone()),
        };
        Self {
            startup,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(path: PathBuf) -> Receiver<Result<Graph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_payload(&path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn ready(&self, graph: Graph) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(&self.startup, &graph)))
    }

    fn failed(error: String) -> AppState {
        log::error!("{error}");
        AppState::Error(error)
    }
}

impl ViewModel {
    fn new(startup: &Startup, graph: &Graph) -> Self {
        let mut engine = GraphEngine::new(startup.config.clone());
        engine.set_color_metric(&startup.metric);
        engine.set_layout(startup.layout);
        engine.load_graph(graph);

        let mut model = Self {
            engine,
            search: String::new(),
            selected: None,
            metric_names: Vec::new(),
            dragging: None,
            panels: PanelManager::new(pos2(380.0, 90.0)),
            open_panels: Vec::new(),
        };
        model.refresh_metric_names();
        model
    }

    /// Swaps in a freshly loaded graph while keeping the view settings.
    fn replace_graph(&mut self, graph: &Graph) {
        self.engine.load_graph(graph);
        self.dragging = None;
        self.selected = None;
        self.open_panels.clear();
        self.refresh_metric_names();
    }

    fn refresh_metric_names(&mut self) {
        self.metric_names = self.engine.model().metric_names();
        let current = self.engine.color_metric().to_owned();
        if !self.metric_names.contains(&current) {
            self.metric_names.push(current);
            self.metric_names.sort();
        }
    }

    fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        self.selected = selected;

        let Some(id) = self.selected.as_deref() else {
            return;
        };
        if self.open_panels.iter().any(|panel| panel.open && panel.title() == id) {
            return;
        }
        if let Some(details) = self.engine.node_details(id) {
            let panel = DetailPanel::new(details.clone(), &mut self.panels);
            self.open_panels.push(panel);
        }
    }
}

impl eframe::App for CallgraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(graph)) => transition = Some(Ok(graph)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading call graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load call graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.startup.graph_path.display().to_string(),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.startup.graph_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(graph)) => model.replace_graph(&graph),
                        Ok(Err(error)) => transition = Some(Err(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = AppState::Loading {
                rx: Self::spawn_load(self.startup.graph_path.clone()),
            };
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(graph) => self.ready(graph),
                Err(error) => Self::failed(error),
            };
        }
    }
}
