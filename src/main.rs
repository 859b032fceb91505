mod app;

use std::path::PathBuf;

use callgraph_lens::{EngineConfig, LayoutMode};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph payload: `{nodes, links}` or a call-graph map keyed by function.
    #[arg(long)]
    graph: PathBuf,

    /// JSON file overriding engine tunables.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LayoutMode::Force)]
    layout: LayoutMode,

    /// Node field used for coloring.
    #[arg(long, default_value = callgraph_lens::color::DEFAULT_METRIC)]
    metric: String,

    /// Root node for the hierarchical and radial layouts.
    #[arg(long)]
    root: Option<String>,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("callgraph_lens=info"))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(error) => {
                log::error!("{error:#}; falling back to defaults");
                EngineConfig::default()
            }
        },
        None => EngineConfig::default(),
    };
    if args.root.is_some() {
        config.layout.root = args.root.clone();
    }

    let startup = app::Startup {
        graph_path: args.graph,
        config,
        layout: args.layout,
        metric: args.metric,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "callgraph-lens",
        options,
        Box::new(move |cc| Ok(Box::new(app::CallgraphApp::new(cc, startup)))),
    )
}
