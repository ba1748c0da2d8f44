use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::cli::CliOptions;
use crate::config::config::Config;
use crate::data::data_exporter::DataExporter;
use crate::data::datasets::Datasets;
use crate::ui::table_display::display_view;
use crate::view::controller::ViewController;
use crate::view::dispatcher::CommandDispatcher;
use crate::view::events::ViewCommand;

/// Replay the command line as view commands: first render, clinic choice, then each click
pub fn build_view(datasets: Arc<Datasets>, config: &Config, options: &CliOptions) -> ViewController {
    let view = ViewController::new(datasets)
        .with_sort_on_switch(config.behavior.keep_sort_on_switch);
    let mut dispatcher = CommandDispatcher::new(view);

    dispatcher.dispatch(ViewCommand::Initialize);
    for command in options.view_commands() {
        dispatcher.dispatch(command);
    }

    info!(target: "view", "Replayed {} commands", dispatcher.history().len());
    dispatcher.view().clone()
}

/// Print and/or export without starting the TUI
pub fn run_batch(datasets: Arc<Datasets>, config: &Config, options: &CliOptions) -> Result<()> {
    let view = build_view(datasets, config, options);

    if options.print {
        display_view(&view);
    }

    if let Some(path) = &options.export {
        let message = DataExporter::export_to_file(&view.displayed_records(), path)?;
        println!("{}", message);
    }

    Ok(())
}
