//! Synchronous dispatch of view commands

use tracing::debug;

use crate::view::controller::ViewController;
use crate::view::events::{ViewChange, ViewCommand};

/// Owns the view and applies commands to it one at a time
pub struct CommandDispatcher {
    view: ViewController,

    /// Command history for debugging
    history: Vec<ViewCommand>,

    /// Maximum history size
    max_history: usize,
}

impl CommandDispatcher {
    pub fn new(view: ViewController) -> Self {
        Self {
            view,
            history: Vec::new(),
            max_history: 100,
        }
    }

    /// Apply a command and report what changed
    pub fn dispatch(&mut self, command: ViewCommand) -> ViewChange {
        debug!(target: "view", "Dispatching {:?}", command);

        let change = match &command {
            ViewCommand::Initialize => {
                if self.view.initialize() {
                    ViewChange::Initialized {
                        records: self.view.len(),
                    }
                } else {
                    ViewChange::Unchanged
                }
            }
            ViewCommand::SelectDataset(clinic_id) => {
                let dataset = self.view.select_dataset(clinic_id);
                ViewChange::DatasetSelected {
                    dataset,
                    records: self.view.len(),
                }
            }
            ViewCommand::ColumnClick(field) => {
                let direction = self.view.handle_column_click(*field);
                ViewChange::Sorted {
                    field: *field,
                    direction,
                }
            }
        };

        self.history.push(command);
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        change
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    /// Commands dispatched so far, oldest first
    pub fn history(&self) -> &[ViewCommand] {
        &self.history
    }
}
