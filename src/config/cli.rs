use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::data::records::PatientField;
use crate::view::events::ViewCommand;

/// What the binary was asked to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub show_help: bool,
    pub generate_config: bool,
    /// Print a table instead of starting the TUI
    pub print: bool,
    /// Clinic id to select after the first render
    pub clinic: Option<String>,
    /// Column clicks to replay, in order
    pub sorts: Vec<PatientField>,
    pub export: Option<PathBuf>,
    pub ascii: bool,
    pub config_file: Option<PathBuf>,
}

impl CliOptions {
    /// Parse arguments, excluding the program name
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut options = CliOptions::default();
        let mut iter = args.iter().map(|a| a.as_ref());

        while let Some(arg) = iter.next() {
            match arg {
                "-h" | "--help" => options.show_help = true,
                "--generate-config" => options.generate_config = true,
                "--print" => options.print = true,
                "--ascii" => options.ascii = true,
                "--clinic" => {
                    options.clinic = Some(Self::value_for(arg, iter.next())?.to_string());
                }
                "--sort" => {
                    let field = Self::value_for(arg, iter.next())?.parse()?;
                    options.sorts.push(field);
                }
                "--export" => {
                    options.export = Some(PathBuf::from(Self::value_for(arg, iter.next())?));
                }
                "--config" => {
                    options.config_file = Some(PathBuf::from(Self::value_for(arg, iter.next())?));
                }
                other => return Err(anyhow!("Unknown argument '{}'", other)),
            }
        }

        Ok(options)
    }

    fn value_for<'a>(flag: &str, value: Option<&'a str>) -> Result<&'a str> {
        match value {
            Some(v) if !v.starts_with("--") => Ok(v),
            _ => Err(anyhow!("{} needs a value", flag)),
        }
    }

    /// Whether the run ends without starting the TUI
    pub fn is_batch(&self) -> bool {
        self.print || self.export.is_some()
    }

    /// Commands to replay after the first render: the clinic choice, then each click
    pub fn view_commands(&self) -> Vec<ViewCommand> {
        self.clinic
            .iter()
            .map(|clinic| ViewCommand::select(clinic.clone()))
            .chain(self.sorts.iter().map(|field| ViewCommand::ColumnClick(*field)))
            .collect()
    }
}
