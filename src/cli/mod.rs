//! CLI interface for zbx-to-cachet.
//!
//! One subcommand per incident lifecycle step, meant to be wired into
//! monitoring alert actions.

mod commands;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::SettingsSource;
use crate::models::ComponentStatus;

pub use commands::*;
pub use utils::*;

#[derive(Parser)]
#[command(name = "zbx-to-cachet")]
#[command(about = "zbx-to-cachet is a program to create/update/resolve incidents on Cachet server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, global = true, overrides_with = "no_debug")]
    pub debug: bool,

    /// Disable verbose output (default)
    #[arg(long = "no-debug", global = true, overrides_with = "debug")]
    pub no_debug: bool,

    /// Configuration file path (INI with a [CACHET] section)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create Cachet Incident
    Create {
        component_id: u64,

        /// Component status to apply: 1-4 or operational, performance-issues,
        /// partial-outage, major-outage
        severity: ComponentStatus,

        subcomponent_name: String,

        /// Shown instead of the component group name
        subcomponent_group: Option<String>,
    },

    /// Update Cachet Incident
    #[command(alias = "update")]
    Ack {
        component_id: u64,

        update_message: Option<String>,
    },

    /// Resolve Cachet Incident
    Resolve { component_id: u64 },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug && !self.no_debug
    }

    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        let source = SettingsSource::resolve(self.config);
        let settings = load_settings(&source)?;

        match self.command {
            Commands::Create {
                component_id,
                severity,
                subcomponent_name,
                subcomponent_group,
            } => {
                create(
                    &settings,
                    component_id,
                    severity,
                    subcomponent_name,
                    subcomponent_group,
                )
                .await
            }

            Commands::Ack {
                component_id,
                update_message,
            } => ack(&settings, component_id, update_message).await,

            Commands::Resolve { component_id } => resolve(&settings, component_id).await,
        }
    }
}
