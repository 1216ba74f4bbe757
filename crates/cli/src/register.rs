//! `docreg register` - register inspection.

use std::path::PathBuf;

use clap::Subcommand;

use docreg_io::ReportMeta;
use docreg_recon::RegisterSummary;

use crate::recon::Project;
use crate::CliError;

#[derive(Subcommand)]
pub enum RegisterCommands {
    /// Count register documents by discipline, situation and status
    #[command(after_help = "\
Examples:
  docreg register summary warehouse.docreg.toml
  docreg register summary warehouse.docreg.toml --json
  docreg register summary warehouse.docreg.toml --xlsx register.xlsx")]
    Summary {
        /// Path to the .docreg.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write the summary and filtered rows to an XLSX workbook
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },
}

pub fn cmd_register(cmd: RegisterCommands) -> Result<(), CliError> {
    match cmd {
        RegisterCommands::Summary { config, json, xlsx } => cmd_register_summary(config, json, xlsx),
    }
}

fn cmd_register_summary(config_path: PathBuf, json_output: bool, xlsx_file: Option<PathBuf>) -> Result<(), CliError> {
    let project = Project::load(&config_path)?;
    let records = project.register()?;
    let summary = RegisterSummary::build(
        &project.config.name,
        &records,
        &project.config.filters,
        &project.catalog,
    );

    if let Some(ref path) = xlsx_file {
        let meta = ReportMeta::now(&project.config.name);
        docreg_io::xlsx::export_register_summary(&summary, &records, &meta, path).map_err(CliError::runtime)?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        let json_str = docreg_io::json::to_string(&summary).map_err(CliError::runtime)?;
        println!("{json_str}");
        return Ok(());
    }

    eprintln!("register '{}': {} documents", summary.project, summary.total);
    for (label, counts) in [
        ("discipline", &summary.by_discipline),
        ("situation", &summary.by_situation),
        ("status", &summary.by_status),
    ] {
        eprintln!("by {label}:");
        for (key, count) in counts {
            eprintln!("  {key:<24} {count}");
        }
    }
    Ok(())
}
