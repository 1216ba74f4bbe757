//! `docreg recon` - config-driven register vs. storage reconciliation.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use docreg_io::{ReconReport, RegisterOptions, ReportMeta};
use docreg_recon::{
    DisciplineCatalog, DocumentRecord, ProjectContext, ReconConfig, StorageFile, StorageSource,
};

use crate::exit_codes::EXIT_RECON_DIVERGENCES;
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  docreg recon run warehouse.docreg.toml
  docreg recon run warehouse.docreg.toml --json
  docreg recon run warehouse.docreg.toml --output result.json --xlsx result.xlsx")]
    Run {
        /// Path to the .docreg.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON report to file (overrides output.json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write XLSX report to file (overrides output.xlsx)
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  docreg recon validate warehouse.docreg.toml")]
    Validate {
        /// Path to the .docreg.toml config file
        config: PathBuf,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { config, json, output, xlsx } => cmd_recon_run(config, json, output, xlsx),
        ReconCommands::Validate { config } => cmd_recon_validate(config),
    }
}

// ---------------------------------------------------------------------------
// Loading (shared with `docreg register`)
// ---------------------------------------------------------------------------

/// A parsed config with the paths it names resolved against its directory.
pub(crate) struct Project {
    pub config: ReconConfig,
    pub base_dir: PathBuf,
    pub context: ProjectContext,
    pub catalog: DisciplineCatalog,
}

impl Project {
    pub fn load(config_path: &Path) -> Result<Self, CliError> {
        let config = ReconConfig::from_file(config_path).map_err(CliError::recon)?;
        let base_dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let context = config.project_context();
        let catalog = config.catalog();
        Ok(Self { config, base_dir, context, catalog })
    }

    /// Register rows after `[filters]`.
    pub fn register(&self) -> Result<Vec<DocumentRecord>, CliError> {
        let path = self.config.register_path(&self.base_dir);
        let options = RegisterOptions {
            header_row: self.config.register.header_row,
            delimiter: self.config.delimiter(),
            sheet: self.config.register.sheet.clone(),
        };
        let records = docreg_io::read_register(&path, &options).map_err(|e| {
            CliError::runtime(e).with_hint("register must hold full_name and revision columns")
        })?;
        Ok(self.config.filters.apply(records))
    }

    pub fn storage(&self) -> Result<Vec<StorageFile>, CliError> {
        let allowed = self.config.storage.allowed_extensions();
        match self.config.storage_source(&self.base_dir).map_err(CliError::recon)? {
            StorageSource::Folder(root) => {
                docreg_io::list_folder(&root, &allowed, &self.context, &self.catalog)
            }
            StorageSource::Manifest(path) => {
                docreg_io::read_manifest(&path, &allowed, &self.context, &self.catalog)
            }
        }
        .map_err(CliError::runtime)
    }

    /// Resolve an output path: the CLI flag as given, else the config entry
    /// relative to the config directory.
    pub fn output_path(&self, flag: Option<PathBuf>, configured: Option<&str>) -> Option<PathBuf> {
        flag.or_else(|| configured.map(|p| self.base_dir.join(p)))
    }
}

// ---------------------------------------------------------------------------
// run / validate
// ---------------------------------------------------------------------------

fn cmd_recon_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    xlsx_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let project = Project::load(&config_path)?;
    let json_path = project.output_path(output_file, project.config.output.json.as_deref());
    let xlsx_path = project.output_path(xlsx_file, project.config.output.xlsx.as_deref());
    if json_path.is_some() && json_path == xlsx_path {
        return Err(CliError::args("JSON and XLSX reports must be written to different files")
            .with_hint("check --output, --xlsx and the [output] section of the config"));
    }

    let register = project.register()?;
    let storage = project.storage()?;

    let result = docreg_recon::run(&register, &storage).map_err(CliError::recon)?;
    let groups = docreg_recon::group_by_discipline(&result, &project.catalog);
    let report = ReconReport::new(ReportMeta::now(&project.config.name), &result, groups);

    if let Some(ref path) = json_path {
        docreg_io::json::export(&report, path).map_err(CliError::runtime)?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = xlsx_path {
        docreg_io::xlsx::export_report(&report, path).map_err(CliError::runtime)?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        let json_str = docreg_io::json::to_string(&report).map_err(CliError::runtime)?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &report.stats;
    eprintln!(
        "recon '{}': {} register items, {} storage files: {} matched, {} register only, {} storage only, {} superseded",
        report.meta.project,
        s.register_items,
        s.storage_files,
        s.matched_register,
        s.register_only,
        s.storage_only,
        s.superseded,
    );
    for (code, bucket) in &report.disciplines {
        eprintln!(
            "  {code:<10} {} register only, {} storage only",
            bucket.register_only.len(),
            bucket.storage_only.len()
        );
    }

    if report.has_divergences() {
        return Err(CliError::new(EXIT_RECON_DIVERGENCES, "divergences found"));
    }
    Ok(())
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let project = Project::load(&config_path)?;
    let source = match project.config.storage_source(&project.base_dir).map_err(CliError::recon)? {
        StorageSource::Folder(root) => format!("folder {}", root.display()),
        StorageSource::Manifest(path) => format!("manifest {}", path.display()),
    };

    eprintln!(
        "valid: '{}' (year {}, project {}), register {}, storage {}",
        project.config.name,
        display_or_dash(&project.context.year),
        display_or_dash(&project.context.project_code),
        project.config.register_path(&project.base_dir).display(),
        source,
    );
    Ok(())
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
