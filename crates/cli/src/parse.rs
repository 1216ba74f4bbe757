//! `docreg parse` - show how filenames parse and which join key they get.

use serde::Serialize;

use docreg_recon::engine::storage_key;
use docreg_recon::{ParsedName, ProjectContext, StorageFile};

use crate::CliError;

#[derive(Serialize)]
struct ParseOutput {
    filename: String,
    #[serde(flatten)]
    parsed: ParsedName,
    /// Join key as a storage file with this name would get it.
    key_base_name: Option<String>,
    key_revision: Option<String>,
}

pub fn cmd_parse(
    filenames: Vec<String>,
    year: Option<String>,
    project: Option<String>,
    json_output: bool,
) -> Result<(), CliError> {
    let context = ProjectContext::default().with_overrides(year.as_deref(), project.as_deref());

    let outputs: Vec<ParseOutput> = filenames
        .iter()
        .map(|filename| {
            let file = StorageFile::new(filename, filename, "", Vec::new(), &context);
            let key = storage_key(&file);
            ParseOutput {
                filename: file.filename.clone(),
                key_base_name: key.as_ref().map(|k| k.base_name_key.clone()),
                key_revision: key.map(|k| k.revision.to_string()),
                parsed: file.parsed,
            }
        })
        .collect();

    if json_output {
        let json_str = serde_json::to_string_pretty(&outputs)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for out in &outputs {
        let grammar = match out.parsed.variant {
            Some(variant) => format!("grammar {}", variant.number()),
            None => "no grammar".to_string(),
        };
        let verdict = if out.parsed.valid { "valid" } else { "invalid" };
        println!(
            "{}\t{grammar}\t{verdict}\tbase={}\trev={}",
            out.filename,
            out.key_base_name.as_deref().unwrap_or("-"),
            out.key_revision.as_deref().filter(|r| !r.is_empty()).unwrap_or("-"),
        );
        if !out.parsed.reject_reason.is_empty() {
            println!("\t{}", out.parsed.reject_reason);
        }
    }
    Ok(())
}
