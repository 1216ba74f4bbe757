//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | recon            | Divergences found (like `diff(1)`)       |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 60-69   | recon            | Config, runtime and input-shape failures |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use docreg_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed, nothing to report.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Recon (1, 60-69)
// =============================================================================

/// `recon run` found register-only or storage-only documents.
pub const EXIT_RECON_DIVERGENCES: u8 = 1;

/// Config file failed to parse or validate.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 60;

/// Runtime failure: unreadable config, register, listing or output path.
pub const EXIT_RECON_RUNTIME: u8 = 61;

/// Register yielded no documents while storage listed files.
pub const EXIT_RECON_EMPTY_REGISTER: u8 = 62;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_RECON_INVALID_CONFIG,
        ReconError::EmptyRegister { .. } => EXIT_RECON_EMPTY_REGISTER,
        ReconError::MissingColumn { .. } | ReconError::Io(_) => EXIT_RECON_RUNTIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_registry() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_RECON_INVALID_CONFIG);
        assert_eq!(recon_exit_code(&ReconError::ConfigValidation("x".into())), EXIT_RECON_INVALID_CONFIG);
        assert_eq!(
            recon_exit_code(&ReconError::EmptyRegister { storage_files: 3 }),
            EXIT_RECON_EMPTY_REGISTER
        );
        assert_eq!(recon_exit_code(&ReconError::Io("x".into())), EXIT_RECON_RUNTIME);
        assert_eq!(
            recon_exit_code(&ReconError::MissingColumn { column: "full_name".into() }),
            EXIT_RECON_RUNTIME
        );
    }
}
