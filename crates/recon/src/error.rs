use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (missing storage source, bad folder mapping, etc.).
    ConfigValidation(String),
    /// Register is empty while storage is not; the register most likely failed to load.
    EmptyRegister { storage_files: usize },
    /// Required register column could not be located.
    MissingColumn { column: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::EmptyRegister { storage_files } => write!(
                f,
                "register has no documents but storage lists {storage_files} file(s)"
            ),
            Self::MissingColumn { column } => {
                write!(f, "register: missing column '{column}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
