use crate::symbol::Symbol;

pub trait ErrorKind {
    fn kind(&self) -> &'static str;
}

impl ErrorKind for std::io::ErrorKind {
    fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "FileNotFound",
            Self::PermissionDenied => "PermissionDenied",
            Self::AlreadyExists => "FileAlreadyExists",
            Self::InvalidInput => "InvalidInput",
            Self::InvalidData => "InvalidData",
            Self::UnexpectedEof => "UnexpectedEof",
            Self::Interrupted => "Interrupted",
            Self::Other => "OtherIoError",
            _ => "UnknownIoError",
        }
    }
}

impl ErrorKind for serde_json::error::Category {
    fn kind(&self) -> &'static str {
        match self {
            Self::Io => "JsonIoError",
            Self::Syntax => "JsonInvalidSyntax",
            Self::Data => "JsonInvalidData",
            Self::Eof => "JsonUnexpectedEof",
        }
    }
}

impl ErrorKind for rustyline::error::ReadlineError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Io(err) => err.kind().kind(),
            Self::Eof => "PromptEof",
            Self::Interrupted => "PromptInterrupted",
            _ => "UnknownPromptError",
        }
    }
}

impl ErrorKind for config::ConfigError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Frozen => "ConfigFrozen",
            Self::NotFound(_) => "ConfigKeyNotFound",
            Self::PathParse(_) => "ConfigPathParse",
            Self::FileParse { .. } => "ConfigFileParse",
            Self::Type { .. } => "ConfigTypeMismatch",
            Self::Message(_) => "ConfigMessage",
            Self::Foreign(_) => "ConfigForeignError",
            _ => "UnknownConfigError",
        }
    }
}

impl ErrorKind for crate::prompt::CancelType {
    fn kind(&self) -> &'static str {
        match self {
            Self::Stop => "PromptCancelled",
            Self::Exit => "PromptExited",
        }
    }
}

impl ErrorKind for MigrationError {
    fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedType(_) => "UnsupportedType",
            Self::ConflictingTypes { .. } => "ConflictingTypes",
            Self::ConflictingReferences { .. } => "ConflictingReferences",
            Self::RenameResolutionFailed { .. } => "RenameResolutionFailed",
            Self::SnapshotDecode(err) => err.classify().kind(),
            Self::Config(err) => err.kind(),
            Self::Prompt(err) => err.kind(),
            Self::Cancelled(err) => err.kind(),
            Self::Io(err) => err.kind().kind(),
        }
    }
}

/// Giant error enum covering every fatal condition in the migration pipeline.
/// `NoChanges` is deliberately absent here: §7 marks it non-fatal, so it is
/// modeled as `Outcome::NoChanges` in [`crate::pipeline`] instead of an error.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("No migration_type set up for {0}")]
    UnsupportedType(String),
    #[error("table {table} attribute {attribute} has conflicting types across declarations")]
    ConflictingTypes { table: Symbol, attribute: Symbol },
    #[error("table {table} attribute {attribute} has conflicting references across declarations")]
    ConflictingReferences { table: Symbol, attribute: Symbol },
    #[error("could not resolve rename for {attribute} after 3 attempts")]
    RenameResolutionFailed { attribute: Symbol },
    #[error("snapshot failed to decode: {0}")]
    SnapshotDecode(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("prompt failed: {0}")]
    Prompt(#[from] rustyline::error::ReadlineError),
    #[error("{0}")]
    Cancelled(#[from] crate::prompt::CancelType),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MigrationResult<T> = Result<T, MigrationError>;
