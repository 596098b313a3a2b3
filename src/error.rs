use thiserror::Error;

/// Failures while reading the source spreadsheet. All of these abort startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[cfg(feature = "xlsx")]
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sheet '{0}' has no header row")]
    EmptySheet(String),

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Error, Debug)]
pub enum DashError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid price range: {min} to {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DashError>;
