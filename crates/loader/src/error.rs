use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read trade file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Delimiter '{0}' is not a single-byte ASCII character")]
    UnsupportedDelimiter(char),

    #[error("Required column '{0}' is missing from the header")]
    MissingColumn(&'static str),

    #[error("Line {line}, column '{column}': cannot parse '{value}' ({reason})")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("The trade file contains no trade rows")]
    Empty,
}
