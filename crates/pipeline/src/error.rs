use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to load trades: {0}")]
    Loader(#[from] loader::LoaderError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Failed to fetch benchmark '{name}': {source}")]
    Benchmark {
        name: String,
        #[source]
        source: api_client::error::ApiError,
    },

    #[error("Benchmark '{name}' is unusable: {source}")]
    BenchmarkData {
        name: String,
        #[source]
        source: analytics::AnalyticsError,
    },

    #[error("Failed to export results: {0}")]
    Export(#[from] exporter::ExportError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for PipelineError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        PipelineError::ProgressBarTemplate(error.to_string())
    }
}
