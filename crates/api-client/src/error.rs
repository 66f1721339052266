use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Binance rejected the request for '{symbol}' (code {code}): {message}")]
    BinanceError {
        symbol: String,
        code: i64,
        message: String,
    },

    #[error("The API request for '{symbol}' failed with status {status}: {body}")]
    Status {
        symbol: String,
        status: u16,
        body: String,
    },

    #[error("Yahoo Finance request for '{symbol}' failed: {message}")]
    Yahoo { symbol: String, message: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("No price provider is registered for source '{0}'")]
    UnsupportedSource(String),
}
