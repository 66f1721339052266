use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Invalid trade type label '{label}': {reason}")]
    InvalidTradeType { label: String, reason: &'static str },
}
