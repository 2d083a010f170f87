pub mod kind;
pub mod notify;
pub mod quantity;

pub use kind::LineKind;
pub use notify::NotificationSink;
pub use quantity::positive_quantity;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("missing or invalid identity")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("cart is empty")]
    EmptyCart,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("unexpected failure: {0}")]
    Unexpected(Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// Wraps a storage or transport failure that the caller cannot fix.
    pub fn unexpected(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Unexpected(err)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
