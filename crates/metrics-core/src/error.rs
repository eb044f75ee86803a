use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Invalid value for {identifier} at {date}: {raw}")]
    InvalidValue {
        identifier: String,
        date: String,
        raw: String,
    },

    #[error("Malformed row in {identifier}: {reason}")]
    MalformedRow { identifier: String, reason: String },
}

pub type MetricsResult<T> = Result<T, MetricsError>;
