//! Error taxonomy (spec §7).

use std::fmt;

/// A SQLSTATE-shaped five-character code, as named by each error kind below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlState(pub &'static str);

impl fmt::Display for SqlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const STATE_CLIENT: SqlState = SqlState("HY000");
pub const STATE_FEATURE_NOT_SUPPORTED: SqlState = SqlState("0A000");
pub const STATE_NO_DATA: SqlState = SqlState("02000");
pub const STATE_CONNECTION: SqlState = SqlState("08000");
pub const STATE_CANCELLED: SqlState = SqlState("HY008");

/// A gateway error, classified by the kinds named in spec §7.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Malformed block, unsupported option, invalid proxy URL, or any other
    /// programming/input mistake surfaced to the caller.
    #[error("{message} (sqlstate: {state})")]
    Client { message: String, state: SqlState },

    /// A requested operation is unavailable on this result set (e.g.
    /// positional navigation on a forward-only cursor).
    #[error("{0} (sqlstate: {})", STATE_FEATURE_NOT_SUPPORTED)]
    FeatureNotSupported(String),

    /// Access on an empty combined result set.
    #[error("no data (sqlstate: {})", STATE_NO_DATA)]
    NoData,

    /// Value coercion failure (number-format, date-parse, etc).
    #[error("data error: {0}")]
    Data(String),

    /// Socket/unknown-host/TLS failure.
    #[error("connection error: {0} (sqlstate: {})", STATE_CONNECTION)]
    Connection(String),

    /// Cooperative cancellation.
    #[error("cancelled (sqlstate: {})", STATE_CANCELLED)]
    Cancelled,

    /// A non-2xx response from the bridge/web interpreter, optionally
    /// enriched by the `/error/<id>` probe (spec §4.7 step 4).
    #[error("server error: {message}")]
    Server { message: String },

    /// Several nested errors chained together (e.g. CombinedResultSet close).
    #[error("{head}{}", format_causes(causes))]
    Chained {
        head: Box<GatewayError>,
        causes: Vec<GatewayError>,
    },
}

fn format_causes(causes: &[GatewayError]) -> String {
    causes
        .iter()
        .map(|c| format!("; also: {c}"))
        .collect::<String>()
}

impl GatewayError {
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
            state: STATE_CLIENT,
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Chains `self` as the head cause with any further errors appended in
    /// order, flattening nested `Chained` heads so the chain stays a flat
    /// list (first error wins as head, rest as subsequent causes, per spec §7).
    pub fn chain_with(self, mut rest: Vec<GatewayError>) -> Self {
        match self {
            GatewayError::Chained { head, mut causes } => {
                causes.append(&mut rest);
                GatewayError::Chained { head, causes }
            }
            other => {
                if rest.is_empty() {
                    other
                } else {
                    GatewayError::Chained {
                        head: Box::new(other),
                        causes: rest,
                    }
                }
            }
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        GatewayError::Connection(value.to_string())
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(value: url::ParseError) -> Self {
        GatewayError::client(format!("invalid URL: {value}"))
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(value: std::io::Error) -> Self {
        GatewayError::Data(value.to_string())
    }
}

/// Result type wrapping [GatewayError].
pub type Result<T> = std::result::Result<T, GatewayError>;

/// A non-fatal warning attached to the connection's warning chain (spec §4.6,
/// §7). Unlike [GatewayError] this never interrupts the pipeline.
#[derive(Debug, Clone)]
pub struct Warning {
    pub block_extension: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.block_extension, self.message)
    }
}
