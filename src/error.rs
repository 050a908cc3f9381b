use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum WalkError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Query timed out")]
    Timeout,

    #[error("No answer for {name} {rtype}")]
    NoAnswer { name: String, rtype: String },

    #[error("Name does not exist: {0}")]
    NxDomain(String),

    #[error("Zone is served with black lies and cannot be walked")]
    Tarpit,

    #[error("Zone published no NSEC3PARAM record")]
    MissingNsec3Params,

    #[error("Malformed NSEC3 parameters: {0}")]
    InvalidNsec3Params(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Candidate generation exhausted after {0} attempts")]
    CandidatesExhausted(usize),
}

impl From<std::io::Error> for WalkError {
    fn from(err: std::io::Error) -> Self {
        WalkError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WalkError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid nameserver address: {0}")]
    InvalidNameserver(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid coverage threshold: {0}")]
    InvalidThreshold(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}
