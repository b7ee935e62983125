use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not be delivered, or the server answered with a
    /// non-success status.
    Transport,
    /// The caller passed an input that was rejected before sending.
    InvalidInput,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "Transport failure"),
            ErrorKind::InvalidInput => write!(f, "Invalid input"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
