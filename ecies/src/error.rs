//! Error type

use core::fmt::{self, Display};

/// Result type with the `ecies` crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Encrypted messaging errors
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A salt, message or key had the wrong shape.
    BadArgument,

    /// A call was made out of protocol order.
    BadState,

    /// The message failed authentication or could not be decrypted.
    MacMismatch,

    /// The random number generator failed.
    RngFailure,

    /// The underlying curve operation failed.
    Curve(weierstrass::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadArgument => f.write_str("bad argument"),
            Error::BadState => f.write_str("called out of protocol order"),
            Error::MacMismatch => f.write_str("message authentication failed"),
            Error::RngFailure => f.write_str("random number generator failure"),
            Error::Curve(err) => write!(f, "curve operation failed: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Curve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<weierstrass::Error> for Error {
    fn from(err: weierstrass::Error) -> Error {
        Error::Curve(err)
    }
}

impl From<rand_core::Error> for Error {
    fn from(_: rand_core::Error) -> Error {
        Error::RngFailure
    }
}
