//! Error type

use core::fmt::{self, Display};

/// Result type with the engine's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Elliptic curve engine errors
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A required input was missing or malformed.
    BadArgument,

    /// No curve matches the requested identifier, name, OID or size.
    CurveNotFound,

    /// Two keys used together are defined over different curves.
    CurveMismatch,

    /// The output buffer is too small; `required` is the length needed.
    BufferTooSmall {
        /// Number of bytes the operation needs to write.
        required: usize,
    },

    /// The point is the identity where a finite point is required.
    PointAtInfinity,

    /// A coordinate or scalar is not reduced modulo its modulus.
    OutOfRange,

    /// The point does not satisfy the curve equation.
    NotOnCurve,

    /// The point does not have the curve's prime order.
    WrongOrder,

    /// The private scalar does not generate the stored public point.
    PrivateKeyMismatch,

    /// The scalar is zero or not below the group order.
    InvalidScalar,

    /// The random number generator failed.
    RngFailure,

    /// A resumable operation was called out of sequence.
    BadState,

    /// A signature could not be parsed.
    InvalidSignature,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadArgument => f.write_str("bad argument"),
            Error::CurveNotFound => f.write_str("curve not found"),
            Error::CurveMismatch => f.write_str("keys are on different curves"),
            Error::BufferTooSmall { required } => {
                write!(f, "output buffer too small: {required} bytes required")
            }
            Error::PointAtInfinity => f.write_str("point at infinity"),
            Error::OutOfRange => f.write_str("value out of range"),
            Error::NotOnCurve => f.write_str("point is not on the curve"),
            Error::WrongOrder => f.write_str("point has the wrong order"),
            Error::PrivateKeyMismatch => f.write_str("private key does not match public key"),
            Error::InvalidScalar => f.write_str("invalid scalar"),
            Error::RngFailure => f.write_str("random number generator failure"),
            Error::BadState => f.write_str("operation called in the wrong state"),
            Error::InvalidSignature => f.write_str("malformed signature"),
        }
    }
}

impl std::error::Error for Error {}

impl From<rand_core::Error> for Error {
    fn from(_: rand_core::Error) -> Error {
        Error::RngFailure
    }
}
