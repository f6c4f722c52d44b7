//! The errors of the resolver.

use crate::base::wire::{ComposeError, ParseError};
use core::fmt;
use std::io;
use std::sync::Arc;

//------------ Error ---------------------------------------------------------

/// An error happened during resolution.
///
/// The type is `Clone` so a single failure can be handed to multiple
/// waiting callers; the underlying io errors are therefore kept behind an
/// [`Arc`].
#[derive(Clone, Debug)]
pub enum Error {
    /// Binding the local UDP socket failed.
    UdpBind(Arc<io::Error>),

    /// Sending a query datagram failed.
    UdpSend(Arc<io::Error>),

    /// Receiving a response datagram failed.
    UdpReceive(Arc<io::Error>),

    /// A query datagram was only partially sent.
    UdpShortSend,

    /// No matching response arrived within any attempt.
    UdpTimeoutNoResponse,

    /// Composing an outgoing message failed.
    Compose(ComposeError),

    /// Parsing a received message failed.
    Parse(ParseError),

    /// A negative alias indirection limit was requested.
    CnameIndirectionLimit,

    /// A server specification could not be understood.
    UnknownServer(String),
}

//--- From

impl From<ComposeError> for Error {
    fn from(err: ComposeError) -> Self {
        Error::Compose(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

//--- Display and Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UdpBind(ref err) => {
                write!(f, "binding UDP socket failed: {}", err)
            }
            Error::UdpSend(ref err) => {
                write!(f, "sending query failed: {}", err)
            }
            Error::UdpReceive(ref err) => {
                write!(f, "receiving response failed: {}", err)
            }
            Error::UdpShortSend => f.write_str("query sent partially"),
            Error::UdpTimeoutNoResponse => {
                f.write_str("no response from server")
            }
            Error::Compose(ref err) => {
                write!(f, "composing query failed: {}", err)
            }
            Error::Parse(ref err) => {
                write!(f, "parsing response failed: {}", err)
            }
            Error::CnameIndirectionLimit => {
                f.write_str("negative alias indirection limit")
            }
            Error::UnknownServer(ref spec) => {
                write!(f, "unknown name server '{}'", spec)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::UdpBind(ref err)
            | Error::UdpSend(ref err)
            | Error::UdpReceive(ref err) => Some(err.as_ref()),
            Error::Compose(ref err) => Some(err),
            Error::Parse(ref err) => Some(err),
            _ => None,
        }
    }
}
