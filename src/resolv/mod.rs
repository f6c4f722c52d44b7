//! An iterative DNS resolver.
//!
//! This module implements resolution by iteration: starting from a root
//! server, the resolver follows the referrals in responses down the
//! delegation tree until the question is answered, never asking any
//! server to recurse on its behalf.
//!
//! The parts fit together like this: [`IterativeResolver`] drives the
//! iteration, using [`DgramTransport`] to exchange messages with one
//! server at a time over UDP and a shared [`Cache`] to remember every
//! record it learns. Behavior is controlled by a [`ResolvConf`], and the
//! milestones of each exchange are reported to an [`EventSink`].

pub use self::cache::Cache;
pub use self::conf::{ResolvConf, RootServer, ROOT_SERVERS};
pub use self::dgram::DgramTransport;
pub use self::error::Error;
pub use self::event::{EventSink, Section, TraceSink};
pub use self::resolver::IterativeResolver;

pub mod cache;
pub mod conf;
pub mod dgram;
pub mod error;
pub mod event;
pub mod resolver;
