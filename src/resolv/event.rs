//! Observing the resolution process.
//!
//! Iterative resolution is interesting to watch: queries go out to
//! servers the caller never named, referrals are followed, records
//! trickle into the cache. The [`EventSink`] trait lets a caller observe
//! these milestones without the resolver committing to an output format.
//! All methods default to doing nothing, so a sink only implements what
//! it cares about. [`TraceSink`] reports everything through [`tracing`].

use crate::base::iana::Rcode;
use crate::base::question::Question;
use crate::base::record::ResourceRecord;
use core::fmt;
use std::net::IpAddr;

//------------ Section -------------------------------------------------------

/// The record section of a response an event refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Section {
    /// The answer section.
    Answer,

    /// The authority section.
    Authority,

    /// The additional section.
    Additional,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Section::Answer => f.write_str("answer"),
            Section::Authority => f.write_str("authority"),
            Section::Additional => f.write_str("additional"),
        }
    }
}

//------------ EventSink -----------------------------------------------------

/// A sink for the milestones of the resolution process.
///
/// The resolver calls the methods in a fixed order for each exchange:
/// [`query_sent`][Self::query_sent] before every transmission attempt,
/// including retransmits after a timeout; then, once a matching response
/// has been decoded, [`response_header`][Self::response_header] followed
/// by a [`section_header`][Self::section_header] and the
/// [`record_received`][Self::record_received] calls of each of the three
/// record sections in their wire order.
pub trait EventSink: Send + Sync {
    /// A query is about to be sent to a server.
    fn query_sent(&self, question: &Question, server: IpAddr, id: u16) {
        let _ = (question, server, id);
    }

    /// The header of a matching response has been decoded.
    fn response_header(&self, id: u16, authoritative: bool, rcode: Rcode) {
        let _ = (id, authoritative, rcode);
    }

    /// A record section of the response is about to be reported.
    fn section_header(&self, section: Section, count: u16) {
        let _ = (section, count);
    }

    /// A record has been received in the given section.
    fn record_received(&self, section: Section, record: &ResourceRecord) {
        let _ = (section, record);
    }
}

impl EventSink for () {}

//------------ TraceSink -----------------------------------------------------

/// An event sink that logs all milestones through [`tracing`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceSink;

impl EventSink for TraceSink {
    fn query_sent(&self, question: &Question, server: IpAddr, id: u16) {
        tracing::debug!(
            "query {:#06x}: {} to {}", id, question, server
        );
    }

    fn response_header(&self, id: u16, authoritative: bool, rcode: Rcode) {
        tracing::debug!(
            "response {:#06x}: authoritative {}, {} ({})",
            id,
            authoritative,
            rcode,
            rcode.description(),
        );
    }

    fn section_header(&self, section: Section, count: u16) {
        tracing::debug!("  {} section, {} records", section, count);
    }

    fn record_received(&self, section: Section, record: &ResourceRecord) {
        tracing::debug!("    [{}] {}", section, record);
    }
}
