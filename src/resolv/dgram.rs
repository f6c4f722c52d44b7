//! Sending queries over UDP.
//!
//! This module provides the datagram transport of the resolver: it sends
//! a single question to a single server and waits for the matching
//! response, retransmitting after a timeout until the configured number
//! of attempts is used up.
//!
//! Everything learned from a response is inserted into the cache right
//! here; what the caller gets back is the list of NS records from the
//! authority section, i.e., the referral to follow if the cache still
//! has no answer.

use super::cache::Cache;
use super::conf::ResolvConf;
use super::error::Error;
use super::event::{EventSink, Section};
use crate::base::iana::Rtype;
use crate::base::message::{Message, MessageBuilder, MAX_MESSAGE_LEN};
use crate::base::question::Question;
use crate::base::record::ResourceRecord;
use core::time::Duration;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Instant};

//------------ DgramTransport ------------------------------------------------

/// The UDP query transport of the resolver.
///
/// One unconnected socket serves all queries of a resolver. Responses
/// are matched to queries by their transaction ID; a datagram that does
/// not match is discarded and the wait continues. That means concurrent
/// queries may consume each other's datagrams only to throw them away,
/// which is harmless since the rightful query retransmits.
#[derive(Debug)]
pub struct DgramTransport {
    /// The shared socket.
    sock: UdpSocket,

    /// How long to wait for a response before retransmitting.
    read_timeout: Duration,

    /// The total number of transmission attempts per query.
    attempts: usize,

    /// The port queries are sent to.
    port: u16,
}

impl DgramTransport {
    /// Creates a transport bound to an ephemeral local port.
    pub async fn new(conf: &ResolvConf) -> Result<Self, Error> {
        let sock = UdpSocket::bind(("0.0.0.0", 0))
            .await
            .map_err(|err| Error::UdpBind(Arc::new(err)))?;
        Ok(DgramTransport {
            sock,
            read_timeout: conf.read_timeout(),
            attempts: conf.attempts(),
            port: conf.port(),
        })
    }

    /// Sends a question to a server and processes the response.
    ///
    /// All records of the response are inserted into `cache`; the
    /// returned list holds the NS records of the authority section.
    /// Fails with [`Error::UdpTimeoutNoResponse`] when every attempt
    /// passes without a matching response.
    pub async fn query(
        &self,
        question: &Question,
        server: IpAddr,
        cache: &Cache,
        sink: &dyn EventSink,
    ) -> Result<Vec<ResourceRecord>, Error> {
        let id: u16 = rand::random();
        let mut builder = MessageBuilder::new(id)?;
        builder.push(question)?;
        let query = builder.finish();
        let dest = SocketAddr::new(server, self.port);

        for attempt in 0..self.attempts {
            if attempt > 0 {
                tracing::debug!(
                    "query {:#06x}: retransmit {} to {}",
                    id,
                    attempt,
                    dest
                );
            }
            sink.query_sent(question, server, id);
            let sent = self
                .sock
                .send_to(&query, dest)
                .await
                .map_err(|err| Error::UdpSend(Arc::new(err)))?;
            if sent != query.len() {
                return Err(Error::UdpShortSend);
            }
            if let Some(msg) = self.recv_response(id).await? {
                return Ok(process_response(&msg, cache, sink));
            }
        }
        tracing::debug!("query {:#06x}: no response from {}", id, dest);
        Err(Error::UdpTimeoutNoResponse)
    }

    /// Waits up to the read timeout for a response matching `id`.
    ///
    /// Datagrams that are not a well-formed response to the given
    /// transaction are dropped without consuming the attempt; `None`
    /// means the timeout passed and the caller should retransmit.
    async fn recv_response(
        &self, id: u16,
    ) -> Result<Option<Message>, Error> {
        let deadline = Instant::now() + self.read_timeout;
        let mut buf = vec![0u8; MAX_MESSAGE_LEN];
        loop {
            let remaining =
                deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let (len, from) =
                match timeout(remaining, self.sock.recv_from(&mut buf))
                    .await
                {
                    Ok(Ok(res)) => res,
                    Ok(Err(err)) => {
                        return Err(Error::UdpReceive(Arc::new(err)))
                    }
                    Err(_) => return Ok(None),
                };
            let msg = match Message::from_octets(buf[..len].to_vec()) {
                Ok(msg) => msg,
                Err(_) => {
                    tracing::debug!("dropping runt datagram from {}", from);
                    continue;
                }
            };
            if msg.header().id() != id || !msg.header().qr() {
                tracing::debug!(
                    "dropping mismatched response {:#06x} from {}",
                    msg.header().id(),
                    from
                );
                continue;
            }
            return Ok(Some(msg));
        }
    }
}

//------------ process_response ----------------------------------------------

/// Reports a response to the sink and caches its records.
///
/// Returns the NS records of the authority section. A response whose
/// sections fail to decode, or that carries a non-zero response code, is
/// still reported as far as possible but contributes nothing further;
/// the empty referral list simply ends this branch of iteration.
fn process_response(
    msg: &Message, cache: &Cache, sink: &dyn EventSink,
) -> Vec<ResourceRecord> {
    let header = msg.header();
    sink.response_header(header.id(), header.aa(), header.rcode());
    let sections = match msg.sections() {
        Ok(sections) => sections,
        Err(err) => {
            tracing::debug!(
                "response {:#06x}: ignoring malformed sections: {}",
                header.id(),
                err
            );
            return Vec::new();
        }
    };
    for (section, records) in [
        (Section::Answer, &sections.answer),
        (Section::Authority, &sections.authority),
        (Section::Additional, &sections.additional),
    ] {
        sink.section_header(section, records.len() as u16);
        for record in records {
            sink.record_received(section, record);
            cache.insert(record.clone());
        }
    }
    sections
        .authority
        .into_iter()
        .filter(|record| record.rtype() == Rtype::Ns)
        .collect()
}
