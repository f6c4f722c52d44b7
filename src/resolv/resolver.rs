//! The iterative resolution engine.
//!
//! The resolver answers questions by walking the delegation tree itself:
//! it asks a start server, follows the referral in the response to one
//! of the delegated name servers, and repeats until an answer for the
//! question is in the cache. The cache is consulted before every
//! network exchange, so repeated questions and shared suffixes of the
//! tree are only fetched once while their records live.

use super::cache::Cache;
use super::conf::{ResolvConf, ROOT_SERVERS};
use super::dgram::DgramTransport;
use super::error::Error;
use super::event::EventSink;
use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::question::Question;
use crate::base::record::{RecordData, ResourceRecord};
use core::future::Future;
use core::pin::Pin;
use rand::Rng;
use std::net::IpAddr;
use std::sync::Mutex;

//------------ IterativeResolver ---------------------------------------------

/// A resolver that iterates from a start server towards an answer.
///
/// The resolver is self-contained: it owns its cache, its UDP transport,
/// and its event sink. It can be shared by reference between concurrent
/// lookups.
pub struct IterativeResolver {
    /// The configuration of the resolver.
    conf: ResolvConf,

    /// The record cache, seeded with the root servers.
    cache: Cache,

    /// The UDP query transport.
    transport: DgramTransport,

    /// The sink resolution milestones are reported to.
    sink: Box<dyn EventSink>,

    /// The server iteration starts from.
    server: Mutex<IpAddr>,
}

/// # Creation
///
impl IterativeResolver {
    /// Creates a resolver with the default configuration.
    ///
    /// See [`set_name_server`][Self::set_name_server] for the accepted
    /// server specifications; `None` picks a random root server.
    pub async fn new(
        server: Option<&str>, sink: Box<dyn EventSink>,
    ) -> Result<Self, Error> {
        Self::with_conf(ResolvConf::default(), server, sink).await
    }

    /// Creates a resolver with the given configuration.
    pub async fn with_conf(
        conf: ResolvConf,
        server: Option<&str>,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, Error> {
        let cache = Cache::new();
        let server = match server {
            Some(spec) => Self::pick_server(&cache, spec)?,
            None => random_root(),
        };
        let transport = DgramTransport::new(&conf).await?;
        Ok(IterativeResolver {
            conf,
            cache,
            transport,
            sink,
            server: Mutex::new(server),
        })
    }
}

/// # Access to Parts
///
impl IterativeResolver {
    /// Returns a reference to the record cache.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Returns a reference to the configuration.
    pub fn conf(&self) -> &ResolvConf {
        &self.conf
    }

    /// Returns the server iteration currently starts from.
    pub fn name_server(&self) -> IpAddr {
        *self.server.lock().expect("poisoned lock")
    }

    /// Changes the server iteration starts from.
    ///
    /// The specification can be `"root"`, `"random"`, or the empty
    /// string for a random root server, an IPv4 or IPv6 address
    /// literal, or the host name of one of the root servers. Anything
    /// else fails with [`Error::UnknownServer`]. Returns the address
    /// that was chosen.
    pub fn set_name_server(&self, spec: &str) -> Result<IpAddr, Error> {
        let addr = Self::pick_server(&self.cache, spec)?;
        *self.server.lock().expect("poisoned lock") = addr;
        Ok(addr)
    }

    /// Translates a server specification into an address.
    fn pick_server(cache: &Cache, spec: &str) -> Result<IpAddr, Error> {
        if spec.is_empty()
            || spec.eq_ignore_ascii_case("root")
            || spec.eq_ignore_ascii_case("random")
        {
            return Ok(random_root());
        }
        if let Ok(addr) = spec.parse::<IpAddr>() {
            return Ok(addr);
        }
        if let Ok(name) = spec.parse::<Name>() {
            let question = Question::new_in(name, Rtype::A);
            if let Some(addr) = cache
                .lookup(&question, false)
                .iter()
                .find_map(|record| record.data().ip_addr())
            {
                return Ok(addr);
            }
        }
        Err(Error::UnknownServer(spec.into()))
    }
}

/// # Resolving
///
impl IterativeResolver {
    /// Resolves a question, iterating from the start server.
    ///
    /// Returns all unexpired records answering the question, which also
    /// includes CNAME records for the question's name when no record of
    /// the asked-for type exists. An empty list means the servers had
    /// nothing to say or never answered; servers that stay silent after
    /// all attempts are abandoned rather than reported as an error.
    pub async fn resolve(
        &self, question: &Question,
    ) -> Result<Vec<ResourceRecord>, Error> {
        self.resolve_at(
            question,
            self.name_server(),
            self.conf.ns_indirection(),
        )
        .await
    }

    /// Resolves a question, following any CNAME chain in the answer.
    ///
    /// At most `limit` aliases are followed; each CNAME record appears
    /// in the result directly before the records obtained by following
    /// it, so a chain reads in order. With a limit of zero, CNAME
    /// records are returned unchased. A negative limit fails with
    /// [`Error::CnameIndirectionLimit`] before any network activity.
    /// A question asking for CNAME records themselves is never chased.
    pub async fn resolve_following_cnames(
        &self, question: &Question, limit: i32,
    ) -> Result<Vec<ResourceRecord>, Error> {
        if limit < 0 {
            return Err(Error::CnameIndirectionLimit);
        }
        self.follow(question.clone(), self.name_server(), limit).await
    }

    /// Resolves a question starting iteration at the given server.
    async fn resolve_at(
        &self, question: &Question, server: IpAddr, depth: usize,
    ) -> Result<Vec<ResourceRecord>, Error> {
        let cached = self.cache.lookup(question, true);
        if !cached.is_empty() {
            return Ok(cached);
        }
        self.iterate(question, server, depth).await?;
        Ok(self.cache.lookup(question, true))
    }

    /// Queries a server and follows the referral, one server per round.
    ///
    /// Each round contacts exactly one server and consumes one level of
    /// `depth`, so a referral cycle, a lame delegation pointing back at
    /// itself included, always runs out of budget. If the response
    /// answers the question, iteration stops; otherwise one of the name
    /// servers from the referral is contacted next, preferring one whose
    /// address is already known. Finding the address of a glueless name
    /// server recurses into a full resolution on the remaining depth.
    /// Both a used-up depth and a server that never answers end
    /// iteration quietly with whatever the cache holds.
    fn iterate<'a>(
        &'a self, question: &'a Question, server: IpAddr, depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>> {
        Box::pin(async move {
            let referral = match self
                .transport
                .query(question, server, &self.cache, self.sink.as_ref())
                .await
            {
                Ok(referral) => referral,
                Err(Error::UdpTimeoutNoResponse) => {
                    tracing::debug!(
                        "abandoning {}: no response from {}",
                        question.qname(),
                        server
                    );
                    return Ok(());
                }
                Err(err) => return Err(err),
            };
            if !self.cache.lookup(question, true).is_empty() {
                return Ok(());
            }
            if depth == 0 {
                tracing::debug!(
                    "giving up on {}: name server indirection exhausted",
                    question.qname()
                );
                return Ok(());
            }
            for ns in &referral {
                let name = match *ns.data() {
                    RecordData::Ns(ref name) => name,
                    _ => continue,
                };
                if let Some(addr) = self.known_address(name) {
                    tracing::debug!(
                        "referral: asking {} ({}) about {}",
                        name,
                        addr,
                        question.qname()
                    );
                    return self.iterate(question, addr, depth - 1).await;
                }
            }
            for ns in &referral {
                let name = match *ns.data() {
                    RecordData::Ns(ref name) => name,
                    _ => continue,
                };
                let address_question = Question::new(
                    name.clone(),
                    Rtype::A,
                    question.qclass(),
                );
                if let Err(err) = self
                    .resolve_at(
                        &address_question,
                        self.name_server(),
                        depth - 1,
                    )
                    .await
                {
                    tracing::debug!(
                        "failed to find address of {}: {}", name, err
                    );
                    continue;
                }
                if let Some(addr) = self.known_address(name) {
                    return self.iterate(question, addr, depth - 1).await;
                }
            }
            Ok(())
        })
    }

    /// Resolves a question and chases CNAMEs in the answer.
    fn follow(
        &self, question: Question, server: IpAddr, limit: i32,
    ) -> Pin<
        Box<
            dyn Future<Output = Result<Vec<ResourceRecord>, Error>>
                + Send
                + '_,
        >,
    > {
        Box::pin(async move {
            let records = self
                .resolve_at(&question, server, self.conf.ns_indirection())
                .await?;
            let mut res = Vec::new();
            for record in records {
                let target = match *record.data() {
                    RecordData::Cname(ref name)
                        if question.qtype() != Rtype::Cname =>
                    {
                        Some(name.clone())
                    }
                    _ => None,
                };
                res.push(record);
                if let (Some(target), true) = (target, limit > 0) {
                    let next = Question::new(
                        target,
                        question.qtype(),
                        question.qclass(),
                    );
                    res.extend(
                        self.follow(next, server, limit - 1).await?,
                    );
                }
            }
            Ok(res)
        })
    }

    /// Returns a cached address of a name server, if any.
    ///
    /// IPv4 addresses win over IPv6 addresses; aliases do not count.
    fn known_address(&self, name: &Name) -> Option<IpAddr> {
        [Rtype::A, Rtype::Aaaa].iter().find_map(|&rtype| {
            let question = Question::new_in(name.clone(), rtype);
            self.cache
                .lookup(&question, false)
                .iter()
                .find_map(|record| record.data().ip_addr())
        })
    }
}

/// Returns the address of a randomly chosen root server.
fn random_root() -> IpAddr {
    let idx = rand::thread_rng().gen_range(0..ROOT_SERVERS.len());
    ROOT_SERVERS[idx].addr.into()
}

//============ Testing =======================================================
