//! End-to-end resolver tests against in-process mock name servers.
//!
//! Each test spins up a UDP socket on a loopback ephemeral port and
//! points the resolver at it by overriding the server port in the
//! configuration. Referral glue always points back at 127.0.0.1, so a
//! single socket can play every server in a delegation chain, telling
//! the rounds apart by the order the queries arrive in.

use core::str::FromStr;
use core::time::Duration;
use iterdns::base::{
    Message, MessageBuilder, Name, Question, Rcode, RecordData,
    ResourceRecord, Rtype,
};
use iterdns::resolv::{
    Error, EventSink, IterativeResolver, ResolvConf, Section,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;

//------------ Mock server harness -------------------------------------------

struct MockServer {
    addr: SocketAddr,
    queries: Arc<Mutex<Vec<Message>>>,
}

impl MockServer {
    /// Spawns a server answering each query with the handler's datagrams.
    ///
    /// The handler receives the zero-based number of the query and the
    /// decoded query itself; every returned octet vector is sent back as
    /// its own datagram.
    async fn spawn<F>(handler: F) -> Self
    where
        F: Fn(usize, &Message) -> Vec<Vec<u8>> + Send + Sync + 'static,
    {
        let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = sock.local_addr().unwrap();
        let queries = Arc::new(Mutex::new(Vec::new()));
        let seen = queries.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            loop {
                let (len, from) = match sock.recv_from(&mut buf).await {
                    Ok(res) => res,
                    Err(_) => return,
                };
                let msg =
                    match Message::from_octets(buf[..len].to_vec()) {
                        Ok(msg) => msg,
                        Err(_) => continue,
                    };
                let count = {
                    let mut seen = seen.lock().unwrap();
                    seen.push(msg.clone());
                    seen.len() - 1
                };
                for reply in handler(count, &msg) {
                    let _ = sock.send_to(&reply, from).await;
                }
            }
        });
        MockServer { addr, queries }
    }

    fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn query_names(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|msg| {
                msg.sections().unwrap().questions[0].qname().to_string()
            })
            .collect()
    }
}

async fn resolver_on(server: &MockServer) -> IterativeResolver {
    resolver_with_sink(server, Box::new(())).await
}

async fn resolver_with_sink(
    server: &MockServer, sink: Box<dyn EventSink>,
) -> IterativeResolver {
    let mut conf = ResolvConf::default();
    conf.set_port(server.addr.port());
    conf.set_read_timeout(Duration::from_millis(100));
    IterativeResolver::with_conf(conf, Some("127.0.0.1"), sink)
        .await
        .unwrap()
}

//------------ Record and reply builders -------------------------------------

fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

fn a_rr(owner: &str, addr: [u8; 4]) -> ResourceRecord {
    ResourceRecord::new(
        Question::new_in(name(owner), Rtype::A),
        3600,
        RecordData::A(addr.into()),
    )
}

fn ns_rr(zone: &str, target: &str) -> ResourceRecord {
    ResourceRecord::new(
        Question::new_in(name(zone), Rtype::Ns),
        3600,
        RecordData::Ns(name(target)),
    )
}

fn cname_rr(owner: &str, target: &str) -> ResourceRecord {
    ResourceRecord::new(
        Question::new_in(name(owner), Rtype::Cname),
        3600,
        RecordData::Cname(name(target)),
    )
}

fn response_to(query: &Message, id: u16) -> MessageBuilder {
    let mut builder = MessageBuilder::new(id).unwrap();
    builder.header_mut().set_qr(true);
    builder.header_mut().set_aa(true);
    builder
        .push(&query.sections().unwrap().questions[0])
        .unwrap();
    builder
}

fn answer_reply(query: &Message, records: &[ResourceRecord]) -> Vec<u8> {
    let mut builder =
        response_to(query, query.header().id()).answer();
    for record in records {
        builder.push(record).unwrap();
    }
    builder.finish()
}

fn referral_reply(
    query: &Message,
    authority: &[ResourceRecord],
    glue: &[ResourceRecord],
) -> Vec<u8> {
    let mut builder = response_to(query, query.header().id())
        .answer()
        .authority();
    for record in authority {
        builder.push(record).unwrap();
    }
    let mut builder = builder.additional();
    for record in glue {
        builder.push(record).unwrap();
    }
    builder.finish()
}

fn data_of(records: &[ResourceRecord]) -> Vec<RecordData> {
    records.iter().map(|record| record.data().clone()).collect()
}

//------------ Tests ---------------------------------------------------------

#[tokio::test]
async fn direct_answer_and_cache_hit() {
    let server = MockServer::spawn(|_, query| {
        vec![answer_reply(query, &[a_rr("www.example.com", [192, 0, 2, 80])])]
    })
    .await;
    let resolver = resolver_on(&server).await;
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    let records = resolver.resolve(&question).await.unwrap();
    assert_eq!(
        data_of(&records),
        [RecordData::A([192, 0, 2, 80].into())]
    );
    assert_eq!(server.query_count(), 1);

    // The second resolution is served from the cache.
    let records = resolver.resolve(&question).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(server.query_count(), 1);
}

#[tokio::test]
async fn silent_server_exhausts_attempts() {
    let server = MockServer::spawn(|_, _| Vec::new()).await;
    let resolver = resolver_on(&server).await;
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    // A server that never answers is abandoned, not reported as an
    // error; the caller gets whatever the cache holds.
    let records = resolver.resolve(&question).await.unwrap();
    assert!(records.is_empty());
    assert_eq!(server.query_count(), 3);

    // Every attempt retransmits the byte-identical datagram.
    let datagrams: Vec<Vec<u8>> = server
        .queries
        .lock()
        .unwrap()
        .iter()
        .map(|msg| msg.as_slice().to_vec())
        .collect();
    assert_eq!(datagrams[0], datagrams[1]);
    assert_eq!(datagrams[0], datagrams[2]);
}

#[tokio::test]
async fn referral_cycle_runs_out_of_budget() {
    // A lame delegation: every response refers back to the very same
    // server through its own glue.
    let server = MockServer::spawn(|_, query| {
        vec![referral_reply(
            query,
            &[ns_rr("example.com", "ns1.example.com")],
            &[a_rr("ns1.example.com", [127, 0, 0, 1])],
        )]
    })
    .await;
    let resolver = resolver_on(&server).await;
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    let records = resolver.resolve(&question).await.unwrap();
    assert!(records.is_empty());
    // The initial round plus one per indirection level, then the
    // budget is gone.
    assert_eq!(
        server.query_count(),
        resolver.conf().ns_indirection() + 1
    );
}

#[tokio::test]
async fn dead_delegation_degrades_to_empty() {
    // The first round refers onwards; the delegated server never
    // answers.
    let server = MockServer::spawn(|count, query| {
        if count == 0 {
            vec![referral_reply(
                query,
                &[ns_rr("example.com", "ns1.example.com")],
                &[a_rr("ns1.example.com", [127, 0, 0, 1])],
            )]
        } else {
            Vec::new()
        }
    })
    .await;
    let resolver = resolver_on(&server).await;
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    let records = resolver.resolve(&question).await.unwrap();
    assert!(records.is_empty());
    // One answered round, then all attempts against the dead server.
    assert_eq!(server.query_count(), 4);
}

#[tokio::test]
async fn referral_with_glue() {
    let server = MockServer::spawn(|count, query| {
        vec![match count {
            0 => referral_reply(
                query,
                &[ns_rr("example.com", "ns1.example.com")],
                &[a_rr("ns1.example.com", [127, 0, 0, 1])],
            ),
            _ => answer_reply(
                query,
                &[a_rr("www.example.com", [192, 0, 2, 80])],
            ),
        }]
    })
    .await;
    let resolver = resolver_on(&server).await;
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    let records = resolver.resolve(&question).await.unwrap();
    assert_eq!(
        data_of(&records),
        [RecordData::A([192, 0, 2, 80].into())]
    );
    assert_eq!(
        server.query_names(),
        ["www.example.com", "www.example.com"]
    );
}

#[tokio::test]
async fn referral_without_glue() {
    let server = MockServer::spawn(|count, query| {
        vec![match count {
            // A bare referral: the name server address must be found
            // through a separate resolution.
            0 => referral_reply(
                query,
                &[ns_rr("example.com", "ns1.example.net")],
                &[],
            ),
            1 => answer_reply(
                query,
                &[a_rr("ns1.example.net", [127, 0, 0, 1])],
            ),
            _ => answer_reply(
                query,
                &[a_rr("www.example.com", [192, 0, 2, 80])],
            ),
        }]
    })
    .await;
    let resolver = resolver_on(&server).await;
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    let records = resolver.resolve(&question).await.unwrap();
    assert_eq!(
        data_of(&records),
        [RecordData::A([192, 0, 2, 80].into())]
    );
    assert_eq!(
        server.query_names(),
        ["www.example.com", "ns1.example.net", "www.example.com"]
    );
}

#[tokio::test]
async fn mismatched_id_is_discarded() {
    let server = MockServer::spawn(|_, query| {
        // A forged response under the wrong ID arrives first; the
        // genuine one follows in the same wait window.
        let forged = response_to(query, query.header().id().wrapping_add(1));
        vec![
            forged.finish(),
            answer_reply(query, &[a_rr("www.example.com", [192, 0, 2, 80])]),
        ]
    })
    .await;
    let resolver = resolver_on(&server).await;
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    let records = resolver.resolve(&question).await.unwrap();
    assert_eq!(
        data_of(&records),
        [RecordData::A([192, 0, 2, 80].into())]
    );
    assert_eq!(server.query_count(), 1);
}

#[tokio::test]
async fn nonzero_rcode_yields_empty_result() {
    let server = MockServer::spawn(|_, query| {
        let mut builder = response_to(query, query.header().id());
        builder.header_mut().set_rcode(Rcode::NXDomain);
        vec![builder.finish()]
    })
    .await;
    let resolver = resolver_on(&server).await;
    let question = Question::new_in(name("no.such.example"), Rtype::A);

    let records = resolver.resolve(&question).await.unwrap();
    assert!(records.is_empty());
    assert_eq!(server.query_count(), 1);
}

#[tokio::test]
async fn cname_chain_from_cache() {
    let server = MockServer::spawn(|_, _| Vec::new()).await;
    let resolver = resolver_on(&server).await;
    resolver.cache().insert(cname_rr("www.example.com", "example.com"));
    resolver.cache().insert(a_rr("example.com", [192, 0, 2, 1]));
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    // With budget, the alias is followed and the chain reads in order.
    let records = resolver
        .resolve_following_cnames(&question, 1)
        .await
        .unwrap();
    assert_eq!(
        data_of(&records),
        [
            RecordData::Cname(name("example.com")),
            RecordData::A([192, 0, 2, 1].into()),
        ]
    );

    // With a zero budget the alias is returned unchased.
    let records = resolver
        .resolve_following_cnames(&question, 0)
        .await
        .unwrap();
    assert_eq!(
        data_of(&records),
        [RecordData::Cname(name("example.com"))]
    );

    // A question for the CNAME itself is never chased.
    let cname_question =
        Question::new_in(name("www.example.com"), Rtype::Cname);
    let records = resolver
        .resolve_following_cnames(&cname_question, 5)
        .await
        .unwrap();
    assert_eq!(
        data_of(&records),
        [RecordData::Cname(name("example.com"))]
    );

    // Everything came from the cache.
    assert_eq!(server.query_count(), 0);
}

//------------ Event ordering ------------------------------------------------

#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event)
    }
}

impl EventSink for RecordingSink {
    fn query_sent(&self, question: &Question, server: IpAddr, _id: u16) {
        self.push(format!("query {} @{}", question.qname(), server));
    }

    fn response_header(
        &self, _id: u16, authoritative: bool, rcode: Rcode,
    ) {
        self.push(format!("response aa={} {}", authoritative, rcode));
    }

    fn section_header(&self, section: Section, count: u16) {
        self.push(format!("section {} {}", section, count));
    }

    fn record_received(&self, section: Section, record: &ResourceRecord) {
        self.push(format!("record {} {}", section, record.data()));
    }
}

#[tokio::test]
async fn events_fire_in_order() {
    let server = MockServer::spawn(|_, query| {
        vec![answer_reply(
            query,
            &[a_rr("www.example.com", [192, 0, 2, 80])],
        )]
    })
    .await;
    let sink = RecordingSink::default();
    let resolver =
        resolver_with_sink(&server, Box::new(sink.clone())).await;
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    resolver.resolve(&question).await.unwrap();
    assert_eq!(
        *sink.events.lock().unwrap(),
        [
            "query www.example.com @127.0.0.1",
            "response aa=true NOERROR",
            "section answer 1",
            "record answer 192.0.2.80",
            "section authority 0",
            "section additional 0",
        ]
    );
}

#[tokio::test]
async fn negative_limit_fails_before_any_query() {
    let server = MockServer::spawn(|_, _| Vec::new()).await;
    let sink = RecordingSink::default();
    let resolver =
        resolver_with_sink(&server, Box::new(sink.clone())).await;
    let question = Question::new_in(name("www.example.com"), Rtype::A);

    assert!(matches!(
        resolver.resolve_following_cnames(&question, -1).await,
        Err(Error::CnameIndirectionLimit)
    ));
    assert!(sink.events.lock().unwrap().is_empty());
}
