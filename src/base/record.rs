//! Resource records.
//!
//! This module defines the [`ResourceRecord`] type, the typed payloads it
//! can carry, and their wire encoding. A record remembers the time it was
//! created together with the TTL the server supplied, so the remaining
//! lifetime can be derived at any point without touching the stored
//! value. An expired record must not be handed to callers; sweeping it
//! from storage is the cache's business.
//!
//! Record identity covers the owner question and the payload value but
//! neither timestamps nor TTL. Two records for the same question with
//! different payloads therefore coexist, while re-learning an identical
//! payload refreshes the existing record.

use super::iana::{Class, Rtype};
use super::name::Name;
use super::question::Question;
use super::wire::{ComposeError, Composer, ParseError, Parser};
use core::fmt;
use core::hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[cfg(not(test))]
use std::time::Instant;

#[cfg(test)]
use mock_instant::thread_local::Instant;

//------------ RecordData ----------------------------------------------------

/// The data of a resource record.
///
/// Only the record types the resolver acts upon are represented in typed
/// form. Everything else is preserved as the raw record data in hex
/// notation, two lowercase digits per octet, and never interpreted
/// further.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RecordData {
    /// An IPv4 host address.
    A(Ipv4Addr),

    /// An IPv6 host address.
    Aaaa(Ipv6Addr),

    /// The host name of an authoritative name server.
    Ns(Name),

    /// The canonical name of an alias.
    Cname(Name),

    /// The host name of a mail exchange.
    ///
    /// The preference field is consumed during decoding to keep the
    /// cursor correct but not retained; it is written as zero when
    /// encoding.
    Mx(Name),

    /// The verbatim record data of an unsupported record type.
    Other(String),
}

impl RecordData {
    /// Returns the IP address of an A or AAAA record.
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match *self {
            RecordData::A(addr) => Some(addr.into()),
            RecordData::Aaaa(addr) => Some(addr.into()),
            _ => None,
        }
    }

    /// Returns the target name of an NS, CNAME, or MX record.
    pub fn target(&self) -> Option<&Name> {
        match *self {
            RecordData::Ns(ref name)
            | RecordData::Cname(ref name)
            | RecordData::Mx(ref name) => Some(name),
            _ => None,
        }
    }
}

//--- Display

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RecordData::A(ref addr) => addr.fmt(f),
            RecordData::Aaaa(ref addr) => addr.fmt(f),
            RecordData::Ns(ref name)
            | RecordData::Cname(ref name)
            | RecordData::Mx(ref name) => name.fmt(f),
            RecordData::Other(ref hex) => f.write_str(hex),
        }
    }
}

//------------ ResourceRecord ------------------------------------------------

/// A DNS resource record with a remaining-TTL clock.
#[derive(Clone, Debug)]
pub struct ResourceRecord {
    /// The owner name, record type, and class of the record.
    ///
    /// Keeping these as a question makes the record directly usable as a
    /// cache entry.
    question: Question,

    /// When the record was created.
    created: Instant,

    /// The time-to-live in seconds as supplied by the server.
    ttl: u32,

    /// The data of the record.
    data: RecordData,
}

/// # Creation and Conversion
///
impl ResourceRecord {
    /// Creates a new record with its clock starting now.
    pub fn new(question: Question, ttl: u32, data: RecordData) -> Self {
        ResourceRecord {
            question,
            created: Instant::now(),
            ttl,
            data,
        }
    }
}

/// # Field Access
///
impl ResourceRecord {
    /// Returns a reference to the question the record answers.
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Returns a reference to the owner name of the record.
    pub fn owner(&self) -> &Name {
        self.question.qname()
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Rtype {
        self.question.qtype()
    }

    /// Returns the class of the record.
    pub fn class(&self) -> Class {
        self.question.qclass()
    }

    /// Returns the TTL the record was created with.
    pub fn original_ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the number of seconds the record remains valid.
    ///
    /// The value counts down from the original TTL; once it reaches
    /// zero the record is expired.
    pub fn remaining_ttl(&self) -> u32 {
        let elapsed = self.created.elapsed().as_secs();
        u32::try_from(elapsed)
            .map_or(0, |elapsed| self.ttl.saturating_sub(elapsed))
    }

    /// Returns whether the record has expired.
    pub fn is_expired(&self) -> bool {
        self.remaining_ttl() == 0
    }

    /// Returns a reference to the data of the record.
    pub fn data(&self) -> &RecordData {
        &self.data
    }
}

/// # Parsing and Composing
///
impl ResourceRecord {
    /// Takes a record from the beginning of `parser`.
    ///
    /// The record data is interpreted according to the record type; the
    /// data of an unsupported type is captured verbatim as hex. The
    /// parser ends up positioned right after the record data either way.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let qname = parser.parse_name()?;
        let rtype = Rtype::from_int(parser.parse_u16()?);
        let qclass = Class::from_int(parser.parse_u16()?);
        let ttl = parser.parse_u32()?;
        let rdlen = usize::from(parser.parse_u16()?);
        let data = match rtype {
            Rtype::A => {
                if rdlen != 4 {
                    return Err(ParseError::form_error(
                        "invalid A record data length",
                    ));
                }
                let mut buf = [0u8; 4];
                parser.parse_buf(&mut buf)?;
                RecordData::A(buf.into())
            }
            Rtype::Aaaa => {
                if rdlen != 16 {
                    return Err(ParseError::form_error(
                        "invalid AAAA record data length",
                    ));
                }
                let mut buf = [0u8; 16];
                parser.parse_buf(&mut buf)?;
                RecordData::Aaaa(buf.into())
            }
            Rtype::Ns => RecordData::Ns(parser.parse_name()?),
            Rtype::Cname => RecordData::Cname(parser.parse_name()?),
            Rtype::Mx => {
                let _preference = parser.parse_u16()?;
                RecordData::Mx(parser.parse_name()?)
            }
            _ => RecordData::Other(to_hex(&parser.parse_octets(rdlen)?)),
        };
        Ok(ResourceRecord::new(
            Question::new(qname, rtype, qclass),
            ttl,
            data,
        ))
    }

    /// Appends the record to the end of `target`.
    ///
    /// The TTL is written as the currently remaining TTL. The record
    /// data length is not known up front for name-carrying types since
    /// the name may end up compressed, so two placeholder octets are
    /// written first and patched to the actual length afterwards.
    pub fn compose(
        &self, target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_name(self.question.qname())?;
        target.append_u16(self.question.qtype().to_int())?;
        target.append_u16(self.question.qclass().to_int())?;
        target.append_u32(self.remaining_ttl())?;
        let lenpos = target.pos();
        target.append_u16(0)?;
        match self.data {
            RecordData::A(ref addr) => {
                target.append_slice(&addr.octets())?
            }
            RecordData::Aaaa(ref addr) => {
                target.append_slice(&addr.octets())?
            }
            RecordData::Ns(ref name) | RecordData::Cname(ref name) => {
                target.append_name(name)?
            }
            RecordData::Mx(ref name) => {
                target.append_u16(0)?;
                target.append_name(name)?
            }
            RecordData::Other(ref hex) => {
                let data = from_hex(hex)
                    .ok_or(ComposeError::BadOpaqueData)?;
                target.append_slice(&data)?
            }
        }
        let rdlen = (target.pos() - lenpos - 2) as u16;
        target.patch(lenpos, &rdlen.to_be_bytes());
        Ok(())
    }
}

//--- PartialEq, Eq, and Hash
//
// Identity covers the question and payload but not the clock, so a
// re-learned record compares equal to the one it refreshes.

impl PartialEq for ResourceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.question == other.question && self.data == other.data
    }
}

impl Eq for ResourceRecord {}

impl hash::Hash for ResourceRecord {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.question.hash(state);
        self.data.hash(state);
    }
}

//--- Display

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.question.qname(),
            self.remaining_ttl(),
            self.question.qclass(),
            self.question.qtype(),
            self.data
        )
    }
}

//------------ Hex helpers ---------------------------------------------------

/// Returns the hex representation of some record data.
fn to_hex(data: &[u8]) -> String {
    use core::fmt::Write;

    let mut res = String::with_capacity(data.len() * 2);
    for ch in data {
        write!(&mut res, "{:02x}", ch).expect("writing to a string")
    }
    res
}

/// Decodes the hex representation of some record data.
fn from_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = core::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

//============ Testing =======================================================
