//! Accessing existing DNS messages and building new ones.
//!
//! This module provides [`Message`] for messages received from the wire
//! and [`MessageBuilder`] for assembling outgoing messages.
//!
//! A [`Message`] wraps the raw octets of a message. The header is
//! available right away; the variable length remainder is decoded into a
//! [`Sections`] value in one pass, reading exactly as many entries from
//! each section as the header counts declare.
//!
//! Messages are built in the order in which their sections appear, so the
//! builder progresses through a sequence of types: [`MessageBuilder`]
//! accepts questions, [`AnswerBuilder`], [`AuthorityBuilder`], and
//! [`AdditionalBuilder`] accept the records of their section. Each type
//! converts into the next and every one of them can finish the message.
//! The header octets are reserved up front and patched with the final
//! header and section counts when the message is finished.

use super::header::{Header, HeaderCounts};
use super::question::Question;
use super::record::ResourceRecord;
use super::wire::{ComposeError, Composer, ParseError, Parser};

/// The largest message that fits into a single datagram.
pub const MAX_MESSAGE_LEN: usize = 512;

//------------ Message -------------------------------------------------------

/// A DNS message received from the wire.
#[derive(Clone, Debug)]
pub struct Message {
    /// The raw octets of the message.
    octets: Vec<u8>,
}

/// # Creation and Conversion
///
impl Message {
    /// Creates a message from an octets vector.
    ///
    /// Fails if the octets are too short to even contain the full
    /// header.
    pub fn from_octets(octets: Vec<u8>) -> Result<Self, ParseError> {
        if octets.len() < Header::LEN + HeaderCounts::LEN {
            return Err(ParseError::ShortInput);
        }
        Ok(Message { octets })
    }

    /// Returns a reference to the underlying octets.
    pub fn as_slice(&self) -> &[u8] {
        &self.octets
    }
}

/// # Header Access
///
impl Message {
    /// Returns a copy of the message header.
    pub fn header(&self) -> Header {
        Header::for_message_slice(&self.octets)
    }

    /// Returns a copy of the section counts of the message.
    pub fn header_counts(&self) -> HeaderCounts {
        HeaderCounts::for_message_slice(&self.octets)
    }
}

/// # Section Access
///
impl Message {
    /// Decodes the four sections of the message.
    ///
    /// Exactly as many entries are read from each section as the header
    /// counts declare. A count pointing past the end of the message
    /// fails the decode, as does any malformed entry. Octets trailing
    /// the last declared entry are ignored.
    pub fn sections(&self) -> Result<Sections, ParseError> {
        let counts = self.header_counts();
        let mut parser = Parser::new(&self.octets);
        parser.advance(Header::LEN + HeaderCounts::LEN)?;
        let mut questions =
            Vec::with_capacity(usize::from(counts.qdcount()));
        for _ in 0..counts.qdcount() {
            questions.push(Question::parse(&mut parser)?);
        }
        Ok(Sections {
            questions,
            answer: parse_records(&mut parser, counts.ancount())?,
            authority: parse_records(&mut parser, counts.nscount())?,
            additional: parse_records(&mut parser, counts.arcount())?,
        })
    }
}

/// Reads `count` resource records from the parser.
fn parse_records(
    parser: &mut Parser, count: u16,
) -> Result<Vec<ResourceRecord>, ParseError> {
    let mut records = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        records.push(ResourceRecord::parse(parser)?);
    }
    Ok(records)
}

//------------ Sections ------------------------------------------------------

/// The decoded variable sections of a message.
#[derive(Clone, Debug)]
pub struct Sections {
    /// The entries of the question section.
    pub questions: Vec<Question>,

    /// The records of the answer section.
    pub answer: Vec<ResourceRecord>,

    /// The records of the authority section.
    pub authority: Vec<ResourceRecord>,

    /// The records of the additional section.
    pub additional: Vec<ResourceRecord>,
}

impl Sections {
    /// Returns an iterator over the records of all three record sections.
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answer
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
    }
}

//------------ BuilderInner --------------------------------------------------

/// The state shared by all stages of building a message.
#[derive(Clone, Debug)]
struct BuilderInner {
    /// The composer for the message octets.
    ///
    /// The first twelve octets are a placeholder that receives the
    /// header and counts when the message is finished.
    composer: Composer,

    /// The header of the message being built.
    header: Header,

    /// The section counts of the message being built.
    counts: HeaderCounts,
}

impl BuilderInner {
    /// Creates a new builder state for a message with the given ID.
    fn new(id: u16) -> Result<Self, ComposeError> {
        let mut composer = Composer::new(MAX_MESSAGE_LEN);
        composer.append_slice(&[0; Header::LEN + HeaderCounts::LEN])?;
        let mut header = Header::new();
        header.set_id(id);
        Ok(BuilderInner {
            composer,
            header,
            counts: HeaderCounts::new(),
        })
    }

    /// Appends a record and bumps the given section count.
    fn push_record(
        &mut self,
        record: &ResourceRecord,
        inc: fn(&mut HeaderCounts) -> Result<(), super::header::CountOverflow>,
    ) -> Result<(), ComposeError> {
        record.compose(&mut self.composer)?;
        inc(&mut self.counts)?;
        Ok(())
    }

    /// Patches in the header and returns the message octets.
    fn finish(mut self) -> Vec<u8> {
        self.composer.patch(0, self.header.as_slice());
        self.composer.patch(Header::LEN, self.counts.as_slice());
        self.composer.into_octets()
    }
}

//------------ MessageBuilder ------------------------------------------------

/// A builder for the question section of a message.
#[derive(Clone, Debug)]
pub struct MessageBuilder {
    inner: BuilderInner,
}

impl MessageBuilder {
    /// Creates a message builder for a message with the given ID.
    ///
    /// All header flags start out unset, matching a plain
    /// non-recursive query.
    pub fn new(id: u16) -> Result<Self, ComposeError> {
        BuilderInner::new(id).map(|inner| MessageBuilder { inner })
    }

    /// Returns a mutable reference to the message header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.inner.header
    }

    /// Appends a question to the question section.
    pub fn push(
        &mut self, question: &Question,
    ) -> Result<(), ComposeError> {
        question.compose(&mut self.inner.composer)?;
        self.inner.counts.inc_qdcount()?;
        Ok(())
    }

    /// Proceeds to building the answer section.
    pub fn answer(self) -> AnswerBuilder {
        AnswerBuilder { inner: self.inner }
    }

    /// Finishes the message, returning its octets.
    pub fn finish(self) -> Vec<u8> {
        self.inner.finish()
    }
}

//------------ AnswerBuilder -------------------------------------------------

/// A builder for the answer section of a message.
#[derive(Clone, Debug)]
pub struct AnswerBuilder {
    inner: BuilderInner,
}

impl AnswerBuilder {
    /// Returns a mutable reference to the message header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.inner.header
    }

    /// Appends a record to the answer section.
    pub fn push(
        &mut self, record: &ResourceRecord,
    ) -> Result<(), ComposeError> {
        self.inner.push_record(record, HeaderCounts::inc_ancount)
    }

    /// Proceeds to building the authority section.
    pub fn authority(self) -> AuthorityBuilder {
        AuthorityBuilder { inner: self.inner }
    }

    /// Finishes the message, returning its octets.
    pub fn finish(self) -> Vec<u8> {
        self.inner.finish()
    }
}

//------------ AuthorityBuilder ----------------------------------------------

/// A builder for the authority section of a message.
#[derive(Clone, Debug)]
pub struct AuthorityBuilder {
    inner: BuilderInner,
}

impl AuthorityBuilder {
    /// Returns a mutable reference to the message header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.inner.header
    }

    /// Appends a record to the authority section.
    pub fn push(
        &mut self, record: &ResourceRecord,
    ) -> Result<(), ComposeError> {
        self.inner.push_record(record, HeaderCounts::inc_nscount)
    }

    /// Proceeds to building the additional section.
    pub fn additional(self) -> AdditionalBuilder {
        AdditionalBuilder { inner: self.inner }
    }

    /// Finishes the message, returning its octets.
    pub fn finish(self) -> Vec<u8> {
        self.inner.finish()
    }
}

//------------ AdditionalBuilder ---------------------------------------------

/// A builder for the additional section of a message.
#[derive(Clone, Debug)]
pub struct AdditionalBuilder {
    inner: BuilderInner,
}

impl AdditionalBuilder {
    /// Returns a mutable reference to the message header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.inner.header
    }

    /// Appends a record to the additional section.
    pub fn push(
        &mut self, record: &ResourceRecord,
    ) -> Result<(), ComposeError> {
        self.inner.push_record(record, HeaderCounts::inc_arcount)
    }

    /// Finishes the message, returning its octets.
    pub fn finish(self) -> Vec<u8> {
        self.inner.finish()
    }
}

//============ Testing =======================================================
