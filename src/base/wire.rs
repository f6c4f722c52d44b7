//! Creating and consuming data in wire format.
//!
//! This module provides the two workhorses of the codec: [`Parser`] walks
//! a received message with an explicit cursor, and [`Composer`] appends
//! wire data to an outgoing message. Both own the name compression state
//! for exactly one message: the parser maps octet offsets to the names
//! already decoded there so compression pointers can be resolved, and the
//! composer maps name suffixes to the offset where they were first
//! written so later occurrences can be replaced by a pointer.
//!
//! Compression pointers may only refer to strictly earlier offsets in the
//! same message. A pointer whose target is not in the parser's offset
//! table is therefore a protocol violation and fails the decode of the
//! whole message with a [`FormError`].

use super::name::Name;
use core::fmt;
use octseq::builder::ShortBuf;
use octseq::parse::{Parser as Cursor, ShortInput};
use std::collections::HashMap;

/// The largest offset a compression pointer can refer to.
const POINTER_MAX: usize = 0x3FFF;

/// The label type bits marking a compression pointer.
const POINTER_BITS: u8 = 0xC0;

//------------ Parser --------------------------------------------------------

/// A parser for the octets of one DNS message.
///
/// The parser wraps the message octets together with a read position and
/// the offset-to-name table used to resolve compression pointers. All
/// `parse_*` methods advance the position past the data they return and
/// fail with [`ParseError::ShortInput`] when asked to read past the end
/// of the received octets.
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    /// The underlying cursor over the message octets.
    cursor: Cursor<'a, [u8]>,

    /// The names already decoded, by the offset of their first label.
    ///
    /// The table stores fully resolved names, so resolving a pointer
    /// never chains through a second lookup.
    names: HashMap<usize, String>,
}

impl<'a> Parser<'a> {
    /// Creates a parser positioned at the start of the given octets.
    pub fn new(octets: &'a [u8]) -> Self {
        Parser {
            cursor: Cursor::from_ref(octets),
            names: HashMap::new(),
        }
    }

    /// Returns the current read position.
    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    /// Returns the number of octets left to read.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Takes a single octet from the parser.
    pub fn parse_u8(&mut self) -> Result<u8, ParseError> {
        self.cursor.parse_u8().map_err(Into::into)
    }

    /// Takes a big-endian `u16` from the parser.
    pub fn parse_u16(&mut self) -> Result<u16, ParseError> {
        self.cursor.parse_u16_be().map_err(Into::into)
    }

    /// Takes a big-endian `u32` from the parser.
    pub fn parse_u32(&mut self) -> Result<u32, ParseError> {
        self.cursor.parse_u32_be().map_err(Into::into)
    }

    /// Fills the given buffer with the next octets.
    pub fn parse_buf(&mut self, buf: &mut [u8]) -> Result<(), ParseError> {
        self.cursor.parse_buf(buf).map_err(Into::into)
    }

    /// Takes the next `len` octets as an owned vector.
    pub fn parse_octets(&mut self, len: usize) -> Result<Vec<u8>, ParseError> {
        let mut buf = vec![0; len];
        self.parse_buf(&mut buf)?;
        Ok(buf)
    }

    /// Advances the position by `len` octets.
    pub fn advance(&mut self, len: usize) -> Result<(), ParseError> {
        self.cursor.advance(len).map_err(Into::into)
    }

    /// Takes a domain name from the parser.
    ///
    /// The name starts at the current position as a sequence of length
    /// prefixed labels terminated by either an empty label or a
    /// compression pointer to an earlier occurrence. The fully resolved
    /// name is remembered at the offset of each of its labels so later
    /// pointers can refer to any of them.
    pub fn parse_name(&mut self) -> Result<Name, ParseError> {
        self.parse_name_string().map(Name::from_decoded)
    }

    /// Parses a name into its dot-joined string representation.
    fn parse_name_string(&mut self) -> Result<String, ParseError> {
        let start = self.pos();
        let len = self.parse_u8()?;
        if len == 0 {
            return Ok(String::new());
        }
        if len & POINTER_BITS == POINTER_BITS {
            let target = usize::from(len & !POINTER_BITS) << 8
                | usize::from(self.parse_u8()?);
            let name = match self.names.get(&target) {
                Some(name) => name.clone(),
                None => {
                    return Err(ParseError::form_error(
                        "compression pointer to unseen offset",
                    ))
                }
            };
            self.names.insert(start, name.clone());
            return Ok(name);
        }
        if len & POINTER_BITS != 0 {
            return Err(ParseError::form_error("reserved label type"));
        }
        let label = self.parse_octets(usize::from(len))?;
        let label = String::from_utf8_lossy(&label).into_owned();
        let suffix = self.parse_name_string()?;
        let name = if suffix.is_empty() {
            label
        } else {
            format!("{}.{}", label, suffix)
        };
        self.names.insert(start, name.clone());
        Ok(name)
    }
}

//------------ Composer ------------------------------------------------------

/// A composer for the octets of one DNS message.
///
/// The composer owns the target octets and the suffix-to-offset table
/// used for name compression. Appending fails with [`ShortBuf`] once the
/// configured length limit would be exceeded, leaving the target
/// unchanged.
#[derive(Clone, Debug)]
pub struct Composer {
    /// The octets written so far.
    target: Vec<u8>,

    /// The offset of each name suffix already written, lowercased.
    names: HashMap<String, u16>,

    /// The maximum number of octets that may be written.
    limit: usize,
}

impl Composer {
    /// Creates a new composer with the given length limit.
    pub fn new(limit: usize) -> Self {
        Composer {
            target: Vec::with_capacity(limit),
            names: HashMap::new(),
            limit,
        }
    }

    /// Returns the current write position.
    pub fn pos(&self) -> usize {
        self.target.len()
    }

    /// Returns the octets written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.target
    }

    /// Converts the composer into the written octets.
    pub fn into_octets(self) -> Vec<u8> {
        self.target
    }

    /// Appends a slice of octets.
    pub fn append_slice(&mut self, slice: &[u8]) -> Result<(), ShortBuf> {
        if self.target.len() + slice.len() > self.limit {
            return Err(ShortBuf);
        }
        self.target.extend_from_slice(slice);
        Ok(())
    }

    /// Appends a single octet.
    pub fn append_u8(&mut self, value: u8) -> Result<(), ShortBuf> {
        self.append_slice(&[value])
    }

    /// Appends a `u16` in big-endian representation.
    pub fn append_u16(&mut self, value: u16) -> Result<(), ShortBuf> {
        self.append_slice(&value.to_be_bytes())
    }

    /// Appends a `u32` in big-endian representation.
    pub fn append_u32(&mut self, value: u32) -> Result<(), ShortBuf> {
        self.append_slice(&value.to_be_bytes())
    }

    /// Overwrites already written octets at the given position.
    ///
    /// This is used to fill in placeholder octets, e.g., the header
    /// section and length-prefixed record data.
    ///
    /// # Panics
    ///
    /// Panics if the given range has not been written yet.
    pub fn patch(&mut self, pos: usize, data: &[u8]) {
        self.target[pos..pos + data.len()].copy_from_slice(data)
    }

    /// Appends a domain name, compressing where possible.
    ///
    /// Each suffix of the name that has not been written into this
    /// message before is written as labels and its offset recorded; a
    /// suffix that has been written before is replaced by a compression
    /// pointer to that earlier occurrence, ignoring ASCII case.
    pub fn append_name(&mut self, name: &Name) -> Result<(), ShortBuf> {
        let mut rest = name.as_str();
        loop {
            if rest.is_empty() {
                return self.append_u8(0);
            }
            let key = rest.to_ascii_lowercase();
            if let Some(&pos) = self.names.get(&key) {
                return self
                    .append_u16(u16::from(POINTER_BITS) << 8 | pos);
            }
            let pos = self.pos();
            if pos <= POINTER_MAX {
                self.names.insert(key, pos as u16);
            }
            let (label, tail) = match rest.split_once('.') {
                Some((label, tail)) => (label, tail),
                None => (rest, ""),
            };
            self.append_u8(label.len() as u8)?;
            self.append_slice(label.as_bytes())?;
            rest = tail;
        }
    }
}

//============ Error Types ===================================================

//------------ ParseError ----------------------------------------------------

/// An error happened while parsing data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An attempt was made to go beyond the end of the parser.
    ShortInput,

    /// A formatting error occurred.
    Form(FormError),
}

impl ParseError {
    /// Creates a new parse error as a form error with the given message.
    pub fn form_error(msg: &'static str) -> Self {
        FormError::new(msg).into()
    }
}

//--- From

impl From<ShortInput> for ParseError {
    fn from(_: ShortInput) -> Self {
        ParseError::ShortInput
    }
}

impl From<FormError> for ParseError {
    fn from(err: FormError) -> Self {
        ParseError::Form(err)
    }
}

//--- Display and Error

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::ShortInput => f.write_str("unexpected end of input"),
            ParseError::Form(ref err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ParseError {}

//------------ FormError -----------------------------------------------------

/// A formatting error occurred.
///
/// This is a generic error for all kinds of error cases that result in
/// data not being accepted. For diagnostics, the error is being given a
/// static string describing the error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormError(&'static str);

impl FormError {
    /// Creates a new form error value with the given diagnostics string.
    pub fn new(msg: &'static str) -> Self {
        FormError(msg)
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for FormError {}

//------------ ComposeError --------------------------------------------------

/// An error happened while composing a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComposeError {
    /// The message would exceed its length limit.
    ShortBuf,

    /// A section count would overflow.
    CountOverflow,

    /// The opaque record data of a record is not valid hex.
    BadOpaqueData,
}

impl From<ShortBuf> for ComposeError {
    fn from(_: ShortBuf) -> Self {
        ComposeError::ShortBuf
    }
}

impl From<super::header::CountOverflow> for ComposeError {
    fn from(_: super::header::CountOverflow) -> Self {
        ComposeError::CountOverflow
    }
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ComposeError::ShortBuf => {
                f.write_str("message length limit exceeded")
            }
            ComposeError::CountOverflow => {
                f.write_str("section count overflow")
            }
            ComposeError::BadOpaqueData => {
                f.write_str("invalid hex in opaque record data")
            }
        }
    }
}

impl std::error::Error for ComposeError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use core::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn compose_name_plain() {
        let mut composer = Composer::new(512);
        composer.append_name(&name("www.example.com")).unwrap();
        assert_eq!(
            composer.as_slice(),
            b"\x03www\x07example\x03com\x00"
        );
    }

    #[test]
    fn compose_name_root() {
        let mut composer = Composer::new(512);
        composer.append_name(&Name::root()).unwrap();
        assert_eq!(composer.as_slice(), b"\x00");
    }

    #[test]
    fn compose_name_compressed() {
        let mut composer = Composer::new(512);
        composer.append_name(&name("www.example.com")).unwrap();
        let first = composer.pos();
        assert_eq!(first, 17);

        // The identical name collapses into a single pointer.
        composer.append_name(&name("www.example.com")).unwrap();
        assert_eq!(composer.pos() - first, 2);
        assert_eq!(&composer.as_slice()[first..], b"\xC0\x00");

        // A shared suffix is pointed at, differing labels are written.
        let second = composer.pos();
        composer.append_name(&name("mail.Example.COM")).unwrap();
        assert_eq!(
            &composer.as_slice()[second..],
            b"\x04mail\xC0\x04"
        );
    }

    #[test]
    fn parse_name_plain() {
        let mut parser =
            Parser::new(b"\x03www\x07example\x03com\x00");
        assert_eq!(parser.parse_name().unwrap(), name("www.example.com"));
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn parse_name_pointer() {
        let buf = b"\x03www\x07example\x03com\x00\xC0\x00\xC0\x04";
        let mut parser = Parser::new(buf);
        assert_eq!(parser.parse_name().unwrap(), name("www.example.com"));
        assert_eq!(parser.parse_name().unwrap(), name("www.example.com"));
        assert_eq!(parser.parse_name().unwrap(), name("example.com"));
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn parse_name_forward_pointer() {
        // The pointer refers to an offset that has not been decoded.
        let mut parser = Parser::new(b"\xC0\x05\x03www\x00");
        assert!(matches!(
            parser.parse_name(),
            Err(ParseError::Form(_))
        ));
    }

    #[test]
    fn parse_name_reserved_label_type() {
        let mut parser = Parser::new(b"\x41www\x00");
        assert!(matches!(
            parser.parse_name(),
            Err(ParseError::Form(_))
        ));
    }

    #[test]
    fn parse_name_truncated() {
        let mut parser = Parser::new(b"\x03ww");
        assert_eq!(parser.parse_name(), Err(ParseError::ShortInput));
    }

    #[test]
    fn parse_name_unterminated() {
        let mut parser = Parser::new(b"\x03www\x07example");
        assert_eq!(parser.parse_name(), Err(ParseError::ShortInput));
    }

    #[test]
    fn compose_parse_round_trip() {
        let mut composer = Composer::new(512);
        composer.append_name(&name("a.b.example.com")).unwrap();
        composer.append_name(&name("b.example.com")).unwrap();
        composer.append_name(&Name::root()).unwrap();
        let octets = composer.into_octets();
        let mut parser = Parser::new(&octets);
        assert_eq!(parser.parse_name().unwrap(), name("a.b.example.com"));
        assert_eq!(parser.parse_name().unwrap(), name("b.example.com"));
        assert_eq!(parser.parse_name().unwrap(), Name::root());
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn compose_limit() {
        let mut composer = Composer::new(4);
        composer.append_u32(0xdead_beef).unwrap();
        assert_eq!(composer.append_u8(0), Err(ShortBuf));
        assert_eq!(composer.pos(), 4);
    }
}
