//! The header of a DNS message.
//!
//! Each DNS message starts with a twelve octet header section defined in
//! section 4.1.1 of [RFC 1035]. Since changing the section counts
//! invalidates the rest of the message while the other fields can be
//! modified freely, the section is split into two types: [`Header`] for
//! the ID, flags, opcode and response code in the first four octets, and
//! [`HeaderCounts`] for the four section counts in the remaining eight.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::iana::{Opcode, Rcode};
use core::fmt;

//------------ Header --------------------------------------------------------

/// The first part of the header of a DNS message.
///
/// The four octets are kept in wire representation, i.e., in network byte
/// order, laid out like this:
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA|Z |   ...  RCODE    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    /// The actual header in its wire format representation.
    inner: [u8; 4],
}

/// # Creation and Conversion
///
impl Header {
    /// The length of the header part in octets.
    pub const LEN: usize = 4;

    /// Creates a new header with all fields zero or false.
    ///
    /// The opcode of such a header is [`Opcode::Query`] and the response
    /// code [`Rcode::NoError`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header from the start of a message octets slice.
    ///
    /// # Panics
    ///
    /// Panics if the slice is less than four octets long.
    pub fn for_message_slice(s: &[u8]) -> Self {
        let mut inner = [0; Self::LEN];
        inner.copy_from_slice(&s[..Self::LEN]);
        Header { inner }
    }

    /// Returns a reference to the underlying octets.
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }
}

/// # Field Access
///
impl Header {
    /// Returns the value of the ID field.
    ///
    /// The ID is chosen by whoever creates a query and copied into the
    /// response by the server, allowing replies to be matched to their
    /// queries.
    pub fn id(self) -> u16 {
        u16::from_be_bytes([self.inner[0], self.inner[1]])
    }

    /// Sets the value of the ID field.
    pub fn set_id(&mut self, value: u16) {
        self.inner[..2].copy_from_slice(&value.to_be_bytes())
    }

    /// Sets the ID field to a randomly chosen value.
    pub fn set_random_id(&mut self) {
        self.set_id(rand::random())
    }

    /// Returns whether the QR bit is set.
    ///
    /// The bit is false in queries and true in responses.
    pub fn qr(self) -> bool {
        self.get_bit(2, 7)
    }

    /// Sets the value of the QR bit.
    pub fn set_qr(&mut self, set: bool) {
        self.set_bit(2, 7, set)
    }

    /// Returns the value of the Opcode field.
    pub fn opcode(self) -> Opcode {
        Opcode::from_int((self.inner[2] >> 3) & 0x0F)
    }

    /// Sets the value of the Opcode field.
    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.inner[2] =
            (self.inner[2] & 0x87) | ((opcode.to_int() & 0x0F) << 3);
    }

    /// Returns whether the AA bit is set.
    ///
    /// In a response, the bit marks the server as authoritative for the
    /// domain name in the question.
    pub fn aa(self) -> bool {
        self.get_bit(2, 2)
    }

    /// Sets the value of the AA bit.
    pub fn set_aa(&mut self, set: bool) {
        self.set_bit(2, 2, set)
    }

    /// Returns whether the TC bit is set.
    ///
    /// A set bit means the message was truncated to the datagram size
    /// limit.
    pub fn tc(self) -> bool {
        self.get_bit(2, 1)
    }

    /// Sets the value of the TC bit.
    pub fn set_tc(&mut self, set: bool) {
        self.set_bit(2, 1, set)
    }

    /// Returns whether the RD bit is set.
    ///
    /// The iterative resolver always leaves this bit unset in queries.
    pub fn rd(self) -> bool {
        self.get_bit(2, 0)
    }

    /// Sets the value of the RD bit.
    pub fn set_rd(&mut self, set: bool) {
        self.set_bit(2, 0, set)
    }

    /// Returns whether the RA bit is set.
    pub fn ra(self) -> bool {
        self.get_bit(3, 7)
    }

    /// Sets the value of the RA bit.
    pub fn set_ra(&mut self, set: bool) {
        self.set_bit(3, 7, set)
    }

    /// Returns the value of the RCODE field.
    pub fn rcode(self) -> Rcode {
        Rcode::from_int(self.inner[3] & 0x0F)
    }

    /// Sets the value of the RCODE field.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.inner[3] = (self.inner[3] & 0xF0) | (rcode.to_int() & 0x0F);
    }

    /// Returns the value of the bit at the given position.
    fn get_bit(self, offset: usize, bit: usize) -> bool {
        self.inner[offset] & (1 << bit) != 0
    }

    /// Sets or clears the bit at the given position.
    fn set_bit(&mut self, offset: usize, bit: usize, set: bool) {
        if set {
            self.inner[offset] |= 1 << bit
        } else {
            self.inner[offset] &= !(1 << bit)
        }
    }
}

//------------ HeaderCounts --------------------------------------------------

/// The section counts of the header of a DNS message.
///
/// These are the four 16 bit counters for the number of entries in the
/// four sections following the header, kept in wire representation. The
/// message builder increments them as entries are pushed so the counts
/// always match what was actually encoded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaderCounts {
    /// The actual counts in their wire format representation.
    inner: [u8; 8],
}

/// # Creation and Conversion
///
impl HeaderCounts {
    /// The length of the counts part in octets.
    pub const LEN: usize = 8;

    /// Creates a new value with all counts zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the counts from a message octets slice.
    ///
    /// The slice must be the full message, i.e., the counts are taken
    /// from octets four to twelve.
    ///
    /// # Panics
    ///
    /// Panics if the slice is less than twelve octets long.
    pub fn for_message_slice(s: &[u8]) -> Self {
        let mut inner = [0; Self::LEN];
        inner.copy_from_slice(&s[Header::LEN..Header::LEN + Self::LEN]);
        HeaderCounts { inner }
    }

    /// Returns a reference to the underlying octets.
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }
}

/// # Field Access
///
impl HeaderCounts {
    /// Returns the value of the QDCOUNT field.
    pub fn qdcount(self) -> u16 {
        self.get_u16(0)
    }

    /// Sets the value of the QDCOUNT field.
    pub fn set_qdcount(&mut self, value: u16) {
        self.set_u16(0, value)
    }

    /// Increases the value of the QDCOUNT field by one.
    pub fn inc_qdcount(&mut self) -> Result<(), CountOverflow> {
        match self.qdcount().checked_add(1) {
            Some(count) => {
                self.set_qdcount(count);
                Ok(())
            }
            None => Err(CountOverflow),
        }
    }

    /// Returns the value of the ANCOUNT field.
    pub fn ancount(self) -> u16 {
        self.get_u16(2)
    }

    /// Sets the value of the ANCOUNT field.
    pub fn set_ancount(&mut self, value: u16) {
        self.set_u16(2, value)
    }

    /// Increases the value of the ANCOUNT field by one.
    pub fn inc_ancount(&mut self) -> Result<(), CountOverflow> {
        match self.ancount().checked_add(1) {
            Some(count) => {
                self.set_ancount(count);
                Ok(())
            }
            None => Err(CountOverflow),
        }
    }

    /// Returns the value of the NSCOUNT field.
    pub fn nscount(self) -> u16 {
        self.get_u16(4)
    }

    /// Sets the value of the NSCOUNT field.
    pub fn set_nscount(&mut self, value: u16) {
        self.set_u16(4, value)
    }

    /// Increases the value of the NSCOUNT field by one.
    pub fn inc_nscount(&mut self) -> Result<(), CountOverflow> {
        match self.nscount().checked_add(1) {
            Some(count) => {
                self.set_nscount(count);
                Ok(())
            }
            None => Err(CountOverflow),
        }
    }

    /// Returns the value of the ARCOUNT field.
    pub fn arcount(self) -> u16 {
        self.get_u16(6)
    }

    /// Sets the value of the ARCOUNT field.
    pub fn set_arcount(&mut self, value: u16) {
        self.set_u16(6, value)
    }

    /// Increases the value of the ARCOUNT field by one.
    pub fn inc_arcount(&mut self) -> Result<(), CountOverflow> {
        match self.arcount().checked_add(1) {
            Some(count) => {
                self.set_arcount(count);
                Ok(())
            }
            None => Err(CountOverflow),
        }
    }

    /// Returns the value at the given octet offset.
    fn get_u16(self, offset: usize) -> u16 {
        u16::from_be_bytes([self.inner[offset], self.inner[offset + 1]])
    }

    /// Sets the value at the given octet offset.
    fn set_u16(&mut self, offset: usize, value: u16) {
        self.inner[offset..offset + 2]
            .copy_from_slice(&value.to_be_bytes())
    }
}

//------------ CountOverflow -------------------------------------------------

/// An error happened while increasing a section count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CountOverflow;

impl fmt::Display for CountOverflow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("section count overflow")
    }
}

impl std::error::Error for CountOverflow {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! test_field {
        ($get:ident, $set:ident, $default:expr, $($value:expr),*) => {
            $({
                let mut h = Header::new();
                assert_eq!(h.$get(), $default);
                h.$set($value);
                assert_eq!(h.$get(), $value);
            })*
        }
    }

    #[test]
    fn header() {
        test_field!(id, set_id, 0, 0x1234);
        test_field!(qr, set_qr, false, true, false);
        test_field!(opcode, set_opcode, Opcode::Query, Opcode::Status);
        test_field!(aa, set_aa, false, true, false);
        test_field!(tc, set_tc, false, true, false);
        test_field!(rd, set_rd, false, true, false);
        test_field!(ra, set_ra, false, true, false);
        test_field!(rcode, set_rcode, Rcode::NoError, Rcode::Refused);
    }

    #[test]
    fn fields_are_independent() {
        let mut h = Header::new();
        h.set_id(0xFFFF);
        h.set_qr(true);
        h.set_opcode(Opcode::Query);
        h.set_aa(true);
        h.set_rcode(Rcode::NXDomain);
        assert_eq!(h.id(), 0xFFFF);
        assert!(h.qr());
        assert!(h.aa());
        assert!(!h.tc());
        assert!(!h.rd());
        assert_eq!(h.rcode(), Rcode::NXDomain);
    }

    #[test]
    fn for_slice() {
        let msg = b"\x12\x34\x85\x03\x00\x01\x00\x02\x00\x03\x00\x04";
        let header = Header::for_message_slice(msg);
        assert_eq!(header.id(), 0x1234);
        assert!(header.qr());
        assert!(header.aa());
        assert!(header.rd());
        assert_eq!(header.rcode(), Rcode::NXDomain);
        let counts = HeaderCounts::for_message_slice(msg);
        assert_eq!(counts.qdcount(), 1);
        assert_eq!(counts.ancount(), 2);
        assert_eq!(counts.nscount(), 3);
        assert_eq!(counts.arcount(), 4);
    }

    #[test]
    fn counts() {
        let mut counts = HeaderCounts::new();
        counts.set_qdcount(1);
        counts.inc_ancount().unwrap();
        counts.inc_ancount().unwrap();
        assert_eq!(counts.qdcount(), 1);
        assert_eq!(counts.ancount(), 2);
        assert_eq!(counts.as_slice(), b"\x00\x01\x00\x02\x00\x00\x00\x00");
        counts.set_arcount(u16::MAX);
        assert!(counts.inc_arcount().is_err());
    }
}
