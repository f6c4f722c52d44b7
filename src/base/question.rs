//! A single question in a DNS message.
//!
//! A question describes what is requested in a query: a domain name, a
//! record type, and a class. Besides its role as a wire element, the
//! [`Question`] type doubles as the key of the resolution cache, which is
//! why it is an immutable value with case-insensitive equality inherited
//! from [`Name`].
//!
//! [`Name`]: super::name::Name

use super::iana::{Class, Rtype};
use super::name::Name;
use super::wire::{ComposeError, Composer, ParseError, Parser};
use core::fmt;

//------------ Question ------------------------------------------------------

/// A question in a DNS message.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Question {
    /// The domain name of the question.
    qname: Name,

    /// The record type of the question.
    qtype: Rtype,

    /// The class of the question.
    qclass: Class,
}

/// # Creation and Conversion
///
impl Question {
    /// Creates a new question from its three components.
    pub fn new(qname: Name, qtype: Rtype, qclass: Class) -> Self {
        Question {
            qname,
            qtype,
            qclass,
        }
    }

    /// Creates a new question from a name and record type, assuming
    /// class IN.
    pub fn new_in(qname: Name, qtype: Rtype) -> Self {
        Question {
            qname,
            qtype,
            qclass: Class::In,
        }
    }
}

/// # Field Access
///
impl Question {
    /// Returns a reference to the domain name of the question.
    pub fn qname(&self) -> &Name {
        &self.qname
    }

    /// Returns the record type of the question.
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    /// Returns the class of the question.
    pub fn qclass(&self) -> Class {
        self.qclass
    }
}

/// # Parsing and Composing
///
impl Question {
    /// Takes a question from the beginning of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Question {
            qname: parser.parse_name()?,
            qtype: Rtype::from_int(parser.parse_u16()?),
            qclass: Class::from_int(parser.parse_u16()?),
        })
    }

    /// Appends the question to the end of `target`.
    pub fn compose(
        &self, target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_name(&self.qname)?;
        target.append_u16(self.qtype.to_int())?;
        target.append_u16(self.qclass.to_int())?;
        Ok(())
    }
}

//--- Display

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.qname, self.qclass, self.qtype)
    }
}

//============ Testing =======================================================
