//! Handling of DNS data in wire format.
//!
//! This module provides the fundamental types needed to encode and decode
//! DNS messages: the [`Header`] and [`HeaderCounts`] of the fixed twelve
//! octet header section, domain [`Name`]s, [`Question`]s, and
//! [`ResourceRecord`]s, the [`Message`] and [`MessageBuilder`] types that
//! tie them together, and the [`Parser`] and [`Composer`] they read and
//! write themselves with.
//!
//! All decoding threads an explicit cursor through the message octets and
//! keeps the name compression state in tables owned by that one decode, so
//! nothing here carries hidden position state between messages.

pub use self::header::{CountOverflow, Header, HeaderCounts};
pub use self::iana::{Class, Opcode, Rcode, Rtype};
pub use self::message::{
    AdditionalBuilder, AnswerBuilder, AuthorityBuilder, Message,
    MessageBuilder, Sections, MAX_MESSAGE_LEN,
};
pub use self::name::{Name, NameError};
pub use self::question::Question;
pub use self::record::{RecordData, ResourceRecord};
pub use self::wire::{ComposeError, Composer, FormError, ParseError, Parser};

pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod question;
pub mod record;
pub mod wire;
