//! The parameter types of the DNS.
//!
//! Record types, classes, opcodes, and response codes are all transmitted
//! as plain integers with a set of well-known values. Each of them is
//! wrapped into its own type here so that the well-known values can be
//! spelled out while unknown values survive a round trip through decoding
//! and encoding unharmed.

use core::fmt;

/// Creates a type wrapping an integer with well-known values.
///
/// Equality, ordering, and hashing all go through the raw integer value so
/// that a well-known variant and the equivalent `Int` variant compare
/// equal.
macro_rules! int_enum {
    ( $(#[$attr:meta])* $name:ident, $inttype:ty;
        $( $(#[$vattr:meta])* ( $variant:ident => $value:expr,
                                                  $mnemonic:expr ) )* ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug)]
        pub enum $name {
            $( $(#[$vattr])* $variant, )*

            /// A raw value given through its integer.
            Int($inttype),
        }

        impl $name {
            /// Returns a value from its raw integer value.
            pub fn from_int(value: $inttype) -> Self {
                match value {
                    $( $value => $name::$variant, )*
                    _ => $name::Int(value),
                }
            }

            /// Returns the raw integer value for a value.
            pub fn to_int(self) -> $inttype {
                match self {
                    $( $name::$variant => $value, )*
                    $name::Int(value) => value,
                }
            }

            /// Returns the mnemonic for this value if there is one.
            pub fn to_mnemonic(self) -> Option<&'static str> {
                match self {
                    $( $name::$variant => Some($mnemonic), )*
                    $name::Int(value) => {
                        match $name::from_int(value) {
                            $name::Int(_) => None,
                            value => value.to_mnemonic(),
                        }
                    }
                }
            }
        }

        //--- From

        impl From<$inttype> for $name {
            fn from(value: $inttype) -> Self {
                $name::from_int(value)
            }
        }

        impl From<$name> for $inttype {
            fn from(value: $name) -> Self {
                value.to_int()
            }
        }

        //--- PartialEq and Eq

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.to_int() == other.to_int()
            }
        }

        impl PartialEq<$inttype> for $name {
            fn eq(&self, other: &$inttype) -> bool {
                self.to_int() == *other
            }
        }

        impl Eq for $name {}

        //--- PartialOrd and Ord

        impl PartialOrd for $name {
            fn partial_cmp(
                &self, other: &Self
            ) -> Option<core::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> core::cmp::Ordering {
                self.to_int().cmp(&other.to_int())
            }
        }

        //--- Hash

        impl core::hash::Hash for $name {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                self.to_int().hash(state)
            }
        }

        //--- Display

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match self.to_mnemonic() {
                    Some(m) => f.write_str(m),
                    None => write!(f, "{}{}", Self::UNKNOWN_PREFIX,
                                   self.to_int()),
                }
            }
        }
    }
}

//------------ Rtype ---------------------------------------------------------

int_enum! {
    /// Resource record types.
    ///
    /// Each resource record has a 16 bit type value indicating what kind
    /// of data it carries. The same type values are used in the question
    /// section of a query. Only the types the resolver interprets are
    /// spelled out; everything else travels as [`Rtype::Int`] and its
    /// record data stays opaque.
    Rtype, u16;

    /// A host address.
    (A => 1, "A")

    /// An authoritative name server.
    (Ns => 2, "NS")

    /// The canonical name for an alias.
    (Cname => 5, "CNAME")

    /// The start of a zone of authority.
    (Soa => 6, "SOA")

    /// Mail exchange.
    (Mx => 15, "MX")

    /// Text strings.
    (Txt => 16, "TXT")

    /// An IPv6 host address.
    (Aaaa => 28, "AAAA")
}

impl Rtype {
    /// The prefix used when formatting unknown type values.
    const UNKNOWN_PREFIX: &'static str = "TYPE";
}

//------------ Class ---------------------------------------------------------

int_enum! {
    /// DNS class values.
    ///
    /// In practice only the Internet class matters, but the wire format
    /// carries the full 16 bit field, so unknown values are preserved.
    Class, u16;

    /// The Internet class.
    (In => 1, "IN")

    /// The Chaos class.
    (Ch => 3, "CH")

    /// The Hesiod class.
    (Hs => 4, "HS")
}

impl Class {
    /// The prefix used when formatting unknown class values.
    const UNKNOWN_PREFIX: &'static str = "CLASS";
}

//------------ Opcode --------------------------------------------------------

int_enum! {
    /// DNS opcodes.
    ///
    /// The opcode of a message describes the kind of query it carries.
    /// The resolver only ever sends [`Opcode::Query`].
    Opcode, u8;

    /// A standard query.
    (Query => 0, "QUERY")

    /// An inverse query.
    (IQuery => 1, "IQUERY")

    /// A server status request.
    (Status => 2, "STATUS")
}

impl Opcode {
    /// The prefix used when formatting unknown opcodes.
    const UNKNOWN_PREFIX: &'static str = "OPCODE";
}

//------------ Rcode ---------------------------------------------------------

int_enum! {
    /// DNS response codes.
    ///
    /// The four bit response code of a reply describes what happened on
    /// the server while answering the query. A non-zero code is reported
    /// to the event sink and otherwise treated as the absence of usable
    /// data; it never aborts resolution.
    Rcode, u8;

    /// No error condition.
    (NoError => 0, "NOERROR")

    /// The server was unable to interpret the query.
    (FormErr => 1, "FORMERR")

    /// The server was unable to process the query.
    (ServFail => 2, "SERVFAIL")

    /// The domain name in the query does not exist.
    (NXDomain => 3, "NXDOMAIN")

    /// The server does not support the requested kind of query.
    (NotImp => 4, "NOTIMP")

    /// The server refused the query for policy reasons.
    (Refused => 5, "REFUSED")
}

impl Rcode {
    /// The prefix used when formatting unknown response codes.
    const UNKNOWN_PREFIX: &'static str = "RCODE";

    /// Returns a human readable description of the response code.
    pub fn description(self) -> &'static str {
        match self {
            Rcode::NoError => "no error",
            Rcode::FormErr => "format error",
            Rcode::ServFail => "server failure",
            Rcode::NXDomain => "name does not exist",
            Rcode::NotImp => "not implemented",
            Rcode::Refused => "refused",
            _ => "unassigned response code",
        }
    }
}

//============ Testing =======================================================
