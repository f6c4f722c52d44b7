//! An iterative DNS resolver library.
//!
//! This crate provides the building blocks for answering DNS questions by
//! talking to authoritative name servers directly, without relying on a
//! recursive resolver. It contains two modules:
//!
//! * [base] implements the DNS wire format: the message header, domain
//!   names with label compression, questions, and resource records, plus
//!   the cursor-based parser and composer they are read and written with;
//! * [resolv] implements the resolver itself: a TTL-aware cache seeded
//!   with the root servers, a retrying UDP query transport, and the
//!   iterative resolution engine that follows referrals and CNAME chains.
//!
//! The resolver is asynchronous and runs on the
//! [Tokio](https://tokio.rs/) runtime. A minimal lookup looks like this:
//!
//! ```no_run
//! use iterdns::base::{Class, Name, Question, Rtype};
//! use iterdns::resolv::{IterativeResolver, TraceSink};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = IterativeResolver::new(
//!     Some("root"), Box::new(TraceSink)
//! ).await?;
//! let question = Question::new(
//!     "www.example.com".parse::<Name>()?, Rtype::A, Class::In
//! );
//! for record in resolver.resolve(&question).await? {
//!     println!("{}", record);
//! }
//! # Ok(())
//! # }
//! ```

pub mod base;
pub mod resolv;
