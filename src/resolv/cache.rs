//! The resolution cache.
//!
//! Every record the resolver learns goes into the cache, and every
//! lookup starts there. Entries are keyed by the full question, so an A
//! record and a CNAME record for the same owner live under different
//! keys. Expired records are swept out lazily whenever the key they live
//! under is looked up.
//!
//! A fresh cache is never empty: it is seeded with the root server
//! bootstrap data, i.e., NS records for the root zone plus an A record
//! for each root server, so iteration always has somewhere to start.

use super::conf::{ROOT_SERVERS, ROOT_TTL};
use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::question::Question;
use crate::base::record::{RecordData, ResourceRecord};
use std::collections::HashMap;
use std::sync::Mutex;

//------------ Cache ---------------------------------------------------------

/// A TTL-aware cache of resource records.
///
/// The cache can be shared by reference between concurrent lookups; all
/// access is serialized through an internal mutex that is only held for
/// the duration of a single operation, never across an await point.
#[derive(Debug)]
pub struct Cache {
    /// The cached records, keyed by the question they answer.
    entries: Mutex<HashMap<Question, Vec<ResourceRecord>>>,
}

impl Cache {
    /// Creates a new cache seeded with the root servers.
    pub fn new() -> Self {
        let res = Cache {
            entries: Mutex::new(HashMap::new()),
        };
        for server in ROOT_SERVERS {
            // The list is compiled in, so the names always parse.
            if let Ok(name) = server.name.parse::<Name>() {
                res.insert(ResourceRecord::new(
                    Question::new_in(Name::root(), Rtype::Ns),
                    ROOT_TTL,
                    RecordData::Ns(name.clone()),
                ));
                res.insert(ResourceRecord::new(
                    Question::new_in(name, Rtype::A),
                    ROOT_TTL,
                    RecordData::A(server.addr),
                ));
            }
        }
        res
    }

    /// Returns the unexpired cached records answering a question.
    ///
    /// Expired records under the touched keys are removed as a side
    /// effect. If no record of the asked-for type is cached and
    /// `include_aliases` is true, CNAME records for the question's name
    /// are returned instead, since they tell the caller where the answer
    /// continues. Alias fallback never applies when the question itself
    /// asks for CNAME records.
    pub fn lookup(
        &self, question: &Question, include_aliases: bool,
    ) -> Vec<ResourceRecord> {
        let mut entries = self.entries.lock().expect("poisoned lock");
        let direct = Self::take_fresh(&mut entries, question);
        if !direct.is_empty()
            || !include_aliases
            || question.qtype() == Rtype::Cname
        {
            return direct;
        }
        let alias = Question::new(
            question.qname().clone(),
            Rtype::Cname,
            question.qclass(),
        );
        Self::take_fresh(&mut entries, &alias)
    }

    /// Inserts a record into the cache.
    ///
    /// A record for an already cached question and payload replaces the
    /// cached one, refreshing its TTL clock.
    pub fn insert(&self, record: ResourceRecord) {
        let mut entries = self.entries.lock().expect("poisoned lock");
        let records =
            entries.entry(record.question().clone()).or_default();
        match records.iter_mut().find(|item| **item == record) {
            Some(item) => *item = record,
            None => records.push(record),
        }
    }

    /// Sweeps expired records under a key and clones the rest.
    fn take_fresh(
        entries: &mut HashMap<Question, Vec<ResourceRecord>>,
        question: &Question,
    ) -> Vec<ResourceRecord> {
        match entries.get_mut(question) {
            Some(records) => {
                records.retain(|record| !record.is_expired());
                records.clone()
            }
            None => Vec::new(),
        }
    }
}

//--- Default

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

//============ Testing =======================================================
