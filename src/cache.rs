use indexmap::IndexMap;

use crate::domain::ticket::{TicketSummary, project_of};

/// Last-seen summary of every ticket encountered this session, keyed by
/// ticket key in first-seen order. Entries are never evicted.
#[derive(Debug, Default)]
pub struct TicketListCache {
    entries: IndexMap<String, TicketSummary>,
}

impl TicketListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, ticket: TicketSummary) {
        self.entries.insert(ticket.key.clone(), ticket);
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&TicketSummary> {
        self.entries.get(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project prefix of the earliest cached key, used to pre-fill new tickets.
    pub fn first_project(&self) -> Option<&str> {
        self.entries.keys().next().map(|key| project_of(key))
    }
}
