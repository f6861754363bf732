//! Ordering guard for overlapping polls.
//!
//! Every fetch takes a ticket when it is issued. A response is applied only
//! if its ticket is newer than the last one applied, so a slow response can
//! never overwrite a fresher view.

/// Issue order of one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollTicket(u64);

impl PollTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct PollSequencer {
    issued: u64,
    applied: Option<PollTicket>,
}

impl PollSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> PollTicket {
        self.issued += 1;
        PollTicket(self.issued)
    }

    /// Record `ticket` as applied if it is newer than anything applied so
    /// far. Returns `false` for a stale response.
    pub fn accept(&mut self, ticket: PollTicket) -> bool {
        match self.applied {
            Some(last) if ticket <= last => false,
            _ => {
                self.applied = Some(ticket);
                true
            }
        }
    }

    pub fn last_applied(&self) -> Option<PollTicket> {
        self.applied
    }
}
