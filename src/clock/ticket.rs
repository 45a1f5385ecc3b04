use crate::clock::actor::ActorId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Delimiter used when a ticket stands for "everything this change produced",
/// as the garbage-collection watermark does.
pub const MAX_DELIMITER: u32 = u32::MAX;

/// Ordering key comparing events across actors: lamport value first, then
/// delimiter, then actor identity.
///
/// A ticket is built on demand from a stored change (or as the initial
/// sentinel) and is never persisted as its own record. The garbage-collection
/// watermark is a ticket; tombstones ordered strictly before it are safe to
/// purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    lamport: u64,
    delimiter: u32,
    actor: ActorId,
}

impl Ticket {
    pub fn new(lamport: u64, delimiter: u32, actor: ActorId) -> Ticket {
        Ticket {
            lamport,
            delimiter,
            actor,
        }
    }

    /// Sentinel meaning "nothing may yet be discarded".
    pub fn initial() -> Ticket {
        Ticket::new(0, 0, ActorId::nil())
    }

    pub fn lamport(&self) -> u64 {
        self.lamport
    }

    pub fn delimiter(&self) -> u32 {
        self.delimiter
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }
}

impl PartialOrd for Ticket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ticket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lamport
            .cmp(&other.lamport)
            .then(self.delimiter.cmp(&other.delimiter))
            .then(self.actor.cmp(&other.actor))
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.lamport, self.delimiter, self.actor)
    }
}
