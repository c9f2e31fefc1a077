//! Packets: immutable descriptors ferried between router queues.

use crate::network::{Network, RouterId};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Index of a packet in the run's packet list. Identity is the index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PacketId(pub usize);

impl PacketId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for PacketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of data with fixed endpoints, moved one hop per network cycle.
/// Immutable for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    id: PacketId,
    source: RouterId,
    destination: RouterId,
}

impl Packet {
    /// Constructs a packet. Equal source and destination is a programmer
    /// error.
    pub fn new(id: PacketId, source: RouterId, destination: RouterId) -> Self {
        assert_ne!(
            source, destination,
            "packet {id} has identical source and destination ({source})",
        );

        Self {
            id,
            source,
            destination,
        }
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn source(&self) -> RouterId {
        self.source
    }

    pub fn destination(&self) -> RouterId {
        self.destination
    }
}

/// Draws `count` packets with ids `0..count`. Sources are uniform over the
/// network; destinations are redrawn until distinct from the source.
/// A network with fewer than two routers cannot host a packet, so the list
/// comes back empty.
pub fn random_packets(network: &Network, count: usize, rng: &mut StdRng) -> Vec<Packet> {
    if network.len() < 2 {
        return Vec::new();
    }

    (0..count)
        .map(|id| {
            let source = RouterId(rng.gen_range(0..network.len()));
            let mut destination = RouterId(rng.gen_range(0..network.len()));
            while destination == source {
                destination = RouterId(rng.gen_range(0..network.len()));
            }
            Packet::new(PacketId(id), source, destination)
        })
        .collect()
}
