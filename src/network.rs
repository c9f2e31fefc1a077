//! Simulated network topology: routers, undirected links, and packet queues.
//!
//! The network is an arena of router records addressed by [`RouterId`]
//! indices. Adjacency lists keep insertion order, queues are strict FIFO,
//! and both orderings are load-bearing: every tie in the simulator resolves
//! through them, which is what makes a seeded run reproducible.

use crate::packet::{Packet, PacketId};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Index of a router in its [`Network`] arena. Identity is the index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RouterId(pub usize);

impl RouterId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RouterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the simulated network.
///
/// Holds the undirected adjacency list and a FIFO queue of packets that have
/// been received but not yet sent away. Per network cycle a router may send
/// at most one packet and receive any number; the queue is mutated only by
/// the cycle scheduler.
#[derive(Debug, Clone)]
pub struct Router {
    id: RouterId,
    neighbors: Vec<RouterId>,
    queue: VecDeque<PacketId>,
}

impl Router {
    fn new(id: RouterId) -> Self {
        Self {
            id,
            neighbors: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn id(&self) -> RouterId {
        self.id
    }

    /// Adjacency list in link-insertion order.
    pub fn neighbors(&self) -> &[RouterId] {
        &self.neighbors
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// Packets awaiting transmission, head first.
    pub fn queue(&self) -> impl Iterator<Item = PacketId> + '_ {
        self.queue.iter().copied()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Appends a packet to the queue tail.
    pub fn enqueue(&mut self, packet: PacketId) {
        self.queue.push_back(packet);
    }

    /// Removes and returns the queue head. Dequeueing from an empty queue is
    /// a programmer error and aborts the run.
    pub fn dequeue(&mut self) -> PacketId {
        self.queue
            .pop_front()
            .expect("dequeue from an empty router queue")
    }

    /// Drops a delivered packet from the queue (first occurrence). Only the
    /// packet's destination router may do this.
    pub fn remove(&mut self, packet: &Packet) {
        assert_eq!(
            packet.destination(),
            self.id,
            "packet {} removed at router {} instead of its destination",
            packet.id(),
            self.id,
        );

        if let Some(pos) = self.queue.iter().position(|&p| p == packet.id()) {
            self.queue.remove(pos);
        }
    }
}

/// An ordered arena of routers joined by undirected links.
#[derive(Debug, Clone, Default)]
pub struct Network {
    routers: Vec<Router>,
}

impl Network {
    /// Creates `routers` unlinked routers with ids `0..routers`.
    pub fn new(routers: usize) -> Self {
        Self {
            routers: (0..routers).map(|i| Router::new(RouterId(i))).collect(),
        }
    }

    /// Builds a random topology: all C(R, 2) candidate links are enumerated,
    /// shuffled with the caller's generator, and the first
    /// `min(links, C(R, 2))` are inserted. The caller is responsible for
    /// checking [`Network::is_connected`] before simulating.
    pub fn random(routers: usize, links: usize, rng: &mut StdRng) -> Self {
        let mut network = Network::new(routers);

        let mut candidates: Vec<(usize, usize)> = Vec::new();
        for a in 0..routers {
            for b in (a + 1)..routers {
                candidates.push((a, b));
            }
        }
        candidates.shuffle(rng);

        for &(a, b) in candidates.iter().take(links.min(candidates.len())) {
            network.connect(RouterId(a), RouterId(b));
        }

        network
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Router ids in network order.
    pub fn ids(&self) -> impl Iterator<Item = RouterId> {
        (0..self.routers.len()).map(RouterId)
    }

    pub fn router(&self, id: RouterId) -> &Router {
        &self.routers[id.0]
    }

    pub fn router_mut(&mut self, id: RouterId) -> &mut Router {
        &mut self.routers[id.0]
    }

    pub fn neighbors(&self, id: RouterId) -> &[RouterId] {
        self.routers[id.0].neighbors()
    }

    /// Inserts an undirected link. Idempotent: an existing link is left
    /// alone. Linking a router to itself is a programmer error.
    pub fn connect(&mut self, a: RouterId, b: RouterId) {
        assert_ne!(a, b, "cannot link router {a} to itself");

        if self.routers[a.0].neighbors.contains(&b) {
            return;
        }

        self.routers[a.0].neighbors.push(b);
        self.routers[b.0].neighbors.push(a);
    }

    pub fn link_count(&self) -> usize {
        self.routers.iter().map(Router::degree).sum::<usize>() / 2
    }

    /// Total number of packets sitting in router queues.
    pub fn total_queued(&self) -> usize {
        self.routers.iter().map(Router::queue_len).sum()
    }

    pub(crate) fn clear_queues(&mut self) {
        for router in &mut self.routers {
            router.queue.clear();
        }
    }

    /// Breadth-first reachability from router 0. Disconnected topologies
    /// must be rejected before simulating: packets stranded in an isolated
    /// component would never drain.
    pub fn is_connected(&self) -> bool {
        assert!(!self.is_empty(), "connectivity of an empty network");

        let mut visited = vec![false; self.routers.len()];
        let mut queue = VecDeque::from([RouterId(0)]);
        visited[0] = true;
        let mut seen = 1;

        while let Some(current) = queue.pop_front() {
            for &neighbor in self.neighbors(current) {
                if !visited[neighbor.0] {
                    visited[neighbor.0] = true;
                    seen += 1;
                    queue.push_back(neighbor);
                }
            }
        }

        seen == self.routers.len()
    }

    /// Hop distance between two routers by breadth-first search, or `None`
    /// when they lie in different components.
    pub fn distance(&self, from: RouterId, to: RouterId) -> Option<usize> {
        let mut dist = vec![usize::MAX; self.routers.len()];
        let mut queue = VecDeque::from([from]);
        dist[from.0] = 0;

        while let Some(current) = queue.pop_front() {
            if current == to {
                return Some(dist[current.0]);
            }
            for &neighbor in self.neighbors(current) {
                if dist[neighbor.0] == usize::MAX {
                    dist[neighbor.0] = dist[current.0] + 1;
                    queue.push_back(neighbor);
                }
            }
        }

        None
    }
}
