//! Routing strategies: how a router picks the next hop for the packet it is
//! about to send.
//!
//! A [`Strategy`] value only selects and configures a heuristic; the mutable
//! tables live in a per-run [`StrategyState`] built inside the simulation,
//! so one `Strategy` can drive any number of independent runs.

use crate::network::{Network, RouterId};
use crate::packet::Packet;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Selects which routing heuristic drives a simulation run.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Forward to a uniformly random neighbor.
    Random,
    /// Forward along a precomputed all-pairs shortest path.
    ShortestPath,
    /// Start from random guesses and learn shorter paths from the histories
    /// of packets passing through.
    Learning(LearningConfig),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::ShortestPath => "shortest-path",
            Strategy::Learning(_) => "learning",
        }
    }

    /// Builds the per-run state, running any precomputation (dispatch
    /// tables) before the first cycle.
    pub(crate) fn new_state(&self, network: &Network, rng: &mut StdRng) -> StrategyState {
        match self {
            Strategy::Random => StrategyState::Random,
            Strategy::ShortestPath => StrategyState::ShortestPath {
                dispatch: shortest_path_table(network),
            },
            Strategy::Learning(config) => {
                StrategyState::Learning(LearningState::new(network, config.clone(), rng))
            }
        }
    }
}

/// Tuning knobs for the learning strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Abort the run once the cycle counter exceeds this value, clearing all
    /// queues and yielding no statistics. `None` disables the cap.
    pub cycle_limit: Option<u64>,
    /// Draw initial guesses and loop-recovery rerandomizations from the
    /// current router's neighbors instead of the whole network. The original
    /// behavior (`false`) treats dispatch as an abstraction and may send a
    /// packet to a non-adjacent router.
    pub init_to_neighbors_only: bool,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            cycle_limit: None,
            init_to_neighbors_only: false,
        }
    }
}

/// Two-level next-hop table: `table[s][d]` is where router `s` forwards a
/// packet destined for `d`.
type DispatchTable = Vec<Vec<Option<RouterId>>>;

/// Per-run mutable state of a strategy.
pub(crate) enum StrategyState {
    Random,
    ShortestPath { dispatch: DispatchTable },
    Learning(LearningState),
}

impl StrategyState {
    /// Picks the router that must receive `packet` this cycle. The current
    /// router is guaranteed to have at least one neighbor.
    pub(crate) fn next_hop(
        &self,
        network: &Network,
        current: RouterId,
        packet: &Packet,
        rng: &mut StdRng,
    ) -> RouterId {
        match self {
            StrategyState::Random => {
                let neighbors = network.neighbors(current);
                neighbors[rng.gen_range(0..neighbors.len())]
            }
            StrategyState::ShortestPath { dispatch } => dispatch[current.index()]
                [packet.destination().index()]
            .unwrap_or_else(|| {
                panic!(
                    "no path from router {current} to router {}",
                    packet.destination()
                )
            }),
            StrategyState::Learning(state) => {
                state.next_hop[current.index()][packet.destination().index()]
                    .expect("learning dispatch table is total for distinct endpoints")
            }
        }
    }

    /// Per-cycle hook between history extension and delivery pruning. Only
    /// the learning strategy does anything here.
    pub(crate) fn post_step(
        &mut self,
        network: &Network,
        histories: &[Vec<RouterId>],
        rng: &mut StdRng,
    ) {
        if let StrategyState::Learning(state) = self {
            state.observe(network, histories, rng);
        }
    }

    pub(crate) fn cycle_limit(&self) -> Option<u64> {
        match self {
            StrategyState::Learning(state) => state.config.cycle_limit,
            _ => None,
        }
    }
}

/// Runs breadth-first search from `source` and records each visited
/// router's parent. Visitation follows neighbor-insertion order, which is
/// how shortest-path ties are broken.
fn bfs_parents(network: &Network, source: RouterId) -> Vec<Option<RouterId>> {
    let mut parents = vec![None; network.len()];
    let mut visited = vec![false; network.len()];
    let mut queue = VecDeque::from([source]);
    visited[source.index()] = true;

    while let Some(current) = queue.pop_front() {
        for &neighbor in network.neighbors(current) {
            if !visited[neighbor.index()] {
                visited[neighbor.index()] = true;
                parents[neighbor.index()] = Some(current);
                queue.push_back(neighbor);
            }
        }
    }

    parents
}

/// Walks the parent chain from `target` back to `source` and returns the
/// first hop out of `source`, or `None` when `target` is unreachable.
fn first_hop(
    source: RouterId,
    target: RouterId,
    parents: &[Option<RouterId>],
) -> Option<RouterId> {
    let mut current = target;
    while let Some(parent) = parents[current.index()] {
        if parent == source {
            return Some(current);
        }
        current = parent;
    }
    None
}

/// All-pairs dispatch table from per-source BFS trees. Unreachable pairs are
/// left empty; dispatching across components is undefined and fails fast.
fn shortest_path_table(network: &Network) -> DispatchTable {
    let mut table = vec![vec![None; network.len()]; network.len()];

    for source in network.ids() {
        let parents = bfs_parents(network, source);
        for target in network.ids() {
            if target == source {
                continue;
            }
            table[source.index()][target.index()] = first_hop(source, target, &parents);
        }
    }

    table
}

/// Distance placeholder before any observation.
const UNKNOWN: u64 = u64::MAX;

/// Per-run tables of the learning strategy.
///
/// Each router starts with a blind random guess per destination. As packets
/// arrive carrying their traversal history, the router learns shorter paths
/// to every router it has seen, and escapes two-hop oscillations by
/// forgetting and rerandomizing the affected entries.
pub(crate) struct LearningState {
    config: LearningConfig,
    /// `next_hop[s][d]`, populated for every `d != s`.
    next_hop: DispatchTable,
    /// `distance[s][d]` in observed hops; `UNKNOWN` until first observation.
    distance: Vec<Vec<u64>>,
}

impl LearningState {
    fn new(network: &Network, config: LearningConfig, rng: &mut StdRng) -> Self {
        let mut next_hop: DispatchTable = vec![vec![None; network.len()]; network.len()];
        let mut distance = vec![vec![UNKNOWN; network.len()]; network.len()];

        for source in network.ids() {
            distance[source.index()][source.index()] = 0;
            for target in network.ids() {
                if target != source {
                    next_hop[source.index()][target.index()] =
                        Some(random_guess(network, source, &config, rng));
                }
            }
        }

        Self {
            config,
            next_hop,
            distance,
        }
    }

    /// Per-cycle learning pass: every router inspects the history of every
    /// packet currently queued at it.
    fn observe(&mut self, network: &Network, histories: &[Vec<RouterId>], rng: &mut StdRng) {
        for router in network.ids() {
            for packet in network.router(router).queue() {
                let compressed = compress_history(&histories[packet.index()]);
                self.learn_from(network, router, &compressed, rng);
            }
        }
    }

    /// Digests one compressed history whose tail is `router`.
    fn learn_from(
        &mut self,
        network: &Network,
        router: RouterId,
        history: &[RouterId],
        rng: &mut StdRng,
    ) {
        let k = history.len();

        // A tail of the form A, B, A is a two-hop loop: forget everything
        // this history taught and start guessing again for every router on
        // the looping path.
        if k >= 3 && history[k - 3] == history[k - 1] && history[k - 2] != history[k - 1] {
            for &seen in history {
                if seen != router {
                    self.distance[router.index()][seen.index()] = UNKNOWN;
                    self.next_hop[router.index()][seen.index()] =
                        Some(random_guess(network, router, &self.config, rng));
                }
            }
            return;
        }

        if k < 2 {
            // Packet still at its source; nothing to learn from.
            return;
        }

        // The router just before us on the observed path becomes the next
        // hop back toward any router the path visited, whenever the observed
        // hop count improves on what we knew.
        let previous = history[k - 2];
        for (i, &seen) in history.iter().enumerate() {
            if seen == router {
                continue;
            }
            let hops = (k - i - 1) as u64;
            if hops < self.distance[router.index()][seen.index()] {
                self.distance[router.index()][seen.index()] = hops;
                self.next_hop[router.index()][seen.index()] = Some(previous);
            }
        }
    }
}

/// Uniformly random dispatch guess for `source`: any other router in the
/// network, or one of its neighbors under `init_to_neighbors_only`.
fn random_guess(
    network: &Network,
    source: RouterId,
    config: &LearningConfig,
    rng: &mut StdRng,
) -> RouterId {
    if config.init_to_neighbors_only {
        let neighbors = network.neighbors(source);
        neighbors[rng.gen_range(0..neighbors.len())]
    } else {
        loop {
            let candidate = RouterId(rng.gen_range(0..network.len()));
            if candidate != source {
                return candidate;
            }
        }
    }
}

/// Collapses runs of identical consecutive entries, so stall cycles do not
/// inflate observed hop distances.
pub(crate) fn compress_history(history: &[RouterId]) -> Vec<RouterId> {
    let mut compressed: Vec<RouterId> = Vec::with_capacity(history.len());
    for &router in history {
        if compressed.last() != Some(&router) {
            compressed.push(router);
        }
    }
    compressed
}
