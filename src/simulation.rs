//! The cycle scheduler: advances the whole network one cycle at a time until
//! every packet has reached its destination.
//!
//! Within a cycle the move election (one dequeue per non-empty router) fully
//! precedes the move application, so a packet can never traverse more than
//! one hop per cycle even though a router may receive in the same cycle it
//! sent. The whole simulator is single-threaded and synchronous; "cycle" is
//! simulated time.

use crate::network::{Network, RouterId};
use crate::packet::{Packet, PacketId};
use crate::stats::SimulationStatistics;
use crate::strategy::{Strategy, StrategyState};
use rand::rngs::StdRng;
use tracing::{debug, trace};

/// Everything a finished run exposes: the aggregate statistics plus the raw
/// per-packet histories and queue-length samples they were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub statistics: SimulationStatistics,
    /// `histories[p]`: routers occupied by packet `p`, one entry per cycle,
    /// with repeats for cycles the packet stalled.
    pub histories: Vec<Vec<RouterId>>,
    /// Queue length of every router at the start of every cycle, in network
    /// order, concatenated across cycles.
    pub queue_samples: Vec<usize>,
    pub cycles: u64,
}

/// Runs a full simulation and returns its statistics.
///
/// A fresh per-run state is constructed internally, so repeated calls with
/// the same strategy are independent; router queues are empty again when the
/// call returns. Yields `None` only for a learning run that exceeded its
/// cycle cap.
pub fn simulate(
    network: &mut Network,
    packets: &[Packet],
    strategy: &Strategy,
    rng: &mut StdRng,
) -> Option<SimulationStatistics> {
    simulate_report(network, packets, strategy, rng).map(|report| report.statistics)
}

/// Like [`simulate`], but also exposes histories and raw queue samples.
pub fn simulate_report(
    network: &mut Network,
    packets: &[Packet],
    strategy: &Strategy,
    rng: &mut StdRng,
) -> Option<SimulationReport> {
    assert!(!packets.is_empty(), "simulation requires at least one packet");
    for (index, packet) in packets.iter().enumerate() {
        assert_eq!(
            packet.id().index(),
            index,
            "packet ids must be dense and in list order",
        );
    }

    let state = strategy.new_state(network, rng);
    let mut run = SimulationRun::new(network, packets, state);

    while !run.undelivered.is_empty() {
        if let Some(limit) = run.state.cycle_limit() {
            if run.cycles > limit {
                debug!(
                    cycles = run.cycles,
                    limit,
                    stranded = run.undelivered.len(),
                    "cycle cap exceeded, aborting run"
                );
                network.clear_queues();
                return None;
            }
        }
        run.step(network, rng);
    }

    debug!(cycles = run.cycles, packets = packets.len(), "run complete");

    let statistics =
        SimulationStatistics::from_samples(&run.queue_samples, &run.histories, run.cycles);
    Some(SimulationReport {
        statistics,
        histories: run.histories,
        queue_samples: run.queue_samples,
        cycles: run.cycles,
    })
}

/// Mutable state of one run. Owns the histories and samples; borrows the
/// network only inside [`SimulationRun::step`].
struct SimulationRun<'a> {
    packets: &'a [Packet],
    histories: Vec<Vec<RouterId>>,
    undelivered: Vec<PacketId>,
    queue_samples: Vec<usize>,
    /// Starts at 1: the initial placement counts as cycle one.
    cycles: u64,
    state: StrategyState,
}

impl<'a> SimulationRun<'a> {
    fn new(network: &mut Network, packets: &'a [Packet], state: StrategyState) -> Self {
        let mut histories = vec![Vec::new(); packets.len()];

        for packet in packets {
            network.router_mut(packet.source()).enqueue(packet.id());
            histories[packet.id().index()].push(packet.source());
        }

        Self {
            packets,
            histories,
            undelivered: packets.iter().map(Packet::id).collect(),
            queue_samples: Vec::new(),
            cycles: 1,
            state,
        }
    }

    fn step(&mut self, network: &mut Network, rng: &mut StdRng) {
        // A: sample queue lengths, network order.
        for id in network.ids() {
            self.queue_samples.push(network.router(id).queue_len());
        }

        // B: elect moves. One dequeue per non-empty router; enqueueing is
        // deferred so a router sends at most once while receiving any
        // number.
        let mut moves: Vec<(PacketId, RouterId)> = Vec::new();
        for id in network.ids() {
            if network.router(id).queue_len() == 0 {
                continue;
            }
            let packet_id = network.router_mut(id).dequeue();
            let packet = &self.packets[packet_id.index()];
            let target = self.state.next_hop(network, id, packet, rng);
            moves.push((packet_id, target));
        }

        // C: apply every elected move.
        for &(packet_id, target) in &moves {
            network.router_mut(target).enqueue(packet_id);
        }

        // D: extend histories. Arrivals gain their new router once; stalled
        // packets repeat their current router.
        for id in network.ids() {
            for packet_id in network.router(id).queue() {
                self.histories[packet_id.index()].push(id);
            }
        }

        // Learning inspects the fresh histories before delivered packets
        // disappear.
        self.state.post_step(network, &self.histories, rng);

        // E: prune delivered packets from their destinations' queues.
        let packets = self.packets;
        let histories = &self.histories;
        self.undelivered.retain(|&packet_id| {
            let packet = &packets[packet_id.index()];
            let delivered =
                histories[packet_id.index()].last() == Some(&packet.destination());
            if delivered {
                network.router_mut(packet.destination()).remove(packet);
            }
            !delivered
        });

        // F: advance simulated time.
        self.cycles += 1;
        trace!(
            cycle = self.cycles,
            in_flight = self.undelivered.len(),
            "cycle complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PacketId;
    use crate::strategy::LearningConfig;
    use rand::SeedableRng;

    fn r(i: usize) -> RouterId {
        RouterId(i)
    }

    fn line(n: usize) -> Network {
        let mut network = Network::new(n);
        for i in 0..n - 1 {
            network.connect(r(i), r(i + 1));
        }
        network
    }

    #[test]
    fn single_hop_delivery_takes_two_cycles() {
        let mut network = line(2);
        let packets = vec![Packet::new(PacketId(0), r(0), r(1))];
        let mut rng = StdRng::seed_from_u64(0);

        let report =
            simulate_report(&mut network, &packets, &Strategy::ShortestPath, &mut rng)
                .unwrap();

        assert_eq!(report.cycles, 2);
        assert_eq!(report.histories[0], vec![r(0), r(1)]);
        assert_eq!(report.queue_samples, vec![1, 0]);
        assert_eq!(network.total_queued(), 0);
    }

    #[test]
    fn queues_are_empty_after_a_run_and_reruns_are_independent() {
        let mut network = line(4);
        let packets = vec![
            Packet::new(PacketId(0), r(0), r(3)),
            Packet::new(PacketId(1), r(3), r(0)),
        ];
        let mut rng = StdRng::seed_from_u64(5);

        let first = simulate(&mut network, &packets, &Strategy::ShortestPath, &mut rng)
            .unwrap();
        assert_eq!(network.total_queued(), 0);

        let second = simulate(&mut network, &packets, &Strategy::ShortestPath, &mut rng)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "at least one packet")]
    fn empty_packet_list_is_rejected() {
        let mut network = line(2);
        let mut rng = StdRng::seed_from_u64(0);
        let _ = simulate(&mut network, &[], &Strategy::Random, &mut rng);
    }

    #[test]
    #[should_panic(expected = "dense and in list order")]
    fn sparse_packet_ids_are_rejected() {
        let mut network = line(2);
        let packets = vec![Packet::new(PacketId(4), r(0), r(1))];
        let mut rng = StdRng::seed_from_u64(0);
        let _ = simulate(&mut network, &packets, &Strategy::Random, &mut rng);
    }

    #[test]
    fn cycle_cap_aborts_and_clears_queues() {
        // Distance 0 -> 7 is seven hops; with neighbor-restricted dispatch a
        // packet advances at most one hop per cycle, so a cap of 5 can never
        // be met.
        let mut network = line(8);
        let packets = vec![Packet::new(PacketId(0), r(0), r(7))];
        let strategy = Strategy::Learning(LearningConfig {
            cycle_limit: Some(5),
            init_to_neighbors_only: true,
        });
        let mut rng = StdRng::seed_from_u64(99);

        assert!(simulate(&mut network, &packets, &strategy, &mut rng).is_none());
        assert_eq!(network.total_queued(), 0);
    }
}
