//! routesim: a discrete-cycle packet-routing simulator over random
//! undirected graphs.
//!
//! The network advances in lockstep cycles: per cycle each router sends at
//! most one packet from its FIFO queue and receives any number. Three
//! routing strategies (uniform-random neighbor, all-pairs shortest path,
//! and history-driven learning with loop detection) can be run against the
//! same topology and packet set, and each run yields aggregate statistics
//! over queue lengths and delivery durations.
//!
//! Every random draw routes through a single caller-seeded generator, so a
//! full run is reproducible from its seed.

pub mod config;
pub mod network;
pub mod packet;
pub mod simulation;
pub mod stats;
pub mod strategy;

pub use network::{Network, Router, RouterId};
pub use packet::{random_packets, Packet, PacketId};
pub use simulation::{simulate, simulate_report, SimulationReport};
pub use stats::{SampleSummary, SimulationStatistics};
pub use strategy::{LearningConfig, Strategy};
