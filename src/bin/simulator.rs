//! Command-line front-end: builds a random topology and packet set, then
//! profiles all three routing strategies against them.

use rand::rngs::StdRng;
use rand::SeedableRng;
use routesim::config::{SetupError, SimConfig};
use routesim::{random_packets, simulate, LearningConfig, Network, Packet, Strategy};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Cycle cap applied to the learning strategy so a non-convergent run
/// cannot spin forever.
const LEARNING_CYCLE_LIMIT: u64 = 4000;

const BAR: &str =
    "--------------------------------------------------------------------------------";

const USAGE: &str = "\
Usage: simulator [ROUTERS LINKS PACKETS]
Where:
    ROUTERS the number of routers in the network.
    LINKS   the number of links between routers.
    PACKETS the number of packets to simulate.
";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() && args.len() != 3 {
        println!("{USAGE}");
        return;
    }

    let config = match SimConfig::from_args(&args) {
        Ok(config) => config,
        Err(err) => fail(err),
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(seed);

    info!(
        seed,
        routers = config.routers,
        links = config.links,
        packets = config.packets,
        "building the network"
    );

    let build_start = Instant::now();
    let mut network = Network::random(config.routers, config.links, &mut rng);
    info!(
        elapsed_ms = build_start.elapsed().as_secs_f64() * 1e3,
        links = network.link_count(),
        "network built"
    );

    if !network.is_connected() {
        fail(SetupError::DisconnectedNetwork);
    }

    let packets = random_packets(&network, config.packets, &mut rng);

    let strategies = [
        Strategy::Random,
        Strategy::Learning(LearningConfig {
            cycle_limit: Some(LEARNING_CYCLE_LIMIT),
            ..LearningConfig::default()
        }),
        Strategy::ShortestPath,
    ];

    for strategy in &strategies {
        profile(&mut network, &packets, strategy, &mut rng);
    }
}

fn profile(network: &mut Network, packets: &[Packet], strategy: &Strategy, rng: &mut StdRng) {
    let start = Instant::now();
    let result = simulate(network, packets, strategy, rng);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    println!("{BAR}");
    println!("Strategy:             {}", strategy.name());
    println!("Simulation wall time: {elapsed_ms:.1} ms");
    match result {
        Some(statistics) => println!("{statistics}"),
        None => println!(
            "Aborted: cycle cap exceeded before every packet was delivered."
        ),
    }
}

fn fail(err: SetupError) -> ! {
    error!("{err}");
    std::process::exit(err.exit_code());
}
