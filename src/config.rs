//! Run parameters for the command-line front-end.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ROUTERS: usize = 50;
pub const DEFAULT_LINKS: usize = 350;
pub const DEFAULT_PACKETS: usize = 1000;

pub const MINIMUM_ROUTERS: i64 = 1;
pub const MINIMUM_LINKS: i64 = 1;
pub const MINIMUM_PACKETS: i64 = 1;

/// Topology and workload parameters of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub routers: usize,
    pub links: usize,
    pub packets: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            routers: DEFAULT_ROUTERS,
            links: DEFAULT_LINKS,
            packets: DEFAULT_PACKETS,
        }
    }
}

impl SimConfig {
    /// Parses `[ROUTERS LINKS PACKETS]`. An empty slice yields the
    /// defaults; otherwise exactly three tokens are expected, each a
    /// positive integer. The caller handles other argument counts (usage
    /// text) before calling this.
    pub fn from_args(args: &[String]) -> Result<Self, SetupError> {
        if args.is_empty() {
            return Ok(Self::default());
        }

        let routers = args[0]
            .parse::<i64>()
            .map_err(|_| SetupError::BadRoutersToken(args[0].clone()))?;
        if routers < MINIMUM_ROUTERS {
            return Err(SetupError::TooFewRouters(routers));
        }

        let links = args[1]
            .parse::<i64>()
            .map_err(|_| SetupError::BadLinksToken(args[1].clone()))?;
        if links < MINIMUM_LINKS {
            return Err(SetupError::TooFewLinks(links));
        }

        let packets = args[2]
            .parse::<i64>()
            .map_err(|_| SetupError::BadPacketsToken(args[2].clone()))?;
        if packets < MINIMUM_PACKETS {
            return Err(SetupError::TooFewPackets(packets));
        }

        Ok(Self {
            routers: routers as usize,
            links: links as usize,
            packets: packets as usize,
        })
    }
}

/// Fatal setup failures, each mapped to a dedicated process exit code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("cannot parse the number of routers: {0:?}")]
    BadRoutersToken(String),
    #[error("the number of routers is too small ({0}), must be at least {}", MINIMUM_ROUTERS)]
    TooFewRouters(i64),
    #[error("cannot parse the number of links: {0:?}")]
    BadLinksToken(String),
    #[error("the number of links is too small ({0}), must be at least {}", MINIMUM_LINKS)]
    TooFewLinks(i64),
    #[error("cannot parse the number of packets: {0:?}")]
    BadPacketsToken(String),
    #[error("the number of packets is too small ({0}), must be at least {}", MINIMUM_PACKETS)]
    TooFewPackets(i64),
    #[error("the generated network is disconnected")]
    DisconnectedNetwork,
}

impl SetupError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::BadRoutersToken(_) => 1,
            SetupError::TooFewRouters(_) => 2,
            SetupError::BadLinksToken(_) => 3,
            SetupError::TooFewLinks(_) => 4,
            SetupError::BadPacketsToken(_) => 5,
            SetupError::TooFewPackets(_) => 6,
            SetupError::DisconnectedNetwork => 7,
        }
    }
}
