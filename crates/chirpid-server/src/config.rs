use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, bail};
use chirpid::{LockSnowflakeGenerator, MachineId, MonotonicClock, SystemClock, TimeSource};
use clap::{Parser, ValueEnum};

/// Runtime configuration for the `chirpid-server` binary.
///
/// Every value can come from a CLI flag or an environment variable (a `.env`
/// file is loaded first). The machine ID is read once at startup and never
/// changes for the life of the process.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chirpid-server",
    version,
    about = "An HTTP service for Snowflake-style 64-bit IDs"
)]
pub struct CliArgs {
    /// Machine ID stamped into every issued ID, in `0..=1023`.
    ///
    /// Must be unique among all processes issuing IDs at the same time. Two
    /// processes sharing a machine ID can issue duplicates, and nothing here
    /// can detect it.
    ///
    /// Environment variable: `MACHINE_ID`
    #[arg(long, env = "MACHINE_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub machine_id: i64,

    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8001"))]
    pub server_addr: String,

    /// Clock the generator reads.
    ///
    /// `system` reads the wall clock on every request and rejects requests
    /// while it is behind the last issued ID. `monotonic` anchors to the wall
    /// clock once at startup and never moves backward.
    ///
    /// Environment variable: `CLOCK`
    #[arg(long, env = "CLOCK", value_enum, default_value_t = ClockKind::System)]
    pub clock: ClockKind,

    /// Log output format.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    System,
    Monotonic,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub machine_id: MachineId,
    pub server_addr: SocketAddr,
    pub clock: ClockKind,
    pub log_format: LogFormat,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let machine_id = MachineId::new(args.machine_id).context("invalid MACHINE_ID")?;

        let Ok(server_addr) = args.server_addr.parse::<SocketAddr>() else {
            bail!(
                "SERVER_ADDR ({}) is not a valid socket address",
                args.server_addr
            );
        };

        Ok(Self {
            machine_id,
            server_addr,
            clock: args.clock,
            log_format: args.log_format,
        })
    }
}

impl ServerConfig {
    /// Builds the process-wide generator. Call once; clones share state.
    pub fn generator(&self) -> anyhow::Result<Generator> {
        let clock = Clock::from_kind(self.clock).context("failed to start the clock")?;
        Ok(LockSnowflakeGenerator::new(self.machine_id, clock))
    }
}

/// The clock selected by `--clock`.
#[derive(Debug, Clone)]
pub enum Clock {
    System(SystemClock),
    Monotonic(MonotonicClock),
}

impl Clock {
    pub fn from_kind(kind: ClockKind) -> chirpid::Result<Self> {
        Ok(match kind {
            ClockKind::System => Self::System(SystemClock::default()),
            ClockKind::Monotonic => Self::Monotonic(MonotonicClock::new()?),
        })
    }
}

impl TimeSource for Clock {
    fn current_millis(&self) -> chirpid::Result<u64> {
        match self {
            Self::System(clock) => clock.current_millis(),
            Self::Monotonic(clock) => clock.current_millis(),
        }
    }

    fn epoch(&self) -> Duration {
        match self {
            Self::System(clock) => clock.epoch(),
            Self::Monotonic(clock) => clock.epoch(),
        }
    }
}

/// Generator used by the server.
pub type Generator = LockSnowflakeGenerator<Clock>;
