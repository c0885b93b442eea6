//! Command-line flags for the `tickview` server.
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--host` | `0.0.0.0` | Bind address |
//! | `--port` | `8050` | Bind port |
//! | `--debug` | `false` | Debug-level logging |
//! | `--window` | `TICKVIEW_WINDOW` or `3mo` | Lookback window (`90d`, `3mo`, `1y`) |
//! | `--offline` | `TICKVIEW_OFFLINE` or `false` | Serve synthetic history |
//!
//! Everything else comes from `TICKVIEW_*` environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use tickview_core::{DashboardConfig, LookbackWindow};

/// Stock Price Viewer: type a ticker, get its recent closing prices.
#[derive(Debug, Parser)]
#[command(name = "tickview", version, about = "Single-ticker stock price dashboard")]
pub struct Cli {
    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to bind.
    #[arg(long, default_value_t = 8050)]
    pub port: u16,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long)]
    pub debug: bool,

    /// Lookback window, overriding TICKVIEW_WINDOW.
    #[arg(long)]
    pub window: Option<LookbackWindow>,

    /// Serve deterministic synthetic history instead of calling the provider.
    #[arg(long)]
    pub offline: bool,
}

impl Cli {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Layers command-line overrides on top of the environment config.
    pub fn apply(&self, mut config: DashboardConfig) -> DashboardConfig {
        if let Some(window) = self.window {
            config.window = window;
        }
        if self.offline {
            config.offline = true;
        }
        config
    }
}
