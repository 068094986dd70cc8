//! `simulate` handler: run the station controller against the in-process radio.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use wifista_core::{IpInfo, Outcome, SimPlatform, Station};

use crate::cli::{GlobalOpts, SimulateArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Result of a successful simulated connection.
#[derive(Debug, Serialize)]
struct ConnectReport {
    ssid: String,
    state: Outcome,
    ip: Option<String>,
    netmask: Option<String>,
    gateway: Option<String>,
    reconnect_count: u32,
    connect_requests: u32,
}

impl ConnectReport {
    fn new(station: &Station<SimPlatform>, platform: &SimPlatform) -> Self {
        let ip_info: Option<IpInfo> = station.ip_info();
        Self {
            ssid: station.ssid().to_string(),
            state: station.outcome(),
            ip: ip_info.map(|i| i.ip.to_string()),
            netmask: ip_info.map(|i| i.netmask.to_string()),
            gateway: ip_info.map(|i| i.gateway.to_string()),
            reconnect_count: station.reconnect_count(),
            connect_requests: platform.connect_requests(),
        }
    }

    fn detail(&self, color: bool) -> String {
        let dash = || "-".to_string();
        output::render_detail(&[
            ("SSID", self.ssid.clone()),
            (
                "State",
                output::status(&self.state.to_string(), self.state == Outcome::Connected, color),
            ),
            ("IP", self.ip.clone().unwrap_or_else(dash)),
            ("Netmask", self.netmask.clone().unwrap_or_else(dash)),
            ("Gateway", self.gateway.clone().unwrap_or_else(dash)),
            ("Reconnects", self.reconnect_count.to_string()),
            ("Connect requests", self.connect_requests.to_string()),
        ])
    }
}

pub async fn handle(args: SimulateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = wifista_config::load_config_or_default();
    let station_config = config::station_config(global, &cfg, &args)?;

    let mut builder = SimPlatform::builder()
        .attempts(args.attempts.iter().copied())
        .fallback(args.fallback)
        .channel(args.channel)
        .latency(Duration::from_millis(args.latency_ms));
    if let Some(fault) = args.fail_at {
        builder = builder.fail(
            fault,
            wifista_core::DriverError::fail(format!("injected failure at {fault}")),
        );
    }
    let platform = Arc::new(builder.build());

    debug!(
        attempts = ?args.attempts.iter().map(ToString::to_string).collect::<Vec<_>>(),
        fallback = %args.fallback,
        "simulated radio ready"
    );

    let station = Station::connect(Arc::clone(&platform), station_config).await?;
    let report = ConnectReport::new(&station, &platform);
    station.shutdown();

    let color = output::should_color(&config::color_mode(global, &cfg));
    let out = output::render_single(
        &config::output_format(global, &cfg),
        &report,
        |r| r.detail(color),
        |r| r.ip.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
