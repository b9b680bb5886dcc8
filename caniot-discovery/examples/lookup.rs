//! Locate a caniot controller on the local network

use std::net::Ipv4Addr;

use caniot_discovery::DiscoveryClient;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> caniot_discovery::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    // Broadcast unless a target is given
    let target = match std::env::var("CANIOT_TARGET") {
        Ok(ip) => match ip.parse::<Ipv4Addr>() {
            Ok(ip) => ip,
            Err(e) => {
                warn!("Ignoring CANIOT_TARGET={:?} ({}), broadcasting instead", ip, e);
                Ipv4Addr::BROADCAST
            }
        },
        Err(_) => Ipv4Addr::BROADCAST,
    };

    let client = DiscoveryClient::new();

    let discovery = client.lookup_at(target).await?;

    println!("{} : parse = {{ip: {}}}", discovery, discovery.controller.ip());
    println!("\t REST server http://{}", discovery.peer.ip());

    Ok(())
}
