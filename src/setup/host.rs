use super::run;
use crate::commands;
use crate::engine::EmulationEngine;
use crate::error::Result;
use crate::topology::{AddressFamily, HostEntry, Topology};
use log::info;

/// Enable global and loopback forwarding on one host.
pub fn configure_forwarding(engine: &mut dyn EmulationEngine, host: &HostEntry) -> Result<()> {
    for command in commands::GLOBAL_FORWARDING
        .iter()
        .chain(commands::LOOPBACK_FORWARDING.iter())
    {
        run(engine, &host.handle, command)?;
    }
    Ok(())
}

/// Assign the loopback address, then forwarding and address of every
/// interface the host owns, in link-file order.
pub fn configure_addresses(
    engine: &mut dyn EmulationEngine,
    topology: &Topology,
    host: &HostEntry,
    family: AddressFamily,
) -> Result<()> {
    let command = commands::add_address(family, &host.node.loopback, "lo");
    info!("{} {}", host.node.id, command);
    run(engine, &host.handle, &command)?;

    for link in topology.interfaces_of(&host.node.id) {
        let iface = link.interface_name();
        for command in commands::interface_forwarding(&iface) {
            run(engine, &host.handle, &command)?;
        }

        let command = commands::add_address(family, &link.address, &iface);
        info!("{} {} (peer {} at {})", host.node.id, command, link.peer, link.peer_loopback);
        run(engine, &host.handle, &command)?;
    }
    Ok(())
}

/// Forwarding then addressing for every host, in node-file order.
pub fn configure_hosts(
    engine: &mut dyn EmulationEngine,
    topology: &Topology,
    family: AddressFamily,
) -> Result<()> {
    info!("Configuring {} hosts for {}", topology.hosts().len(), family);
    for host in topology.hosts() {
        configure_forwarding(engine, host)?;
        configure_addresses(engine, topology, host, family)?;
    }
    Ok(())
}
