//! Interactive inspection session.
//!
//! Reads one command per line until `exit`, `quit` or end of input:
//!
//! - `nodes`: list hosts
//! - `net`: list each host's neighbours
//! - `dump`: list each host's addresses
//! - `<host> <command...>`: run a shell command inside a host

use crate::engine::EmulationEngine;
use crate::topology::Topology;
use log::debug;
use std::io::{self, BufRead, Write};

const PROMPT: &str = "topolab> ";

const HELP: &str = "\
Commands:
  nodes                 list hosts
  net                   list links per host
  dump                  list host addresses
  <host> <command...>   run a command inside a host
  help                  show this message
  exit | quit           leave the session";

/// Run the session until the user leaves. Host command failures are
/// reported and the session continues.
pub fn run_session<R: BufRead, W: Write>(
    engine: &mut dyn EmulationEngine,
    topology: &Topology,
    input: R,
    mut output: W,
) -> io::Result<()> {
    let mut lines = input.lines();
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line?;
        let line = line.trim();
        let Some((first, rest)) = split_command(line) else {
            continue;
        };

        match first {
            "exit" | "quit" => break,
            "help" => writeln!(output, "{}", HELP)?,
            "nodes" => {
                let ids: Vec<&str> = topology.hosts().iter().map(|h| h.node.id.as_str()).collect();
                writeln!(output, "available nodes are:\n{}", ids.join(" "))?;
            }
            "net" => {
                for host in topology.hosts() {
                    let neighbours = topology.neighbours(&host.node.id);
                    writeln!(output, "{} -> {}", host.node.id, neighbours.join(" "))?;
                }
            }
            "dump" => {
                for host in topology.hosts() {
                    write!(output, "{}: lo={}", host.node.id, host.node.loopback)?;
                    for link in topology.interfaces_of(&host.node.id) {
                        write!(output, " {}={}", link.interface_name(), link.address)?;
                    }
                    writeln!(output)?;
                }
            }
            id => match topology.host(id) {
                Some(host) if !rest.is_empty() => {
                    debug!("session: {} {}", id, rest);
                    match engine.execute(&host.handle, rest) {
                        Ok(text) => write!(output, "{}", text)?,
                        Err(e) => writeln!(output, "*** {}: {}", id, e)?,
                    }
                }
                Some(_) => writeln!(output, "*** usage: {} <command>", id)?,
                None => writeln!(output, "*** Unknown command: {}", line)?,
            },
        }
    }
    Ok(())
}

fn split_command(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((first, rest)) => Some((first, rest.trim())),
        None => Some((line, "")),
    }
}
