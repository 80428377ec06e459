//! Integration tests for the apply/teardown lifecycle.
//!
//! These tests drive the CLI and the lifecycle functions against `FakeHost`,
//! an in-memory model of the kernel state the `ip` commands touch:
//! 1. Tunnels, addresses and routes appear and disappear as on Linux
//! 2. Deleting a missing tunnel exits 1, as iproute2 does
//! 3. Every command line is recorded for order checks

use std::collections::BTreeSet;
use std::io;
use std::sync::Mutex;

use clap::Parser;
use sixrd::commands::Cli;
use sixrd::config::Settings;
use sixrd::exec::{CommandOutput, CommandRunner, Executor};
use sixrd::lifecycle::{self, Lease};

const WAN: &str = "203.0.113.5";
const OPTIONS: &str = "0 32 2001:db8:: 198.51.100.1";

#[derive(Debug, Default)]
struct HostState {
    links: BTreeSet<String>,
    tunnels: BTreeSet<String>,
    up: BTreeSet<String>,
    /// (device, address)
    addresses: BTreeSet<(String, String)>,
    /// (destination, device)
    routes: BTreeSet<(String, String)>,
    log: Vec<String>,
}

impl HostState {
    fn has_device(&self, dev: &str) -> bool {
        self.links.contains(dev) || self.tunnels.contains(dev)
    }
}

/// In-memory host answering `ip` commands.
struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    fn new(links: &[&str]) -> Self {
        let state = HostState {
            links: links.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }

    fn has_tunnel(&self, name: &str) -> bool {
        self.state.lock().unwrap().tunnels.contains(name)
    }

    fn is_up(&self, name: &str) -> bool {
        self.state.lock().unwrap().up.contains(name)
    }

    fn has_address(&self, dev: &str, addr: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .addresses
            .contains(&(dev.to_string(), addr.to_string()))
    }

    fn has_route(&self, dest: &str, dev: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .routes
            .contains(&(dest.to_string(), dev.to_string()))
    }

    fn is_clean(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.tunnels.is_empty() && state.addresses.is_empty() && state.routes.is_empty()
    }
}

fn fail(status: i32, stderr: &str) -> CommandOutput {
    CommandOutput::exited(status, stderr)
}

impl CommandRunner for FakeHost {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        assert_eq!(program, "ip");

        let mut state = self.state.lock().unwrap();
        state.log.push(format!("{} {}", program, args.join(" ")));

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = match args.as_slice() {
            ["tunnel", "add", name, "mode", "sit", "local", _, "ttl", _] => {
                if !state.tunnels.insert(name.to_string()) {
                    fail(1, "add tunnel failed: File exists")
                } else {
                    CommandOutput::ok()
                }
            }
            ["tunnel", "6rd", "dev", name, "6rd-prefix", _] => {
                if state.tunnels.contains(*name) {
                    CommandOutput::ok()
                } else {
                    fail(1, "No such device")
                }
            }
            ["tunnel", "del", name] => {
                if state.tunnels.remove(*name) {
                    state.up.remove(*name);
                    state.addresses.retain(|(dev, _)| dev != name);
                    state.routes.retain(|(_, dev)| dev != name);
                    CommandOutput::ok()
                } else {
                    fail(1, "delete tunnel failed: No such device")
                }
            }
            ["addr", "add", addr, "dev", dev] => {
                if !state.has_device(dev) {
                    fail(1, "Cannot find device")
                } else if !state.addresses.insert((dev.to_string(), addr.to_string())) {
                    fail(2, "RTNETLINK answers: File exists")
                } else {
                    CommandOutput::ok()
                }
            }
            ["addr", "del", addr, "dev", dev] => {
                if state.addresses.remove(&(dev.to_string(), addr.to_string())) {
                    CommandOutput::ok()
                } else {
                    fail(2, "RTNETLINK answers: Cannot assign requested address")
                }
            }
            ["link", "set", "mtu", _, "dev", dev] => {
                if state.has_device(dev) {
                    CommandOutput::ok()
                } else {
                    fail(1, "Cannot find device")
                }
            }
            ["link", "set", dev, "up"] => {
                if state.has_device(dev) {
                    state.up.insert(dev.to_string());
                    CommandOutput::ok()
                } else {
                    fail(1, "Cannot find device")
                }
            }
            ["route", "add", "blackhole", net, "metric", _] => {
                if state.routes.insert((net.to_string(), "lo".to_string())) {
                    CommandOutput::ok()
                } else {
                    fail(2, "RTNETLINK answers: File exists")
                }
            }
            ["route", "add", "default", "via", _, "dev", dev] => {
                if !state.up.contains(*dev) {
                    fail(2, "RTNETLINK answers: Network is down")
                } else if state.routes.insert(("default".to_string(), dev.to_string())) {
                    CommandOutput::ok()
                } else {
                    fail(2, "RTNETLINK answers: File exists")
                }
            }
            ["route", "del", net, "dev", dev] => {
                if state.routes.remove(&(net.to_string(), dev.to_string())) {
                    CommandOutput::ok()
                } else {
                    fail(2, "RTNETLINK answers: No such process")
                }
            }
            other => panic!("unexpected ip invocation: {:?}", other),
        };

        Ok(output)
    }
}

fn run_cli(host: &FakeHost, args: &[&str]) -> anyhow::Result<()> {
    let cli = Cli::try_parse_from(std::iter::once("sixrd").chain(args.iter().copied()))?;
    cli.run_with(&Executor::new(host))
}

#[test]
fn test_apply_configures_host() {
    let host = FakeHost::new(&["lo", "eth0"]);
    let executor = Executor::new(&host);

    let config = lifecycle::apply(&executor, &Settings::default(), &Lease::new(WAN, OPTIONS), 1480)
        .unwrap();

    assert_eq!(config.gateway.to_string(), "::198.51.100.1");
    assert_eq!(config.tunnel_prefix, "2001:db8::/32");
    assert_eq!(config.full_subnet.to_string(), "2001:db8:cb00:7105::/64");

    assert!(host.has_tunnel("ipv6rd"));
    assert!(host.is_up("ipv6rd"));
    assert!(host.has_address("ipv6rd", "2001:db8:cb00:7105::1/128"));
    assert!(host.has_route("2001:db8:cb00:7105::/64", "lo"));
    assert!(host.has_route("default", "ipv6rd"));
}

#[test]
fn test_round_trip_without_lan() {
    let host = FakeHost::new(&["lo", "eth0"]);

    run_cli(&host, &["apply", "--ip", WAN, "--options", OPTIONS]).unwrap();
    run_cli(&host, &["teardown", "--ip", WAN, "--options", OPTIONS]).unwrap();

    assert!(host.is_clean());
}

#[test]
fn test_round_trip_with_lan() {
    let host = FakeHost::new(&["lo", "eth0", "eth1"]);

    run_cli(
        &host,
        &["apply", "--lan-interface", "eth1", "--ip", WAN, "--options", OPTIONS],
    )
    .unwrap();
    assert!(host.has_address("eth1", "2001:db8:cb00:7105::1/64"));
    assert!(!host.has_route("2001:db8:cb00:7105::/64", "lo"));

    run_cli(
        &host,
        &["teardown", "--lan-interface", "eth1", "--ip", WAN, "--options", OPTIONS],
    )
    .unwrap();
    assert!(host.is_clean());
}

#[test]
fn test_round_trip_with_lan_and_wide_subnet() {
    let host = FakeHost::new(&["lo", "eth0", "eth1"]);
    let options = "0 24 2001:db8:: 198.51.100.1";

    run_cli(
        &host,
        &["start", "--lan-interface", "eth1", "--ip", WAN, "--options", options],
    )
    .unwrap();
    assert!(host.has_route("2001:dcb:71:500::/56", "lo"));
    assert!(host.has_address("eth1", "2001:dcb:71:500::1/64"));

    run_cli(
        &host,
        &["stop", "--lan-interface", "eth1", "--ip", WAN, "--options", options],
    )
    .unwrap();
    assert!(host.is_clean());
}

#[test]
fn test_repeated_teardown_succeeds() {
    let host = FakeHost::new(&["lo", "eth0"]);

    run_cli(&host, &["apply", "--ip", WAN, "--options", OPTIONS]).unwrap();
    run_cli(&host, &["teardown", "--ip", WAN, "--options", OPTIONS]).unwrap();

    host.clear_log();
    run_cli(&host, &["teardown"]).unwrap();
    run_cli(&host, &["teardown"]).unwrap();

    assert_eq!(
        host.log(),
        vec!["ip tunnel del ipv6rd", "ip tunnel del ipv6rd"]
    );
    assert!(host.is_clean());
}

#[test]
fn test_teardown_without_context_only_deletes_tunnel() {
    let host = FakeHost::new(&["lo", "eth0", "eth1"]);

    run_cli(
        &host,
        &["apply", "--lan-interface", "eth1", "--ip", WAN, "--options", OPTIONS],
    )
    .unwrap();
    host.clear_log();

    run_cli(&host, &["teardown", "--lan-interface", "eth1"]).unwrap();

    assert_eq!(host.log(), vec!["ip tunnel del ipv6rd"]);
    assert!(!host.has_tunnel("ipv6rd"));
    // LAN address stays, nothing told us which one it was
    assert!(host.has_address("eth1", "2001:db8:cb00:7105::1/64"));
}

#[test]
fn test_teardown_uses_old_lease() {
    let host = FakeHost::new(&["lo", "eth0"]);

    run_cli(&host, &["apply", "--ip", WAN, "--options", OPTIONS]).unwrap();
    host.clear_log();

    // The new lease has a different address; teardown is handed the old one
    run_cli(&host, &["teardown", "--ip", WAN, "--options", OPTIONS]).unwrap();
    run_cli(
        &host,
        &["apply", "--ip", "203.0.113.77", "--options", OPTIONS],
    )
    .unwrap();

    assert!(!host.has_route("2001:db8:cb00:7105::/64", "lo"));
    assert!(host.has_route("2001:db8:cb00:714d::/64", "lo"));
    assert!(host.has_address("ipv6rd", "2001:db8:cb00:714d::1/128"));
}

#[test]
fn test_malformed_option_runs_no_commands() {
    let host = FakeHost::new(&["lo", "eth0"]);

    let err = run_cli(&host, &["apply", "--ip", WAN, "--options", "0 32 2001:db8::"]).unwrap_err();
    let err = err.downcast_ref::<sixrd::SixrdError>().unwrap();

    assert_eq!(err.reason_code(), "decode_failed");
    assert!(host.log().is_empty());
}

#[test]
fn test_teardown_with_malformed_old_option() {
    let host = FakeHost::new(&["lo", "eth0"]);

    run_cli(&host, &["apply", "--ip", WAN, "--options", OPTIONS]).unwrap();
    host.clear_log();

    let err = run_cli(&host, &["teardown", "--ip", WAN, "--options", "garbage"]).unwrap_err();
    let err = err.downcast_ref::<sixrd::SixrdError>().unwrap();

    // The tunnel is already gone when the old option fails to decode
    assert_eq!(err.reason_code(), "decode_failed");
    assert_eq!(host.log(), vec!["ip tunnel del ipv6rd"]);
    assert!(!host.has_tunnel("ipv6rd"));
    assert!(host.has_route("2001:db8:cb00:7105::/64", "lo"));
}

#[test]
fn test_invalid_wan_address_runs_no_commands() {
    let host = FakeHost::new(&["lo", "eth0"]);

    let err = run_cli(&host, &["apply", "--ip", "not-an-ip", "--options", OPTIONS]).unwrap_err();

    assert!(err.to_string().contains("not-an-ip"));
    assert!(host.log().is_empty());
}

#[test]
fn test_apply_over_existing_tunnel_is_fatal() {
    let host = FakeHost::new(&["lo", "eth0"]);

    run_cli(&host, &["apply", "--ip", WAN, "--options", OPTIONS]).unwrap();
    host.clear_log();

    let err = run_cli(&host, &["apply", "--ip", WAN, "--options", OPTIONS]).unwrap_err();

    assert!(err
        .to_string()
        .starts_with("failed to execute: ip tunnel add ipv6rd mode sit local 203.0.113.5 ttl 64"));
    assert_eq!(host.log().len(), 1);
}

#[test]
fn test_custom_tunnel_name_and_discard_device() {
    let host = FakeHost::new(&["lo", "eth0"]);

    run_cli(
        &host,
        &["apply", "--sixrd-interface", "sit6rd", "--ip", WAN, "--options", OPTIONS],
    )
    .unwrap();
    assert!(host.has_tunnel("sit6rd"));

    // A discard device that does not match where the route lives fails removal
    let err = run_cli(
        &host,
        &[
            "teardown",
            "--sixrd-interface",
            "sit6rd",
            "--discard-device",
            "eth0",
            "--ip",
            WAN,
            "--options",
            OPTIONS,
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("ip route del 2001:db8:cb00:7105::/64 dev eth0"));
    assert!(!host.has_tunnel("sit6rd"));
}
