//! Runs the `nxcli` binary against a mock device.

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::json;

use server::*;

fn nxcli(server: &MockServer, cli: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nxcli"));
    cmd.arg("-host")
        .arg("127.0.0.1")
        .arg("-port")
        .arg(server.port().to_string())
        .arg("-proto")
        .arg("http")
        .arg("-user")
        .arg(USERNAME)
        .arg("-pass")
        .arg(PASSWORD)
        .arg("-log.level")
        .arg("off")
        .arg("-cli")
        .arg(cli);
    cmd
}

#[test]
fn show_version_prints_four_lines() {
    let server = MockServer::start();
    let mock = expect_batch(&server, "cli", &["show version"], 1, &ok_body(1, version_body()));

    let assert = nxcli(&server, "show version").assert().success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Hostname: nx-01\n"));
    assert!(output.contains("Processor Board ID: FOX\n"));
    assert!(output.contains("Kickstart Image Version: 9.3(5)\n"));
    assert!(output.contains("Uptime: 12345\n"));
    mock.assert();
}

#[test]
fn show_vlan_prints_in_order() {
    let server = MockServer::start();
    let mock = expect_batch(&server, "cli", &["show vlan"], 1, &ok_body(1, vlan_body()));

    nxcli(&server, "show vlan")
        .assert()
        .success()
        .stdout("Vlan ID 1, Name: default\nVlan ID 10, Name: users\n");
    mock.assert();
}

#[test]
fn show_single_interface() {
    let server = MockServer::start();
    let mock = expect_batch(
        &server,
        "cli",
        &["show interface Ethernet1/1"],
        1,
        &ok_body(1, interface_body()),
    );

    nxcli(&server, "show interface Ethernet1/1")
        .assert()
        .success()
        .stdout(contains(
            "State: up/up, MAC: 00:11:22:33:44:55, IP: 10.0.0.1/24",
        ));
    mock.assert();
}

#[test]
fn failing_batch_command_is_reported() {
    let server = MockServer::start();
    let mock = expect_batch(
        &server,
        "cli",
        &["interface Ethernet1/1", "description x"],
        1,
        &json!([ok_empty(1), rpc_error(2, -32602, "invalid")]),
    );

    nxcli(&server, "interface Ethernet1/1 ; description x")
        .assert()
        .failure()
        .stderr(contains("#2").and(contains("description x")).and(contains("invalid")));
    mock.assert();
}

#[test]
fn failing_batch_reported_with_status_500() {
    let server = MockServer::start();
    let mock = expect_batch_with_status(
        &server,
        "cli",
        &["interface Ethernet1/1", "description x"],
        1,
        500,
        &json!([ok_empty(1), rpc_error(2, -32602, "invalid")]),
    );

    nxcli(&server, "interface Ethernet1/1 ; description x")
        .assert()
        .failure()
        .stderr(contains("#2").and(contains("invalid")));
    mock.assert();
}

#[test]
fn bgp_summary_is_printed_unchanged() {
    let server = MockServer::start();
    let text = heredoc(
        "BGP summary information for VRF default, address family IPv4 Unicast
        BGP router identifier 10.0.0.1, local AS number 65000
        Neighbor        V    AS MsgRcvd MsgSent   TblVer  InQ OutQ Up/Down  State/PfxRcd
        10.0.0.2        4 65001    1204    1198       42    0    0 19:52:11 12",
    );
    let mock = expect_batch(
        &server,
        "cli_ascii",
        &["show ip bgp summary"],
        1,
        &ok_body(1, json!(text)),
    );

    nxcli(&server, "show ip bgp summary")
        .assert()
        .success()
        .stdout(format!("{}\n", text));
    mock.assert();
}

#[test]
fn generic_command_protocol_error() {
    let server = MockServer::start();
    let mock = expect_batch(
        &server,
        "cli",
        &["show foobar"],
        1,
        &rpc_error(1, -32602, "Invalid params"),
    );

    nxcli(&server, "show foobar")
        .assert()
        .failure()
        .stderr(contains("-32602").and(contains("Invalid params")));
    mock.assert();
}

#[test]
fn generic_command_prints_text_body() {
    let server = MockServer::start();
    let mock = expect_batch(
        &server,
        "cli",
        &["show hostname"],
        1,
        &ok_body(1, json!("nx-01")),
    );

    nxcli(&server, "show hostname")
        .assert()
        .success()
        .stdout("nx-01\n");
    mock.assert();
}

#[test]
fn generic_command_without_body_prints_raw_result() {
    let server = MockServer::start();
    let mock = expect_batch(
        &server,
        "cli",
        &["show hostname"],
        1,
        &json!({ "jsonrpc": "2.0", "id": 1, "result": { "msg": "nx-01" } }),
    );

    nxcli(&server, "show hostname")
        .assert()
        .failure()
        .stdout(contains("\"msg\"").and(contains("nx-01")))
        .stderr(contains("failed to parse device response"));
    mock.assert();
}

#[test]
fn generic_command_with_null_result_prints_nothing() {
    let server = MockServer::start();
    let mock = expect_batch(&server, "cli", &["clear counters"], 1, &ok_empty(1));

    nxcli(&server, "clear counters").assert().success().stdout("");
    mock.assert();
}

#[test]
fn empty_command_fails_before_network() {
    // nothing is mocked, so any request would surface as an http 404
    let server = MockServer::start();
    nxcli(&server, "   ")
        .assert()
        .failure()
        .stderr(contains("invalid argument").and(contains("404").not()));
}

#[test]
fn invalid_protocol_fails_before_network() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nxcli"));
    cmd.args(["-host", "127.0.0.1", "-proto", "ftp", "-user", "admin", "-cli", "show version"])
        .assert()
        .failure()
        .stderr(contains("ftp"));
}

#[test]
fn missing_host_is_a_usage_error() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nxcli"));
    cmd.args(["-user", "admin", "-cli", "show version"])
        .assert()
        .failure();
}

#[test]
fn version_banner() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nxcli"));
    cmd.arg("-version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_mentions_insecure_default() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nxcli"));
    cmd.arg("-help")
        .assert()
        .success()
        .stdout(contains("Disabled by"));
}
