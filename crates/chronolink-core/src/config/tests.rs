use super::*;
use crate::status::Status;

#[test]
fn unset_options_resolve_to_defaults() {
    let (join, time) = BuildOptions::new("net", "secret").resolve().unwrap();

    assert_eq!(join.ssid(), "net");
    assert_eq!(join.password(), "secret");
    assert_eq!(join.auth_floor(), AuthFloor::Wpa2Psk);
    assert_eq!(join.sae_mode(), SaeMode::Both);
    assert_eq!(join.max_retries(), DEFAULT_MAX_RETRIES);
    assert_eq!(join.wait_timeout_ms(), DEFAULT_JOIN_WAIT_MS);
    assert_eq!(time.server(), DEFAULT_TIME_SERVER);
    assert_eq!(time.policy(), SyncPolicy::new());
}

#[test]
fn every_auth_floor_spelling_round_trips() {
    for floor in [
        AuthFloor::Open,
        AuthFloor::Wep,
        AuthFloor::WpaPsk,
        AuthFloor::Wpa2Psk,
        AuthFloor::WpaWpa2Psk,
        AuthFloor::Wpa3Psk,
        AuthFloor::Wpa2Wpa3Psk,
        AuthFloor::WapiPsk,
    ] {
        assert_eq!(AuthFloor::parse(floor.as_str()), Ok(floor));
    }
    assert_eq!(AuthFloor::parse("wpa4"), Err(ConfigError::UnknownAuthFloor));
}

#[test]
fn explicit_options_override_defaults() {
    let options = BuildOptions {
        auth_floor: Some("wpa3-psk"),
        sae_mode: Some("hash-to-element"),
        sae_identifier: Some("home-id"),
        max_retries: Some(" 3 "),
        join_wait_ms: Some("20000"),
        time_server: Some("192.168.1.1"),
        ..BuildOptions::new("net", "secret")
    };

    let (join, time) = options.resolve().unwrap();
    assert_eq!(join.auth_floor(), AuthFloor::Wpa3Psk);
    assert_eq!(join.sae_mode(), SaeMode::HashToElement);
    assert_eq!(join.sae_identifier(), "home-id");
    assert_eq!(join.max_retries(), 3);
    assert_eq!(join.wait_timeout_ms(), 20_000);
    assert_eq!(time.server(), "192.168.1.1");
}

#[test]
fn hunt_and_peck_ignores_identifier() {
    let join = JoinConfig::new("net", "secret")
        .unwrap()
        .with_sae(SaeMode::HuntAndPeck, "ignored")
        .unwrap();
    assert_eq!(join.sae_identifier(), "");
}

#[test]
fn oversized_fields_are_rejected() {
    let long_ssid = "s".repeat(SSID_MAX_BYTES + 1);
    let long_password = "p".repeat(PASSWORD_MAX_BYTES + 1);
    let long_server = "n".repeat(SERVER_MAX_BYTES + 1);

    assert_eq!(
        JoinConfig::new(&long_ssid, "secret"),
        Err(ConfigError::SsidTooLong)
    );
    assert_eq!(
        JoinConfig::new("net", &long_password),
        Err(ConfigError::PasswordTooLong)
    );
    assert_eq!(
        TimeSyncConfig::new(&long_server),
        Err(ConfigError::ServerTooLong)
    );
    assert!(JoinConfig::new(&"s".repeat(SSID_MAX_BYTES), "").is_ok());
}

#[test]
fn empty_ssid_and_server_are_rejected() {
    assert_eq!(JoinConfig::new("", "secret"), Err(ConfigError::SsidEmpty));
    assert_eq!(TimeSyncConfig::new("  "), Err(ConfigError::ServerEmpty));
}

#[test]
fn retry_count_must_fit_u8() {
    assert_eq!(parse_retry_count("0"), Ok(0));
    assert_eq!(parse_retry_count("255"), Ok(255));
    assert_eq!(parse_retry_count("256"), Err(ConfigError::InvalidRetryCount));
    assert_eq!(parse_retry_count(""), Err(ConfigError::InvalidRetryCount));
    assert_eq!(parse_retry_count("-1"), Err(ConfigError::InvalidRetryCount));
}

#[test]
fn join_wait_defaults_to_fifty_seconds_and_rejects_zero() {
    assert_eq!(DEFAULT_JOIN_WAIT_MS, 50_000);
    assert_eq!(parse_join_wait_ms(" 50000 "), Ok(50_000));
    assert_eq!(parse_join_wait_ms("0"), Err(ConfigError::InvalidJoinWait));
    assert_eq!(parse_join_wait_ms("5s"), Err(ConfigError::InvalidJoinWait));

    let options = BuildOptions {
        join_wait_ms: Some("-1"),
        ..BuildOptions::new("net", "secret")
    };
    assert_eq!(options.resolve(), Err(ConfigError::InvalidJoinWait));
    assert_eq!(Status::from(ConfigError::InvalidJoinWait), Status::InvalidParam);
}

#[test]
fn debug_output_redacts_password() {
    let join = JoinConfig::new("net", "hunter2").unwrap();
    let rendered = format!("{join:?}");
    assert!(rendered.contains("net"));
    assert!(!rendered.contains("hunter2"));
}
