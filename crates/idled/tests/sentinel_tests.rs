//! Sentinel loop tests: config file → probe → idle counter → power action.

use idled::config::Config;
use idled::power::{PowerAction, PowerControl};
use idled::sentinel::{check, NetworkStatus, Sentinel, SystemProbe, TickOutcome};
use idled::session::{SessionCriterion, SessionProbe};
use idled::tcp_table::NetworkVerdict;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const HEADER: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode\n";

#[derive(Clone, Default)]
struct RecordingPower {
    actions: Arc<Mutex<Vec<PowerAction>>>,
}

impl PowerControl for RecordingPower {
    fn execute(&self, action: PowerAction) -> idled::Result<()> {
        self.actions.lock().unwrap().push(action);
        Ok(())
    }
}

fn write_config(dir: &Path) -> Config {
    let tcp = dir.join("tcp");
    let tcp6 = dir.join("tcp6");
    fs::write(&tcp, HEADER).unwrap();
    fs::write(&tcp6, HEADER).unwrap();

    let path = dir.join("config.toml");
    let content = format!(
        r#"
[daemon]
idle_checks = 2
power_action = "poweroff"

[network]
tcp_table = "{}"
tcp6_table = "{}"
"#,
        tcp.display(),
        tcp6.display()
    );
    fs::write(&path, content).unwrap();

    let config = Config::load_from_path(&path).unwrap();
    config.validate().unwrap();
    config
}

fn quiet_sessions() -> SessionProbe {
    // `true` prints nothing: no sessions
    SessionProbe::new(SessionCriterion::NonEmpty).with_program("true")
}

#[test]
fn test_idle_machine_powers_off_after_threshold() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let probe = SystemProbe::from_config(&config)
        .unwrap()
        .with_sessions(quiet_sessions());
    let power = RecordingPower::default();

    let mut sentinel = Sentinel::new(
        probe,
        power.clone(),
        config.daemon.power_action,
        config.daemon.idle_checks,
    );

    assert_eq!(sentinel.tick(), TickOutcome::Idle { count: 1, required: 2 });
    assert_eq!(
        sentinel.tick(),
        TickOutcome::PowerExecuted {
            action: PowerAction::Poweroff
        }
    );
    assert_eq!(*power.actions.lock().unwrap(), vec![PowerAction::Poweroff]);
}

#[test]
fn test_connection_appearing_resets_counter() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let probe = SystemProbe::from_config(&config)
        .unwrap()
        .with_sessions(quiet_sessions());
    let power = RecordingPower::default();
    let mut sentinel = Sentinel::new(probe, power.clone(), PowerAction::Suspend, 2);

    assert_eq!(sentinel.tick(), TickOutcome::Idle { count: 1, required: 2 });

    // an ssh session from the LAN shows up
    fs::write(
        dir.path().join("tcp"),
        format!("{}   0: 0A01A8C0:0016 0501A8C0:D431 01\n", HEADER),
    )
    .unwrap();
    assert_eq!(sentinel.tick(), TickOutcome::InUse);
    assert_eq!(sentinel.idle_count(), 0);
    assert!(power.actions.lock().unwrap().is_empty());
}

#[test]
fn test_logged_in_user_keeps_machine_awake() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    // `echo` prints its arguments: one non-empty line
    let probe = SystemProbe::from_config(&config)
        .unwrap()
        .with_sessions(SessionProbe::new(SessionCriterion::NonEmpty).with_program("echo"));

    let report = check(&probe);
    assert_eq!(report.sessions_active, Some(true));
    assert!(report.in_use);
}

#[test]
fn test_unreadable_table_keeps_machine_awake() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    fs::remove_file(dir.path().join("tcp6")).unwrap();

    let probe = SystemProbe::from_config(&config)
        .unwrap()
        .with_sessions(quiet_sessions());
    let report = check(&probe);

    assert!(report.in_use);
    assert_eq!(report.sessions_active, None);
    assert!(matches!(
        report.network,
        NetworkStatus::Scanned {
            result: NetworkVerdict::Unobservable { .. }
        }
    ));
}

#[test]
fn test_report_serializes_for_once_mode() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let probe = SystemProbe::from_config(&config)
        .unwrap()
        .with_sessions(quiet_sessions());

    let json = serde_json::to_value(check(&probe)).unwrap();
    assert_eq!(json["in_use"], false);
    assert_eq!(json["network"]["status"], "scanned");
    assert_eq!(json["network"]["result"]["verdict"], "idle");
    assert_eq!(json["sessions_active"], false);
}

#[test]
fn test_conflicting_strategies_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[network]\nexclude_loopback = true\ninterface = \"eth0\"\n").unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert!(config.validate().is_err());
    assert!(SystemProbe::from_config(&config).is_err());
}
