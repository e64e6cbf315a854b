//! Integration tests for the OS adapters
//!
//! These run real subprocesses (`sh`, `sleep`) and touch the filesystem
//! inside temporary directories.

#![cfg(unix)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_core::{ClientConfig, OmniClient};
use application::ports::{
    DirectoryPort, EngineHealthPort, LifecycleLockPort, PortProbePort, ProcessLauncherPort,
    ProcessRecordStore, ProcessTablePort, TerminationSignal,
};
use application::{
    AssetServerStatus, EngineStopOutcome, LauncherService, RecordOutcome, TerminatorService,
};
use domain::{
    CommandPattern, CommandSpec, LifecycleTimings, ProcessId, ProcessRecord, ServiceSettings,
};
use infrastructure::{
    AppConfig, EngineHealthAdapter, FileLifecycleLock, FileRecordStore, FsDirectories,
    PathRuntimeResolver, SysinfoProcessTable, TcpPortProbe, TokioProcessLauncher,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Helpers
// =============================================================================

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh", vec!["-c".to_string(), script.to_string()])
}

async fn wait_until_gone(table: &SysinfoProcessTable, pid: ProcessId) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if table.inspect(pid).await.is_none() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Marker no other process on the machine carries in its command line
fn unique_marker(name: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("omni-{name}-{}-{nanos}", std::process::id())
}

// =============================================================================
// Record store
// =============================================================================

mod record_store_tests {
    use super::*;

    #[tokio::test]
    async fn missing_record_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("asset_server.pid"));
        assert!(store.load().await.unwrap().is_none());
        assert!(!store.remove().await.unwrap());
    }

    #[tokio::test]
    async fn save_creates_parent_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run/asset_server.pid");
        let store = FileRecordStore::new(&path);

        let record = ProcessRecord::new(ProcessId::new(4321)).with_start_time(1_700_000_000);
        store.save(&record).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "4321\n1700000000\n");
        assert_eq!(store.load().await.unwrap(), Some(record));
        assert!(store.remove().await.unwrap());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn bare_pid_file_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("asset_server.pid");
        std::fs::write(&path, "777\n").unwrap();

        let record = FileRecordStore::new(&path).load().await.unwrap().unwrap();
        assert_eq!(record.pid, ProcessId::new(777));
        assert!(record.start_time.is_none());
    }

    #[tokio::test]
    async fn garbage_record_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("asset_server.pid");
        std::fs::write(&path, "not a pid").unwrap();

        assert!(FileRecordStore::new(&path).load().await.is_err());
    }
}

// =============================================================================
// Directories and lock
// =============================================================================

mod filesystem_tests {
    use super::*;

    #[tokio::test]
    async fn ensure_dir_reports_creation_once() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("media/clips");

        assert!(FsDirectories.ensure_dir(&target).await.unwrap());
        assert!(target.is_dir());
        assert!(!FsDirectories.ensure_dir(&target).await.unwrap());
        assert!(!FsDirectories.ensure_dir(&PathBuf::new()).await.unwrap());
    }

    #[tokio::test]
    async fn lock_is_exclusive_until_dropped() {
        let dir = TempDir::new().unwrap();
        let lock = Arc::new(FileLifecycleLock::new(dir.path().join("run/omni-serve.lock")));

        let guard = lock.acquire().await.unwrap();

        let contender = Arc::clone(&lock);
        let waiter = tokio::spawn(async move {
            let _second = contender.acquire().await.unwrap();
            Instant::now()
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!waiter.is_finished());

        let released_at = Instant::now();
        drop(guard);
        let acquired_at = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(acquired_at >= released_at);
    }
}

// =============================================================================
// Launcher
// =============================================================================

mod launcher_tests {
    use super::*;

    #[tokio::test]
    async fn foreground_exit_code_is_propagated() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("engine.log");

        let code = TokioProcessLauncher::new()
            .run_foreground(&sh("echo starting; echo oops >&2; exit 3"), &log)
            .await
            .unwrap();

        assert_eq!(code, 3);
        let contents = std::fs::read_to_string(&log).unwrap();
        assert!(contents.contains("starting"));
        assert!(contents.contains("oops"));
    }

    #[tokio::test]
    async fn foreground_log_is_appended() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("engine.log");
        std::fs::write(&log, "previous run\n").unwrap();

        TokioProcessLauncher::new()
            .run_foreground(&sh("echo second run"), &log)
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&log).unwrap();
        assert!(contents.starts_with("previous run\n"));
        assert!(contents.contains("second run"));
    }

    #[tokio::test]
    async fn death_by_signal_maps_to_128_plus_signal() {
        let dir = TempDir::new().unwrap();
        let code = TokioProcessLauncher::new()
            .run_foreground(&sh("kill -TERM $$"), &dir.path().join("engine.log"))
            .await
            .unwrap();
        assert_eq!(code, 128 + 15);
    }

    #[tokio::test]
    async fn env_is_passed_to_child_only() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("engine.log");
        let command = sh("echo value=$OMNI_TEST_MARKER").with_env("OMNI_TEST_MARKER", "present");

        TokioProcessLauncher::new().run_foreground(&command, &log).await.unwrap();

        assert!(std::fs::read_to_string(&log).unwrap().contains("value=present"));
        assert!(std::env::var_os("OMNI_TEST_MARKER").is_none());
    }

    #[tokio::test]
    async fn missing_program_is_setup_failure() {
        let dir = TempDir::new().unwrap();
        let err = TokioProcessLauncher::new()
            .run_foreground(
                &CommandSpec::new("/no/such/engine-binary", Vec::new()),
                &dir.path().join("engine.log"),
            )
            .await
            .unwrap_err();
        assert!(err.is_setup_failure());
    }

    #[tokio::test]
    async fn lingering_output_holder_does_not_block_exit() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("engine.log");
        let started = Instant::now();

        let code = TokioProcessLauncher::new()
            .with_drain_timeout(Duration::from_millis(300))
            .run_foreground(&sh("sleep 30 & echo holder=$!"), &log)
            .await
            .unwrap();

        assert_eq!(code, 0);
        assert!(started.elapsed() < Duration::from_secs(10));

        let contents = std::fs::read_to_string(&log).unwrap();
        let holder = contents
            .lines()
            .find_map(|line| line.strip_prefix("holder="))
            .and_then(|pid| pid.trim().parse::<u32>().ok())
            .map(ProcessId::new)
            .expect("holder pid in log");
        let table = SysinfoProcessTable::new();
        table.signal(holder, TerminationSignal::Forced).await.unwrap();
    }

    #[tokio::test]
    async fn detached_process_outlives_handle_and_can_be_stopped() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("asset_server.log");
        let table = Arc::new(SysinfoProcessTable::new());
        let launcher = TokioProcessLauncher::new().with_identity(table.clone());

        let record = launcher
            .spawn_detached(&CommandSpec::new("sleep", vec!["30".to_string()]), &log)
            .await
            .unwrap();

        let info = table.inspect(record.pid).await.expect("child should be running");
        assert!(record.is_same_process(info.start_time));
        assert!(record.start_time.is_some());

        assert!(table.signal(record.pid, TerminationSignal::Graceful).await.unwrap());
        assert!(wait_until_gone(&table, record.pid).await);
    }
}

// =============================================================================
// Process table
// =============================================================================

mod process_table_tests {
    use super::*;

    #[tokio::test]
    async fn finds_process_by_command_line() {
        let dir = TempDir::new().unwrap();
        let table = Arc::new(SysinfoProcessTable::new());
        let record = TokioProcessLauncher::new()
            .spawn_detached(&sh("exec sleep 30"), &dir.path().join("out.log"))
            .await
            .unwrap();

        let pattern = CommandPattern::new("sleep 30").unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut found = false;
        while Instant::now() < deadline {
            if table.find_matching(&pattern).await.contains(&record.pid) {
                found = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(found);

        assert!(table.signal(record.pid, TerminationSignal::Forced).await.unwrap());
        assert!(wait_until_gone(&table, record.pid).await);
    }

    #[tokio::test]
    async fn listener_discovery_finds_bound_socket() {
        let table = SysinfoProcessTable::new();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let holders = table.listeners_on_port(port).await;
        assert!(holders.contains(&ProcessId::current()));
    }
}

// =============================================================================
// Launcher and terminator over real adapters
// =============================================================================

mod lifecycle_tests {
    use super::*;

    struct Stack {
        launcher: LauncherService,
        terminator: TerminatorService,
        probe: Arc<TcpPortProbe>,
        records: Arc<FileRecordStore>,
        table: Arc<SysinfoProcessTable>,
    }

    fn settings_in(dir: &TempDir, port: u16, marker: &str) -> ServiceSettings {
        let mut settings = ServiceSettings::default();
        settings.asset_server.host = "127.0.0.1".to_string();
        settings.asset_server.port = port;
        settings.asset_server.directory = dir.path().join("media");
        settings.asset_server.record_file = dir.path().join("run/asset_server.pid");
        settings.asset_server.log_file = dir.path().join("logs/asset_server.log");
        settings.engine.log_file = dir.path().join("logs/engine.log");
        settings.engine.match_pattern = CommandPattern::new(marker).unwrap();
        settings.lock_file = dir.path().join("run/omni-serve.lock");
        settings.timings = LifecycleTimings {
            settle_delay_ms: 1500,
            grace_period_ms: 500,
            kill_confirm_ms: 2000,
            probe_timeout_ms: 300,
        };
        settings
    }

    fn stack(settings: ServiceSettings) -> Stack {
        let settings = Arc::new(settings);
        let table = Arc::new(SysinfoProcessTable::new());
        let records = Arc::new(FileRecordStore::new(&settings.asset_server.record_file));
        let lock = Arc::new(FileLifecycleLock::new(&settings.lock_file));
        let probe = Arc::new(TcpPortProbe::new(settings.timings.probe_timeout()));

        let launcher = LauncherService::new(
            Arc::clone(&settings),
            Arc::new(PathRuntimeResolver::new(None)),
            probe.clone(),
            records.clone(),
            Arc::new(TokioProcessLauncher::new().with_identity(table.clone())),
            Arc::new(FsDirectories),
            lock.clone(),
        );
        let terminator =
            TerminatorService::new(settings, table.clone(), records.clone(), lock);

        Stack {
            launcher,
            terminator,
            probe,
            records,
            table,
        }
    }

    async fn wait_for_port(probe: &TcpPortProbe, port: u16, listening: bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if probe.is_listening("127.0.0.1", port).await == listening {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        false
    }

    #[tokio::test]
    async fn fresh_start_is_reused_and_fully_stopped() {
        let dir = TempDir::new().unwrap();
        let port = free_port();
        let services = stack(settings_in(&dir, port, &unique_marker("engine")));

        let first = services.launcher.ensure_asset_server().await.unwrap();
        assert!(first.was_spawned());
        assert!(dir.path().join("media").is_dir());
        assert!(wait_for_port(&services.probe, port, true).await);

        let second = services.launcher.ensure_asset_server().await.unwrap();
        assert_eq!(
            second,
            AssetServerStatus::Reused {
                url: first.url().to_string()
            }
        );

        let record = services.records.load().await.unwrap().expect("record written");
        let info = services
            .table
            .inspect(record.pid)
            .await
            .expect("recorded server is alive");
        assert!(record.is_same_process(info.start_time));

        let report = services.terminator.stop().await.unwrap();
        assert_eq!(report.asset_record, RecordOutcome::Signalled { pid: record.pid });
        assert_eq!(report.engine, EngineStopOutcome::NothingRunning);

        assert!(services.records.load().await.unwrap().is_none());
        assert!(wait_for_port(&services.probe, port, false).await);
    }

    #[tokio::test]
    async fn stop_without_anything_running_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let services = stack(settings_in(&dir, free_port(), &unique_marker("idle")));

        let report = services.terminator.stop().await.unwrap();

        assert_eq!(report.asset_record, RecordOutcome::Absent);
        assert!(report.port_holders_killed.is_empty());
        assert_eq!(report.engine, EngineStopOutcome::NothingRunning);
        assert!(!report.stopped_anything());
    }

    #[tokio::test]
    async fn engine_ignoring_sigterm_is_killed_after_grace_period() {
        let dir = TempDir::new().unwrap();
        let marker = unique_marker("stubborn");
        let signals = dir.path().join("signals.txt");
        let ready = dir.path().join("ready");
        let script = format!(
            "trap 'echo term >> \"{}\"' TERM; touch \"{}\"; while :; do sleep 0.1; done # {marker}",
            signals.display(),
            ready.display()
        );

        let engine = TokioProcessLauncher::new()
            .spawn_detached(&sh(&script), &dir.path().join("engine.log"))
            .await
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !ready.exists() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(ready.exists());

        let services = stack(settings_in(&dir, free_port(), &marker));
        let started = Instant::now();
        let report = services.terminator.stop().await.unwrap();
        let elapsed = started.elapsed();

        match &report.engine {
            EngineStopOutcome::Stopped {
                signalled,
                forced,
                remaining,
            } => {
                assert!(signalled.contains(&engine.pid));
                assert!(forced.contains(&engine.pid));
                assert!(remaining.is_empty());
            },
            EngineStopOutcome::NothingRunning => {
                unreachable!("stand-in engine was not found")
            },
        }
        assert!(elapsed >= Duration::from_millis(500));
        assert!(std::fs::read_to_string(&signals).unwrap().contains("term"));
        assert!(wait_until_gone(&services.table, engine.pid).await);
    }
}

// =============================================================================
// Engine health
// =============================================================================

mod engine_health_tests {
    use super::*;

    fn adapter_for(server: &MockServer) -> EngineHealthAdapter {
        let client = OmniClient::new(ClientConfig::default(), &server.uri()).unwrap();
        EngineHealthAdapter::new(Arc::new(client))
    }

    #[tokio::test]
    async fn answering_engine_is_healthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(adapter_for(&server).is_healthy().await);
    }

    #[tokio::test]
    async fn failing_engine_is_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(!adapter_for(&server).is_healthy().await);
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("omni-serve.toml");
        std::fs::write(
            &path,
            r#"
lock_file = "/tmp/omni.lock"

[engine]
port = 8100
tensor_parallel_size = 4
runtime_dir = "/opt/envs/vllm"

[asset_server]
port = 9090
directory = "/srv/media"

[timings]
grace_period_ms = 100

[client]
strip_reasoning = false

[telemetry]
log_format = "json"
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();

        assert_eq!(config.engine.port, 8100);
        assert_eq!(config.engine.tensor_parallel_size, 4);
        assert_eq!(config.engine.runtime_dir, Some(PathBuf::from("/opt/envs/vllm")));
        assert_eq!(config.engine.dtype, "bfloat16");
        assert_eq!(config.asset_server.port, 9090);
        assert_eq!(config.asset_server.directory, PathBuf::from("/srv/media"));
        assert_eq!(config.timings.grace_period_ms, 100);
        assert_eq!(config.timings.settle_delay_ms, 2000);
        assert!(!config.client.strip_reasoning);
        assert_eq!(config.lock_file, PathBuf::from("/tmp/omni.lock"));
        assert_eq!(config.telemetry.log_format, infrastructure::LogFormat::Json);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
