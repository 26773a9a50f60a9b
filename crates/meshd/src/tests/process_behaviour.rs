//! Behavioural tests covering daemon process supervision and lifecycle files.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use tempfile::TempDir;

use crate::bootstrap::SystemConfigLoader;
use crate::health::HealthReporter;
use crate::process::LaunchError;
use crate::process::daemonizer::{DaemonizeError, Daemonizer};
use crate::process::launch::{LaunchMode, LaunchPlan, ProcessControl, ServiceDeps, run_daemon_with};
use crate::process::paths::ProcessPaths;
use crate::process::shutdown::{ShutdownError, ShutdownSignal};

use super::support::{RecordingHealthReporter, TestConfDir};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(25);

type StepResult = Result<(), String>;

struct ProcessWorld {
    conf: TestConfDir,
    runtime: TempDir,
    reporter: Arc<RecordingHealthReporter>,
    daemonizer: TestDaemonizer,
    shutdown: TestShutdownSignal,
    handle: Option<thread::JoinHandle<Result<(), LaunchError>>>,
    result: Option<Result<(), LaunchError>>,
}

impl ProcessWorld {
    fn new() -> Self {
        Self {
            conf: TestConfDir::new(),
            runtime: TempDir::new().expect("runtime dir"),
            reporter: Arc::new(RecordingHealthReporter::default()),
            daemonizer: TestDaemonizer::default(),
            shutdown: TestShutdownSignal::new(),
            handle: None,
            result: None,
        }
    }

    fn plan(
        &self,
        mode: LaunchMode,
        shutdown: TestShutdownSignal,
    ) -> LaunchPlan<SystemConfigLoader, TestDaemonizer, TestShutdownSignal> {
        LaunchPlan {
            process: ProcessControl {
                mode,
                daemonizer: self.daemonizer.clone(),
                shutdown,
                runtime_dir: Some(self.runtime.path().to_path_buf()),
            },
            services: ServiceDeps {
                loader: SystemConfigLoader,
                reporter: self.reporter.clone() as Arc<dyn HealthReporter>,
                paths: self.conf.paths().clone(),
            },
        }
    }

    fn start_background(&mut self) -> StepResult {
        if self.handle.is_some() {
            return Err("daemon already running".to_owned());
        }
        let plan = self.plan(LaunchMode::Background, self.shutdown.clone());
        self.handle = Some(thread::spawn(move || run_daemon_with(plan)));
        self.wait_for_ready()
    }

    fn run_foreground(&mut self) {
        let shutdown = TestShutdownSignal::new();
        shutdown.trigger();
        self.result = Some(run_daemon_with(self.plan(LaunchMode::Foreground, shutdown)));
    }

    fn wait_for_ready(&self) -> StepResult {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while Instant::now() < deadline {
            if self
                .read_health()
                .is_ok_and(|snapshot| snapshot_status(&snapshot) == "ready")
            {
                return Ok(());
            }
            if self.handle.as_ref().is_some_and(thread::JoinHandle::is_finished) {
                return Err("daemon exited before becoming ready".to_owned());
            }
            thread::sleep(POLL_INTERVAL);
        }
        Err("daemon did not publish a ready health snapshot".to_owned())
    }

    fn join_background(&mut self) -> StepResult {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| "daemon not running".to_owned())?;
        let result = handle
            .join()
            .map_err(|_| "daemon thread panicked".to_owned())?;
        self.result = Some(result);
        Ok(())
    }

    fn paths(&self) -> ProcessPaths {
        ProcessPaths::derive(Some(self.runtime.path()), None).expect("process paths")
    }

    fn read_health(&self) -> Result<Value, String> {
        let content =
            fs::read_to_string(self.paths().health_path()).map_err(|error| error.to_string())?;
        serde_json::from_str(&content).map_err(|error| error.to_string())
    }

    fn artefacts(&self) -> [PathBuf; 3] {
        let paths = self.paths();
        [
            paths.lock_path().to_path_buf(),
            paths.pid_path().to_path_buf(),
            paths.health_path().to_path_buf(),
        ]
    }
}

fn snapshot_status(snapshot: &Value) -> &str {
    snapshot
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

#[derive(Clone, Default)]
struct TestDaemonizer {
    calls: Arc<AtomicUsize>,
}

impl TestDaemonizer {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Daemonizer for TestDaemonizer {
    fn daemonize(&self, _paths: &ProcessPaths) -> Result<(), DaemonizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone)]
struct TestShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl TestShutdownSignal {
    fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().expect("shutdown mutex poisoned") = true;
        cvar.notify_all();
    }
}

impl ShutdownSignal for TestShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().expect("shutdown mutex poisoned");
        while !*triggered {
            triggered = cvar
                .wait(triggered)
                .expect("shutdown mutex poisoned during wait");
        }
        Ok(())
    }
}

#[fixture]
fn world() -> RefCell<ProcessWorld> {
    RefCell::new(ProcessWorld::new())
}

#[given("a daemon configured for node {name}")]
fn given_configured_daemon(world: &RefCell<ProcessWorld>, name: String) {
    world
        .borrow()
        .conf
        .provision_node(&name, "BindToAddress = 127.0.0.1\n", "Port = 0\n");
}

#[given("a daemon configuration without a node name")]
fn given_nameless_daemon(world: &RefCell<ProcessWorld>) {
    world.borrow().conf.write_config("Mode = router\n");
}

#[given("stale runtime artefacts exist")]
fn given_stale_runtime(world: &RefCell<ProcessWorld>) -> StepResult {
    let paths = world.borrow().paths();
    fs::write(paths.lock_path(), b"").map_err(|error| error.to_string())?;
    fs::write(paths.pid_path(), b"0\n").map_err(|error| error.to_string())?;
    Ok(())
}

#[when("the daemon starts in background mode")]
fn when_starts_background(world: &RefCell<ProcessWorld>) -> StepResult {
    world.borrow_mut().start_background()
}

#[when("the daemon runs in the foreground")]
fn when_runs_foreground(world: &RefCell<ProcessWorld>) {
    world.borrow_mut().run_foreground();
}

#[when("shutdown is triggered")]
fn when_shutdown_triggered(world: &RefCell<ProcessWorld>) {
    world.borrow().shutdown.trigger();
}

#[when("the daemon run completes")]
fn when_run_completes(world: &RefCell<ProcessWorld>) -> StepResult {
    world.borrow_mut().join_background()
}

#[then("daemonisation was requested")]
fn then_daemonised(world: &RefCell<ProcessWorld>) {
    assert_eq!(world.borrow().daemonizer.calls(), 1);
}

#[then("daemonisation was not requested")]
fn then_not_daemonised(world: &RefCell<ProcessWorld>) {
    assert_eq!(world.borrow().daemonizer.calls(), 0);
}

#[then("the daemon wrote the pid file")]
fn then_pid_file(world: &RefCell<ProcessWorld>) {
    let content = fs::read_to_string(world.borrow().paths().pid_path()).expect("pid file");
    let pid: u32 = content.trim().parse().expect("pid is an integer");
    assert_eq!(pid, std::process::id());
}

#[then("the daemon wrote the ready health snapshot")]
fn then_health_ready(world: &RefCell<ProcessWorld>) {
    let snapshot = world.borrow().read_health().expect("health snapshot");
    assert_eq!(snapshot_status(&snapshot), "ready");
    assert_eq!(
        snapshot.get("pid").and_then(Value::as_u64),
        Some(u64::from(std::process::id()))
    );
}

#[then("starting the daemon again fails with already running")]
fn then_second_start_refused(world: &RefCell<ProcessWorld>) {
    let mut world = world.borrow_mut();
    world.run_foreground();
    let result = world.result.take().expect("second run result");
    assert!(
        matches!(result, Err(LaunchError::AlreadyRunning { pid }) if pid == std::process::id()),
        "unexpected result: {result:?}"
    );
}

#[then("the daemon run succeeds")]
fn then_run_succeeds(world: &RefCell<ProcessWorld>) {
    let world = world.borrow();
    let result = world.result.as_ref().expect("daemon result");
    assert!(result.is_ok(), "daemon run failed: {result:?}");
}

#[then("the daemon run fails at step {step}")]
fn then_run_fails(world: &RefCell<ProcessWorld>, step: String) {
    let world = world.borrow();
    match world.result.as_ref() {
        Some(Err(LaunchError::Start(error))) => assert_eq!(error.step().to_string(), step),
        other => panic!("expected a start-up failure, got {other:?}"),
    }
}

#[then("the runtime artefacts are removed")]
fn then_artefacts_removed(world: &RefCell<ProcessWorld>) {
    for path in world.borrow().artefacts() {
        assert!(!path.exists(), "{} should be removed", path.display());
    }
}

#[scenario(path = "tests/features/daemon_process.feature", index = 0)]
fn health_and_cleanup(world: RefCell<ProcessWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/daemon_process.feature", index = 1)]
fn second_daemon_refused(world: RefCell<ProcessWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/daemon_process.feature", index = 2)]
fn failed_startup_cleans_up(world: RefCell<ProcessWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/daemon_process.feature", index = 3)]
fn stale_artefacts_reclaimed(world: RefCell<ProcessWorld>) {
    let _ = world;
}
