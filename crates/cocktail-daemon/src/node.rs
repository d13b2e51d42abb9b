use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cocktail_types::{CocktailError, CocktailResult};
use tokio::sync::RwLock;
use tracing::info;

use crate::api::ApiServer;
use crate::config::DaemonConfig;
use crate::robot::RobotTransport;
use crate::runtime::{self, FakeRobotTransport, NullPumpChannel, SerialPumpChannel, TcpRobotTransport};
use crate::storage::{EventStore, MemoryEventStore, SledEventStore, StorageConfig};
use crate::supervisor::{RestartPolicy, TaskSupervisor};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationStatus {
    Stopped,
    Starting,
    Running,
}

/// Wires the event store, plan execution engine and HTTP surface together
/// and owns the supervised background tasks that keep them running.
pub struct Application {
    config: DaemonConfig,
    store: Arc<dyn EventStore>,
    supervisor: Arc<TaskSupervisor>,
    api: Option<ApiServer>,
    status: Arc<RwLock<ApplicationStatus>>,
    stop_flag: Arc<AtomicBool>,
    abort_flag: Arc<AtomicBool>,
    start_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl Application {
    pub fn new(config: DaemonConfig) -> CocktailResult<Self> {
        config.validate()?;

        let store: Arc<dyn EventStore> = if config.fake_system {
            Arc::new(MemoryEventStore::new())
        } else {
            std::fs::create_dir_all(&config.data_dir)
                .map_err(|e| CocktailError::Storage(format!("failed to create data dir: {e}")))?;
            let storage_config = StorageConfig { path: config.data_dir.join("db"), ..Default::default() };
            Arc::new(SledEventStore::open(storage_config)?)
        };

        Ok(Self {
            config,
            store,
            supervisor: Arc::new(TaskSupervisor::new()),
            api: None,
            status: Arc::new(RwLock::new(ApplicationStatus::Stopped)),
            stop_flag: Arc::new(AtomicBool::new(false)),
            abort_flag: Arc::new(AtomicBool::new(false)),
            start_time: None,
        })
    }

    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn EventStore> {
        self.store.clone()
    }

    pub async fn status(&self) -> ApplicationStatus {
        *self.status.read().await
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time
            .map(|t| chrono::Utc::now().signed_duration_since(t).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }

    pub fn supervisor(&self) -> Arc<TaskSupervisor> {
        self.supervisor.clone()
    }

    pub async fn start(&mut self) -> CocktailResult<()> {
        let current = *self.status.read().await;
        if current != ApplicationStatus::Stopped {
            return Err(CocktailError::Internal(format!("cannot start from state {current:?}")));
        }
        *self.status.write().await = ApplicationStatus::Starting;
        info!("starting cocktail control core");

        self.stop_flag.store(false, Ordering::Relaxed);
        self.spawn_management_loop()?;

        if self.config.api.enabled {
            let addr: SocketAddr = format!("{}:{}", self.config.api.bind_address, self.config.api.port)
                .parse()
                .map_err(|e| CocktailError::Config(format!("invalid API bind address: {e}")))?;
            let server = ApiServer::new(addr, self.store.clone(), self.abort_flag.clone(), self.config.api.auth_token.clone());
            server.start().await?;
            self.api = Some(server);
        }

        self.start_time = Some(chrono::Utc::now());
        *self.status.write().await = ApplicationStatus::Running;
        info!("cocktail control core started");
        Ok(())
    }

    fn spawn_management_loop(&self) -> CocktailResult<()> {
        let store = self.store.clone();
        let config = self.config.clone();
        let stop_flag = self.stop_flag.clone();
        let abort_flag = self.abort_flag.clone();

        self.supervisor.spawn("management-loop", RestartPolicy::ExponentialBackoff, move |mut cancel_rx| {
            let store = store.clone();
            let config = config.clone();
            let stop_flag = stop_flag.clone();
            let abort_flag = abort_flag.clone();
            async move {
                let watcher_stop = stop_flag.clone();
                tokio::spawn(async move {
                    let _ = cancel_rx.changed().await;
                    watcher_stop.store(true, Ordering::Relaxed);
                });

                tokio::task::spawn_blocking(move || build_and_run(store, config, stop_flag, abort_flag))
                    .await
                    .map_err(|e| CocktailError::Internal(format!("management loop task panicked: {e}")))?
            }
        })
    }

    pub async fn stop(&mut self) -> CocktailResult<()> {
        let current = *self.status.read().await;
        if current == ApplicationStatus::Stopped {
            return Ok(());
        }
        info!("stopping cocktail control core");
        *self.status.write().await = ApplicationStatus::Stopped;

        self.stop_flag.store(true, Ordering::Relaxed);
        self.supervisor.shutdown(Duration::from_secs(10)).await?;

        if let Some(server) = self.api.take() {
            server.stop().await;
        }

        info!("cocktail control core stopped");
        Ok(())
    }

    pub async fn diagnose(&self) -> DiagnosticReport {
        let mut report = DiagnosticReport::new();
        report.add_check("Robot link reachability", self.check_robot_reachable());
        report.add_check("Pump serial port", self.check_pump_port());
        report.add_check("Event store schema", self.check_storage());
        report.add_check("Disk space", self.check_disk_space());
        report
    }

    fn check_robot_reachable(&self) -> CheckResult {
        if self.config.fake_system {
            return CheckResult::Pass("fake_system mode, robot link not used".into());
        }
        match self.config.robot_address.parse::<SocketAddr>() {
            Ok(addr) => match TcpStream::connect_timeout(&addr, Duration::from_secs(2)) {
                Ok(_) => CheckResult::Pass(format!("robot controller reachable at {addr}")),
                Err(e) => CheckResult::Fail(format!("robot controller unreachable at {addr}: {e}")),
            },
            Err(e) => CheckResult::Fail(format!("invalid robot_address {:?}: {e}", self.config.robot_address)),
        }
    }

    fn check_pump_port(&self) -> CheckResult {
        if self.config.fake_system {
            return CheckResult::Pass("fake_system mode, pump channel not used".into());
        }
        if std::path::Path::new(&self.config.pump_serial_port).exists() {
            CheckResult::Pass(format!("{} present", self.config.pump_serial_port))
        } else {
            CheckResult::Warn(format!("{} not found", self.config.pump_serial_port))
        }
    }

    fn check_storage(&self) -> CheckResult {
        let state = self.store.current_state();
        CheckResult::Pass(format!(
            "{} orders, {} recipes, {} queued",
            state.orders.len(),
            state.recipes.len(),
            state.order_queue.len()
        ))
    }

    fn check_disk_space(&self) -> CheckResult {
        if !self.config.data_dir.exists() {
            return CheckResult::Warn("data directory does not exist yet".into());
        }
        CheckResult::Pass(format!("data directory accessible at {:?}", self.config.data_dir))
    }
}

fn build_and_run(
    store: Arc<dyn EventStore>,
    config: DaemonConfig,
    stop_flag: Arc<AtomicBool>,
    abort_flag: Arc<AtomicBool>,
) -> CocktailResult<()> {
    let mut robot_transport: Box<dyn RobotTransport + Send> = if config.fake_system {
        Box::new(FakeRobotTransport::new())
    } else {
        Box::new(TcpRobotTransport::connect(&config.robot_address, Duration::from_millis(200))?)
    };

    if config.fake_system {
        let mut channel = NullPumpChannel;
        let mut send: Box<dyn FnMut(u8) -> CocktailResult<()>> = Box::new(move |b| channel.send(b));
        runtime::run_blocking_with_abort(store, &config, robot_transport.as_mut(), &mut send, stop_flag, Some(abort_flag))
    } else {
        let mut channel = SerialPumpChannel::open(&config.pump_serial_port)?;
        let mut send: Box<dyn FnMut(u8) -> CocktailResult<()>> = Box::new(move |b| channel.send(b));
        runtime::run_blocking_with_abort(store, &config, robot_transport.as_mut(), &mut send, stop_flag, Some(abort_flag))
    }
}

#[derive(Clone, Debug)]
pub enum CheckResult {
    Pass(String),
    Warn(String),
    Fail(String),
}

impl CheckResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckResult::Pass(_))
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CheckResult::Fail(_))
    }

    pub fn message(&self) -> &str {
        match self {
            CheckResult::Pass(m) | CheckResult::Warn(m) | CheckResult::Fail(m) => m,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DiagnosticReport {
    checks: Vec<(String, CheckResult)>,
    timestamp: chrono::DateTime<chrono::Utc>,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self { checks: Vec::new(), timestamp: chrono::Utc::now() }
    }

    pub fn add_check(&mut self, name: &str, result: CheckResult) {
        self.checks.push((name.to_string(), result));
    }

    pub fn checks(&self) -> &[(String, CheckResult)] {
        &self.checks
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|(_, r)| r.is_pass())
    }

    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|(_, r)| r.is_fail())
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|(_, r)| r.is_pass()).count();
        let failed = self.checks.iter().filter(|(_, r)| r.is_fail()).count();
        let warnings = self.checks.len() - passed - failed;
        format!("{passed} passed, {warnings} warnings, {failed} failed")
    }
}

impl Default for DiagnosticReport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cocktail Cell Diagnostics")?;
        writeln!(f, "=========================")?;
        writeln!(f, "Time: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f)?;
        for (name, result) in &self.checks {
            let symbol = match result {
                CheckResult::Pass(_) => "[OK]",
                CheckResult::Warn(_) => "[!!]",
                CheckResult::Fail(_) => "[XX]",
            };
            writeln!(f, "{symbol} {name}: {}", result.message())?;
        }
        writeln!(f)?;
        writeln!(f, "Summary: {}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn application_starts_stopped() {
        let config = DaemonConfig { fake_system: true, api: crate::config::ApiConfig { enabled: false, ..Default::default() }, ..Default::default() };
        let app = Application::new(config).unwrap();
        assert_eq!(app.status().await, ApplicationStatus::Stopped);
    }

    #[test]
    fn diagnostic_report_summary() {
        let mut report = DiagnosticReport::new();
        report.add_check("a", CheckResult::Pass("ok".into()));
        report.add_check("b", CheckResult::Warn("meh".into()));
        report.add_check("c", CheckResult::Fail("bad".into()));
        assert!(!report.all_passed());
        assert!(report.has_failures());
        assert_eq!(report.summary(), "1 passed, 1 warnings, 1 failed");
    }
}
