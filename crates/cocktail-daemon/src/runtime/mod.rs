mod fake;
mod pump_serial;
mod tcp;

pub use fake::{FakeRobotTransport, NullPumpChannel};
pub use pump_serial::SerialPumpChannel;
pub use tcp::TcpRobotTransport;

use std::sync::Arc;
use std::time::{Duration, Instant};

use cocktail_types::CocktailResult;
use tracing::{error, info};

use crate::config::DaemonConfig;
use crate::management::ManagementLoop;
use crate::robot::RobotTransport;
use crate::storage::EventStore;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Drives the management loop against a concrete transport pair until
/// told to stop. Blocking I/O on the robot link and pump means this runs
/// on its own OS thread rather than directly on the async runtime; callers
/// typically spawn it via `tokio::task::spawn_blocking` under supervision.
pub fn run_blocking(
    store: Arc<dyn EventStore>,
    config: &DaemonConfig,
    mut robot_transport: Box<dyn RobotTransport + Send>,
    mut pump_send: impl FnMut(u8) -> CocktailResult<()>,
    stop: Arc<std::sync::atomic::AtomicBool>,
) -> CocktailResult<()> {
    run_blocking_with_abort(store, config, robot_transport.as_mut(), &mut pump_send, stop, None)
}

/// Like `run_blocking`, but also watches an abort flag: when set, the active
/// order (if any) is aborted and the flag is cleared, independent of `stop`.
pub fn run_blocking_with_abort(
    store: Arc<dyn EventStore>,
    config: &DaemonConfig,
    robot_transport: &mut dyn RobotTransport,
    pump_send: &mut dyn FnMut(u8) -> CocktailResult<()>,
    stop: Arc<std::sync::atomic::AtomicBool>,
    abort: Option<Arc<std::sync::atomic::AtomicBool>>,
) -> CocktailResult<()> {
    let mut management = ManagementLoop::new(store, config.system);
    management.initialize(robot_transport)?;

    let started = Instant::now();
    info!("management loop starting");
    while !stop.load(std::sync::atomic::Ordering::Relaxed) {
        if let Some(ref abort_flag) = abort {
            if abort_flag.swap(false, std::sync::atomic::Ordering::Relaxed) {
                management.abort()?;
            }
        }

        let now = started.elapsed().as_secs_f64();
        let byte = match management.step(robot_transport, now) {
            Ok(byte) => byte,
            Err(e) => {
                error!(error = %e, "management loop tick failed");
                return Err(e);
            }
        };
        let _ = pump_send(byte);
        std::thread::sleep(TICK_INTERVAL);
    }
    info!("management loop stopped");
    Ok(())
}
