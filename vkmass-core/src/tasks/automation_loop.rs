// vkmass-core/src/tasks/automation_loop.rs

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::scheduler::{CycleDriver, RunSignal};
use crate::state::SharedState;

/// The global run flag.
///
/// Every start and stop bumps the signal's generation, so toggles that land
/// between two polls of the task are not lost. Dropping the control ends every
/// task spawned from it.
#[derive(Debug)]
pub struct AutomationControl {
    tx: watch::Sender<RunSignal>,
}

impl AutomationControl {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RunSignal::default());
        Self { tx }
    }

    pub fn start(&self) {
        self.tx.send_if_modified(|signal| signal.set(true));
    }

    pub fn stop(&self) {
        self.tx.send_if_modified(|signal| signal.set(false));
    }

    pub fn is_running(&self) -> bool {
        self.tx.borrow().running
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSignal> {
        self.tx.subscribe()
    }
}

impl Default for AutomationControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that owns `driver` and follows the control flag.
///
/// The driver is started when the flag turns true and stopped when it turns
/// false. A generation the task has not seen yet always stops the current run
/// before a new one starts. While running, the task sleeps until the next
/// deadline and then fires whatever is due.
pub fn spawn_automation_task(
    driver: CycleDriver,
    state: SharedState,
    control: &AutomationControl,
) -> JoinHandle<()> {
    let mut rx = control.subscribe();
    let mut driver = driver.with_control(control.subscribe());

    tokio::spawn(async move {
        let mut seen = *rx.borrow_and_update();
        if seen.running {
            driver.start(&state).await;
        }

        loop {
            if driver.is_running() {
                driver.run_due(&state).await;
            }
            let wait = driver
                .next_deadline()
                .filter(|_| driver.is_running())
                .map(|deadline| deadline.saturating_sub(driver.now()));

            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        debug!("Automation control dropped; leaving loop");
                        driver.stop(&state).await;
                        break;
                    }
                    let signal = *rx.borrow_and_update();
                    if signal.generation != seen.generation {
                        if driver.is_running() {
                            driver.stop(&state).await;
                        }
                        if signal.running {
                            driver.start(&state).await;
                        }
                    }
                    seen = signal;
                }
                _ = sleep(wait.unwrap_or(Duration::ZERO)), if wait.is_some() => {}
            }
        }

        info!("Automation task finished");
    })
}
