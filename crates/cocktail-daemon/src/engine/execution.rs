use std::collections::VecDeque;

use cocktail_types::{CocktailError, CocktailResult, CocktailSystemPlan, PlanProgress, Position, Task};
use tracing::{debug, info};
use uuid::Uuid;

use crate::pump::{PumpController, PumpStatus};
use crate::robot::{RobotLink, RobotTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    InitializingPlan,
    FeedingRobot,
    Pumping,
}

enum Run {
    Robot(Vec<(usize, Task)>),
    Pump(Vec<(usize, Task)>),
}

enum ActiveRun {
    Robot { pending: VecDeque<(usize, Task)>, in_flight: VecDeque<(usize, Uuid)> },
    Pump { pending: VecDeque<(usize, Task)>, current_step: Option<usize> },
}

/// Single-threaded cooperative scheduler multiplexing the robot ring-buffer
/// protocol, the pump, and wall-clock time, advancing one plan at a time.
/// `tick` is the outer driver: callers (the management loop, or tests) call
/// it repeatedly, each call performing the fair-share pass described for
/// `gen_handle_effects` plus at most one plan-execution substep.
pub struct PlanExecutionEngine {
    link: RobotLink,
    pump: PumpController,
    status: EngineStatus,
    progress: Option<PlanProgress>,
    runs: VecDeque<Run>,
    active: Option<ActiveRun>,
    stopped: bool,
}

impl PlanExecutionEngine {
    pub fn new() -> Self {
        Self {
            link: RobotLink::new(),
            pump: PumpController::new(),
            status: EngineStatus::Idle,
            progress: None,
            runs: VecDeque::new(),
            active: None,
            stopped: false,
        }
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn progress(&self) -> Option<&PlanProgress> {
        self.progress.as_ref()
    }

    /// Drops a finished plan's terminal progress snapshot once the caller
    /// has reconciled it. No-op if the engine is mid-run or already clear.
    pub fn clear_finished_progress(&mut self) {
        if self.progress.as_ref().is_some_and(|p| p.is_finished()) {
            self.progress = None;
        }
    }

    pub fn robot_link(&self) -> &RobotLink {
        &self.link
    }

    pub fn pump_status(&self) -> PumpStatus {
        self.pump.status()
    }

    pub fn initialize(&mut self, transport: &mut dyn RobotTransport) -> CocktailResult<()> {
        self.link.initialize(transport)?;
        self.link.initialize_job(transport)
    }

    /// Submits a plan for execution. Precondition: `status() == Idle`.
    pub fn run_plan(&mut self, plan: CocktailSystemPlan) -> CocktailResult<()> {
        if self.status != EngineStatus::Idle {
            return Err(CocktailError::InvalidOrderState("engine is not idle".to_string()));
        }
        self.runs = partition_runs(&plan.tasks);
        self.progress = Some(PlanProgress::new(plan));
        self.status = EngineStatus::InitializingPlan;
        self.advance_to_next_run();
        Ok(())
    }

    pub fn signal_stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn advance_to_next_run(&mut self) {
        match self.runs.pop_front() {
            None => {
                // Leave `progress` in place: it now holds the plan's terminal
                // snapshot (`finished_step_pos` at the last index), which the
                // management loop still needs to observe `is_finished()` and
                // reconcile the last step's events. Cleared explicitly via
                // `clear_finished_progress` once that reconciliation happens.
                self.status = EngineStatus::Idle;
                self.active = None;
            }
            Some(Run::Robot(steps)) => {
                self.status = EngineStatus::FeedingRobot;
                self.active = Some(ActiveRun::Robot {
                    pending: steps.into_iter().collect(),
                    in_flight: VecDeque::new(),
                });
            }
            Some(Run::Pump(steps)) => {
                self.status = EngineStatus::Pumping;
                self.active = Some(ActiveRun::Pump { pending: steps.into_iter().collect(), current_step: None });
            }
        }
    }

    /// One iteration: the fair-share effect pass, then at most one plan
    /// substep. `now` is the caller-supplied wall-clock reading in seconds.
    pub fn tick(&mut self, transport: &mut dyn RobotTransport, now: f64) -> CocktailResult<u8> {
        let robot_at_pump = self.link.robot_state().map(|s| s.position == Position::Pump).unwrap_or(false);
        self.pump.update(now, robot_at_pump);
        let pump_byte = self.pump.get_pump_msg();

        if self.link.is_initialized() {
            self.link.sync_state(transport)?;
            self.link.assure_running(transport)?;
        }

        if self.status == EngineStatus::Idle {
            return Ok(pump_byte);
        }

        self.advance_plan()?;
        Ok(pump_byte)
    }

    fn advance_plan(&mut self) -> CocktailResult<()> {
        let run_finished = match self.active.as_mut() {
            Some(ActiveRun::Robot { pending, in_flight }) => {
                let finished_ids = self.link.pop_finished_tasks()?;
                for task_id in finished_ids {
                    let (step, expected_id) = in_flight
                        .pop_front()
                        .ok_or_else(|| CocktailError::RobotLink("robot reported completion with nothing in flight".to_string()))?;
                    if expected_id != task_id {
                        return Err(CocktailError::RobotLink("robot completions arrived out of enqueue order".to_string()));
                    }
                    if let Some(progress) = self.progress.as_mut() {
                        debug_assert!(step as i64 > progress.finished_step_pos);
                        progress.finished_step_pos = step as i64;
                    }
                }

                if let Some((step, task)) = pending.front().cloned() {
                    let task_id = Uuid::new_v4();
                    if self.link.enqueue_task(task_id, &task)? {
                        pending.pop_front();
                        in_flight.push_back((step, task_id));
                        if let Some(progress) = self.progress.as_mut() {
                            progress.queued_step_pos = step as i64;
                        }
                    }
                }

                pending.is_empty() && in_flight.is_empty()
            }
            Some(ActiveRun::Pump { pending, current_step }) => {
                match current_step {
                    None => {
                        if let Some((step, task)) = pending.pop_front() {
                            let Task::Pump { durations } = task else {
                                return Err(CocktailError::Planning("pump run contains a non-pump task".to_string()));
                            };
                            if self.pump.status() != PumpStatus::Ready {
                                return Err(CocktailError::Pump("pump requested while not ready".to_string()));
                            }
                            self.pump.request_pump(durations);
                            *current_step = Some(step);
                            if let Some(progress) = self.progress.as_mut() {
                                progress.queued_step_pos = step as i64;
                            }
                        }
                        false
                    }
                    Some(step) => {
                        if self.pump.status() != PumpStatus::Pumping {
                            let finished_step = *step;
                            self.pump.reset();
                            *current_step = None;
                            if let Some(progress) = self.progress.as_mut() {
                                progress.finished_step_pos = finished_step as i64;
                            }
                        }
                        pending.is_empty() && current_step.is_none()
                    }
                }
            }
            None => true,
        };

        if run_finished {
            info!("plan run finished, advancing to next run");
            self.advance_to_next_run();
        }

        Ok(())
    }
}

impl Default for PlanExecutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn partition_runs(tasks: &[Task]) -> VecDeque<Run> {
    let mut runs = VecDeque::new();
    let mut current_robot: Vec<(usize, Task)> = Vec::new();
    let mut current_pump: Vec<(usize, Task)> = Vec::new();

    for (index, task) in tasks.iter().enumerate() {
        if task.is_robot_task() {
            if !current_pump.is_empty() {
                runs.push_back(Run::Pump(std::mem::take(&mut current_pump)));
            }
            current_robot.push((index, task.clone()));
        } else {
            if !current_robot.is_empty() {
                runs.push_back(Run::Robot(std::mem::take(&mut current_robot)));
            }
            current_pump.push((index, task.clone()));
        }
    }
    if !current_robot.is_empty() {
        runs.push_back(Run::Robot(current_robot));
    }
    if !current_pump.is_empty() {
        runs.push_back(Run::Pump(current_pump));
    }
    debug!(run_count = runs.len(), "partitioned plan into runs");
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocktail_types::CocktailSystemPlan;

    #[test]
    fn partitions_alternating_robot_and_pump_tasks() {
        let tasks = vec![
            Task::Move { to: Position::Home },
            Task::Pump { durations: [1.0, 0.0, 0.0, 0.0] },
            Task::Pour,
        ];
        let runs = partition_runs(&tasks);
        assert_eq!(runs.len(), 3);
    }

    #[test]
    fn run_plan_requires_idle_status() {
        let mut engine = PlanExecutionEngine::new();
        engine.status = EngineStatus::FeedingRobot;
        let plan = CocktailSystemPlan::new(vec![Task::Pour]);
        assert!(engine.run_plan(plan).is_err());
    }
}
