use std::sync::Arc;

use chrono::Utc;
use cocktail_types::{Event, OrderId, OrderStatus, PlanProgress, Position, Task};
use tracing::{info, warn};

use crate::config::SystemConfig;
use crate::engine::{EngineStatus, PlanExecutionEngine};
use crate::planner::plan_cocktail;
use crate::robot::RobotTransport;
use crate::storage::EventStore;

/// Binds the plan execution engine to the bookkeeping log: translates
/// observed plan progress into persisted events, and dispatches the next
/// queued order whenever the engine goes idle.
pub struct ManagementLoop {
    store: Arc<dyn EventStore>,
    engine: PlanExecutionEngine,
    config: SystemConfig,
    active_order: Option<OrderId>,
    last_finished_step: i64,
}

impl ManagementLoop {
    pub fn new(store: Arc<dyn EventStore>, config: SystemConfig) -> Self {
        Self { store, engine: PlanExecutionEngine::new(), config, active_order: None, last_finished_step: -1 }
    }

    pub fn engine(&self) -> &PlanExecutionEngine {
        &self.engine
    }

    pub fn initialize(&mut self, transport: &mut dyn RobotTransport) -> cocktail_types::CocktailResult<()> {
        self.engine.initialize(transport)
    }

    /// One pass: advance the engine by a tick, reconcile any new progress
    /// into persisted events, then dispatch the next queued order if idle.
    /// Returns the pump frame byte the caller should send this tick.
    pub fn step(&mut self, transport: &mut dyn RobotTransport, now: f64) -> cocktail_types::CocktailResult<u8> {
        let pump_byte = self.engine.tick(transport, now)?;
        self.reconcile_progress()?;
        if self.engine.status() == EngineStatus::Idle {
            self.dispatch()?;
        }
        Ok(pump_byte)
    }

    fn reconcile_progress(&mut self) -> cocktail_types::CocktailResult<()> {
        let Some(progress) = self.engine.progress().cloned() else {
            self.last_finished_step = -1;
            return Ok(());
        };

        let mut events = Vec::new();
        let from = self.last_finished_step;
        let to = progress.finished_step_pos;
        if to > from {
            for step_index in (from + 1)..=to {
                if let Some(task) = progress.plan.tasks.get(step_index as usize) {
                    events.extend(events_for_task(task, &self.config));
                }
            }
            self.last_finished_step = to;
        }

        if progress.is_finished() {
            if let Some(order_id) = self.active_order.take() {
                events.push(Event::OrderFulfilled { order_id });
            }
            // Engine retains the terminal snapshot until reconciled so that
            // `is_finished()` is observable here exactly once; drop it now.
            self.engine.clear_finished_progress();
        }

        if !events.is_empty() {
            let now = Utc::now();
            let timestamped: Vec<_> = events.into_iter().map(|e| (now, e)).collect();
            self.store.persist_events(&timestamped)?;
        }
        Ok(())
    }

    fn dispatch(&mut self) -> cocktail_types::CocktailResult<()> {
        if self.active_order.is_some() {
            return Ok(());
        }
        let state = self.store.current_state();
        let Some(order_id) = state.order_queue.front().copied() else {
            return Ok(());
        };
        let Some(order) = state.orders.get(&order_id).cloned() else {
            warn!(%order_id, "queued order id has no corresponding order record");
            return Ok(());
        };
        if order.status != OrderStatus::Enqueued {
            warn!(%order_id, status = ?order.status, "queue head is not in enqueued state, skipping");
            return Ok(());
        }
        let Some(recipe) = state.recipes.get(&order.recipe_id).cloned() else {
            warn!(%order_id, "order references unknown recipe, skipping");
            return Ok(());
        };

        self.store.persist_events(&[(Utc::now(), Event::OrderExecuting { order_id })])?;

        let start_position = self.engine.robot_link().robot_state().map(|s| s.position).unwrap_or(Position::Home);
        match plan_cocktail(&recipe, &state.slots, start_position, &self.config) {
            Ok(plan) => {
                self.engine.run_plan(plan)?;
                self.active_order = Some(order_id);
                self.last_finished_step = -1;
                info!(%order_id, "dispatched order to execution engine");
            }
            Err(e) => {
                warn!(%order_id, error = %e, "planning failed, order left executing pending operator action");
            }
        }
        Ok(())
    }

    /// Aborts the active order, if any, recording it in the log.
    pub fn abort(&mut self) -> cocktail_types::CocktailResult<()> {
        if let Some(order_id) = self.active_order.take() {
            self.store.persist_events(&[(Utc::now(), Event::OrderAborted { order_id })])?;
            self.engine.signal_stop();
        }
        Ok(())
    }
}

fn events_for_task(task: &Task, config: &SystemConfig) -> Vec<Event> {
    match task {
        Task::Zapf { slot } => vec![Event::AmountPoured {
            slot_path: cocktail_types::SlotPath::zapf(*slot),
            ml: config.ml_per_zapf,
        }],
        Task::Pump { durations } => durations
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > 0.01)
            .map(|(channel, &duration)| Event::AmountPoured {
                slot_path: cocktail_types::SlotPath::pump(channel as u8),
                ml: config.ml_per_second * duration,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_progress_events_for_zapf_and_pump() {
        let config = SystemConfig::default();
        let zapf_events = events_for_task(&Task::Zapf { slot: 5 }, &config);
        assert_eq!(zapf_events.len(), 1);
        match &zapf_events[0] {
            Event::AmountPoured { ml, .. } => assert_eq!(*ml, config.ml_per_zapf),
            _ => panic!("expected AmountPoured"),
        }

        let pump_events = events_for_task(&Task::Pump { durations: [2.0, 0.0, 0.0, 0.0] }, &config);
        assert_eq!(pump_events.len(), 1);
        match &pump_events[0] {
            Event::AmountPoured { ml, .. } => assert_eq!(*ml, config.ml_per_second * 2.0),
            _ => panic!("expected AmountPoured"),
        }

        assert!(events_for_task(&Task::Move { to: Position::Home }, &config).is_empty());
    }

    #[test]
    fn s4_progress_events_for_multi_channel_pump() {
        let config = SystemConfig::default();
        let events = events_for_task(&Task::Pump { durations: [1.5, 0.0, 2.5, 0.5] }, &config);
        assert_eq!(events.len(), 3);
        for event in &events {
            match event {
                Event::AmountPoured { slot_path, .. } => {
                    assert_eq!(slot_path.station, cocktail_types::StationKind::Pump)
                }
                _ => panic!("expected AmountPoured"),
            }
        }
    }
}
