//! The distress arbiter
//!
//! Pure transition authority over `AlarmState`. Inbound events and the
//! local silence action arrive one at a time (`&mut self`, single pump
//! task), so transitions never race; the effects engine underneath is
//! additionally restart-safe and stop-idempotent.
//!
//! A second SOS while already `Alerting` is a no-op: the state did not
//! change and the engine already holds a live emitter set.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use faro_core::{AlarmState, DistressEvent, DistressKind};
use faro_effects::{AlarmEffectsEngine, ModalityReport};

use crate::NotificationBridge;

/// What one event did to the alarm.
#[derive(Debug)]
pub enum ArbiterOutcome {
    /// Entered `Alerting`; effects started with this report.
    Armed(ModalityReport),
    /// Entered `Silenced`; effects stopped.
    Dismissed,
    /// No transition (duplicate kind, ping, or clear while not alerting).
    Unchanged,
}

/// Source of a distress payload for UI/notification fan-out.
#[derive(Clone, Debug, Default)]
struct ActiveAlert {
    alias: String,
    lat: f64,
    lon: f64,
}

/// Owns `AlarmState` and the only authority to change it.
pub struct DistressArbiter {
    engine: Arc<AlarmEffectsEngine>,
    bridge: Arc<dyn NotificationBridge>,
    state_tx: watch::Sender<AlarmState>,
    state: AlarmState,
    active: ActiveAlert,
}

impl DistressArbiter {
    pub fn new(engine: Arc<AlarmEffectsEngine>, bridge: Arc<dyn NotificationBridge>) -> Self {
        let (state_tx, _) = watch::channel(AlarmState::Idle);
        DistressArbiter {
            engine,
            bridge,
            state_tx,
            state: AlarmState::Idle,
            active: ActiveAlert::default(),
        }
    }

    /// Current alarm state.
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Subscribe to alarm-state transitions (UI hook).
    pub fn states(&self) -> watch::Receiver<AlarmState> {
        self.state_tx.subscribe()
    }

    /// Apply one inbound event.
    pub async fn handle_event(&mut self, event: &DistressEvent) -> ArbiterOutcome {
        match event.kind {
            DistressKind::Ping => {
                debug!("ping from {:?}, no state change", event.alias);
                ArbiterOutcome::Unchanged
            }
            DistressKind::Sos => self.arm(event).await,
            DistressKind::Clear => self.dismiss("inbound clear").await,
        }
    }

    /// Local user silence action. Same net state as an inbound CLEAR.
    pub async fn silence(&mut self) -> ArbiterOutcome {
        self.dismiss("local silence").await
    }

    async fn arm(&mut self, event: &DistressEvent) -> ArbiterOutcome {
        if self.state == AlarmState::Alerting {
            debug!("duplicate SOS while alerting, ignored");
            return ArbiterOutcome::Unchanged;
        }

        let report = self.engine.start().await;
        self.active = ActiveAlert {
            alias: event.alias.clone(),
            lat: event.lat,
            lon: event.lon,
        };
        self.transition(AlarmState::Alerting);
        info!(
            "alarm armed by {:?} at ({}, {}), {} modalities active",
            self.active.alias,
            self.active.lat,
            self.active.lon,
            report.active_count()
        );
        ArbiterOutcome::Armed(report)
    }

    async fn dismiss(&mut self, cause: &str) -> ArbiterOutcome {
        if self.state != AlarmState::Alerting {
            debug!("{} while {}, ignored", cause, self.state);
            return ArbiterOutcome::Unchanged;
        }

        self.engine.stop().await;
        self.transition(AlarmState::Silenced);
        info!("alarm silenced ({})", cause);
        ArbiterOutcome::Dismissed
    }

    fn transition(&mut self, next: AlarmState) {
        self.state = next;
        let _ = self.state_tx.send(next);
        self.bridge
            .alarm_state_changed(&self.active.alias, next, self.active.lat, self.active.lon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingBridge;
    use faro_core::GeoPoint;
    use faro_effects::sim::SimEmitters;
    use faro_effects::EffectsConfig;

    fn arbiter_with(sim: &SimEmitters) -> (DistressArbiter, Arc<RecordingBridge>) {
        let engine = Arc::new(AlarmEffectsEngine::new(
            sim.set(),
            EffectsConfig::persistent(),
        ));
        let bridge = Arc::new(RecordingBridge::new());
        (
            DistressArbiter::new(engine, Arc::clone(&bridge) as Arc<dyn NotificationBridge>),
            bridge,
        )
    }

    fn sos(alias: &str) -> DistressEvent {
        DistressEvent::sos(alias, GeoPoint::new(-12.05, -77.04))
    }

    #[tokio::test]
    async fn test_sos_arms_from_idle() {
        let sim = SimEmitters::new();
        let (mut arbiter, bridge) = arbiter_with(&sim);

        let outcome = arbiter.handle_event(&sos("Ana")).await;
        assert!(matches!(outcome, ArbiterOutcome::Armed(_)));
        assert_eq!(arbiter.state(), AlarmState::Alerting);
        assert!(sim.audio.is_playing());

        let notified = bridge.notifications();
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].0, "Ana");
        assert_eq!(notified[0].1, AlarmState::Alerting);
    }

    #[tokio::test]
    async fn test_clear_silences_and_releases() {
        let sim = SimEmitters::new();
        let (mut arbiter, _) = arbiter_with(&sim);

        arbiter.handle_event(&sos("Ana")).await;
        let outcome = arbiter.handle_event(&DistressEvent::clear("Ana")).await;
        assert!(matches!(outcome, ArbiterOutcome::Dismissed));
        assert_eq!(arbiter.state(), AlarmState::Silenced);
        assert!(sim.all_released());
    }

    #[tokio::test]
    async fn test_sos_rearms_after_silence() {
        let sim = SimEmitters::new();
        let (mut arbiter, _) = arbiter_with(&sim);

        arbiter.handle_event(&sos("Ana")).await;
        arbiter.silence().await;
        assert_eq!(arbiter.state(), AlarmState::Silenced);

        let outcome = arbiter.handle_event(&sos("Ana")).await;
        assert!(matches!(outcome, ArbiterOutcome::Armed(_)));
        assert_eq!(arbiter.state(), AlarmState::Alerting);
        assert!(sim.audio.is_playing());
    }

    #[tokio::test]
    async fn test_duplicate_sos_is_idempotent() {
        let sim = SimEmitters::new();
        let (mut arbiter, bridge) = arbiter_with(&sim);

        arbiter.handle_event(&sos("Ana")).await;
        let outcome = arbiter.handle_event(&sos("Ana")).await;
        assert!(matches!(outcome, ArbiterOutcome::Unchanged));
        assert_eq!(sim.audio.acquisitions(), 1);
        assert_eq!(bridge.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_ping_never_changes_state() {
        let sim = SimEmitters::new();
        let (mut arbiter, bridge) = arbiter_with(&sim);

        arbiter.handle_event(&DistressEvent::ping("Ana")).await;
        assert_eq!(arbiter.state(), AlarmState::Idle);

        arbiter.handle_event(&sos("Ana")).await;
        arbiter.handle_event(&DistressEvent::ping("Ana")).await;
        assert_eq!(arbiter.state(), AlarmState::Alerting);
        assert!(bridge.notifications().iter().all(|n| n.1 != AlarmState::Idle));
    }

    #[tokio::test]
    async fn test_clear_while_idle_is_noop() {
        let sim = SimEmitters::new();
        let (mut arbiter, bridge) = arbiter_with(&sim);

        let outcome = arbiter.handle_event(&DistressEvent::clear("Ana")).await;
        assert!(matches!(outcome, ArbiterOutcome::Unchanged));
        assert_eq!(arbiter.state(), AlarmState::Idle);
        assert!(bridge.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_local_silence_race_nets_silenced() {
        let sim = SimEmitters::new();
        let (mut arbiter, _) = arbiter_with(&sim);

        arbiter.handle_event(&sos("Ana")).await;
        // The pump serializes these; whichever lands second is a no-op.
        arbiter.handle_event(&DistressEvent::clear("Ana")).await;
        let second = arbiter.silence().await;
        assert!(matches!(second, ArbiterOutcome::Unchanged));
        assert_eq!(arbiter.state(), AlarmState::Silenced);
        assert!(sim.all_released());
    }

    #[tokio::test]
    async fn test_states_watch_publishes_transitions() {
        let sim = SimEmitters::new();
        let (mut arbiter, _) = arbiter_with(&sim);
        let states = arbiter.states();
        assert_eq!(*states.borrow(), AlarmState::Idle);

        arbiter.handle_event(&sos("Ana")).await;
        assert_eq!(*states.borrow(), AlarmState::Alerting);

        arbiter.silence().await;
        assert_eq!(*states.borrow(), AlarmState::Silenced);
    }

    // Property from the state-affecting-event law: after any sequence,
    // alerting iff the last SOS/CLEAR was an SOS.
    #[test]
    fn test_alerting_iff_last_state_affecting_was_sos() {
        use proptest::prelude::*;
        use proptest::test_runner::{Config, TestRunner};

        let mut runner = TestRunner::new(Config::with_cases(64));
        runner
            .run(
                &proptest::collection::vec(0u8..3, 0..32),
                |kinds| {
                    let sequence: Vec<DistressEvent> = kinds
                        .iter()
                        .map(|k| match k {
                            0 => sos("Ana"),
                            1 => DistressEvent::clear("Ana"),
                            _ => DistressEvent::ping("Ana"),
                        })
                        .collect();

                    let rt = tokio::runtime::Builder::new_current_thread()
                        .enable_time()
                        .build()
                        .expect("runtime");
                    rt.block_on(async {
                        let sim = SimEmitters::new();
                        let (mut arbiter, _) = arbiter_with(&sim);
                        for event in &sequence {
                            arbiter.handle_event(event).await;
                        }
                        let last = sequence
                            .iter()
                            .rev()
                            .find(|e| e.is_state_affecting())
                            .map(|e| e.kind);
                        let expect_alerting = last == Some(DistressKind::Sos);
                        prop_assert_eq!(arbiter.state().is_alerting(), expect_alerting);
                        prop_assert_eq!(sim.audio.is_playing(), expect_alerting);
                        Ok(())
                    })
                },
            )
            .unwrap();
    }
}
