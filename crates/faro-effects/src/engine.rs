//! The alarm effects engine
//!
//! Owns the four emitters and drives them as one atomic alarm session.
//! `start` acquires every modality (degrading failures in isolation),
//! `stop` cancels the timer loops, joins them, and releases everything.
//! Both are serialized on one session lock, so a restart always completes
//! the previous teardown before re-acquiring.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use faro_core::Modality;

use crate::{AudioSink, Banner, EffectsConfig, EmitterError, StrobePolicy, Torch, VibrationMotor};

/// The four physical emitters, as injected trait objects.
pub struct EmitterSet {
    pub audio: Arc<dyn AudioSink>,
    pub vibration: Arc<dyn VibrationMotor>,
    pub torch: Arc<dyn Torch>,
    pub banner: Arc<dyn Banner>,
}

/// How one modality came up for the current session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ModalityOutcome {
    /// Emitting.
    Active,
    /// Hardware present but acquisition failed; session continues without it.
    Degraded,
    /// Capability absent on this device.
    Unavailable,
}

/// Per-emitter outcome of one `start`.
#[derive(Clone, Debug)]
pub struct ModalityReport {
    pub audio: ModalityOutcome,
    pub vibration: ModalityOutcome,
    pub torch: ModalityOutcome,
    pub banner: ModalityOutcome,
}

impl Default for ModalityReport {
    fn default() -> Self {
        ModalityReport {
            audio: ModalityOutcome::Unavailable,
            vibration: ModalityOutcome::Unavailable,
            torch: ModalityOutcome::Unavailable,
            banner: ModalityOutcome::Unavailable,
        }
    }
}

impl ModalityReport {
    pub fn outcome(&self, modality: Modality) -> ModalityOutcome {
        match modality {
            Modality::Audio => self.audio,
            Modality::Vibration => self.vibration,
            Modality::Torch => self.torch,
            Modality::Banner => self.banner,
        }
    }

    pub fn is_active(&self, modality: Modality) -> bool {
        self.outcome(modality) == ModalityOutcome::Active
    }

    pub fn active_count(&self) -> usize {
        Modality::ALL
            .iter()
            .filter(|m| self.is_active(**m))
            .count()
    }
}

/// One live alarm session: cancel signal, timer tasks, acquisition report.
struct AlarmSession {
    cancel: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    report: ModalityReport,
}

/// The engine. At most one alarm session is live at any time.
pub struct AlarmEffectsEngine {
    emitters: EmitterSet,
    config: EffectsConfig,
    session: Mutex<Option<AlarmSession>>,
    torch_probe: parking_lot::Mutex<Option<bool>>,
}

impl AlarmEffectsEngine {
    pub fn new(emitters: EmitterSet, config: EffectsConfig) -> Self {
        AlarmEffectsEngine {
            emitters,
            config,
            session: Mutex::new(None),
            torch_probe: parking_lot::Mutex::new(None),
        }
    }

    /// Start one alarm session across all four emitters.
    ///
    /// If a previous session exists its teardown runs to completion first,
    /// under the session lock, so acquire and release of the same resource
    /// never interleave. Per-emitter failures degrade that modality only;
    /// this call itself never fails.
    pub async fn start(&self) -> ModalityReport {
        let mut slot = self.session.lock().await;
        if let Some(prev) = slot.take() {
            Self::teardown(prev, &self.emitters).await;
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut tasks = Vec::new();
        let mut report = ModalityReport::default();

        let audio_result = if self.config.audio_looping {
            self.emitters.audio.play_looping()
        } else {
            self.emitters.audio.play_once()
        };
        report.audio = Self::classify(Modality::Audio, audio_result);

        let phase = self.config.vibration_phase;
        let vibration_result = if self.config.vibration_repeating {
            self.emitters.vibration.start_waveform(phase, phase)
        } else {
            self.emitters.vibration.pulse_once(phase)
        };
        report.vibration = Self::classify(Modality::Vibration, vibration_result);

        if self.torch_available() {
            tasks.push(tokio::spawn(strobe_loop(
                Arc::clone(&self.emitters.torch),
                self.config.strobe_phase,
                self.config.strobe_policy,
                cancel_rx.clone(),
            )));
            report.torch = ModalityOutcome::Active;
        } else {
            debug!("torch absent, alarm continues without strobe");
            report.torch = ModalityOutcome::Unavailable;
        }

        tasks.push(tokio::spawn(banner_loop(
            Arc::clone(&self.emitters.banner),
            self.config.banner_period,
            cancel_rx,
        )));
        report.banner = ModalityOutcome::Active;

        *slot = Some(AlarmSession {
            cancel: cancel_tx,
            tasks,
            report: report.clone(),
        });
        report
    }

    /// Stop the current alarm session, if any. Safe to call any number of
    /// times, from any task; returns after all timer loops have exited and
    /// every emitter is released.
    pub async fn stop(&self) {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.take() {
            Self::teardown(session, &self.emitters).await;
        }
    }

    /// Whether a session is currently live.
    pub async fn is_active(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// The current session's acquisition report.
    pub async fn report(&self) -> Option<ModalityReport> {
        self.session.lock().await.as_ref().map(|s| s.report.clone())
    }

    fn classify(modality: Modality, result: Result<(), EmitterError>) -> ModalityOutcome {
        match result {
            Ok(()) => ModalityOutcome::Active,
            Err(EmitterError::Unavailable(reason)) => {
                debug!("{} unavailable: {}", modality, reason);
                ModalityOutcome::Unavailable
            }
            Err(e) => {
                warn!("{} acquisition failed, degrading: {}", modality, e);
                ModalityOutcome::Degraded
            }
        }
    }

    /// Torch capability, probed once and cached.
    fn torch_available(&self) -> bool {
        let mut probe = self.torch_probe.lock();
        *probe.get_or_insert_with(|| self.emitters.torch.available())
    }

    async fn teardown(session: AlarmSession, emitters: &EmitterSet) {
        let _ = session.cancel.send(true);
        for task in session.tasks {
            let _ = task.await;
        }
        emitters.audio.stop();
        emitters.vibration.cancel();
        if let Err(e) = emitters.torch.set_on(false) {
            debug!("torch release: {}", e);
        }
        emitters.banner.clear();
    }
}

/// Wait one phase, or return `true` immediately on cancellation.
async fn phase_wait(cancel: &mut watch::Receiver<bool>, phase: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(phase) => false,
        _ = cancel.changed() => true,
    }
}

/// Torch strobe loop. Observes cancellation at every phase boundary, so
/// stop latency is bounded by one phase.
async fn strobe_loop(
    torch: Arc<dyn Torch>,
    phase: Duration,
    policy: StrobePolicy,
    mut cancel: watch::Receiver<bool>,
) {
    let mut remaining = match policy {
        StrobePolicy::Count(n) => Some(n),
        StrobePolicy::Infinite => None,
    };

    loop {
        if remaining == Some(0) {
            break;
        }
        if let Err(e) = torch.set_on(true) {
            warn!("torch strobe failed, stopping strobe: {}", e);
            break;
        }
        if phase_wait(&mut cancel, phase).await {
            break;
        }
        if let Err(e) = torch.set_on(false) {
            warn!("torch strobe failed, stopping strobe: {}", e);
            break;
        }
        if let Some(n) = remaining.as_mut() {
            *n -= 1;
            if *n == 0 {
                break;
            }
        }
        if phase_wait(&mut cancel, phase).await {
            break;
        }
    }

    // Torch must end off on every exit path.
    let _ = torch.set_on(false);
}

/// Banner blink loop, independent of the strobe period.
async fn banner_loop(banner: Arc<dyn Banner>, period: Duration, mut cancel: watch::Receiver<bool>) {
    let mut highlighted = true;
    loop {
        banner.set_highlight(highlighted);
        if phase_wait(&mut cancel, period).await {
            break;
        }
        highlighted = !highlighted;
    }
    banner.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimEmitters;
    use std::time::Instant;

    fn engine(sim: &SimEmitters, config: EffectsConfig) -> AlarmEffectsEngine {
        AlarmEffectsEngine::new(sim.set(), config)
    }

    #[tokio::test]
    async fn test_start_acquires_all_modalities() {
        let sim = SimEmitters::new();
        let engine = engine(&sim, EffectsConfig::persistent());

        let report = engine.start().await;
        assert_eq!(report.active_count(), 4);
        assert!(sim.audio.is_playing());
        assert!(sim.vibration.is_active());
        assert!(engine.is_active().await);

        engine.stop().await;
        assert!(sim.all_released());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let sim = SimEmitters::new();
        let engine = engine(&sim, EffectsConfig::persistent());

        engine.start().await;
        engine.stop().await;
        engine.stop().await;
        engine.stop().await;
        assert!(sim.all_released());
        assert!(!engine.is_active().await);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let sim = SimEmitters::new();
        let engine = engine(&sim, EffectsConfig::persistent());
        engine.stop().await;
        assert!(sim.all_released());
    }

    #[tokio::test]
    async fn test_restart_never_double_acquires() {
        let sim = SimEmitters::new();
        let engine = engine(&sim, EffectsConfig::persistent());

        engine.start().await;
        engine.start().await;

        assert_eq!(sim.audio.acquisitions(), 2);
        assert_eq!(sim.audio.overlaps(), 0);
        assert!(sim.audio.is_playing());

        engine.stop().await;
        assert!(sim.all_released());
    }

    #[tokio::test]
    async fn test_torch_absent_degrades_silently() {
        let sim = SimEmitters::without_torch();
        let engine = engine(&sim, EffectsConfig::persistent());

        let report = engine.start().await;
        assert_eq!(report.torch, ModalityOutcome::Unavailable);
        assert!(report.is_active(Modality::Audio));
        assert!(report.is_active(Modality::Vibration));
        assert!(report.is_active(Modality::Banner));

        engine.stop().await;
    }

    #[tokio::test]
    async fn test_audio_failure_is_isolated() {
        let sim = SimEmitters::with_failing_audio();
        let engine = engine(&sim, EffectsConfig::persistent());

        let report = engine.start().await;
        assert_eq!(report.audio, ModalityOutcome::Degraded);
        assert!(report.is_active(Modality::Vibration));
        assert!(report.is_active(Modality::Torch));
        assert!(report.is_active(Modality::Banner));

        engine.stop().await;
        assert!(sim.all_released());
    }

    #[tokio::test]
    async fn test_stop_latency_within_one_phase() {
        let sim = SimEmitters::new();
        let engine = engine(&sim, EffectsConfig::persistent());

        engine.start().await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        let begin = Instant::now();
        engine.stop().await;
        assert!(begin.elapsed() <= faro_core::STROBE_PHASE);
        assert!(sim.all_released());
    }

    #[tokio::test]
    async fn test_burst_strobe_is_bounded() {
        let sim = SimEmitters::new();
        let config = EffectsConfig {
            strobe_policy: StrobePolicy::Count(3),
            strobe_phase: Duration::from_millis(10),
            ..EffectsConfig::burst()
        };
        let engine = engine(&sim, config);

        engine.start().await;
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(sim.torch.on_count(), 3);
        assert!(!sim.torch.is_on());

        engine.stop().await;
        assert!(sim.all_released());
    }

    #[tokio::test]
    async fn test_concurrent_stops_are_safe() {
        let sim = SimEmitters::new();
        let engine = Arc::new(engine(&sim, EffectsConfig::persistent()));

        engine.start().await;
        let a = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.stop().await })
        };
        let b = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.stop().await })
        };
        a.await.unwrap();
        b.await.unwrap();
        assert!(sim.all_released());
    }
}
