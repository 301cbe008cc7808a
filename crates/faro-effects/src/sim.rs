//! Simulated emitters
//!
//! In-process emitters that record what the engine did to them. Tests and
//! headless hosts use these; device hosts supply real hardware bindings.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{AudioSink, Banner, EmitterError, EmitterSet, Torch, VibrationMotor};

/// Audio device that tracks acquisitions and would-be overlaps.
pub struct SimAudio {
    playing: AtomicBool,
    acquisitions: AtomicUsize,
    overlaps: AtomicUsize,
    fail: bool,
}

impl SimAudio {
    pub fn new() -> Self {
        SimAudio {
            playing: AtomicBool::new(false),
            acquisitions: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Audio device whose acquisition always fails.
    pub fn failing() -> Self {
        SimAudio {
            fail: true,
            ..Self::new()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Times a play call found a previous instance still live. The engine
    /// contract keeps this at zero.
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Result<(), EmitterError> {
        if self.fail {
            return Err(EmitterError::Hardware("sim audio fault".into()));
        }
        if self.playing.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Default for SimAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for SimAudio {
    fn play_looping(&self) -> Result<(), EmitterError> {
        self.acquire()
    }

    fn play_once(&self) -> Result<(), EmitterError> {
        self.acquire()
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }
}

/// Vibration motor, optionally absent.
pub struct SimVibration {
    active: AtomicBool,
    present: bool,
}

impl SimVibration {
    pub fn new() -> Self {
        SimVibration {
            active: AtomicBool::new(false),
            present: true,
        }
    }

    pub fn absent() -> Self {
        SimVibration {
            present: false,
            ..Self::new()
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Result<(), EmitterError> {
        if !self.present {
            return Err(EmitterError::Unavailable("no vibration motor".into()));
        }
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Default for SimVibration {
    fn default() -> Self {
        Self::new()
    }
}

impl VibrationMotor for SimVibration {
    fn start_waveform(&self, _on: Duration, _off: Duration) -> Result<(), EmitterError> {
        self.acquire()
    }

    fn pulse_once(&self, _duration: Duration) -> Result<(), EmitterError> {
        self.acquire()
    }

    fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Torch, optionally absent, with toggle accounting.
pub struct SimTorch {
    present: bool,
    on: AtomicBool,
    on_count: AtomicUsize,
}

impl SimTorch {
    pub fn new() -> Self {
        SimTorch {
            present: true,
            on: AtomicBool::new(false),
            on_count: AtomicUsize::new(0),
        }
    }

    /// Device without flash hardware.
    pub fn absent() -> Self {
        SimTorch {
            present: false,
            ..Self::new()
        }
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    /// Times the torch was switched on.
    pub fn on_count(&self) -> usize {
        self.on_count.load(Ordering::SeqCst)
    }
}

impl Default for SimTorch {
    fn default() -> Self {
        Self::new()
    }
}

impl Torch for SimTorch {
    fn available(&self) -> bool {
        self.present
    }

    fn set_on(&self, on: bool) -> Result<(), EmitterError> {
        if !self.present {
            return Err(EmitterError::Unavailable("no flash hardware".into()));
        }
        if on && !self.on.swap(true, Ordering::SeqCst) {
            self.on_count.fetch_add(1, Ordering::SeqCst);
        } else if !on {
            self.on.store(false, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Banner indicator with phase accounting.
pub struct SimBanner {
    highlighted: AtomicBool,
    toggles: AtomicUsize,
}

impl SimBanner {
    pub fn new() -> Self {
        SimBanner {
            highlighted: AtomicBool::new(false),
            toggles: AtomicUsize::new(0),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted.load(Ordering::SeqCst)
    }

    pub fn toggles(&self) -> usize {
        self.toggles.load(Ordering::SeqCst)
    }
}

impl Default for SimBanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Banner for SimBanner {
    fn set_highlight(&self, on: bool) {
        self.highlighted.store(on, Ordering::SeqCst);
        self.toggles.fetch_add(1, Ordering::SeqCst);
    }

    fn clear(&self) {
        self.highlighted.store(false, Ordering::SeqCst);
    }
}

/// One full set of simulated emitters plus handles for assertions.
pub struct SimEmitters {
    pub audio: Arc<SimAudio>,
    pub vibration: Arc<SimVibration>,
    pub torch: Arc<SimTorch>,
    pub banner: Arc<SimBanner>,
}

impl SimEmitters {
    pub fn new() -> Self {
        SimEmitters {
            audio: Arc::new(SimAudio::new()),
            vibration: Arc::new(SimVibration::new()),
            torch: Arc::new(SimTorch::new()),
            banner: Arc::new(SimBanner::new()),
        }
    }

    pub fn without_torch() -> Self {
        SimEmitters {
            torch: Arc::new(SimTorch::absent()),
            ..Self::new()
        }
    }

    pub fn with_failing_audio() -> Self {
        SimEmitters {
            audio: Arc::new(SimAudio::failing()),
            ..Self::new()
        }
    }

    /// The trait-object set the engine consumes.
    pub fn set(&self) -> EmitterSet {
        EmitterSet {
            audio: self.audio.clone(),
            vibration: self.vibration.clone(),
            torch: self.torch.clone(),
            banner: self.banner.clone(),
        }
    }

    /// True when no emitter holds a live resource.
    pub fn all_released(&self) -> bool {
        !self.audio.is_playing()
            && !self.vibration.is_active()
            && !self.torch.is_on()
            && !self.banner.is_highlighted()
    }
}

impl Default for SimEmitters {
    fn default() -> Self {
        Self::new()
    }
}
