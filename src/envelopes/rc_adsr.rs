//! ADSR envelope generator modeled on an analog RC circuit.

use crate::Signal;
use tracing::warn;

/// Stage of the envelope state machine.
///
/// There is no explicit sustain stage: decay approaches the sustain level
/// asymptotically and holds there until a gate-off moves the envelope to
/// [`Stage::Release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Envelope has never been gated; output is frozen
    Idle,
    /// Capacitor charging toward the supply rail
    Attack,
    /// Capacitor discharging toward the sustain level
    Decay,
    /// Capacitor discharging toward zero
    Release,
}

/// ADSR envelope generator that simulates an analog RC circuit.
///
/// Each stage follows the exponential charge/discharge curve of a
/// resistor-capacitor network instead of a linear ramp. The stage time
/// constants are derived from a per-stage resistance (in kΩ) and a shared
/// capacitance (in µF), so the envelope is configured the way an analog
/// circuit is built:
///
/// - **Attack**: charges from the gate-on amplitude toward 1.0; hands over
///   to decay once the output crosses [`RcAdsr::ATTACK_THRESHOLD`]
/// - **Decay**: discharges toward the sustain level and holds there
///   (there is no separate sustain stage)
/// - **Release**: discharges toward 0.0 from wherever the gate-off landed
///
/// Gating on captures the current amplitude as the new attack starting
/// point, so re-triggering mid-decay or mid-release never produces an
/// amplitude discontinuity.
///
/// # Preconditions
///
/// The generator performs no validation and no clamping. Resistances,
/// capacitance, and sampling period must be positive, and the sustain level
/// must lie in `[0, ATTACK_THRESHOLD)`; violating these is a configuration
/// error that yields non-physical or non-terminating curves, not a panic.
///
/// # Examples
///
/// ```
/// use farad::{RcAdsr, Signal};
///
/// // 3 kΩ attack, 4 kΩ decay, 30% sustain, 10 kΩ release,
/// // 22 µF capacitor, 1 kHz sample clock
/// let mut env = RcAdsr::new(3.0, 4.0, 0.3, 10.0, 22.0, 0.001);
///
/// // Gate the envelope on and run the attack/decay portion
/// env.gate_on();
/// for _ in 0..500 {
///     let level = env.next_sample();
///     // Use level to control amplitude, filter cutoff, etc.
/// }
///
/// // Gate off and let the release tail run
/// env.gate_off();
/// for _ in 0..500 {
///     let level = env.next_sample();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RcAdsr {
    stage: Stage,
    tick: u32,      // samples since the last gate-on
    amplitude: f64, // current output level

    // Component values
    attack_r: f64,        // kΩ
    decay_r: f64,         // kΩ
    sustain_level: f64,   // 0.0 to just below ATTACK_THRESHOLD
    release_r: f64,       // kΩ
    capacitance: f64,     // µF
    sampling_period: f64, // seconds per sample

    // Stage-boundary snapshots, anchoring the later stages' curves
    v1: f64, // amplitude when attack crossed the threshold
    t1: f64, // elapsed seconds at that crossing
    v2: f64, // amplitude at gate-off
    t2: f64, // elapsed seconds at gate-off
    v3: f64, // amplitude at gate-on
}

impl RcAdsr {
    /// Output level at which attack hands over to decay.
    ///
    /// Analog envelope circuits end the attack stage well before the
    /// capacitor reaches the rail, where the charge curve has gone flat.
    /// The sustain level must stay strictly below this value.
    pub const ATTACK_THRESHOLD: f64 = 0.6;

    /// Creates a new envelope in the idle stage with zero amplitude.
    ///
    /// # Arguments
    ///
    /// * `attack_r` - Attack resistance in kΩ (positive)
    /// * `decay_r` - Decay resistance in kΩ (positive)
    /// * `sustain_level` - Sustain level in `[0, ATTACK_THRESHOLD)`
    /// * `release_r` - Release resistance in kΩ (positive)
    /// * `capacitance` - Shared capacitance in µF (positive)
    /// * `sampling_period` - Seconds per sample (positive), e.g. `1.0 / 44100.0`
    ///
    /// # Examples
    ///
    /// ```
    /// use farad::RcAdsr;
    ///
    /// let env = RcAdsr::new(3.0, 4.0, 0.3, 10.0, 22.0, 1.0 / 44100.0);
    /// assert!(!env.is_active());
    /// ```
    pub fn new(
        attack_r: f64,
        decay_r: f64,
        sustain_level: f64,
        release_r: f64,
        capacitance: f64,
        sampling_period: f64,
    ) -> Self {
        Self {
            stage: Stage::Idle,
            tick: 0,
            amplitude: 0.0,
            attack_r,
            decay_r,
            sustain_level,
            release_r,
            capacitance,
            sampling_period,
            v1: 0.0,
            t1: 0.0,
            v2: 0.0,
            t2: 0.0,
            v3: 0.0,
        }
    }

    /// Triggers the start of a new envelope cycle.
    ///
    /// The current amplitude becomes the attack curve's starting point and
    /// the sample clock restarts at zero. Callable from any stage; calling
    /// it mid-cycle is an explicit re-trigger.
    ///
    /// # Examples
    ///
    /// ```
    /// use farad::{RcAdsr, Stage};
    ///
    /// let mut env = RcAdsr::new(3.0, 4.0, 0.3, 10.0, 22.0, 0.001);
    /// env.gate_on();
    /// assert_eq!(env.stage(), Stage::Attack);
    /// ```
    pub fn gate_on(&mut self) {
        self.v3 = self.amplitude;
        self.tick = 0;
        self.stage = Stage::Attack;
    }

    /// Ends the sustained portion of the cycle and begins release.
    ///
    /// The current amplitude and elapsed time anchor the release curve, so
    /// gating off during attack or decay releases from whatever level had
    /// been reached. Callable from any stage.
    ///
    /// # Examples
    ///
    /// ```
    /// use farad::{RcAdsr, Signal, Stage};
    ///
    /// let mut env = RcAdsr::new(3.0, 4.0, 0.3, 10.0, 22.0, 0.001);
    /// env.gate_on();
    /// for _ in 0..100 {
    ///     env.next_sample();
    /// }
    /// env.gate_off();
    /// assert_eq!(env.stage(), Stage::Release);
    /// ```
    pub fn gate_off(&mut self) {
        self.v2 = self.amplitude;
        self.t2 = self.tick as f64 * self.sampling_period;
        self.stage = Stage::Release;
    }

    /// Produces the next output sample and advances the state machine.
    ///
    /// In the idle stage the output is frozen at its last value. Attack
    /// hands over to decay at the first sample whose amplitude exceeds
    /// [`RcAdsr::ATTACK_THRESHOLD`]; that crossing sample is still computed
    /// with the attack curve. Decay and release approach their targets
    /// asymptotically and never leave their stage on their own.
    ///
    /// The sample counter wraps around at `u32::MAX`. A warning is logged
    /// at the wrap point; gating on again resets the counter.
    pub fn advance(&mut self) -> f64 {
        let t = self.tick as f64 * self.sampling_period;

        match self.stage {
            Stage::Idle => {}
            Stage::Attack => {
                self.amplitude = self.attack_level(t);
                if self.amplitude > Self::ATTACK_THRESHOLD {
                    self.v1 = self.amplitude;
                    self.t1 = t;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                self.amplitude = self.decay_level(t);
            }
            Stage::Release => {
                self.amplitude = self.release_level(t);
            }
        }

        self.tick = self.tick.wrapping_add(1);
        if self.tick == u32::MAX {
            warn!("envelope sample counter about to wrap; gate_on resets it");
        }

        self.amplitude
    }

    /// Restores the post-construction run-time state.
    ///
    /// The stage returns to idle and the output, sample clock, and gate-on
    /// snapshot are zeroed. Component values are left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use farad::{RcAdsr, Signal};
    ///
    /// let mut env = RcAdsr::new(3.0, 4.0, 0.3, 10.0, 22.0, 0.001);
    /// env.gate_on();
    /// env.next_sample();
    /// env.reset();
    /// assert!(!env.is_active());
    /// assert_eq!(env.amplitude(), 0.0);
    /// ```
    pub fn reset(&mut self) {
        self.stage = Stage::Idle;
        self.tick = 0;
        self.amplitude = 0.0;
        self.v3 = 0.0;
    }

    /// Gets the current stage of the envelope.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Gets the current output amplitude without advancing the envelope.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Returns true if the envelope has been gated at least once.
    ///
    /// Unlike ramp-based envelopes, an RC release never reaches zero
    /// exactly, so the envelope stays active until the caller resets it.
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, Stage::Idle)
    }

    /// Sets the attack resistance in kΩ. Must be positive.
    pub fn set_attack_resistance(&mut self, kohms: f64) {
        self.attack_r = kohms;
    }

    /// Sets the decay resistance in kΩ. Must be positive.
    pub fn set_decay_resistance(&mut self, kohms: f64) {
        self.decay_r = kohms;
    }

    /// Sets the release resistance in kΩ. Must be positive.
    pub fn set_release_resistance(&mut self, kohms: f64) {
        self.release_r = kohms;
    }

    /// Sets the sustain level. Must stay in `[0, ATTACK_THRESHOLD)`.
    pub fn set_sustain_level(&mut self, level: f64) {
        self.sustain_level = level;
    }

    /// Sets the shared capacitance in µF. Must be positive.
    pub fn set_capacitance(&mut self, microfarads: f64) {
        self.capacitance = microfarads;
    }

    /// Sets the sampling period in seconds per sample. Must be positive.
    ///
    /// Changing this mid-cycle distorts the in-flight curve; change it
    /// between notes.
    pub fn set_sampling_period(&mut self, seconds: f64) {
        self.sampling_period = seconds;
    }

    // Charge curve from v3 toward the rail. The kΩ·µF product is scaled
    // by 1/1000 to express the time constant in seconds.
    fn attack_level(&self, t: f64) -> f64 {
        let tau = self.attack_r * self.capacitance / 1000.0;
        1.0 - (1.0 - self.v3) * (-t / tau).exp()
    }

    // Discharge curve from the threshold crossing toward the sustain level.
    fn decay_level(&self, t: f64) -> f64 {
        let tau = self.decay_r * self.capacitance / 1000.0;
        (self.v1 - self.sustain_level) * (-(t - self.t1) / tau).exp() + self.sustain_level
    }

    // Discharge curve from the gate-off point toward zero.
    fn release_level(&self, t: f64) -> f64 {
        let tau = self.release_r * self.capacitance / 1000.0;
        self.v2 * (-(t - self.t2) / tau).exp()
    }
}

impl Signal for RcAdsr {
    fn next_sample(&mut self) -> f64 {
        self.advance()
    }
}
