//! Audio system using Web Audio API
//!
//! Procedurally generated tones - no external files needed. Sound is
//! best-effort: every Web Audio call is swallowed on failure and nothing
//! here can throw into the game loop. On native builds the manager is a
//! silent stub so the simulation and tests stay platform-free.

use crate::sim::GameEvent;

/// Oscillator waveform for a synthesized tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Named sound effects triggered by game events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundEffect {
    /// Session start - rising two-note chirp
    Start,
    /// Projectile fired
    Fire,
    /// Asteroid destroyed; pitch is randomized per explosion
    Explosion { pitch: f32 },
    /// Entering pause
    Pause,
    /// Leaving pause
    Resume,
    /// Run ended - descending notes
    GameOver,
}

impl SoundEffect {
    /// Map a simulation event to its effect, if it makes a sound
    pub fn for_event(event: GameEvent) -> Option<Self> {
        match event {
            GameEvent::Started => Some(Self::Start),
            GameEvent::Fired => Some(Self::Fire),
            GameEvent::Explosion { pitch } => Some(Self::Explosion { pitch }),
            GameEvent::Paused => Some(Self::Pause),
            GameEvent::Resumed => Some(Self::Resume),
            GameEvent::GameOver => Some(Self::GameOver),
        }
    }
}

pub use backend::AudioManager;

#[cfg(target_arch = "wasm32")]
mod backend {
    use super::{SoundEffect, Waveform};
    use web_sys::{AudioContext, OscillatorType};

    impl Waveform {
        fn oscillator_type(self) -> OscillatorType {
            match self {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Square => OscillatorType::Square,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
                Waveform::Triangle => OscillatorType::Triangle,
            }
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context; the game runs on silently
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Play a tone of the given frequency, duration, waveform, and
        /// volume. The core synthesis contract; failures are swallowed.
        pub fn play_tone(&self, frequency: f32, duration_secs: f64, waveform: Waveform, volume: f32) {
            self.tone_at(frequency, duration_secs, waveform, volume, 0.0);
        }

        /// Schedule a tone `delay_secs` into the future
        fn tone_at(
            &self,
            frequency: f32,
            duration_secs: f64,
            waveform: Waveform,
            volume: f32,
            delay_secs: f64,
        ) {
            let vol = self.effective_volume() * volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let Ok(osc) = ctx.create_oscillator() else { return };
            let Ok(gain) = ctx.create_gain() else { return };
            osc.set_type(waveform.oscillator_type());
            osc.frequency().set_value(frequency);
            if osc.connect_with_audio_node(&gain).is_err() {
                return;
            }
            if gain.connect_with_audio_node(&ctx.destination()).is_err() {
                return;
            }

            let t = ctx.current_time() + delay_secs;
            let _ = gain.gain().set_value_at_time(vol, t);
            let _ = gain
                .gain()
                .exponential_ramp_to_value_at_time(0.01, t + duration_secs);
            let _ = osc.start_with_when(t);
            let _ = osc.stop_with_when(t + duration_secs + 0.05);
        }

        /// Play a named sound effect
        pub fn play(&self, effect: SoundEffect) {
            match effect {
                SoundEffect::Start => {
                    self.tone_at(440.0, 0.12, Waveform::Triangle, 0.3, 0.0);
                    self.tone_at(660.0, 0.15, Waveform::Triangle, 0.3, 0.1);
                }
                SoundEffect::Fire => {
                    self.play_tone(880.0, 0.07, Waveform::Square, 0.2);
                }
                SoundEffect::Explosion { pitch } => {
                    self.play_tone(pitch, 0.3, Waveform::Sawtooth, 0.5);
                }
                SoundEffect::Pause => {
                    self.play_tone(330.0, 0.1, Waveform::Sine, 0.3);
                }
                SoundEffect::Resume => {
                    self.play_tone(440.0, 0.1, Waveform::Sine, 0.3);
                }
                SoundEffect::GameOver => {
                    for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                        self.tone_at(*freq, 0.3, Waveform::Sine, 0.3, i as f64 * 0.2);
                    }
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod backend {
    use super::{SoundEffect, Waveform};

    /// Silent stand-in with the same surface as the web manager
    #[derive(Default)]
    pub struct AudioManager {
        muted: bool,
    }

    impl AudioManager {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn resume(&self) {}

        pub fn set_master_volume(&mut self, _vol: f32) {}

        pub fn set_sfx_volume(&mut self, _vol: f32) {}

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn play_tone(&self, frequency: f32, duration_secs: f64, waveform: Waveform, volume: f32) {
            if !self.muted {
                log::trace!("tone {frequency}Hz {duration_secs}s {waveform:?} vol {volume}");
            }
        }

        pub fn play(&self, effect: SoundEffect) {
            if !self.muted {
                log::trace!("sound effect {effect:?}");
            }
        }
    }
}
