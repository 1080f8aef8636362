//! Audio system
//!
//! Procedurally generated sound effects and music - no external files needed!
//! The envelopes and the music sequencer are plain data so they can be tested
//! natively; only [`WebAudio`] (wasm32) talks to the Web Audio API.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

pub use crate::sim::SoundCue;

/// Sink for sound cues drained from the simulation
pub trait AudioBackend {
    /// Prepare the audio graph. Safe to call repeatedly; later calls only
    /// resume a suspended context.
    fn init(&mut self);

    /// Play a one-shot cue. A backend that isn't initialized stays silent.
    fn play(&mut self, cue: SoundCue);
}

/// Backend that never makes a sound
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioBackend for SilentAudio {
    fn init(&mut self) {}
    fn play(&mut self, _cue: SoundCue) {}
}

/// Backend that remembers what it was asked to play
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub init_calls: u32,
    pub played: Vec<SoundCue>,
}

impl RecordingAudio {
    pub fn count(&self, cue: SoundCue) -> usize {
        self.played.iter().filter(|&&c| c == cue).count()
    }
}

impl AudioBackend for RecordingAudio {
    fn init(&mut self) {
        self.init_calls += 1;
    }

    fn play(&mut self, cue: SoundCue) {
        self.played.push(cue);
    }
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// How a parameter moves to its end value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Linear,
    Exponential,
}

/// Single-oscillator sound: a frequency sweep under a gain fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueEnvelope {
    pub wave: Waveform,
    pub freq_start: f32,
    pub freq_end: f32,
    pub freq_ramp: Ramp,
    pub gain_start: f32,
    pub gain_end: f32,
    pub gain_ramp: Ramp,
    /// Seconds
    pub duration: f64,
}

impl CueEnvelope {
    pub fn for_cue(cue: SoundCue) -> Self {
        match cue {
            // Zap down
            SoundCue::Fire => Self {
                wave: Waveform::Sawtooth,
                freq_start: 800.0,
                freq_end: 100.0,
                freq_ramp: Ramp::Exponential,
                gain_start: 0.3,
                gain_end: 0.01,
                gain_ramp: Ramp::Exponential,
                duration: 0.15,
            },
            // Crunchy low buzz
            SoundCue::EnemyHit => Self {
                wave: Waveform::Square,
                freq_start: 100.0,
                freq_end: 10.0,
                freq_ramp: Ramp::Linear,
                gain_start: 0.4,
                gain_end: 0.01,
                gain_ramp: Ramp::Exponential,
                duration: 0.2,
            },
            // Dull thud
            SoundCue::PlayerDamage => Self {
                wave: Waveform::Sine,
                freq_start: 150.0,
                freq_end: 50.0,
                freq_ramp: Ramp::Linear,
                gain_start: 0.5,
                gain_end: 0.01,
                gain_ramp: Ramp::Linear,
                duration: 0.3,
            },
        }
    }
}

/// Music voices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice {
    /// Long triangle drone, dry
    Bass,
    /// Short sine blip, sent through the echo
    Lead,
}

impl Voice {
    pub fn envelope(self, freq: f32) -> CueEnvelope {
        match self {
            Voice::Bass => CueEnvelope {
                wave: Waveform::Triangle,
                freq_start: freq,
                freq_end: freq,
                freq_ramp: Ramp::Linear,
                gain_start: 0.4,
                gain_end: 0.01,
                gain_ramp: Ramp::Exponential,
                duration: 1.5,
            },
            Voice::Lead => CueEnvelope {
                wave: Waveform::Sine,
                freq_start: freq,
                freq_end: freq,
                freq_ramp: Ramp::Linear,
                gain_start: 0.1,
                gain_end: 0.001,
                gain_ramp: Ramp::Exponential,
                duration: 0.5,
            },
        }
    }
}

/// A note scheduled on the audio clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicNote {
    /// Start time in audio-clock seconds
    pub time: f64,
    pub voice: Voice,
    pub freq: f32,
}

/// Lookahead scheduler for the background track
#[derive(Debug, Clone)]
pub struct MusicSequencer {
    rng: Pcg32,
    next_note_time: f64,
    step: u64,
}

impl MusicSequencer {
    pub const TEMPO_BPM: f64 = 110.0;
    /// How far ahead of the clock notes are queued (seconds)
    pub const LOOKAHEAD: f64 = 0.1;
    /// Scheduler wake-up period (milliseconds)
    pub const INTERVAL_MS: i32 = 25;

    pub const BASS_NOTES: [f32; 4] = [73.42, 65.41, 55.00, 73.42];
    pub const LEAD_NOTES: [f32; 6] = [146.83, 174.61, 196.00, 220.00, 261.63, 293.66];

    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_note_time: 0.0,
            step: 0,
        }
    }

    /// Eighth note length in seconds
    pub fn step_seconds() -> f64 {
        60.0 / Self::TEMPO_BPM / 2.0
    }

    /// Steps scheduled so far
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Queue every note starting before `now + LOOKAHEAD`
    pub fn schedule(&mut self, now: f64) -> Vec<MusicNote> {
        // The clock ran on without us (throttled tab); skip ahead instead of
        // dumping a burst of stale notes
        if self.next_note_time < now {
            self.next_note_time = now;
        }

        let mut notes = Vec::new();
        while self.next_note_time < now + Self::LOOKAHEAD {
            self.notes_for_step(self.step, self.next_note_time, &mut notes);
            self.next_note_time += Self::step_seconds();
            self.step += 1;
        }
        notes
    }

    fn notes_for_step(&mut self, step: u64, time: f64, out: &mut Vec<MusicNote>) {
        if step % 8 == 0 {
            let idx = (step / 16) as usize % Self::BASS_NOTES.len();
            out.push(MusicNote {
                time,
                voice: Voice::Bass,
                freq: Self::BASS_NOTES[idx],
            });
        }

        if self.rng.random_bool(0.6) {
            let base = Self::LEAD_NOTES[self.rng.random_range(0..Self::LEAD_NOTES.len())];
            let octave = if self.rng.random_bool(0.2) { 2.0 } else { 1.0 };
            out.push(MusicNote {
                time,
                voice: Voice::Lead,
                freq: base * octave,
            });
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{AudioContext, AudioContextState, AudioNode, DelayNode, GainNode, OscillatorType};

    use super::{AudioBackend, CueEnvelope, MusicSequencer, Ramp, SoundCue, Voice, Waveform};
    use crate::settings::Settings;

    /// Base level of the master bus before the user volume
    const MASTER_LEVEL: f32 = 0.3;
    const ECHO_DELAY: f64 = 0.3;
    const ECHO_FEEDBACK: f32 = 0.4;

    /// Nodes that live as long as the context
    struct Graph {
        ctx: AudioContext,
        master: GainNode,
        music: GainNode,
        echo: DelayNode,
    }

    impl Graph {
        fn build(master_level: f32, music_level: f32) -> Option<Self> {
            let ctx = AudioContext::new().ok()?;

            let master = ctx.create_gain().ok()?;
            master.gain().set_value(master_level);
            master.connect_with_audio_node(&ctx.destination()).ok()?;

            let music = ctx.create_gain().ok()?;
            music.gain().set_value(music_level);
            music.connect_with_audio_node(&master).ok()?;

            // Echo loop: delay -> feedback -> delay, tapped into the music bus
            let echo = ctx.create_delay().ok()?;
            echo.delay_time().set_value(ECHO_DELAY as f32);
            let feedback = ctx.create_gain().ok()?;
            feedback.gain().set_value(ECHO_FEEDBACK);
            echo.connect_with_audio_node(&feedback).ok()?;
            feedback.connect_with_audio_node(&echo).ok()?;
            echo.connect_with_audio_node(&music).ok()?;

            Some(Self {
                ctx,
                master,
                music,
                echo,
            })
        }

        fn play_envelope(&self, env: &CueEnvelope, dest: &AudioNode, t: f64) -> Option<()> {
            let osc = self.ctx.create_oscillator().ok()?;
            let gain = self.ctx.create_gain().ok()?;
            osc.set_type(osc_type(env.wave));
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(dest).ok()?;

            let end = t + env.duration;
            let freq = osc.frequency();
            freq.set_value_at_time(env.freq_start, t).ok()?;
            if env.freq_end != env.freq_start {
                match env.freq_ramp {
                    Ramp::Linear => freq.linear_ramp_to_value_at_time(env.freq_end, end).ok()?,
                    Ramp::Exponential => freq
                        .exponential_ramp_to_value_at_time(env.freq_end, end)
                        .ok()?,
                };
            }

            let level = gain.gain();
            level.set_value_at_time(env.gain_start, t).ok()?;
            match env.gain_ramp {
                Ramp::Linear => level.linear_ramp_to_value_at_time(env.gain_end, end).ok()?,
                Ramp::Exponential => level.exponential_ramp_to_value_at_time(env.gain_end, end).ok()?,
            };

            osc.start_with_when(t).ok()?;
            osc.stop_with_when(end).ok()?;
            Some(())
        }

        fn play_note(&self, voice: Voice, freq: f32, t: f64) {
            let dest: &AudioNode = match voice {
                Voice::Bass => &self.music,
                Voice::Lead => &self.echo,
            };
            self.play_envelope(&voice.envelope(freq), dest, t);
        }
    }

    fn osc_type(wave: Waveform) -> OscillatorType {
        match wave {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }

    /// Web Audio backend. The context is created lazily on the first
    /// [`AudioBackend::init`], which must follow a user gesture.
    pub struct WebAudio {
        graph: Option<Rc<Graph>>,
        failed: bool,
        master_level: f32,
        music_level: f32,
        seed: u64,
    }

    impl WebAudio {
        pub fn new(settings: &Settings, seed: u64) -> Self {
            let master_level = if settings.muted {
                0.0
            } else {
                MASTER_LEVEL * settings.master_volume.clamp(0.0, 1.0)
            };
            Self {
                graph: None,
                failed: false,
                master_level,
                music_level: settings.music_volume.clamp(0.0, 1.0),
                seed,
            }
        }

        fn start_music(&self, graph: Rc<Graph>) {
            let Some(window) = web_sys::window() else { return };
            let sequencer = RefCell::new(MusicSequencer::new(self.seed));

            let closure = Closure::<dyn FnMut()>::new(move || {
                let now = graph.ctx.current_time();
                for note in sequencer.borrow_mut().schedule(now) {
                    graph.play_note(note.voice, note.freq, note.time);
                }
            });
            if window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    MusicSequencer::INTERVAL_MS,
                )
                .is_err()
            {
                log::warn!("Failed to start music scheduler");
            }
            closure.forget();
        }
    }

    impl AudioBackend for WebAudio {
        fn init(&mut self) {
            if self.graph.is_none() && !self.failed {
                match Graph::build(self.master_level, self.music_level) {
                    Some(graph) => {
                        let graph = Rc::new(graph);
                        self.start_music(Rc::clone(&graph));
                        self.graph = Some(graph);
                        log::info!("Audio initialized");
                    }
                    None => {
                        // Don't retry on every click
                        self.failed = true;
                        log::warn!("Failed to create AudioContext - audio disabled");
                    }
                }
            }

            if let Some(graph) = &self.graph {
                if graph.ctx.state() == AudioContextState::Suspended {
                    let _ = graph.ctx.resume();
                }
            }
        }

        fn play(&mut self, cue: SoundCue) {
            let Some(graph) = &self.graph else { return };
            let t = graph.ctx.current_time();
            graph.play_envelope(&CueEnvelope::for_cue(cue), &graph.master, t);
        }
    }
}
