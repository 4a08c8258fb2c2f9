//! Audio cues using the Web Audio API
//!
//! Short procedural blips, no sample files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Bright two-voice chirp
    Hit,
    /// Low falling thud
    Miss,
}

/// Lazily created audio context plus volume state
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            ctx: None,
            master_volume: 0.8,
        }
    }

    /// Create or resume the context; browsers only allow this after a
    /// user gesture
    pub fn ensure(&mut self) {
        if self.ctx.is_none() {
            self.ctx = AudioContext::new().ok();
            if self.ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
                return;
            }
        }
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Play a cue; any Web Audio failure is swallowed
    pub fn play(&mut self, cue: Cue) {
        let vol = self.master_volume;
        if vol <= 0.0 {
            return;
        }
        self.ensure();
        let Some(ctx) = &self.ctx else { return };

        match cue {
            Cue::Hit => play_hit(ctx, vol),
            Cue::Miss => play_miss(ctx, vol),
        }
    }
}

/// Gain node with a quick attack and exponential release
fn envelope(ctx: &AudioContext, peak: f32, release: f64) -> Option<GainNode> {
    let gain = ctx.create_gain().ok()?;
    let t = ctx.current_time();
    gain.gain().set_value_at_time(0.0001, t).ok()?;
    gain.gain()
        .exponential_ramp_to_value_at_time(peak.max(0.0002), t + 0.01)
        .ok()?;
    gain.gain()
        .exponential_ramp_to_value_at_time(0.0001, t + release)
        .ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;
    Some(gain)
}

/// Oscillator sweeping `from` -> `to` Hz over `sweep` seconds
fn sweep(
    ctx: &AudioContext,
    gain: &GainNode,
    osc_type: OscillatorType,
    from: f32,
    to: f32,
    sweep: f64,
) -> Option<OscillatorNode> {
    let osc = ctx.create_oscillator().ok()?;
    let t = ctx.current_time();
    osc.set_type(osc_type);
    osc.frequency().set_value_at_time(from, t).ok()?;
    osc.frequency()
        .exponential_ramp_to_value_at_time(to, t + sweep)
        .ok()?;
    osc.connect_with_audio_node(gain).ok()?;
    Some(osc)
}

fn play_hit(ctx: &AudioContext, vol: f32) {
    let Some(gain) = envelope(ctx, 0.09 * vol, 0.10) else {
        return;
    };
    let t = ctx.current_time();
    let voices = [
        sweep(ctx, &gain, OscillatorType::Sine, 820.0, 620.0, 0.08),
        sweep(ctx, &gain, OscillatorType::Triangle, 410.0, 320.0, 0.08),
    ];
    for osc in voices.into_iter().flatten() {
        osc.start().ok();
        osc.stop_with_when(t + 0.11).ok();
    }
}

fn play_miss(ctx: &AudioContext, vol: f32) {
    let Some(gain) = envelope(ctx, 0.08 * vol, 0.14) else {
        return;
    };
    let t = ctx.current_time();
    if let Some(osc) = sweep(ctx, &gain, OscillatorType::Sine, 180.0, 120.0, 0.12) {
        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }
}
