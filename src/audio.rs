//! Audio system using Web Audio API
//!
//! Procedurally generated cues - no external files needed!

use web_sys::{AudioContext, AudioNode, BiquadFilterType, GainNode, OscillatorNode, OscillatorType};

use crate::feedback::SoundEffect;

/// Overall level; each cue scales its own peak from this
const CUE_VOLUME: f32 = 1.0;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    muted: bool,
}

impl AudioManager {
    /// `muted` comes from the player's settings
    pub fn new(muted: bool) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            muted,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        if self.muted {
            return;
        }
        let vol = CUE_VOLUME;

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Correct => self.play_correct(ctx, vol),
            SoundEffect::Pass => self.play_pass(ctx, vol),
            SoundEffect::TimeUp => self.play_time_up(ctx, vol),
            SoundEffect::Countdown { last } => self.play_countdown(ctx, vol, last),
        }
    }

    // === Sound generators ===

    /// Oscillator feeding a silent gain node, routed through `via` to the output
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
        via: Option<&AudioNode>,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        gain.gain().set_value(0.0);
        match via {
            Some(node) => {
                osc.connect_with_audio_node(node).ok()?;
                node.connect_with_audio_node(&gain).ok()?;
            }
            None => {
                osc.connect_with_audio_node(&gain).ok()?;
            }
        }
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Quick attack then linear fade over `duration`
    fn blip(gain: &GainNode, peak: f32, start: f64, duration: f64) {
        gain.gain().set_value_at_time(0.0, start).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(peak, start + 0.01)
            .ok();
        gain.gain()
            .linear_ramp_to_value_at_time(0.0, start + duration)
            .ok();
    }

    /// Correct - two rising beeps
    fn play_correct(&self, ctx: &AudioContext, vol: f32) {
        let beep = 0.08;
        let gap = 0.04;
        for (i, freq) in [880.0, 1320.0].iter().enumerate() {
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine, None) {
                let t = ctx.current_time() + i as f64 * (beep + gap);
                Self::blip(&gain, vol * 0.5, t, beep);
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + beep).ok();
            }
        }
    }

    /// Pass - short downward tone
    fn play_pass(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 440.0, OscillatorType::Square, None) else {
            return;
        };
        let t = ctx.current_time();
        let duration = 0.2;

        osc.frequency().set_value_at_time(440.0, t).ok();
        osc.frequency()
            .linear_ramp_to_value_at_time(220.0, t + duration)
            .ok();
        Self::blip(&gain, vol * 0.3, t, duration);

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + duration).ok();
    }

    /// Time up - descending siren, softened by a low-pass
    fn play_time_up(&self, ctx: &AudioContext, vol: f32) {
        let Some(filter) = ctx.create_biquad_filter().ok() else {
            return;
        };
        filter.set_type(BiquadFilterType::Lowpass);
        filter.frequency().set_value(1500.0);
        filter.q().set_value(5.0);

        let Some((osc, gain)) =
            self.create_osc(ctx, 880.0, OscillatorType::Sawtooth, Some(&*filter))
        else {
            return;
        };
        let t = ctx.current_time();
        let duration = 0.8;
        let peak = vol * 0.4;

        osc.frequency().set_value_at_time(880.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(110.0, t + duration)
            .ok();
        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(peak, t + 0.05)
            .ok();
        gain.gain()
            .set_value_at_time(peak, t + duration - 0.05)
            .ok();
        gain.gain()
            .linear_ramp_to_value_at_time(0.0, t + duration)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + duration).ok();
    }

    /// Countdown - plain beep, or a higher longer one for the last
    fn play_countdown(&self, ctx: &AudioContext, vol: f32, last: bool) {
        let (freq, osc_type, duration) = if last {
            (880.0, OscillatorType::Square, 0.3)
        } else {
            (440.0, OscillatorType::Sine, 0.1)
        };
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type, None) else {
            return;
        };
        let t = ctx.current_time();

        Self::blip(&gain, vol * 0.3, t, duration);

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + duration).ok();
    }
}
