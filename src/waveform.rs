//! Waveform construction: padding and repeating the user's sample markup.
//!
//! Everything here is pure. The widget calls [`build_sequence`] once at
//! construction and keeps the result for its whole lifetime.

/// Three-sample heartbeat blip, the default markup.
pub const PULSE: [f64; 3] = [0.5, -1.0, 0.3];

/// Twelve-sample "signature" trace: a small lead-in bump, a sharp spike
/// and a slow recovery wave.
pub const SIGNATURE: [f64; 12] = [0.1, 0.2, 0.0, -0.15, 0.95, -0.7, 0.1, 0.0, 0.25, 0.35, 0.15, 0.0];

/// Built-in markup presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    #[default]
    Pulse,
    Signature,
}

impl Preset {
    pub fn samples(self) -> &'static [f64] {
        match self {
            Self::Pulse => &PULSE,
            Self::Signature => &SIGNATURE,
        }
    }
}

/// `pad` zeros, then `samples` unchanged, then `pad` zeros.
pub fn surround(samples: &[f64], pad: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(samples.len() + pad * 2);
    out.resize(pad, 0.0);
    out.extend_from_slice(samples);
    out.resize(out.len() + pad, 0.0);
    out
}

/// Repeat `samples` `repeat` times with `pad / 2` zeros around every copy,
/// then wrap the whole run in another `pad / 2` zeros.
///
/// Only the half padding is used here, so a repeated waveform has thinner
/// edges than the single-copy [`surround`] path. A `repeat` of 0 behaves
/// like 1.
pub fn repeat_and_surround(samples: &[f64], repeat: usize, pad: usize) -> Vec<f64> {
    let half = pad / 2;
    let unit = surround(samples, half);
    let repeated = unit.repeat(repeat.max(1));
    surround(&repeated, half)
}

/// Build the sequence the widget draws: repeated iff `repeat > 1`.
pub fn build_sequence(markup: &[f64], repeat: usize, interval: usize) -> Vec<f64> {
    if repeat > 1 {
        repeat_and_surround(markup, repeat, interval)
    } else {
        surround(markup, interval)
    }
}

/// Length of [`build_sequence`]'s output, or `None` if it overflows `usize`.
pub fn sequence_len(markup_len: usize, repeat: usize, interval: usize) -> Option<usize> {
    if repeat > 1 {
        let half = interval / 2;
        let unit = markup_len.checked_add(half.checked_mul(2)?)?;
        unit.checked_mul(repeat)?.checked_add(half.checked_mul(2)?)
    } else {
        markup_len.checked_add(interval.checked_mul(2)?)
    }
}
