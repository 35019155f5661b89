//! Interpolation, easing and spring physics used by scene layout.
//!
//! All functions are pure over `f64` frame positions so a frame can be
//! computed in isolation, in any order.

/// Easing applied to the progress within one interpolation segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// `1 - (1 - t)^3`: fast start, gentle landing.
    OutCubic,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Map `input` through a piecewise curve, easing within each segment.
///
/// `input_range` must be non-decreasing and the same length as
/// `output_range` (at least two points). Input outside the range holds the
/// boundary output. Degenerate input is answered with the first output value
/// rather than a panic.
pub fn interpolate(input: f64, input_range: &[f64], output_range: &[f64], easing: Easing) -> f64 {
    let n = input_range.len().min(output_range.len());
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return output_range[0];
    }

    if input < input_range[0] {
        return output_range[0];
    }
    if input > input_range[n - 1] {
        return output_range[n - 1];
    }

    let mut segment = n - 2;
    for i in 1..n {
        if input < input_range[i] {
            segment = i - 1;
            break;
        }
    }

    let (in_lo, in_hi) = (input_range[segment], input_range[segment + 1]);
    let (out_lo, out_hi) = (output_range[segment], output_range[segment + 1]);

    let span = in_hi - in_lo;
    if span <= 0.0 {
        return if input < in_hi { out_lo } else { out_hi };
    }

    let t = easing.apply(((input - in_lo) / span).clamp(0.0, 1.0));
    out_lo + (out_hi - out_lo) * t
}

// ---------------------------------------------------------------------------
// Spring
// ---------------------------------------------------------------------------

/// Physical parameters of a damped spring animating from 0 to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub damping: f64,
    pub stiffness: f64,
    pub mass: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: 10.0,
            stiffness: 100.0,
            mass: 1.0,
        }
    }
}

/// Longest step the simulation takes between two samples, in milliseconds.
const MAX_STEP_MS: f64 = 64.0;

#[derive(Debug, Clone, Copy)]
struct SpringState {
    position: f64,
    velocity: f64,
    last_ms: f64,
}

fn step(state: SpringState, now_ms: f64, config: SpringConfig) -> SpringState {
    const TARGET: f64 = 1.0;

    let dt = (now_ms - state.last_ms).min(MAX_STEP_MS) / 1000.0;
    let v0 = -state.velocity;
    let x0 = TARGET - state.position;
    let zeta = config.damping / (2.0 * (config.stiffness * config.mass).sqrt());
    let omega0 = (config.stiffness / config.mass).sqrt();

    let (position, velocity) = if zeta < 1.0 {
        let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
        let (sin1, cos1) = (omega1 * dt).sin_cos();
        let envelope = (-zeta * omega0 * dt).exp();
        let frag = envelope * (sin1 * ((v0 + zeta * omega0 * x0) / omega1) + x0 * cos1);
        let velocity = zeta * omega0 * frag
            - envelope * (cos1 * (v0 + zeta * omega0 * x0) - omega1 * x0 * sin1);
        (TARGET - frag, velocity)
    } else {
        let envelope = (-omega0 * dt).exp();
        let position = TARGET - envelope * (x0 + (v0 + omega0 * x0) * dt);
        let velocity = envelope * (v0 * (dt * omega0 - 1.0) + dt * x0 * omega0 * omega0);
        (position, velocity)
    };

    SpringState {
        position,
        velocity,
        last_ms: now_ms,
    }
}

/// Spring progress at `frame`, sampled once per frame from rest at 0.
///
/// Negative frames are clamped to 0 (value 0). Fractional frames take a
/// final partial step. Underdamped configs overshoot 1 before settling.
pub fn spring(frame: f64, fps: f64, config: SpringConfig) -> f64 {
    let frame = frame.max(0.0);
    let whole = frame.floor();
    let fraction = frame - whole;

    let mut state = SpringState {
        position: 0.0,
        velocity: 0.0,
        last_ms: 0.0,
    };
    let last = whole as u64;
    for f in 0..=last {
        let f = if f == last { f as f64 + fraction } else { f as f64 };
        state = step(state, f / fps * 1000.0, config);
    }
    state.position
}
