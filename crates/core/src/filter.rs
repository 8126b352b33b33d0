//! Fixed band-limiting filters applied ahead of gain control and feature extraction.
//!
//! A one-pole high-pass (hum/rumble) cascaded with a one-pole low-pass
//! (music/effects). Both are first-order sections run through `biquad`'s
//! direct form 1, so the carried state is exactly the previous input and
//! output of each stage.

use crate::constants::{HPF_CUTOFF_HZ, LPF_CUTOFF_HZ};
use anyhow::{anyhow, Result};
use biquad::{Biquad, Coefficients, DirectForm1};
use std::f32::consts::PI;

/// High-pass smoothing factor: `rc / (rc + dt)`.
pub fn high_pass_alpha(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let rc = 1.0 / (2.0 * PI * cutoff_hz);
    let dt = 1.0 / sample_rate;
    rc / (rc + dt)
}

/// Low-pass smoothing factor: `1 / (rc * fs + 1)`.
pub fn low_pass_alpha(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let rc = 1.0 / (2.0 * PI * cutoff_hz);
    1.0 / rc.mul_add(sample_rate, 1.0)
}

/// `y = a * (y_prev + x - x_prev)`
fn one_pole_high_pass(alpha: f32) -> Coefficients<f32> {
    Coefficients {
        a1: -alpha,
        a2: 0.0,
        b0: alpha,
        b1: -alpha,
        b2: 0.0,
    }
}

/// `y += a * (x - y)`
fn one_pole_low_pass(alpha: f32) -> Coefficients<f32> {
    Coefficients {
        a1: alpha - 1.0,
        a2: 0.0,
        b0: alpha,
        b1: 0.0,
        b2: 0.0,
    }
}

/// High-pass at 120 Hz followed by low-pass at 4 kHz.
///
/// Coefficients are derived once at construction and never change; filter
/// state carries across frames and is never reset.
pub struct FilterChain {
    high_pass: DirectForm1<f32>,
    low_pass: DirectForm1<f32>,
}

impl FilterChain {
    pub fn new(sample_rate: f32) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(anyhow!("Invalid sample rate for filter chain: {}", sample_rate));
        }

        let a_hp = high_pass_alpha(HPF_CUTOFF_HZ, sample_rate);
        let a_lp = low_pass_alpha(LPF_CUTOFF_HZ, sample_rate);
        if !a_hp.is_finite() || !a_lp.is_finite() {
            return Err(anyhow!(
                "Filter coefficients not finite at {}Hz (hp={}, lp={})",
                sample_rate,
                a_hp,
                a_lp
            ));
        }

        Ok(Self {
            high_pass: DirectForm1::<f32>::new(one_pole_high_pass(a_hp)),
            low_pass: DirectForm1::<f32>::new(one_pole_low_pass(a_lp)),
        })
    }

    pub fn process(&mut self, sample: f32) -> f32 {
        let hp = self.high_pass.run(sample);
        self.low_pass.run(hp)
    }

    /// Filters a frame in place, sample by sample.
    pub fn process_frame(&mut self, frame: &mut [f32]) {
        for sample in frame.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
