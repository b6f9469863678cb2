//! Spectral estimation glue over `rustfft`.
//!
//! The FFT itself is the library's job; this module owns the windowing,
//! periodogram/Welch averaging, and band-power binning the pipeline needs.

use std::cell::RefCell;
use std::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::bands::FrequencyBand;
use crate::config::PsdMethod;

// Thread-local planner so rayon workers reuse FFT plans
thread_local! {
    static FFT_PLANNER: RefCell<FftPlanner<f64>> = RefCell::new(FftPlanner::new());
}

/// One-sided power spectral density
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSpectrum {
    pub frequencies: Vec<f64>,
    pub power: Vec<f64>,
}

impl PowerSpectrum {
    pub fn empty() -> Self {
        Self {
            frequencies: Vec::new(),
            power: Vec::new(),
        }
    }
}

/// Hann-windowed periodogram, zero-padded to the next power of two.
///
/// Returns a one-sided density: interior bins carry the doubled power of
/// their negative-frequency twins. Signals shorter than 2 samples yield an
/// empty spectrum.
pub fn periodogram(signal: &[f64], sample_rate: f64) -> PowerSpectrum {
    let n = signal.len();
    if n < 2 {
        return PowerSpectrum::empty();
    }
    let n_fft = n.next_power_of_two();

    let mut window_energy = 0.0;
    let mut input: Vec<Complex<f64>> = Vec::with_capacity(n_fft);
    for (i, &x) in signal.iter().enumerate() {
        let w = 0.5 * (1.0 - (2.0 * PI * i as f64 / (n - 1) as f64).cos());
        window_energy += w * w;
        input.push(Complex::new(x * w, 0.0));
    }
    input.resize(n_fft, Complex::new(0.0, 0.0));

    FFT_PLANNER.with(|planner| {
        let fft = planner.borrow_mut().plan_fft_forward(n_fft);
        fft.process(&mut input);
    });

    let n_positive = n_fft / 2 + 1;
    let freq_resolution = sample_rate / n_fft as f64;
    let scale = 1.0 / (sample_rate * window_energy);

    let frequencies: Vec<f64> = (0..n_positive)
        .map(|k| k as f64 * freq_resolution)
        .collect();
    let power: Vec<f64> = input[..n_positive]
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let one_sided = if k == 0 || k == n_fft / 2 { 1.0 } else { 2.0 };
            c.norm_sqr() * scale * one_sided
        })
        .collect();

    PowerSpectrum { frequencies, power }
}

/// Welch's method: averaged Hann periodograms over overlapping segments.
///
/// Falls back to a single whole-signal periodogram when the signal is
/// shorter than one segment.
pub fn welch(signal: &[f64], sample_rate: f64, segment_len: usize, overlap: usize) -> PowerSpectrum {
    let n = signal.len();
    if n < segment_len || segment_len < 2 {
        return periodogram(signal, sample_rate);
    }
    let step = segment_len - overlap;

    let mut averaged: Option<PowerSpectrum> = None;
    let mut n_segments = 0usize;
    let mut start = 0usize;
    while start + segment_len <= n {
        let segment = periodogram(&signal[start..start + segment_len], sample_rate);
        match averaged.as_mut() {
            None => averaged = Some(segment),
            Some(acc) => {
                for (p, s) in acc.power.iter_mut().zip(segment.power.iter()) {
                    *p += s;
                }
            }
        }
        n_segments += 1;
        start += step;
    }

    match averaged {
        Some(mut spectrum) => {
            for p in &mut spectrum.power {
                *p /= n_segments as f64;
            }
            spectrum
        }
        None => periodogram(signal, sample_rate),
    }
}

/// Run the configured estimator.
pub fn estimate(signal: &[f64], sample_rate: f64, method: &PsdMethod) -> PowerSpectrum {
    match *method {
        PsdMethod::Periodogram => periodogram(signal, sample_rate),
        PsdMethod::Welch {
            segment_len,
            overlap,
        } => welch(signal, sample_rate, segment_len, overlap),
    }
}

/// Summed power at frequencies inside `(band.low, band.high]`.
pub fn band_power(spectrum: &PowerSpectrum, band: &FrequencyBand) -> f64 {
    spectrum
        .frequencies
        .iter()
        .zip(spectrum.power.iter())
        .filter(|(&f, _)| band.contains(f))
        .map(|(_, &p)| p)
        .sum()
}

/// Summed power over the analyzed bandwidth `(0, max_freq_hz]`, DC excluded.
pub fn total_power(spectrum: &PowerSpectrum, max_freq_hz: f64) -> f64 {
    spectrum
        .frequencies
        .iter()
        .zip(spectrum.power.iter())
        .filter(|(&f, _)| f > 0.0 && f <= max_freq_hz)
        .map(|(_, &p)| p)
        .sum()
}

/// Fraction of total in-band power falling inside `band`.
///
/// A signal with no power in the analyzed bandwidth (e.g. all zeros) yields
/// 0.0 for every band rather than 0/0.
pub fn relative_band_power(spectrum: &PowerSpectrum, band: &FrequencyBand, max_freq_hz: f64) -> f64 {
    let total = total_power(spectrum, max_freq_hz);
    if total <= 0.0 {
        return 0.0;
    }
    band_power(spectrum, band) / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|k| (2.0 * PI * freq * k as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_periodogram_peak_at_signal_frequency() {
        let signal = sine(10.0, 250.0, 1000);
        let spectrum = periodogram(&signal, 250.0);
        let (peak_idx, _) = spectrum
            .power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        assert!((spectrum.frequencies[peak_idx] - 10.0).abs() < 0.5);
    }

    #[test]
    fn test_welch_peak_at_signal_frequency() {
        let signal = sine(10.0, 250.0, 1000);
        let spectrum = welch(&signal, 250.0, 256, 128);
        let (peak_idx, _) = spectrum
            .power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        assert!((spectrum.frequencies[peak_idx] - 10.0).abs() < 1.0);
    }

    #[test]
    fn test_welch_falls_back_to_periodogram_for_short_signals() {
        let signal = sine(10.0, 250.0, 100);
        let from_welch = welch(&signal, 250.0, 256, 128);
        let from_periodogram = periodogram(&signal, 250.0);
        assert_eq!(from_welch.frequencies.len(), from_periodogram.frequencies.len());
    }

    #[test]
    fn test_relative_powers_over_complete_partition_sum_to_one() {
        let signal = sine(10.0, 250.0, 1000);
        let spectrum = periodogram(&signal, 250.0);
        let bands = vec![
            FrequencyBand::new("low", 0.0, 20.0),
            FrequencyBand::new("high", 20.0, 125.0),
        ];
        let sum: f64 = bands
            .iter()
            .map(|b| relative_band_power(&spectrum, b, 125.0))
            .sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {}", sum);
    }

    #[test]
    fn test_sub_partition_sums_to_at_most_one() {
        let signal = sine(10.0, 250.0, 1000);
        let spectrum = periodogram(&signal, 250.0);
        let bands = vec![
            FrequencyBand::new("delta", 0.5, 4.0),
            FrequencyBand::new("theta", 4.0, 7.0),
            FrequencyBand::new("alpha", 7.0, 12.0),
            FrequencyBand::new("beta", 12.0, 30.0),
        ];
        let sum: f64 = bands
            .iter()
            .map(|b| relative_band_power(&spectrum, b, 30.0))
            .sum();
        assert!(sum <= 1.0 + 1e-9);
        assert!(sum >= 0.0);
    }

    #[test]
    fn test_widening_a_band_never_decreases_power() {
        let signal = sine(10.0, 250.0, 1000);
        let spectrum = periodogram(&signal, 250.0);
        let narrow = FrequencyBand::new("narrow", 8.0, 11.0);
        let wide = FrequencyBand::new("wide", 7.0, 12.0);
        assert!(band_power(&spectrum, &wide) >= band_power(&spectrum, &narrow));
    }

    #[test]
    fn test_zero_signal_yields_zero_relative_power() {
        let spectrum = periodogram(&vec![0.0; 1000], 250.0);
        let alpha = FrequencyBand::new("alpha", 7.0, 12.0);
        assert_eq!(relative_band_power(&spectrum, &alpha, 125.0), 0.0);
    }

    #[test]
    fn test_degenerate_signal_gives_empty_spectrum() {
        assert!(periodogram(&[], 250.0).power.is_empty());
        assert!(periodogram(&[1.0], 250.0).power.is_empty());
    }
}
