//! Analytic-signal construction and instantaneous measures.
//!
//! The analytic signal is built the usual way: forward FFT, zero the
//! negative frequencies, double the positive ones, inverse FFT. Modulus and
//! argument then give instantaneous amplitude and phase; the unwrapped
//! phase derivative gives instantaneous frequency.

use std::cell::RefCell;
use std::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

thread_local! {
    static FFT_PLANNER: RefCell<FftPlanner<f64>> = RefCell::new(FftPlanner::new());
}

/// Complex analytic signal of a real input, same length as the input.
pub fn analytic_signal(signal: &[f64]) -> Vec<Complex<f64>> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buf: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    FFT_PLANNER.with(|planner| {
        let fft = planner.borrow_mut().plan_fft_forward(n);
        fft.process(&mut buf);
    });

    // Single-sided spectrum: keep DC (and Nyquist for even n), double the
    // positive frequencies, zero the negative ones
    let half = n / 2;
    for (k, value) in buf.iter_mut().enumerate() {
        if k == 0 || (n % 2 == 0 && k == half) {
            continue;
        } else if k < half || (n % 2 == 1 && k == half) {
            *value *= 2.0;
        } else {
            *value = Complex::new(0.0, 0.0);
        }
    }

    FFT_PLANNER.with(|planner| {
        let ifft = planner.borrow_mut().plan_fft_inverse(n);
        ifft.process(&mut buf);
    });
    for value in &mut buf {
        *value /= n as f64;
    }
    buf
}

/// Instantaneous amplitude (envelope): modulus of the analytic signal.
pub fn instantaneous_amplitude(signal: &[f64]) -> Vec<f64> {
    analytic_signal(signal).iter().map(|c| c.norm()).collect()
}

/// Instantaneous phase in radians, wrapped to (-pi, pi].
pub fn instantaneous_phase(signal: &[f64]) -> Vec<f64> {
    analytic_signal(signal).iter().map(|c| c.arg()).collect()
}

/// Instantaneous frequency in Hz from unwrapped phase differences.
///
/// Output length is `n - 1` (one value per consecutive sample pair).
pub fn instantaneous_frequency(signal: &[f64], sample_rate: f64) -> Vec<f64> {
    let phase = instantaneous_phase(signal);
    phase
        .windows(2)
        .map(|pair| {
            let mut dp = pair[1] - pair[0];
            // Unwrap a single-step jump
            while dp > PI {
                dp -= 2.0 * PI;
            }
            while dp < -PI {
                dp += 2.0 * PI;
            }
            dp * sample_rate / (2.0 * PI)
        })
        .collect()
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
    fn test_amplitude_of_unit_sine_is_one() {
        let signal = sine(10.0, 250.0, 1000);
        let amplitude = instantaneous_amplitude(&signal);
        // Edges suffer from the finite-length transform; check the middle
        for &a in &amplitude[100..900] {
            assert!((a - 1.0).abs() < 0.05, "amplitude {}", a);
        }
    }

    #[test]
    fn test_frequency_of_pure_sine() {
        let signal = sine(10.0, 250.0, 1000);
        let freq = instantaneous_frequency(&signal, 250.0);
        let middle = &freq[100..900];
        let mean: f64 = middle.iter().sum::<f64>() / middle.len() as f64;
        assert!((mean - 10.0).abs() < 0.2, "mean frequency {}", mean);
    }

    #[test]
    fn test_phase_is_wrapped() {
        let signal = sine(10.0, 250.0, 500);
        for &p in &instantaneous_phase(&signal) {
            assert!(p <= PI && p >= -PI);
        }
    }

    #[test]
    fn test_analytic_real_part_matches_input() {
        let signal = sine(7.0, 250.0, 512);
        let analytic = analytic_signal(&signal);
        for (x, c) in signal.iter().zip(analytic.iter()) {
            assert!((x - c.re).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(analytic_signal(&[]).is_empty());
        assert!(instantaneous_frequency(&[], 250.0).is_empty());
    }
}
