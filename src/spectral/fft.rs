// =============================================================================
// Radix-2 Fast Fourier Transform
// =============================================================================
//
// Iterative Cooley–Tukey over a power-of-two buffer:
//   1. Bit-reversal permutation of the input.
//   2. log2(N) butterfly stages with twiddle W = exp(-2πik/len).
//
// Output ordering is the standard one: bin 0 is DC, frequency increases with
// the bin index up to N/2, the upper half mirrors the negative frequencies.

use std::f64::consts::PI;

/// Minimal complex number for the transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Magnitude √(re² + im²).
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Argument atan2(im, re) in (-π, π].
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }
}

impl std::ops::Add for Complex {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl std::ops::Sub for Complex {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl std::ops::Mul for Complex {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// Unit-magnitude twiddle `exp(-2πi · k / len)`.
fn twiddle(k: usize, len: usize) -> Complex {
    let (sin, cos) = (-2.0 * PI * k as f64 / len as f64).sin_cos();
    Complex::new(cos, sin)
}

/// In-place forward FFT.
///
/// The caller guarantees `data.len()` is a power of two; lengths 0 and 1 are
/// returned unchanged.
pub fn fft_in_place(data: &mut [Complex]) {
    let n = data.len();
    if n <= 1 {
        return;
    }
    debug_assert!(n.is_power_of_two(), "FFT size must be a power of two");

    // --- Bit-reversal permutation ---------------------------------------------
    let shift = usize::BITS - n.trailing_zeros();
    for i in 0..n {
        let r = i.reverse_bits() >> shift;
        if i < r {
            data.swap(i, r);
        }
    }

    // --- Butterflies ------------------------------------------------------------
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let twiddles: Vec<Complex> = (0..half).map(|k| twiddle(k, len)).collect();
        for block in data.chunks_exact_mut(len) {
            let (even, odd) = block.split_at_mut(half);
            for ((e, o), &w) in even.iter_mut().zip(odd.iter_mut()).zip(&twiddles) {
                let t = *o * w;
                *o = *e - t;
                *e = *e + t;
            }
        }
        len <<= 1;
    }
}

/// Forward FFT of a real-valued signal; returns all N complex coefficients.
pub fn real_fft(signal: &[f64]) -> Vec<Complex> {
    let mut data: Vec<Complex> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft_in_place(&mut data);
    data
}
