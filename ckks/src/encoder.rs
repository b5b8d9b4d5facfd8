use crate::context::Context;
use crate::plaintext::Plaintext;
use math::modulus::WordOps;
use math::ring::RingRNS;
use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::{ToPrimitive, Zero};
use std::sync::Arc;

/// Encoder between vectors of n/2 complex values and plaintext
/// polynomials, through the canonical embedding: slot j carries the
/// evaluation of the message polynomial at the primitive root of
/// exponent 5^j, so that the Galois automorphisms act as slot
/// rotations and conjugation.
pub struct Encoder {
    context: Arc<Context>,
    /// 5^j mod 2n, the exponent orbit of the slots.
    rot_group: Vec<usize>,
    /// exp(2*pi*i * k / 2n) for k in [0, 2n].
    ksi_pows: Vec<Complex64>,
    values: Vec<Complex64>,
    coeffs_big: Vec<BigInt>,
}

impl Encoder {
    pub fn new(context: Arc<Context>) -> Encoder {
        let n: usize = context.n();
        let m: usize = n << 1;
        let slots: usize = context.slots();

        let mut rot_group: Vec<usize> = Vec::with_capacity(slots);
        let mut pow: usize = 1;
        for _ in 0..slots {
            rot_group.push(pow);
            pow = pow.wrapping_mul(math::GALOISGENERATOR as usize) & (m - 1);
        }

        let angle: f64 = 2.0 * std::f64::consts::PI / (m as f64);
        let ksi_pows: Vec<Complex64> = (0..m + 1)
            .map(|k| Complex64::new((angle * k as f64).cos(), (angle * k as f64).sin()))
            .collect();

        Encoder {
            context,
            rot_group,
            ksi_pows,
            values: vec![Complex64::zero(); slots],
            coeffs_big: vec![BigInt::zero(); n],
        }
    }

    pub fn encode_complex_new(
        &mut self,
        values: &[Complex64],
        level: usize,
        scale: usize,
    ) -> Plaintext {
        let mut plaintext: Plaintext = Plaintext::new(&self.context, level, scale);
        self.encode_complex(values, &mut plaintext);
        plaintext
    }

    /// Encodes n/2 complex values: inverse special FFT, scaling by
    /// 2^scale with rounding, then the forward NTT.
    pub fn encode_complex(&mut self, values: &[Complex64], plaintext: &mut Plaintext) {
        let slots: usize = self.context.slots();
        assert!(
            values.len() == slots,
            "invalid values.len()={}: must be n/2={}",
            values.len(),
            slots
        );

        self.values.copy_from_slice(values);
        self.special_invfft();

        let scale_f: f64 = (2.0f64).powi(plaintext.scale() as i32);
        let mut coeffs: Vec<i64> = vec![0; self.context.n()];
        for (i, v) in self.values.iter().enumerate() {
            coeffs[i] = (v.re * scale_f).round() as i64;
            coeffs[i + slots] = (v.im * scale_f).round() as i64;
        }

        let ring: RingRNS<u64> = self.context.ring_q().at_level(plaintext.level());
        ring.set_coefficients_i64(&coeffs, plaintext.value_mut());
        ring.ntt_inplace::<false>(plaintext.value_mut());
        plaintext.0.is_ntt = true;
    }

    /// Decodes a plaintext back into its n/2 complex values.
    pub fn decode_complex(&mut self, plaintext: &Plaintext) -> Vec<Complex64> {
        let slots: usize = self.context.slots();
        let ring: RingRNS<u64> = self.context.ring_q().at_level(plaintext.level());

        let mut coeff_poly = plaintext.value().clone();
        ring.intt_inplace::<false>(&mut coeff_poly);
        ring.to_bigint_centered(&coeff_poly, &mut self.coeffs_big);

        let scale_f: f64 = (2.0f64).powi(plaintext.scale() as i32);
        for i in 0..slots {
            self.values[i] = Complex64::new(
                self.coeffs_big[i].to_f64().unwrap() / scale_f,
                self.coeffs_big[i + slots].to_f64().unwrap() / scale_f,
            );
        }
        self.special_fft();
        self.values.clone()
    }

    /// Evaluates the message at the roots of the slot orbit
    /// (coefficient order to slot order).
    fn special_fft(&mut self) {
        let n: usize = self.values.len();
        let m: usize = self.context.n() << 1;

        bit_reverse(&mut self.values);

        let mut len: usize = 2;
        while len <= n {
            let len_h: usize = len >> 1;
            let len_q: usize = len << 2;
            let mut i: usize = 0;
            while i < n {
                for j in 0..len_h {
                    let idx: usize = (self.rot_group[j] % len_q) * (m / len_q);
                    let u: Complex64 = self.values[i + j];
                    let v: Complex64 = self.values[i + j + len_h] * self.ksi_pows[idx];
                    self.values[i + j] = u + v;
                    self.values[i + j + len_h] = u - v;
                }
                i += len;
            }
            len <<= 1;
        }
    }

    /// Inverse of special_fft (slot order to coefficient order).
    fn special_invfft(&mut self) {
        let n: usize = self.values.len();
        let m: usize = self.context.n() << 1;

        let mut len: usize = n;
        while len >= 2 {
            let len_h: usize = len >> 1;
            let len_q: usize = len << 2;
            let mut i: usize = 0;
            while i < n {
                for j in 0..len_h {
                    let idx: usize = (len_q - (self.rot_group[j] % len_q)) * (m / len_q);
                    let u: Complex64 = self.values[i + j] + self.values[i + j + len_h];
                    let v: Complex64 =
                        (self.values[i + j] - self.values[i + j + len_h]) * self.ksi_pows[idx];
                    self.values[i + j] = u;
                    self.values[i + j + len_h] = v;
                }
                i += len;
            }
            len >>= 1;
        }

        bit_reverse(&mut self.values);

        let n_inv: f64 = 1.0 / (n as f64);
        self.values.iter_mut().for_each(|v| *v *= n_inv);
    }
}

fn bit_reverse(values: &mut [Complex64]) {
    let n: usize = values.len();
    let log_n: u32 = n.log2() as u32;
    for i in 0..n {
        let j: usize = i.reverse_bits_msb(log_n);
        if i < j {
            values.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::default_parameters;
    use crate::Parameters;

    #[test]
    fn test_encode_decode_round_trip() {
        let params: Parameters = default_parameters()[0].clone();
        let context: Arc<Context> = Arc::new(Context::new(&params).unwrap());
        let mut encoder: Encoder = Encoder::new(context.clone());

        let slots: usize = context.slots();
        let values: Vec<Complex64> = (0..slots)
            .map(|i| {
                Complex64::new(
                    ((i * 17) % 101) as f64 / 101.0 - 0.5,
                    ((i * 31) % 97) as f64 / 97.0 - 0.5,
                )
            })
            .collect();

        let plaintext: Plaintext =
            encoder.encode_complex_new(&values, context.max_level(), context.log_scale());
        let decoded: Vec<Complex64> = encoder.decode_complex(&plaintext);

        for (want, have) in values.iter().zip(decoded.iter()) {
            assert!((want - have).norm() < 1e-10, "want={} have={}", want, have);
        }
    }
}
