use crate::modulus::{ReduceOnce, BARRETT, ONCE};
use crate::modulus::barrett::Barrett;
use crate::poly::PolyRNS;
use crate::ring::RingRNS;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Computes round(t * x / Q) from a polynomial over the extended
/// basis QP, writing the result over the basis Q. The integer parts
/// of the per-residue weights are carried exactly in RNS; the
/// fractional parts are accumulated in f64 and rounded to nearest.
pub struct ComplexScaler {
    pub t: u64,
    ring_q: RingRNS<u64>,
    ring_p: RingRNS<u64>,
    /// floor(t * P / q_i) mod q_k, indexed [k][i].
    w_mod_qk: Vec<Vec<u64>>,
    /// frac(t * P / q_i).
    theta: Vec<f64>,
    /// t * (P / p_j) mod q_k, indexed [k][j].
    lambda_mod_qk: Vec<Vec<u64>>,
    /// t * P mod q_k.
    tp_mod_qk: Vec<u64>,
    /// [(QP/q_i)^-1]_{q_i}, prepared per q_i.
    d_over_qi_inv: Vec<Barrett<u64>>,
    /// [(QP/p_j)^-1]_{p_j}, prepared per p_j.
    d_over_pj_inv: Vec<Barrett<u64>>,
    /// 1/m as f64 over the moduli of QP, for the quotient recovery.
    m_inv_f64: Vec<f64>,
    buf_q: Vec<u64>,
    buf_p: Vec<u64>,
}

impl ComplexScaler {
    pub fn new(t: u64, ring_q: &RingRNS<u64>, ring_p: &RingRNS<u64>) -> ComplexScaler {
        let q_big: BigUint = ring_q.modulus().to_biguint().unwrap();
        let p_big: BigUint = ring_p.modulus().to_biguint().unwrap();
        let d_big: BigUint = &q_big * &p_big;
        let t_big: BigUint = BigUint::from(t);

        let moduli_q: Vec<u64> = ring_q.moduli();
        let moduli_p: Vec<u64> = ring_p.moduli();

        // Weights of the Q residues: t * P / q_i split into integer
        // and fractional parts.
        let w_int: Vec<BigUint> = moduli_q.iter().map(|&qi| (&t_big * &p_big) / qi).collect();
        let theta: Vec<f64> = moduli_q
            .iter()
            .map(|&qi| {
                let num: BigUint = &t_big * &p_big;
                let rem: BigUint = &num % qi;
                rem.to_f64().unwrap() / (qi as f64)
            })
            .collect();

        // Weights of the P residues: t * (P / p_j), exact integers.
        let lambda: Vec<BigUint> = moduli_p.iter().map(|&pj| (&t_big * &p_big) / pj).collect();

        let w_mod_qk: Vec<Vec<u64>> = moduli_q
            .iter()
            .map(|&qk| w_int.iter().map(|w| (w % qk).to_u64().unwrap()).collect())
            .collect();
        let lambda_mod_qk: Vec<Vec<u64>> = moduli_q
            .iter()
            .map(|&qk| lambda.iter().map(|l| (l % qk).to_u64().unwrap()).collect())
            .collect();
        let tp_mod_qk: Vec<u64> = moduli_q
            .iter()
            .map(|&qk| ((&t_big * &p_big) % qk).to_u64().unwrap())
            .collect();

        let d_over_qi_inv: Vec<Barrett<u64>> = ring_q
            .0
            .iter()
            .map(|r| {
                let qi: u64 = r.modulus.q;
                let d_over_qi: u64 = ((&d_big / qi) % qi).to_u64().unwrap();
                r.modulus.barrett.prepare(r.modulus.inv(d_over_qi))
            })
            .collect();
        let d_over_pj_inv: Vec<Barrett<u64>> = ring_p
            .0
            .iter()
            .map(|r| {
                let pj: u64 = r.modulus.q;
                let d_over_pj: u64 = ((&d_big / pj) % pj).to_u64().unwrap();
                r.modulus.barrett.prepare(r.modulus.inv(d_over_pj))
            })
            .collect();

        let m_inv_f64: Vec<f64> = moduli_q
            .iter()
            .chain(moduli_p.iter())
            .map(|&m| 1.0 / (m as f64))
            .collect();

        ComplexScaler {
            t,
            ring_q: ring_q.clone(),
            ring_p: ring_p.clone(),
            w_mod_qk,
            theta,
            lambda_mod_qk,
            tp_mod_qk,
            d_over_qi_inv,
            d_over_pj_inv,
            m_inv_f64,
            buf_q: vec![0u64; moduli_q.len()],
            buf_p: vec![0u64; moduli_p.len()],
        }
    }

    /// Scales a (over QP, coefficient domain) by t/Q with rounding,
    /// writing the result over Q into b.
    pub fn scale(&mut self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        let levels_q: usize = self.ring_q.level() + 1;
        let levels_p: usize = self.ring_p.level() + 1;
        let n: usize = self.ring_q.n();

        debug_assert!(a.level() + 1 >= levels_q + levels_p, "input a too short");
        debug_assert!(b.level() + 1 >= levels_q, "output b too short");

        for col in 0..n {
            // Normalized residues over the full basis QP, the CRT
            // quotient, and the rounded fractional contribution.
            let mut v_f64: f64 = 0.0;
            let mut frac: f64 = 0.0;
            for i in 0..levels_q {
                let r = &self.ring_q.0[i];
                let x_hat: u64 = r
                    .modulus
                    .barrett
                    .mul_external::<ONCE>(&self.d_over_qi_inv[i], &a.at(i).0[col]);
                self.buf_q[i] = x_hat;
                v_f64 += (x_hat as f64) * self.m_inv_f64[i];
                frac += (x_hat as f64) * self.theta[i];
            }
            for j in 0..levels_p {
                let r = &self.ring_p.0[j];
                let x_hat: u64 = r
                    .modulus
                    .barrett
                    .mul_external::<ONCE>(&self.d_over_pj_inv[j], &a.at(levels_q + j).0[col]);
                self.buf_p[j] = x_hat;
                v_f64 += (x_hat as f64) * self.m_inv_f64[levels_q + j];
            }
            let v: u64 = v_f64 as u64;
            let frac_rounded: u128 = (frac + 0.5) as u128;

            for k in 0..levels_q {
                let rk = &self.ring_q.0[k];
                let qk: u64 = rk.modulus.q;
                let mut acc: u128 = frac_rounded % (qk as u128);
                for i in 0..levels_q {
                    acc += (self.buf_q[i] as u128) * (self.w_mod_qk[k][i] as u128);
                }
                for j in 0..levels_p {
                    acc += (self.buf_p[j] as u128) * (self.lambda_mod_qk[k][j] as u128);
                }
                let sum: u64 = rk.modulus.barrett.reduce_u128::<BARRETT>(acc);
                let correction: u64 = rk
                    .modulus
                    .barrett
                    .reduce_u128::<BARRETT>((v as u128) * (self.tp_mod_qk[k] as u128));
                b.at_mut(k).0[col] = (sum + qk - correction).reduce_once(qk);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_traits::{ToPrimitive, Zero};

    #[test]
    fn test_scale_matches_bigint_reference() {
        let n: usize = 32;
        let t: u64 = 65537;
        let ring_q: RingRNS<u64> = RingRNS::<u64>::new(n, vec![0x7fffffd8001, 0x7fffffc8001]);
        let ring_p: RingRNS<u64> = RingRNS::<u64>::new(n, vec![0x7fffff98001]);
        let ring_qp: RingRNS<u64> = ring_q.merged(&ring_p);

        let mut scaler: ComplexScaler = ComplexScaler::new(t, &ring_q, &ring_p);

        let coeffs: Vec<i64> = (0..n as i64).map(|i| i * 0x123456789abcd + 0xabcdef).collect();
        let mut a: PolyRNS<u64> = ring_qp.new_polyrns();
        ring_qp.set_coefficients_i64(&coeffs, &mut a);

        let mut a_big: Vec<BigInt> = vec![BigInt::zero(); n];
        ring_qp.to_bigint(&a, &mut a_big);

        let mut b: PolyRNS<u64> = ring_q.new_polyrns();
        scaler.scale(&a, &mut b);

        let q_big: BigInt = ring_q.modulus();
        let mut have: Vec<BigInt> = vec![BigInt::zero(); n];
        ring_q.to_bigint(&b, &mut have);

        for (x, h) in a_big.iter().zip(have.iter()) {
            let want: BigInt = (x * t + (&q_big >> 1)) / &q_big;
            // Fractional accumulation may be off by one at ties.
            let delta: BigInt = h - &want;
            assert!(delta.magnitude().to_u64().unwrap_or(u64::MAX) <= 1, "delta={}", delta);
        }
    }
}
