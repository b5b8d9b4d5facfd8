use crate::modulus::barrett::Barrett;
use crate::modulus::{ReduceOnce, BARRETT, ONCE};
use crate::poly::PolyRNS;
use crate::ring::RingRNS;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Extends a polynomial from the basis Q to the basis QP using the
/// float-assisted exact CRT interpolation: the multi-precision
/// quotient is recovered from the sum of the normalized residues.
pub struct BasisExtender {
    ring_q: RingRNS<u64>,
    ring_p: RingRNS<u64>,
    /// [(Q/q_i)^-1]_{q_i}, prepared per q_i.
    q_over_qi_inv: Vec<Barrett<u64>>,
    /// (Q/q_i) mod p_j, indexed [j][i].
    q_over_qi_mod_pj: Vec<Vec<u64>>,
    /// Q mod p_j.
    q_mod_pj: Vec<u64>,
    /// 1/q_i as f64, for the quotient recovery.
    qi_inv_f64: Vec<f64>,
    buf: Vec<u64>,
}

impl BasisExtender {
    pub fn new(ring_q: &RingRNS<u64>, ring_p: &RingRNS<u64>) -> BasisExtender {
        let q_big: BigUint = ring_q.modulus().to_biguint().unwrap();

        let q_over_qi_inv: Vec<Barrett<u64>> = ring_q
            .0
            .iter()
            .map(|r| {
                let qi: BigUint = BigUint::from(r.modulus.q);
                let q_over_qi: u64 = ((&q_big / &qi) % &qi).to_u64().unwrap();
                r.modulus.barrett.prepare(r.modulus.inv(q_over_qi))
            })
            .collect();

        let q_over_qi_mod_pj: Vec<Vec<u64>> = ring_p
            .0
            .iter()
            .map(|rp| {
                let pj: BigUint = BigUint::from(rp.modulus.q);
                ring_q
                    .0
                    .iter()
                    .map(|rq| ((&q_big / BigUint::from(rq.modulus.q)) % &pj).to_u64().unwrap())
                    .collect()
            })
            .collect();

        let q_mod_pj: Vec<u64> = ring_p
            .0
            .iter()
            .map(|rp| (&q_big % BigUint::from(rp.modulus.q)).to_u64().unwrap())
            .collect();

        let qi_inv_f64: Vec<f64> = ring_q.0.iter().map(|r| 1.0 / (r.modulus.q as f64)).collect();

        BasisExtender {
            ring_q: ring_q.clone(),
            ring_p: ring_p.clone(),
            q_over_qi_inv,
            q_over_qi_mod_pj,
            q_mod_pj,
            qi_inv_f64,
            buf: vec![0u64; ring_q.level() + 1],
        }
    }

    /// Extends a (over Q, coefficient domain) into b (over QP): the Q
    /// rows are copied, the P rows carry the same integer mod p_j.
    pub fn extend_basis(&mut self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        let levels_q: usize = self.ring_q.level() + 1;
        let levels_p: usize = self.ring_p.level() + 1;
        let n: usize = self.ring_q.n();

        debug_assert!(a.level() + 1 >= levels_q, "input a too short");
        debug_assert!(b.level() + 1 >= levels_q + levels_p, "output b too short");

        for col in 0..n {
            // Normalized residues x_i * [(Q/q_i)^-1]_{q_i} mod q_i and
            // the quotient of the CRT interpolation.
            let mut v_f64: f64 = 0.0;
            for i in 0..levels_q {
                let r = &self.ring_q.0[i];
                self.buf[i] = r
                    .modulus
                    .barrett
                    .mul_external::<ONCE>(&self.q_over_qi_inv[i], &a.at(i).0[col]);
                v_f64 += (self.buf[i] as f64) * self.qi_inv_f64[i];
            }
            let v: u64 = v_f64 as u64;

            for j in 0..levels_p {
                let rp = &self.ring_p.0[j];
                let pj: u64 = rp.modulus.q;
                let mut acc: u128 = 0;
                for i in 0..levels_q {
                    acc += (self.buf[i] as u128) * (self.q_over_qi_mod_pj[j][i] as u128);
                }
                let sum: u64 = rp.modulus.barrett.reduce_u128::<BARRETT>(acc);
                let correction: u64 = rp
                    .modulus
                    .barrett
                    .reduce_u128::<BARRETT>((v as u128) * (self.q_mod_pj[j] as u128));
                b.at_mut(levels_q + j).0[col] = (sum + pj - correction).reduce_once(pj);
            }
        }

        for i in 0..levels_q {
            b.at_mut(i).0.copy_from_slice(&a.at(i).0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_traits::Zero;

    #[test]
    fn test_extension_preserves_integer() {
        let n: usize = 32;
        let ring_q: RingRNS<u64> = RingRNS::<u64>::new(n, vec![0x7fffffd8001, 0x7fffffc8001]);
        let ring_p: RingRNS<u64> = RingRNS::<u64>::new(n, vec![0x7fffff98001]);
        let ring_qp: RingRNS<u64> = ring_q.merged(&ring_p);

        let mut extender: BasisExtender = BasisExtender::new(&ring_q, &ring_p);

        let coeffs: Vec<i64> = (0..n as i64).map(|i| i * 0x1234567891011 - 0xffffffffff).collect();
        let mut a: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.set_coefficients_i64(&coeffs, &mut a);
        // Make the represented integers positive in [0, Q).
        let mut a_big: Vec<BigInt> = vec![BigInt::zero(); n];
        ring_q.to_bigint(&a, &mut a_big);

        let mut b: PolyRNS<u64> = ring_qp.new_polyrns();
        extender.extend_basis(&a, &mut b);

        let mut b_big: Vec<BigInt> = vec![BigInt::zero(); n];
        ring_qp.to_bigint(&b, &mut b_big);
        assert_eq!(a_big, b_big);
    }
}
