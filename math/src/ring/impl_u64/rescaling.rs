use crate::modulus::barrett::Barrett;
use crate::modulus::{BARRETT, NONE, ONCE};
use crate::poly::PolyRNS;
use crate::ring::{Ring, RingRNS};
use crate::scalar::ScalarRNS;

impl RingRNS<u64> {
    /// Updates b to floor(a / q[level]) (rounded if ROUND), dropping
    /// the top row. NTT selects the domain of a and b; the top row is
    /// always brought to the coefficient domain internally.
    pub fn div_by_last_modulus<const ROUND: bool, const NTT: bool>(
        &self,
        a: &PolyRNS<u64>,
        buf: &mut PolyRNS<u64>,
        b: &mut PolyRNS<u64>,
    ) {
        debug_assert!(self.level() != 0, "invalid call: self.level()=0");
        debug_assert!(
            self.level() <= a.level(),
            "invalid input a: self.level()={} > a.level()={}",
            self.level(),
            a.level()
        );
        debug_assert!(
            b.level() >= self.level() - 1,
            "invalid input b: b.level()={} < self.level()-1={}",
            b.level(),
            self.level() - 1
        );
        debug_assert!(buf.level() >= 1, "invalid input buf: buf.level()=0");

        let level: usize = self.level();
        let rescaling_constants: ScalarRNS<Barrett<u64>> = self.rescaling_constants();
        let r_last: &Ring<u64> = &self.0[level];

        let (buf_top, buf_row) = buf.0.split_at_mut(1);

        if ROUND {
            let q_half: u64 = r_last.modulus.q >> 1;

            if NTT {
                r_last.intt::<false>(a.at(level), &mut buf_top[0]);
                r_last.a_add_b_scalar_into_a::<ONCE>(&q_half, &mut buf_top[0]);
            } else {
                r_last.a_add_b_scalar_into_c::<ONCE>(a.at(level), &q_half, &mut buf_top[0]);
            }

            for (i, r) in self.0[0..level].iter().enumerate() {
                r_last.a_add_b_scalar_into_c::<NONE>(
                    &buf_top[0],
                    &(r.modulus.q - r.modulus.barrett.reduce::<BARRETT>(&q_half)),
                    &mut buf_row[0],
                );
                if NTT {
                    r.ntt_inplace::<true>(&mut buf_row[0]);
                    r.a_sub_b_mul_c_scalar_barrett_into_d::<2, ONCE>(
                        &buf_row[0],
                        a.at(i),
                        rescaling_constants.at(i),
                        b.at_mut(i),
                    );
                } else {
                    r.a_sub_b_mul_c_scalar_barrett_into_d::<2, ONCE>(
                        &buf_row[0],
                        a.at(i),
                        rescaling_constants.at(i),
                        b.at_mut(i),
                    );
                }
            }
        } else if NTT {
            r_last.intt::<false>(a.at(level), &mut buf_top[0]);
            for (i, r) in self.0[0..level].iter().enumerate() {
                r.ntt::<true>(&buf_top[0], &mut buf_row[0]);
                r.a_sub_b_mul_c_scalar_barrett_into_d::<2, ONCE>(
                    &buf_row[0],
                    a.at(i),
                    rescaling_constants.at(i),
                    b.at_mut(i),
                );
            }
        } else {
            for (i, r) in self.0[0..level].iter().enumerate() {
                r.a_sub_b_mul_c_scalar_barrett_into_d::<2, ONCE>(
                    a.at(level),
                    a.at(i),
                    rescaling_constants.at(i),
                    b.at_mut(i),
                );
            }
        }
    }

    /// In-place variant of div_by_last_modulus; the rows above the new
    /// level are left untouched and must be ignored by the caller.
    pub fn div_by_last_modulus_inplace<const ROUND: bool, const NTT: bool>(
        &self,
        buf: &mut PolyRNS<u64>,
        a: &mut PolyRNS<u64>,
    ) {
        debug_assert!(self.level() != 0, "invalid call: self.level()=0");
        debug_assert!(
            self.level() <= a.level(),
            "invalid input a: self.level()={} > a.level()={}",
            self.level(),
            a.level()
        );

        let level: usize = self.level();
        let rescaling_constants: ScalarRNS<Barrett<u64>> = self.rescaling_constants();
        let r_last: &Ring<u64> = &self.0[level];

        if ROUND {
            let q_half: u64 = r_last.modulus.q >> 1;

            if NTT {
                let (buf_top, buf_row) = buf.0.split_at_mut(1);
                r_last.intt::<false>(a.at(level), &mut buf_top[0]);
                r_last.a_add_b_scalar_into_a::<ONCE>(&q_half, &mut buf_top[0]);
                for (i, r) in self.0[0..level].iter().enumerate() {
                    r_last.a_add_b_scalar_into_c::<NONE>(
                        &buf_top[0],
                        &(r.modulus.q - r.modulus.barrett.reduce::<BARRETT>(&q_half)),
                        &mut buf_row[0],
                    );
                    r.ntt_inplace::<true>(&mut buf_row[0]);
                    r.a_sub_b_mul_c_scalar_barrett_into_b::<2, ONCE>(
                        &buf_row[0],
                        rescaling_constants.at(i),
                        a.at_mut(i),
                    );
                }
            } else {
                let (a_rows, a_top) = a.0.split_at_mut(level);
                r_last.a_add_b_scalar_into_a::<ONCE>(&q_half, &mut a_top[0]);
                for (i, r) in self.0[0..level].iter().enumerate() {
                    r.b_sub_a_add_c_scalar_mul_d_scalar_barrett_into_a::<1, ONCE>(
                        &a_top[0],
                        &(r.modulus.q - r.modulus.barrett.reduce::<BARRETT>(&q_half)),
                        rescaling_constants.at(i),
                        &mut a_rows[i],
                    );
                }
            }
        } else if NTT {
            let (buf_top, buf_row) = buf.0.split_at_mut(1);
            r_last.intt::<false>(a.at(level), &mut buf_top[0]);
            for (i, r) in self.0[0..level].iter().enumerate() {
                r.ntt::<true>(&buf_top[0], &mut buf_row[0]);
                r.a_sub_b_mul_c_scalar_barrett_into_b::<2, ONCE>(
                    &buf_row[0],
                    rescaling_constants.at(i),
                    a.at_mut(i),
                );
            }
        } else {
            let (a_rows, a_top) = a.0.split_at_mut(level);
            for (i, r) in self.0[0..level].iter().enumerate() {
                r.a_sub_b_mul_c_scalar_barrett_into_b::<2, ONCE>(
                    &a_top[0],
                    rescaling_constants.at(i),
                    &mut a_rows[i],
                );
            }
        }
    }

    /// Updates b to floor(a / prod of the nb_moduli top moduli).
    pub fn div_by_last_moduli<const ROUND: bool, const NTT: bool>(
        &self,
        nb_moduli: usize,
        a: &PolyRNS<u64>,
        buf: &mut PolyRNS<u64>,
        b: &mut PolyRNS<u64>,
    ) {
        debug_assert!(
            nb_moduli <= self.level(),
            "invalid nb_moduli={}: exceeds level={}",
            nb_moduli,
            self.level()
        );

        if nb_moduli == 0 {
            self.copy(a, b);
            return;
        }

        if NTT {
            self.intt::<false>(a, buf);
            let mut scratch: PolyRNS<u64> = PolyRNS::new(self.n(), 1);
            (0..nb_moduli).for_each(|i| {
                self.at_level(self.level() - i)
                    .div_by_last_modulus_inplace::<ROUND, false>(&mut scratch, buf)
            });
            self.at_level(self.level() - nb_moduli).ntt::<false>(buf, b);
        } else {
            self.div_by_last_modulus::<ROUND, false>(a, buf, b);
            (1..nb_moduli).for_each(|i| {
                let mut scratch: PolyRNS<u64> = PolyRNS::new(0, 0);
                self.at_level(self.level() - i)
                    .div_by_last_modulus_inplace::<ROUND, false>(&mut scratch, b)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_traits::{ToPrimitive, Zero};

    #[test]
    fn test_div_by_last_modulus_round() {
        let n: usize = 32;
        let ring: RingRNS<u64> = RingRNS::<u64>::new(n, vec![0x7fffffd8001, 0x7fffffc8001, 0x7fffff98001]);
        let sub_ring: RingRNS<u64> = ring.at_level(ring.level() - 1);

        let coeffs: Vec<i64> = (0..n as i64).map(|i| i * 0x123456789ab - 0xfffffff).collect();
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.set_coefficients_i64(&coeffs, &mut a);

        let mut buf: PolyRNS<u64> = ring.new_polyrns();
        let mut b: PolyRNS<u64> = ring.new_polyrns();
        ring.div_by_last_modulus::<true, false>(&a, &mut buf, &mut b);

        let q_top: i64 = ring.0[ring.level()].modulus.q as i64;
        let mut have: Vec<BigInt> = vec![BigInt::zero(); n];
        sub_ring.to_bigint_centered(&b, &mut have);
        for (c, h) in coeffs.iter().zip(have.iter()) {
            // Round half away from zero is within 1 of round half up.
            let want: f64 = *c as f64 / q_top as f64;
            assert!((h.to_i64().unwrap() as f64 - want).abs() <= 1.0);
        }
    }

    #[test]
    fn test_div_round_trip_with_ntt() {
        let n: usize = 32;
        let ring: RingRNS<u64> = RingRNS::<u64>::new(n, vec![0x7fffffd8001, 0x7fffffc8001]);

        let coeffs: Vec<i64> = (0..n as i64).map(|i| i * 0x123456789).collect();
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.set_coefficients_i64(&coeffs, &mut a);
        ring.ntt_inplace::<false>(&mut a);

        let mut buf: PolyRNS<u64> = ring.new_polyrns();
        let mut b: PolyRNS<u64> = ring.new_polyrns();
        ring.div_by_last_modulus::<true, true>(&a, &mut buf, &mut b);

        let sub_ring: RingRNS<u64> = ring.at_level(0);
        sub_ring.intt_inplace::<false>(&mut b);

        let q_top: i64 = ring.0[1].modulus.q as i64;
        let mut have: Vec<BigInt> = vec![BigInt::zero(); n];
        sub_ring.to_bigint_centered(&b, &mut have);
        for (c, h) in coeffs.iter().zip(have.iter()) {
            let want: f64 = *c as f64 / q_top as f64;
            assert!((h.to_i64().unwrap() as f64 - want).abs() <= 1.0);
        }
    }
}
