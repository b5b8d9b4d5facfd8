use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::REDUCEMOD;
use crate::poly::PolyRNS;
use crate::ring::{Ring, RingRNS};
use crate::scalar::ScalarRNS;
use itertools::izip;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::sync::Arc;

macro_rules! debug_assert_level {
    ($self:expr, $a:expr) => {
        debug_assert!(
            $a.level() >= $self.level(),
            "input level={} < ring level={}",
            $a.level(),
            $self.level()
        );
    };
}

impl RingRNS<u64> {
    pub fn new(n: usize, moduli: Vec<u64>) -> Self {
        assert!(!moduli.is_empty(), "moduli cannot be empty");
        let rings: Vec<Arc<Ring<u64>>> = moduli
            .into_iter()
            .map(|prime| Arc::new(Ring::new(n, prime, 1)))
            .collect();
        RingRNS(rings)
    }

    /// Product of the moduli of the chain.
    pub fn modulus(&self) -> BigInt {
        let mut modulus: BigInt = BigInt::from(1);
        self.0.iter().for_each(|r| modulus *= BigInt::from(r.modulus.q));
        modulus
    }

    /// Constants -(q_level^-1) mod q_i for the rounded division by the
    /// top modulus.
    pub fn rescaling_constants(&self) -> ScalarRNS<Barrett<u64>> {
        let level: usize = self.level();
        let q_scale: u64 = self.0[level].modulus.q;
        ScalarRNS(
            (0..level)
                .map(|i| {
                    let r: &Ring<u64> = &self.0[i];
                    r.modulus
                        .barrett
                        .prepare(r.modulus.q - r.modulus.inv(q_scale % r.modulus.q))
                })
                .collect(),
        )
    }
}

impl RingRNS<u64> {
    pub fn ntt_inplace<const LAZY: bool>(&self, a: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.ntt_inplace::<LAZY>(a.at_mut(i)));
    }

    pub fn intt_inplace<const LAZY: bool>(&self, a: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.intt_inplace::<LAZY>(a.at_mut(i)));
    }

    pub fn ntt<const LAZY: bool>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.ntt::<LAZY>(a.at(i), b.at_mut(i)));
    }

    pub fn intt<const LAZY: bool>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.intt::<LAZY>(a.at(i), b.at_mut(i)));
    }
}

impl RingRNS<u64> {
    #[inline(always)]
    pub fn a_reduce_into_a<const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_reduce_into_a::<REDUCE>(a.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_add_b_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        debug_assert_level!(self, c);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_add_b_into_c::<REDUCE>(a.at(i), b.at(i), c.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_add_b_into_b<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_add_b_into_b::<REDUCE>(a.at(i), b.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_sub_b_into_c<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        debug_assert_level!(self, c);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_sub_b_into_c::<BRANGE, REDUCE>(a.at(i), b.at(i), c.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_sub_b_into_b<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_sub_b_into_b::<BRANGE, REDUCE>(a.at(i), b.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_neg_into_a<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_neg_into_a::<ARANGE, REDUCE>(a.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_neg_into_b<const ARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_neg_into_b::<ARANGE, REDUCE>(a.at(i), b.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_prepare_montgomery_into_b<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &mut PolyRNS<Montgomery<u64>>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_prepare_montgomery_into_b::<REDUCE>(a.at(i), b.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_prepare_montgomery_into_a<const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<Montgomery<u64>>) {
        debug_assert_level!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_prepare_montgomery_into_a::<REDUCE>(a.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_from_montgomery_into_b<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_from_montgomery_into_b::<REDUCE>(a.at(i), b.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        debug_assert_level!(self, c);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.a_mul_b_montgomery_into_c::<REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_into_b<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_mul_b_montgomery_into_b::<REDUCE>(a.at(i), b.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_add_c_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        debug_assert_level!(self, c);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.a_mul_b_montgomery_add_c_into_c::<REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_sub_c_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        debug_assert_level!(self, c);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.a_mul_b_montgomery_sub_c_into_c::<REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    #[inline(always)]
    pub fn a_mul_b_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        debug_assert_level!(self, c);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_mul_b_into_c::<REDUCE>(a.at(i), b.at(i), c.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_mul_b_scalar_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &u64,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, c);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_mul_b_scalar_into_c::<REDUCE>(a.at(i), b, c.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_mul_b_scalar_into_a<const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_mul_b_scalar_into_a::<REDUCE>(b, a.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_mul_b_scalar_rns_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &ScalarRNS<Barrett<u64>>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, c);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.a_mul_b_scalar_barrett_into_c::<REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    #[inline(always)]
    pub fn a_mul_b_pow2_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        pow2: usize,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, c);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_mul_b_pow2_into_c::<REDUCE>(a.at(i), pow2, c.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_mul_b_pow2_into_a<const REDUCE: REDUCEMOD>(&self, pow2: usize, a: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_mul_b_pow2_into_a::<REDUCE>(pow2, a.at_mut(i)));
    }

    /// Broadcasts the digit-th base-2^base window of row src_row of a
    /// across all rows of b.
    pub fn a_row_ith_digit_base_b_broadcast_into_c(
        &self,
        src_row: usize,
        digit: usize,
        base: usize,
        a: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert_level!(self, c);
        debug_assert!(src_row <= a.level());
        let (head, tail) = c.0.split_first_mut().unwrap();
        self.0[0].a_ith_digit_base_b_into_c(digit, a.at(src_row), base, head);
        tail.iter_mut()
            .take(self.level())
            .for_each(|row| row.0.copy_from_slice(&head.0));
    }

    pub fn copy(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        debug_assert_level!(self, b);
        (0..self.level() + 1).for_each(|i| b.at_mut(i).0.copy_from_slice(&a.at(i).0));
    }

    /// Equality over the rows of the chain, assuming canonical residues.
    pub fn equal(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>) -> bool {
        (0..self.level() + 1).all(|i| a.at(i).0 == b.at(i).0)
    }
}

impl RingRNS<u64> {
    /// Sets the coefficients of a from unsigned integers, reduced mod
    /// each modulus of the chain.
    pub fn set_coefficients_u64(&self, coeffs: &[u64], a: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        assert!(coeffs.len() == self.n(), "coeffs.len()={} != n={}", coeffs.len(), self.n());
        for (i, ring) in self.0.iter().enumerate() {
            let q: u64 = ring.modulus.q;
            izip!(coeffs.iter(), a.at_mut(i).0.iter_mut()).for_each(|(c, x)| *x = c % q);
        }
    }

    /// Sets the coefficients of a from signed integers, lifting the
    /// negatives to q - |c|.
    pub fn set_coefficients_i64(&self, coeffs: &[i64], a: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        assert!(coeffs.len() == self.n(), "coeffs.len()={} != n={}", coeffs.len(), self.n());
        for (i, ring) in self.0.iter().enumerate() {
            let q: i64 = ring.modulus.q as i64;
            izip!(coeffs.iter(), a.at_mut(i).0.iter_mut())
                .for_each(|(c, x)| *x = (c.rem_euclid(q)) as u64);
        }
    }

    /// Sets the coefficients of a from big integers, reduced mod each
    /// modulus of the chain.
    pub fn set_coefficients_bigint(&self, coeffs: &[BigInt], a: &mut PolyRNS<u64>) {
        debug_assert_level!(self, a);
        assert!(coeffs.len() == self.n(), "coeffs.len()={} != n={}", coeffs.len(), self.n());
        for (i, ring) in self.0.iter().enumerate() {
            let q_big: BigInt = BigInt::from(ring.modulus.q);
            izip!(coeffs.iter(), a.at_mut(i).0.iter_mut()).for_each(|(c, x)| {
                let mut r: BigInt = c % &q_big;
                if r.is_negative() {
                    r += &q_big;
                }
                *x = r.to_u64().unwrap();
            });
        }
    }

    /// CRT reconstruction of the coefficients of a in [0, Q).
    pub fn to_bigint(&self, a: &PolyRNS<u64>, coeffs: &mut [BigInt]) {
        debug_assert_level!(self, a);
        assert!(coeffs.len() == self.n(), "coeffs.len()={} != n={}", coeffs.len(), self.n());

        let q_big: BigInt = self.modulus();
        let crt: Vec<BigInt> = (0..self.level() + 1)
            .map(|i| {
                let qi_big: BigInt = BigInt::from(self.0[i].modulus.q);
                let q_over_qi: BigInt = &q_big / &qi_big;
                (&q_over_qi).modinv(&qi_big).unwrap() * &q_over_qi
            })
            .collect();

        coeffs.iter_mut().enumerate().for_each(|(j, c)| {
            *c = BigInt::zero();
            (0..self.level() + 1).for_each(|i| *c += BigInt::from(a.at(i).0[j]) * &crt[i]);
            *c %= &q_big;
        });
    }

    /// CRT reconstruction of the coefficients of a centered in
    /// (-Q/2, Q/2].
    pub fn to_bigint_centered(&self, a: &PolyRNS<u64>, coeffs: &mut [BigInt]) {
        self.to_bigint(a, coeffs);
        let q_big: BigInt = self.modulus();
        let q_half: BigInt = &q_big >> 1;
        coeffs.iter_mut().for_each(|c| {
            if &*c >= &q_half {
                *c -= &q_big;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulus::{BARRETT, NONE, ONCE};

    fn new_test_ring() -> RingRNS<u64> {
        RingRNS::<u64>::new(32, vec![0x7fffffd8001, 0x7fffffc8001])
    }

    #[test]
    fn test_bigint_round_trip() {
        let ring: RingRNS<u64> = new_test_ring();
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        let coeffs: Vec<i64> = (0..32).map(|i| (i as i64) - 16).collect();
        ring.set_coefficients_i64(&coeffs, &mut a);

        let mut reconstructed: Vec<BigInt> = vec![BigInt::zero(); 32];
        ring.to_bigint_centered(&a, &mut reconstructed);
        izip!(coeffs.iter(), reconstructed.iter())
            .for_each(|(want, have)| assert_eq!(BigInt::from(*want), *have));
    }

    #[test]
    fn test_add_sub_neg() {
        let ring: RingRNS<u64> = new_test_ring();
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        let mut b: PolyRNS<u64> = ring.new_polyrns();
        let mut c: PolyRNS<u64> = ring.new_polyrns();

        ring.set_coefficients_u64(&(0..32).collect::<Vec<u64>>(), &mut a);
        ring.set_coefficients_u64(&(0..32).map(|i| 2 * i).collect::<Vec<u64>>(), &mut b);

        ring.a_add_b_into_c::<ONCE>(&a, &b, &mut c);
        ring.a_sub_b_into_b::<1, ONCE>(&c, &mut b);
        ring.a_sub_b_into_b::<1, ONCE>(&a, &mut b);
        ring.a_neg_into_a::<1, ONCE>(&mut b);
        // b = -(a - (a + b - b)) = 0
        let zero: PolyRNS<u64> = ring.new_polyrns();
        assert!(ring.equal(&b, &zero));
    }

    #[test]
    fn test_montgomery_mul_matches_barrett_mul() {
        let ring: RingRNS<u64> = new_test_ring();
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        let mut b: PolyRNS<u64> = ring.new_polyrns();
        ring.set_coefficients_u64(&(0..32).map(|i| i * 12345).collect::<Vec<u64>>(), &mut a);
        ring.set_coefficients_u64(&(0..32).map(|i| i * 67891).collect::<Vec<u64>>(), &mut b);

        let mut a_mont: PolyRNS<u64> = ring.new_polyrns();
        ring.a_prepare_montgomery_into_b::<ONCE>(&a, &mut a_mont);

        let mut want: PolyRNS<u64> = ring.new_polyrns();
        let mut have: PolyRNS<u64> = ring.new_polyrns();
        ring.a_mul_b_into_c::<BARRETT>(&a, &b, &mut want);
        ring.a_mul_b_montgomery_into_c::<ONCE>(&a_mont, &b, &mut have);
        assert!(ring.equal(&want, &have));

        // Accumulating twice with the lazy variant then reducing
        // equals 2ab.
        let mut acc: PolyRNS<u64> = ring.new_polyrns();
        ring.a_mul_b_montgomery_add_c_into_c::<NONE>(&a_mont, &b, &mut acc);
        ring.a_mul_b_montgomery_add_c_into_c::<NONE>(&a_mont, &b, &mut acc);
        ring.a_reduce_into_a::<BARRETT>(&mut acc);
        ring.a_add_b_into_b::<ONCE>(&want, &mut have);
        assert!(ring.equal(&acc, &have));
    }
}
