use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::{Montgomery, MontgomeryPrecomp};
use crate::modulus::{REDUCEMOD, ONCE};

use num_bigint::BigUint;
use num_traits::cast::ToPrimitive;

impl MontgomeryPrecomp<u64> {
    pub fn new(q: u64) -> MontgomeryPrecomp<u64> {
        debug_assert!(q & 1 == 1, "invalid modulus q={}: not odd", q);

        // Newton iteration doubles the number of correct low bits.
        let mut q_inv: u64 = q;
        for _ in 0..5 {
            q_inv = q_inv.wrapping_mul(2u64.wrapping_sub(q.wrapping_mul(q_inv)));
        }
        debug_assert!(q.wrapping_mul(q_inv) == 1);

        let r_square: u64 = ((BigUint::from(1usize) << 128usize) % BigUint::from(q))
            .to_u64()
            .unwrap();

        let mut precomp: MontgomeryPrecomp<u64> = Self {
            q,
            two_q: q << 1,
            four_q: q << 2,
            q_inv_neg: q_inv.wrapping_neg(),
            r_square,
            barrett: BarrettPrecomp::new(q),
            one: 0,
            minus_one: 0,
        };
        precomp.one = precomp.prepare::<ONCE>(1);
        precomp.minus_one = q - precomp.one;
        precomp
    }

    #[inline(always)]
    pub fn one(&self) -> Montgomery<u64> {
        self.one
    }

    #[inline(always)]
    pub fn minus_one(&self) -> Montgomery<u64> {
        self.minus_one
    }

    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        self.barrett.reduce_assign::<REDUCE>(x);
    }

    /// REDC of a double-word value: returns t * 2^-64 mod q in [0, 2q)
    /// before the tail reduction. Valid for t <= 2^64 * q.
    #[inline(always)]
    pub fn redc<const REDUCE: REDUCEMOD>(&self, t: u128) -> u64 {
        let m: u64 = (t as u64).wrapping_mul(self.q_inv_neg);
        let mut r: u64 = ((t.wrapping_add((m as u128) * (self.q as u128))) >> 64) as u64;
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    /// Maps x into the Montgomery domain: x * 2^64 mod q.
    #[inline(always)]
    pub fn prepare<const REDUCE: REDUCEMOD>(&self, x: u64) -> Montgomery<u64> {
        self.redc::<REDUCE>((x as u128) * (self.r_square as u128))
    }

    #[inline(always)]
    pub fn prepare_assign<const REDUCE: REDUCEMOD>(&self, x: u64, r: &mut Montgomery<u64>) {
        *r = self.prepare::<REDUCE>(x);
    }

    /// Maps x out of the Montgomery domain: x * 2^-64 mod q.
    #[inline(always)]
    pub fn unprepare<const REDUCE: REDUCEMOD>(&self, x: &Montgomery<u64>) -> u64 {
        self.redc::<REDUCE>(*x as u128)
    }

    /// Multiplies a Montgomery-domain operand with a plain operand,
    /// returning a plain result. rhs may be lazy in [0, 2q).
    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>, rhs: u64) -> u64 {
        self.redc::<REDUCE>((lhs as u128) * (rhs as u128))
    }

    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>, rhs: &mut u64) {
        *rhs = self.mul_external::<REDUCE>(lhs, *rhs);
    }

    /// Multiplies two Montgomery-domain operands, returning a
    /// Montgomery-domain result.
    #[inline(always)]
    pub fn mul_internal<const REDUCE: REDUCEMOD>(
        &self,
        lhs: Montgomery<u64>,
        rhs: Montgomery<u64>,
    ) -> Montgomery<u64> {
        self.redc::<REDUCE>((lhs as u128) * (rhs as u128))
    }

    /// Square-and-multiply exponentiation of a Montgomery-domain base.
    pub fn pow(&self, base: Montgomery<u64>, exp: u64) -> Montgomery<u64> {
        let mut acc: Montgomery<u64> = self.one;
        let mut base_pow: Montgomery<u64> = base;
        let mut e: u64 = exp;
        while e > 0 {
            if e & 1 == 1 {
                acc = self.mul_internal::<ONCE>(acc, base_pow);
            }
            base_pow = self.mul_internal::<ONCE>(base_pow, base_pow);
            e >>= 1;
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_unprepare_roundtrip() {
        let q: u64 = 0x1fffffffffe00001;
        let precomp: MontgomeryPrecomp<u64> = MontgomeryPrecomp::new(q);
        let x: u64 = q - 987654321;
        let x_mont: Montgomery<u64> = precomp.prepare::<ONCE>(x);
        assert_eq!(precomp.unprepare::<ONCE>(&x_mont), x);
    }

    #[test]
    fn test_mul_external() {
        let q: u64 = 0x1fffffffffe00001;
        let precomp: MontgomeryPrecomp<u64> = MontgomeryPrecomp::new(q);
        let (a, b): (u64, u64) = (q - 3, q - 5);
        let want: u64 = (((a as u128) * (b as u128)) % (q as u128)) as u64;
        assert_eq!(precomp.mul_external::<ONCE>(precomp.prepare::<ONCE>(a), b), want);
    }

    #[test]
    fn test_pow() {
        let q: u64 = 0xffffee001;
        let precomp: MontgomeryPrecomp<u64> = MontgomeryPrecomp::new(q);
        let base: Montgomery<u64> = precomp.prepare::<ONCE>(3);
        let mut want: u64 = 1;
        for _ in 0..17 {
            want = (((want as u128) * 3) % (q as u128)) as u64;
        }
        assert_eq!(precomp.unprepare::<ONCE>(&precomp.pow(base, 17)), want);
    }
}
