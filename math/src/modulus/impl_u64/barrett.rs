use crate::modulus::barrett::{Barrett, BarrettPrecomp};
use crate::modulus::ReduceOnce;
use crate::modulus::{BARRETT, BARRETTLAZY, FOURTIMES, NONE, ONCE, REDUCEMOD, TWICE};

use num_bigint::BigUint;
use num_traits::cast::ToPrimitive;

impl BarrettPrecomp<u64> {
    pub fn new(q: u64) -> BarrettPrecomp<u64> {
        debug_assert!(q < 1 << 62, "invalid modulus q={}: q >= 2^62", q);
        let big_r: BigUint = (BigUint::from(1usize) << ((u64::BITS << 1) as usize)) / BigUint::from(q);
        let lo: u64 = (&big_r & BigUint::from(u64::MAX)).to_u64().unwrap();
        let hi: u64 = (big_r >> u64::BITS).to_u64().unwrap();
        let mut precomp: BarrettPrecomp<u64> = Self {
            q,
            two_q: q << 1,
            four_q: q << 2,
            lo,
            hi,
            one: Barrett(0, 0),
        };
        precomp.one = precomp.prepare(1);
        precomp
    }

    #[inline(always)]
    pub fn one(&self) -> Barrett<u64> {
        self.one
    }

    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        match REDUCE {
            NONE => {}
            ONCE => x.reduce_once_assign(self.q),
            TWICE => x.reduce_once_assign(self.two_q),
            FOURTIMES => x.reduce_once_assign(self.four_q),
            BARRETT => {
                let (_, mhi) = widening_mul(*x, self.hi);
                *x = x.wrapping_sub(mhi.wrapping_mul(self.q));
                x.reduce_once_assign(self.q);
            }
            BARRETTLAZY => {
                let (_, mhi) = widening_mul(*x, self.hi);
                *x = x.wrapping_sub(mhi.wrapping_mul(self.q));
            }
            _ => unreachable!("invalid REDUCE argument"),
        }
    }

    #[inline(always)]
    pub fn reduce<const REDUCE: REDUCEMOD>(&self, x: &u64) -> u64 {
        let mut r = *x;
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    /// Reduces a full double-word value using the two-word reciprocal.
    /// The approximate quotient undershoots by at most 3, so the raw
    /// remainder lies in [0, 4q).
    #[inline(always)]
    pub fn reduce_u128<const REDUCE: REDUCEMOD>(&self, x: u128) -> u64 {
        let xhi: u128 = x >> 64;
        let xlo: u128 = x & (u64::MAX as u128);
        let mid: u128 = xhi * (self.lo as u128) + xlo * (self.hi as u128) + ((xlo * (self.lo as u128)) >> 64);
        let quotient: u64 = (xhi * (self.hi as u128) + (mid >> 64)) as u64;
        let mut r: u64 = (x as u64).wrapping_sub(quotient.wrapping_mul(self.q));
        r.reduce_once_assign(self.two_q);
        match REDUCE {
            NONE | TWICE | BARRETTLAZY => {}
            _ => r.reduce_once_assign(self.q),
        }
        r
    }

    /// Prepares the Shoup quotient of v for repeated multiplication.
    #[inline(always)]
    pub fn prepare(&self, v: u64) -> Barrett<u64> {
        debug_assert!(v < self.q);
        let quotient: u64 = (((v as u128) << 64) / self.q as u128) as _;
        Barrett(v, quotient)
    }

    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &u64) -> u64 {
        let mut r: u64 = *rhs;
        self.mul_external_assign::<REDUCE>(lhs, &mut r);
        r
    }

    /// Shoup multiplication: output in [0, 2q) before the tail reduction.
    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &mut u64) {
        let t: u64 = ((*lhs.quotient() as u128 * *rhs as u128) >> 64) as _;
        *rhs = (rhs.wrapping_mul(*lhs.value())).wrapping_sub(self.q.wrapping_mul(t));
        self.reduce_assign::<REDUCE>(rhs);
    }

    /// Reduces the full product a * b.
    #[inline(always)]
    pub fn mul<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &u64) -> u64 {
        self.reduce_u128::<REDUCE>((*a as u128) * (*b as u128))
    }
}

#[inline(always)]
pub fn widening_mul(a: u64, b: u64) -> (u64, u64) {
    let t: u128 = (a as u128) * (b as u128);
    (t as u64, (t >> 64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_u128() {
        let q: u64 = 0x1fffffffffe00001;
        let precomp: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        let a: u64 = q - 12345;
        let b: u64 = q - 67890;
        let want: u64 = (((a as u128) * (b as u128)) % (q as u128)) as u64;
        assert_eq!(precomp.reduce_u128::<BARRETT>((a as u128) * (b as u128)), want);
    }

    #[test]
    fn test_mul_external() {
        let q: u64 = 0xffffee001;
        let precomp: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        let lhs: Barrett<u64> = precomp.prepare(0x123456789);
        let rhs: u64 = q - 1;
        let want: u64 = (((0x123456789u128) * (rhs as u128)) % (q as u128)) as u64;
        assert_eq!(precomp.mul_external::<ONCE>(&lhs, &rhs), want);
    }
}
