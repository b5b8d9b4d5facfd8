use crate::dft::ntt::Table;
use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::{ReduceOnce, VectorOperations};
use crate::modulus::{BARRETT, REDUCEMOD};
use crate::poly::Poly;
use crate::ring::Ring;
use crate::CHUNK;

impl Ring<u64> {
    pub fn new(n: usize, q_base: u64, q_power: usize) -> Self {
        assert!(n & (n - 1) == 0, "invalid n={}: not a power of two", n);
        let prime: Prime<u64> = Prime::<u64>::new(q_base, q_power);
        Self {
            n,
            modulus: prime.clone(),
            nth_root: n << 1,
            ntt: Table::<u64>::new(prime, (n << 1) as u64),
        }
    }
}

impl Ring<u64> {
    pub fn ntt_inplace<const LAZY: bool>(&self, a: &mut Poly<u64>) {
        match LAZY {
            true => self.ntt.forward_inplace_core::<true>(&mut a.0),
            false => self.ntt.forward_inplace_core::<false>(&mut a.0),
        }
    }

    pub fn intt_inplace<const LAZY: bool>(&self, a: &mut Poly<u64>) {
        match LAZY {
            true => self.ntt.backward_inplace_core::<true>(&mut a.0),
            false => self.ntt.backward_inplace_core::<false>(&mut a.0),
        }
    }

    pub fn ntt<const LAZY: bool>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        b.0.copy_from_slice(&a.0);
        self.ntt_inplace::<LAZY>(b);
    }

    pub fn intt<const LAZY: bool>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        b.0.copy_from_slice(&a.0);
        self.intt_inplace::<LAZY>(b);
    }
}

impl Ring<u64> {
    #[inline(always)]
    pub fn a_reduce_into_a<const REDUCE: REDUCEMOD>(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.va_reduce_into_va::<CHUNK, REDUCE>(&mut a.0);
    }

    #[inline(always)]
    pub fn a_add_b_into_c<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_add_vb_into_vc::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_add_b_into_b<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_add_vb_into_vb::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    #[inline(always)]
    pub fn a_add_b_scalar_into_c<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &u64, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_add_sb_into_vc::<CHUNK, REDUCE>(&a.0, b, &mut c.0);
    }

    #[inline(always)]
    pub fn a_add_b_scalar_into_a<const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.va_add_sb_into_va::<CHUNK, REDUCE>(b, &mut a.0);
    }

    #[inline(always)]
    pub fn a_sub_b_into_c<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_sub_vb_into_vc::<CHUNK, BRANGE, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_sub_b_into_b<const BRANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_sub_vb_into_vb::<CHUNK, BRANGE, REDUCE>(&a.0, &mut b.0);
    }

    #[inline(always)]
    pub fn a_neg_into_a<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.va_neg_into_va::<CHUNK, ARANGE, REDUCE>(&mut a.0);
    }

    #[inline(always)]
    pub fn a_neg_into_b<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_neg_into_vb::<CHUNK, ARANGE, REDUCE>(&a.0, &mut b.0);
    }

    #[inline(always)]
    pub fn a_prepare_montgomery_into_b<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &mut Poly<Montgomery<u64>>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_prepare_montgomery_into_vb::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    #[inline(always)]
    pub fn a_prepare_montgomery_into_a<const REDUCE: REDUCEMOD>(&self, a: &mut Poly<Montgomery<u64>>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.va_prepare_montgomery_into_va::<CHUNK, REDUCE>(&mut a.0);
    }

    #[inline(always)]
    pub fn a_from_montgomery_into_b<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_from_montgomery_into_vb::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_mul_vb_montgomery_into_vc::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_into_b<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_mul_vb_montgomery_into_vb::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_add_c_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_mul_vb_montgomery_add_vc_into_vc::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_sub_c_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_mul_vb_montgomery_sub_vc_into_vc::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_mul_b_into_c<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_mul_vb_into_vc::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_mul_b_scalar_barrett_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Barrett<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.va_mul_sb_barrett_into_vc::<CHUNK, REDUCE>(&a.0, b, &mut c.0);
    }

    #[inline(always)]
    pub fn a_mul_b_scalar_barrett_into_a<const REDUCE: REDUCEMOD>(&self, b: &Barrett<u64>, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.va_mul_sb_barrett_into_va::<CHUNK, REDUCE>(b, &mut a.0);
    }

    #[inline(always)]
    pub fn a_mul_b_scalar_into_c<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &u64, c: &mut Poly<u64>) {
        let b_prepared: Barrett<u64> = self.modulus.barrett.prepare(self.modulus.barrett.reduce::<BARRETT>(b));
        self.a_mul_b_scalar_barrett_into_c::<REDUCE>(a, &b_prepared, c);
    }

    #[inline(always)]
    pub fn a_mul_b_scalar_into_a<const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut Poly<u64>) {
        let b_prepared: Barrett<u64> = self.modulus.barrett.prepare(self.modulus.barrett.reduce::<BARRETT>(b));
        self.a_mul_b_scalar_barrett_into_a::<REDUCE>(&b_prepared, a);
    }

    /// Multiplies by 2^pow2.
    #[inline(always)]
    pub fn a_mul_b_pow2_into_c<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, pow2: usize, c: &mut Poly<u64>) {
        let b: u64 = self.modulus.pow(2, pow2 as u64);
        self.a_mul_b_scalar_barrett_into_c::<REDUCE>(a, &self.modulus.barrett.prepare(b), c);
    }

    #[inline(always)]
    pub fn a_mul_b_pow2_into_a<const REDUCE: REDUCEMOD>(&self, pow2: usize, a: &mut Poly<u64>) {
        let b: u64 = self.modulus.pow(2, pow2 as u64);
        self.a_mul_b_scalar_barrett_into_a::<REDUCE>(&self.modulus.barrett.prepare(b), a);
    }

    #[inline(always)]
    pub fn a_sub_b_mul_c_scalar_barrett_into_d<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Poly<u64>,
        c: &Barrett<u64>,
        d: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(d.n() == self.n(), "d.n()={} != n={}", d.n(), self.n());
        self.modulus
            .va_sub_vb_mul_sc_barrett_into_vd::<CHUNK, BRANGE, REDUCE>(&a.0, &b.0, c, &mut d.0);
    }

    #[inline(always)]
    pub fn a_sub_b_mul_c_scalar_barrett_into_b<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        c: &Barrett<u64>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .va_sub_vb_mul_sc_barrett_into_vb::<CHUNK, BRANGE, REDUCE>(&a.0, c, &mut b.0);
    }

    #[inline(always)]
    pub fn b_sub_a_add_c_scalar_mul_d_scalar_barrett_into_a<const ARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &Poly<u64>,
        c: &u64,
        d: &Barrett<u64>,
        a: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .vb_sub_va_add_sc_mul_sd_barrett_into_va::<CHUNK, ARANGE, REDUCE>(&b.0, c, d, &mut a.0);
    }

    /// Writes the i-th base-2^base digit window of a into b.
    #[inline(always)]
    pub fn a_ith_digit_base_b_into_c(&self, i: usize, a: &Poly<u64>, base: usize, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_ith_digit_unsigned_base_sb_into_vc::<CHUNK>(i, &a.0, &base, &mut c.0);
    }

    /// Centers a residue around 0, returning a signed value in (-q/2, q/2].
    #[inline(always)]
    pub fn center(&self, x: u64) -> i64 {
        let q: u64 = self.modulus.q;
        let x_reduced: u64 = x.reduce_once(q);
        if x_reduced > q >> 1 {
            -((q - x_reduced) as i64)
        } else {
            x_reduced as i64
        }
    }
}
