use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::{ScalarOperations, VectorOperations};
use crate::modulus::{NONE, ONCE, REDUCEMOD};
use crate::{apply_binary, apply_ternary, apply_unary};
use itertools::izip;

impl ScalarOperations<u64> for Prime<u64> {
    /// Applies a modular reduction on a based on REDUCE:
    /// - NONE: no modular reduction.
    /// - ONCE: subtracts q if a >= q.
    /// - TWICE: subtracts 2q if a >= 2q.
    /// - FOURTIMES: subtracts 4q if a >= 4q.
    /// - BARRETT: maps a to a mod q using Barrett reduction.
    /// - BARRETTLAZY: maps a to a mod q with values in [0, 2q-1].
    #[inline(always)]
    fn sa_reduce_into_sa<const REDUCE: REDUCEMOD>(&self, a: &mut u64) {
        self.barrett.reduce_assign::<REDUCE>(a);
    }

    #[inline(always)]
    fn sa_add_sb_into_sc<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &u64, c: &mut u64) {
        *c = a.wrapping_add(*b);
        self.barrett.reduce_assign::<REDUCE>(c);
    }

    #[inline(always)]
    fn sa_add_sb_into_sb<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &mut u64) {
        *b = a.wrapping_add(*b);
        self.barrett.reduce_assign::<REDUCE>(b);
    }

    #[inline(always)]
    fn sa_sub_sb_into_sc<const SBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &u64,
        c: &mut u64,
    ) {
        *c = a.wrapping_add((SBRANGE as u64) * self.q).wrapping_sub(*b);
        self.barrett.reduce_assign::<REDUCE>(c);
    }

    #[inline(always)]
    fn sa_sub_sb_into_sb<const SBRANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &u64, b: &mut u64) {
        *b = a.wrapping_add((SBRANGE as u64) * self.q).wrapping_sub(*b);
        self.barrett.reduce_assign::<REDUCE>(b);
    }

    #[inline(always)]
    fn sa_neg_into_sa<const SARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut u64) {
        *a = ((SARANGE as u64) * self.q).wrapping_sub(*a);
        self.barrett.reduce_assign::<REDUCE>(a);
    }

    #[inline(always)]
    fn sa_neg_into_sb<const SARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &u64, b: &mut u64) {
        *b = ((SARANGE as u64) * self.q).wrapping_sub(*a);
        self.barrett.reduce_assign::<REDUCE>(b);
    }

    #[inline(always)]
    fn sa_prepare_montgomery_into_sb<const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &mut Montgomery<u64>,
    ) {
        *b = self.montgomery.prepare::<REDUCE>(*a);
    }

    #[inline(always)]
    fn sa_from_montgomery_into_sb<const REDUCE: REDUCEMOD>(&self, a: &Montgomery<u64>, b: &mut u64) {
        *b = self.montgomery.unprepare::<REDUCE>(a);
    }

    #[inline(always)]
    fn sa_mul_sb_montgomery_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<u64>,
        b: &u64,
        c: &mut u64,
    ) {
        *c = self.montgomery.mul_external::<REDUCE>(*a, *b);
    }

    #[inline(always)]
    fn sa_mul_sb_montgomery_into_sb<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<u64>,
        b: &mut u64,
    ) {
        self.montgomery.mul_external_assign::<REDUCE>(*a, b);
    }

    #[inline(always)]
    fn sa_mul_sb_montgomery_add_sc_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<u64>,
        b: &u64,
        c: &mut u64,
    ) {
        match REDUCE {
            NONE => *c = c.wrapping_add(self.montgomery.mul_external::<NONE>(*a, *b)),
            _ => {
                *c = c.wrapping_add(self.montgomery.mul_external::<ONCE>(*a, *b));
                self.barrett.reduce_assign::<REDUCE>(c);
            }
        }
    }

    #[inline(always)]
    fn sa_mul_sb_montgomery_sub_sc_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<u64>,
        b: &u64,
        c: &mut u64,
    ) {
        match REDUCE {
            NONE => {
                *c = c
                    .wrapping_add(self.two_q)
                    .wrapping_sub(self.montgomery.mul_external::<NONE>(*a, *b))
            }
            _ => {
                *c = c
                    .wrapping_add(self.q)
                    .wrapping_sub(self.montgomery.mul_external::<ONCE>(*a, *b));
                self.barrett.reduce_assign::<REDUCE>(c);
            }
        }
    }

    #[inline(always)]
    fn sa_mul_sb_barrett_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &Barrett<u64>,
        c: &mut u64,
    ) {
        *c = self.barrett.mul_external::<REDUCE>(b, a);
    }

    #[inline(always)]
    fn sa_mul_sb_barrett_into_sa<const REDUCE: REDUCEMOD>(&self, b: &Barrett<u64>, a: &mut u64) {
        self.barrett.mul_external_assign::<REDUCE>(b, a);
    }

    #[inline(always)]
    fn sa_mul_sb_into_sc<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &u64, c: &mut u64) {
        *c = self.barrett.mul::<REDUCE>(a, b);
    }

    #[inline(always)]
    fn sa_sub_sb_mul_sc_barrett_into_sd<const SBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &u64,
        c: &Barrett<u64>,
        d: &mut u64,
    ) {
        *d = self
            .barrett
            .mul_external::<REDUCE>(c, &a.wrapping_add((SBRANGE as u64) * self.q).wrapping_sub(*b));
    }

    #[inline(always)]
    fn sa_sub_sb_mul_sc_barrett_into_sb<const SBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        c: &Barrett<u64>,
        b: &mut u64,
    ) {
        *b = self
            .barrett
            .mul_external::<REDUCE>(c, &a.wrapping_add((SBRANGE as u64) * self.q).wrapping_sub(*b));
    }

    #[inline(always)]
    fn sb_sub_sa_add_sc_mul_sd_barrett_into_sa<const SARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &u64,
        c: &u64,
        d: &Barrett<u64>,
        a: &mut u64,
    ) {
        *a = self.barrett.mul_external::<REDUCE>(
            d,
            &b.wrapping_add((SARANGE as u64) * self.q)
                .wrapping_sub(*a)
                .wrapping_add(*c),
        );
    }

    #[inline(always)]
    fn sa_rsh_sb_mask_sc_into_sd(&self, a: &u64, b: &usize, c: &u64, d: &mut u64) {
        *d = (a >> b) & c;
    }
}

impl VectorOperations<u64> for Prime<u64> {
    #[inline(always)]
    fn va_reduce_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &mut [u64]) {
        apply_unary!(self, Self::sa_reduce_into_sa::<REDUCE>, a, CHUNK);
    }

    #[inline(always)]
    fn va_add_vb_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(self, Self::sa_add_sb_into_sc::<REDUCE>, a, b, c, CHUNK);
    }

    #[inline(always)]
    fn va_add_vb_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::sa_add_sb_into_sb::<REDUCE>, a, b, CHUNK);
    }

    #[inline(always)]
    fn va_add_sb_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &u64,
        c: &mut [u64],
    ) {
        apply_binary!(
            self,
            |s: &Self, x: &u64, y: &mut u64| s.sa_add_sb_into_sc::<REDUCE>(x, b, y),
            a,
            c,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_add_sb_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut [u64]) {
        apply_unary!(
            self,
            |s: &Self, x: &mut u64| s.sa_add_sb_into_sb::<REDUCE>(b, x),
            a,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_sub_vb_into_vc<const CHUNK: usize, const VBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(
            self,
            Self::sa_sub_sb_into_sc::<VBRANGE, REDUCE>,
            a,
            b,
            c,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_sub_vb_into_vb<const CHUNK: usize, const VBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::sa_sub_sb_into_sb::<VBRANGE, REDUCE>, a, b, CHUNK);
    }

    #[inline(always)]
    fn va_neg_into_va<const CHUNK: usize, const VARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &mut [u64],
    ) {
        apply_unary!(self, Self::sa_neg_into_sa::<VARANGE, REDUCE>, a, CHUNK);
    }

    #[inline(always)]
    fn va_neg_into_vb<const CHUNK: usize, const VARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::sa_neg_into_sb::<VARANGE, REDUCE>, a, b, CHUNK);
    }

    #[inline(always)]
    fn va_prepare_montgomery_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &mut [Montgomery<u64>],
    ) {
        apply_binary!(self, Self::sa_prepare_montgomery_into_sb::<REDUCE>, a, b, CHUNK);
    }

    #[inline(always)]
    fn va_prepare_montgomery_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &mut [Montgomery<u64>],
    ) {
        apply_unary!(
            self,
            |s: &Self, x: &mut u64| {
                let v: u64 = *x;
                s.sa_prepare_montgomery_into_sb::<REDUCE>(&v, x)
            },
            a,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_from_montgomery_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::sa_from_montgomery_into_sb::<REDUCE>, a, b, CHUNK);
    }

    #[inline(always)]
    fn va_mul_vb_montgomery_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(self, Self::sa_mul_sb_montgomery_into_sc::<REDUCE>, a, b, c, CHUNK);
    }

    #[inline(always)]
    fn va_mul_vb_montgomery_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::sa_mul_sb_montgomery_into_sb::<REDUCE>, a, b, CHUNK);
    }

    #[inline(always)]
    fn va_mul_vb_montgomery_add_vc_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(
            self,
            Self::sa_mul_sb_montgomery_add_sc_into_sc::<REDUCE>,
            a,
            b,
            c,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_mul_vb_montgomery_sub_vc_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(
            self,
            Self::sa_mul_sb_montgomery_sub_sc_into_sc::<REDUCE>,
            a,
            b,
            c,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_mul_sb_barrett_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &Barrett<u64>,
        c: &mut [u64],
    ) {
        apply_binary!(
            self,
            |s: &Self, x: &u64, y: &mut u64| s.sa_mul_sb_barrett_into_sc::<REDUCE>(x, b, y),
            a,
            c,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_mul_sb_barrett_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        b: &Barrett<u64>,
        a: &mut [u64],
    ) {
        apply_unary!(
            self,
            |s: &Self, x: &mut u64| s.sa_mul_sb_barrett_into_sa::<REDUCE>(b, x),
            a,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_mul_vb_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(self, Self::sa_mul_sb_into_sc::<REDUCE>, a, b, c, CHUNK);
    }

    #[inline(always)]
    fn va_sub_vb_mul_sc_barrett_into_vd<
        const CHUNK: usize,
        const VBRANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        a: &[u64],
        b: &[u64],
        c: &Barrett<u64>,
        d: &mut [u64],
    ) {
        apply_ternary!(
            self,
            |s: &Self, x: &u64, y: &u64, z: &mut u64| s
                .sa_sub_sb_mul_sc_barrett_into_sd::<VBRANGE, REDUCE>(x, y, c, z),
            a,
            b,
            d,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_sub_vb_mul_sc_barrett_into_vb<
        const CHUNK: usize,
        const VBRANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        a: &[u64],
        c: &Barrett<u64>,
        b: &mut [u64],
    ) {
        apply_binary!(
            self,
            |s: &Self, x: &u64, y: &mut u64| s
                .sa_sub_sb_mul_sc_barrett_into_sb::<VBRANGE, REDUCE>(x, c, y),
            a,
            b,
            CHUNK
        );
    }

    #[inline(always)]
    fn vb_sub_va_add_sc_mul_sd_barrett_into_va<
        const CHUNK: usize,
        const VARANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        b: &[u64],
        c: &u64,
        d: &Barrett<u64>,
        a: &mut [u64],
    ) {
        apply_binary!(
            self,
            |s: &Self, x: &u64, y: &mut u64| s
                .sb_sub_sa_add_sc_mul_sd_barrett_into_sa::<VARANGE, REDUCE>(x, c, d, y),
            b,
            a,
            CHUNK
        );
    }

    #[inline(always)]
    fn va_ith_digit_unsigned_base_sb_into_vc<const CHUNK: usize>(
        &self,
        i: usize,
        a: &[u64],
        sb: &usize,
        c: &mut [u64],
    ) {
        let shift: usize = i * sb;
        let mask: u64 = (1u64 << sb) - 1;
        apply_binary!(
            self,
            |s: &Self, x: &u64, y: &mut u64| s.sa_rsh_sb_mask_sc_into_sd(x, &shift, &mask, y),
            a,
            c,
            CHUNK
        );
    }
}
