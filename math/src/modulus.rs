pub mod barrett;
pub mod impl_u64;
pub mod montgomery;
pub mod prime;

use barrett::Barrett;
use montgomery::Montgomery;

/// Parameterized modular reduction applied at the tail of a kernel.
pub type REDUCEMOD = u8;

/// No reduction, output range is the arithmetic range of the kernel.
pub const NONE: REDUCEMOD = 0;
/// Subtracts q if the value is >= q.
pub const ONCE: REDUCEMOD = 1;
/// Subtracts 2q if the value is >= 2q.
pub const TWICE: REDUCEMOD = 2;
/// Subtracts 4q if the value is >= 4q.
pub const FOURTIMES: REDUCEMOD = 3;
/// Maps to [0, q) using Barrett reduction.
pub const BARRETT: REDUCEMOD = 4;
/// Maps to [0, 2q) using Barrett reduction without the exact tail.
pub const BARRETTLAZY: REDUCEMOD = 5;

pub trait WordOps<O> {
    fn log2(self) -> usize;
    fn reverse_bits_msb(self, n: u32) -> O;
    fn mask(self) -> O;
}

impl WordOps<u64> for u64 {
    #[inline(always)]
    fn log2(self) -> usize {
        (u64::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> u64 {
        self.reverse_bits() >> (u64::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> u64 {
        (1 << self.log2()) - 1
    }
}

impl WordOps<usize> for usize {
    #[inline(always)]
    fn log2(self) -> usize {
        (usize::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> usize {
        self.reverse_bits() >> (usize::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> usize {
        (1 << self.log2()) - 1
    }
}

pub trait ReduceOnce<O> {
    /// Assigns self-q to self if self >= q in constant time.
    /// User must ensure that 2q fits in O.
    fn reduce_once_constant_time_assign(&mut self, q: O);
    /// Returns self-q if self >= q else self in constant time.
    /// User must ensure that 2q fits in O.
    fn reduce_once_constant_time(&self, q: O) -> O;
    /// Assigns self-q to self if self >= q.
    /// User must ensure that 2q fits in O.
    fn reduce_once_assign(&mut self, q: O);
    /// Returns self-q if self >= q else self.
    /// User must ensure that 2q fits in O.
    fn reduce_once(&self, q: O) -> O;
}

/// Word-level modular kernels of a prime modulus.
/// The RANGE const generics give the multiple of q bounding the
/// subtracted operand; REDUCE selects the tail reduction.
pub trait ScalarOperations<O> {
    // Applies a parameterized modular reduction on a.
    fn sa_reduce_into_sa<const REDUCE: REDUCEMOD>(&self, a: &mut O);

    // Assigns a + b to c.
    fn sa_add_sb_into_sc<const REDUCE: REDUCEMOD>(&self, a: &O, b: &O, c: &mut O);

    // Assigns a + b to b.
    fn sa_add_sb_into_sb<const REDUCE: REDUCEMOD>(&self, a: &O, b: &mut O);

    // Assigns a - b to c.
    fn sa_sub_sb_into_sc<const SBRANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &O, b: &O, c: &mut O);

    // Assigns a - b to b.
    fn sa_sub_sb_into_sb<const SBRANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &O, b: &mut O);

    // Assigns -a to a.
    fn sa_neg_into_sa<const SARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut O);

    // Assigns -a to b.
    fn sa_neg_into_sb<const SARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &O, b: &mut O);

    // Assigns a * 2^64 to b.
    fn sa_prepare_montgomery_into_sb<const REDUCE: REDUCEMOD>(&self, a: &O, b: &mut Montgomery<O>);

    // Assigns a * 2^-64 to b.
    fn sa_from_montgomery_into_sb<const REDUCE: REDUCEMOD>(&self, a: &Montgomery<O>, b: &mut O);

    // Assigns a * b * 2^-64 to c.
    fn sa_mul_sb_montgomery_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<O>,
        b: &O,
        c: &mut O,
    );

    // Assigns a * b * 2^-64 to b.
    fn sa_mul_sb_montgomery_into_sb<const REDUCE: REDUCEMOD>(&self, a: &Montgomery<O>, b: &mut O);

    // Assigns a * b * 2^-64 + c to c.
    fn sa_mul_sb_montgomery_add_sc_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<O>,
        b: &O,
        c: &mut O,
    );

    // Assigns c - a * b * 2^-64 to c.
    fn sa_mul_sb_montgomery_sub_sc_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<O>,
        b: &O,
        c: &mut O,
    );

    // Assigns a * b to c using the prepared quotient of b.
    fn sa_mul_sb_barrett_into_sc<const REDUCE: REDUCEMOD>(&self, a: &O, b: &Barrett<O>, c: &mut O);

    // Assigns a * b to a using the prepared quotient of b.
    fn sa_mul_sb_barrett_into_sa<const REDUCE: REDUCEMOD>(&self, b: &Barrett<O>, a: &mut O);

    // Assigns a * b to c by Barrett reduction of the full product.
    fn sa_mul_sb_into_sc<const REDUCE: REDUCEMOD>(&self, a: &O, b: &O, c: &mut O);

    // Assigns (a + SBRANGE * q - b) * c to d.
    fn sa_sub_sb_mul_sc_barrett_into_sd<const SBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &O,
        b: &O,
        c: &Barrett<O>,
        d: &mut O,
    );

    // Assigns (a + SBRANGE * q - b) * c to b.
    fn sa_sub_sb_mul_sc_barrett_into_sb<const SBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &O,
        c: &Barrett<O>,
        b: &mut O,
    );

    // Assigns (b - a + c) * d to a.
    fn sb_sub_sa_add_sc_mul_sd_barrett_into_sa<const SARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &O,
        c: &O,
        d: &Barrett<O>,
        a: &mut O,
    );

    // Assigns (a >> b) & c to d.
    fn sa_rsh_sb_mask_sc_into_sd(&self, a: &O, b: &usize, c: &O, d: &mut O);
}

/// Vectorized lifts of the word-level kernels, unrolled by CHUNK.
pub trait VectorOperations<O> {
    fn va_reduce_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &mut [O]);

    // vec(c) <- vec(a) + vec(b).
    fn va_add_vb_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &[O],
        c: &mut [O],
    );

    // vec(b) <- vec(a) + vec(b).
    fn va_add_vb_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, a: &[O], b: &mut [O]);

    // vec(c) <- vec(a) + scalar(b).
    fn va_add_sb_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &O,
        c: &mut [O],
    );

    // vec(a) <- vec(a) + scalar(b).
    fn va_add_sb_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, b: &O, a: &mut [O]);

    // vec(c) <- vec(a) - vec(b).
    fn va_sub_vb_into_vc<const CHUNK: usize, const VBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &[O],
        c: &mut [O],
    );

    // vec(b) <- vec(a) - vec(b).
    fn va_sub_vb_into_vb<const CHUNK: usize, const VBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &mut [O],
    );

    // vec(a) <- -vec(a).
    fn va_neg_into_va<const CHUNK: usize, const VARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &mut [O],
    );

    // vec(b) <- -vec(a).
    fn va_neg_into_vb<const CHUNK: usize, const VARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &mut [O],
    );

    // vec(b) <- vec(a) * 2^64.
    fn va_prepare_montgomery_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &mut [Montgomery<O>],
    );

    // vec(a) <- vec(a) * 2^64.
    fn va_prepare_montgomery_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &mut [Montgomery<O>],
    );

    // vec(b) <- vec(a) * 2^-64.
    fn va_from_montgomery_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<O>],
        b: &mut [O],
    );

    // vec(c) <- vec(a) * vec(b) * 2^-64.
    fn va_mul_vb_montgomery_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<O>],
        b: &[O],
        c: &mut [O],
    );

    // vec(b) <- vec(a) * vec(b) * 2^-64.
    fn va_mul_vb_montgomery_into_vb<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<O>],
        b: &mut [O],
    );

    // vec(c) <- vec(a) * vec(b) * 2^-64 + vec(c).
    fn va_mul_vb_montgomery_add_vc_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<O>],
        b: &[O],
        c: &mut [O],
    );

    // vec(c) <- vec(c) - vec(a) * vec(b) * 2^-64.
    fn va_mul_vb_montgomery_sub_vc_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<O>],
        b: &[O],
        c: &mut [O],
    );

    // vec(c) <- vec(a) * scalar(b).
    fn va_mul_sb_barrett_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &Barrett<O>,
        c: &mut [O],
    );

    // vec(a) <- vec(a) * scalar(b).
    fn va_mul_sb_barrett_into_va<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        b: &Barrett<O>,
        a: &mut [O],
    );

    // vec(c) <- vec(a) * vec(b) by Barrett reduction of the full products.
    fn va_mul_vb_into_vc<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        b: &[O],
        c: &mut [O],
    );

    // vec(d) <- (vec(a) + VBRANGE * q - vec(b)) * scalar(c).
    fn va_sub_vb_mul_sc_barrett_into_vd<
        const CHUNK: usize,
        const VBRANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        a: &[O],
        b: &[O],
        c: &Barrett<O>,
        d: &mut [O],
    );

    // vec(b) <- (vec(a) + VBRANGE * q - vec(b)) * scalar(c).
    fn va_sub_vb_mul_sc_barrett_into_vb<
        const CHUNK: usize,
        const VBRANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        a: &[O],
        c: &Barrett<O>,
        b: &mut [O],
    );

    // vec(a) <- (vec(b) - vec(a) + scalar(c)) * scalar(d).
    fn vb_sub_va_add_sc_mul_sd_barrett_into_va<
        const CHUNK: usize,
        const VARANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        b: &[O],
        c: &O,
        d: &Barrett<O>,
        a: &mut [O],
    );

    // vec(c) <- i-th unsigned digit base 2^{sb} of vec(a).
    fn va_ith_digit_unsigned_base_sb_into_vc<const CHUNK: usize>(
        &self,
        i: usize,
        a: &[O],
        sb: &usize,
        c: &mut [O],
    );
}
