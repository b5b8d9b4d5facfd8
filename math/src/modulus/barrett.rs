/// Barrett is a value paired with its prepared 64-bit quotient
/// floor(value * 2^64 / q), enabling Shoup-style multiplication
/// by a constant without runtime division.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Barrett<O>(pub O, pub O);

impl<O> Barrett<O> {
    #[inline(always)]
    pub fn value(&self) -> &O {
        &self.0
    }

    #[inline(always)]
    pub fn quotient(&self) -> &O {
        &self.1
    }
}

/// BarrettPrecomp stores the two-word reciprocal floor(2^128 / q)
/// and the small multiples of q used by the lazy reductions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrettPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub lo: O,
    pub hi: O,
    pub one: Barrett<O>,
}

impl<O> BarrettPrecomp<O> {
    #[inline(always)]
    pub fn value_hi(&self) -> &O {
        &self.hi
    }

    #[inline(always)]
    pub fn value_lo(&self) -> &O {
        &self.lo
    }
}
