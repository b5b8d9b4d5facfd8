use crate::modulus::barrett::BarrettPrecomp;

/// Montgomery is a generic marker for an element in the Montgomery
/// domain, i.e. storing x * 2^64 mod q.
pub type Montgomery<O> = O;

/// MontgomeryPrecomp stores the precomputations for REDC-based
/// multiplication: -q^-1 mod 2^64 and 2^128 mod q (to map into the
/// Montgomery domain with a single multiplication).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MontgomeryPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub q_inv_neg: O,
    pub r_square: O,
    pub barrett: BarrettPrecomp<O>,
    pub one: Montgomery<O>,
    pub minus_one: Montgomery<O>,
}
