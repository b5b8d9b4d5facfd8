use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::MontgomeryPrecomp;

/// Prime stores a prime-power modulus q = q_base^q_power along with
/// its fast-reduction precomputations and the factorization of
/// phi(q), from which primitive roots are derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prime<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub q_base: O,
    pub q_power: usize,
    /// Euler totient of q.
    pub phi: O,
    /// Distinct prime factors of phi.
    pub factors: Vec<O>,
    pub barrett: BarrettPrecomp<O>,
    pub montgomery: MontgomeryPrecomp<O>,
}

/// Walks candidates of the form 2^size +/- k * nth_root + 1, yielding
/// primes congruent to 1 mod nth_root (the NTT-friendliness condition).
pub struct NTTFriendlyPrimesGenerator<O> {
    pub size: usize,
    pub nth_root: O,
    pub next_prime: O,
    pub prev_prime: O,
}
