pub mod impl_u64;

use crate::dft::ntt::Table;
use crate::modulus::prime::Prime;
use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use crate::GALOISGENERATOR;
use std::sync::Arc;

/// Ring binds a single prime modulus to the degree-n negacyclic
/// polynomial ring Z_q[X]/(X^n + 1) and its NTT tables.
pub struct Ring<O> {
    pub n: usize,
    pub modulus: Prime<O>,
    /// Order of the cyclotomic group, i.e. 2n.
    pub nth_root: usize,
    pub ntt: Table<O>,
}

impl<O> Ring<O> {
    #[inline(always)]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn log_n(&self) -> usize {
        self.n.log2()
    }

    #[inline(always)]
    pub fn nth_root(&self) -> usize {
        self.nth_root
    }

    /// Returns GALOISGENERATOR^gen_exp * (-1)^negate mod nth_root.
    pub fn galois_element(&self, gen_exp: usize, negate: bool) -> usize {
        let mask: usize = self.nth_root - 1;
        let mut gal_el: usize = 1;
        let mut gen_pow: usize = GALOISGENERATOR as usize;
        let mut e: usize = gen_exp;
        while e > 0 {
            if e & 1 == 1 {
                gal_el = gal_el.wrapping_mul(gen_pow) & mask;
            }
            gen_pow = gen_pow.wrapping_mul(gen_pow) & mask;
            e >>= 1;
        }
        if negate {
            return self.nth_root - gal_el;
        }
        gal_el
    }
}

impl<O> Ring<O>
where
    O: Default + Clone,
{
    pub fn new_poly(&self) -> Poly<O> {
        Poly::<O>::new(self.n())
    }
}

/// RingRNS is an ordered chain of rings sharing the degree n; the
/// composite modulus is the product of the per-ring primes. Chains
/// compose and truncate by slicing the shared ring handles.
pub struct RingRNS<O>(pub Vec<Arc<Ring<O>>>);

impl<O> RingRNS<O> {
    #[inline(always)]
    pub fn n(&self) -> usize {
        self.0[0].n()
    }

    #[inline(always)]
    pub fn log_n(&self) -> usize {
        self.0[0].log_n()
    }

    #[inline(always)]
    pub fn nth_root(&self) -> usize {
        self.0[0].nth_root()
    }

    #[inline(always)]
    pub fn level(&self) -> usize {
        self.0.len() - 1
    }

    #[inline(always)]
    pub fn max_level(&self) -> usize {
        self.0.len() - 1
    }

    pub fn moduli(&self) -> Vec<O>
    where
        O: Copy,
    {
        self.0.iter().map(|r| r.modulus.q).collect()
    }

    /// View of the chain truncated to the given level.
    pub fn at_level(&self, level: usize) -> RingRNS<O> {
        assert!(
            level <= self.max_level(),
            "invalid level={}: exceeds max_level={}",
            level,
            self.max_level()
        );
        RingRNS(self.0[..level + 1].to_vec())
    }

    /// Concatenation of two chains over the same degree; the CRT
    /// reconstruction of the merged chain is recomputed on demand.
    pub fn merged(&self, other: &RingRNS<O>) -> RingRNS<O> {
        assert!(
            self.n() == other.n(),
            "invalid merge: n={} != other.n()={}",
            self.n(),
            other.n()
        );
        let mut rings: Vec<Arc<Ring<O>>> = self.0.clone();
        rings.extend(other.0.iter().cloned());
        RingRNS(rings)
    }

    pub fn galois_element(&self, gen_exp: usize, negate: bool) -> usize {
        self.0[0].galois_element(gen_exp, negate)
    }
}

impl<O> RingRNS<O>
where
    O: Default + Clone,
{
    pub fn new_polyrns(&self) -> PolyRNS<O> {
        PolyRNS::<O>::new(self.n(), self.level())
    }

    pub fn new_poly(&self) -> Poly<O> {
        Poly::<O>::new(self.n())
    }
}

impl<O> Clone for RingRNS<O> {
    fn clone(&self) -> Self {
        RingRNS(self.0.clone())
    }
}
