use crate::context::Context;
use math::poly::PolyRNS;
use math::ring::RingRNS;
use num_bigint::BigInt;

/// Element is the common representation of ciphertexts and
/// plaintexts: a sequence of RNS polynomials whose number of live
/// rows is the level plus one, a scale in log2 units, the running
/// product of the live moduli and the evaluation-domain flag (kept
/// true during evaluation by convention).
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub value: Vec<PolyRNS<u64>>,
    pub scale: usize,
    pub current_modulus: BigInt,
    pub is_ntt: bool,
}

impl Element {
    pub fn new(context: &Context, degree: usize, level: usize, scale: usize) -> Element {
        let ring: RingRNS<u64> = context.ring_q().at_level(level);
        Element {
            value: (0..degree + 1).map(|_| ring.new_polyrns()).collect(),
            scale,
            current_modulus: ring.modulus(),
            is_ntt: true,
        }
    }

    #[inline(always)]
    pub fn degree(&self) -> usize {
        self.value.len() - 1
    }

    #[inline(always)]
    pub fn level(&self) -> usize {
        self.value[0].level()
    }

    /// Grows or truncates the number of polynomials at the current
    /// level.
    pub fn resize(&mut self, context: &Context, degree: usize) {
        let level: usize = self.level();
        while self.degree() > degree {
            self.value.pop();
        }
        while self.degree() < degree {
            self.value
                .push(context.ring_q().at_level(level).new_polyrns());
        }
    }

    /// Truncates the live rows down to the given level, updating the
    /// modulus bookkeeping.
    pub fn drop_to_level(&mut self, context: &Context, level: usize) {
        debug_assert!(level <= self.level());
        for i in level..self.level() {
            self.current_modulus /= BigInt::from(context.ring_q().0[i + 1].modulus.q);
        }
        for poly in self.value.iter_mut() {
            poly.drop_level(level);
        }
    }

    pub fn copy_from(&mut self, other: &Element) {
        debug_assert!(self.degree() >= other.degree(), "receiver degree too small");
        debug_assert!(self.level() == other.level(), "level mismatch");
        for (a, b) in self.value.iter_mut().zip(other.value.iter()) {
            a.copy_from(b);
        }
        self.scale = other.scale;
        self.current_modulus = other.current_modulus.clone();
        self.is_ntt = other.is_ntt;
    }

    pub fn zero(&mut self) {
        self.value.iter_mut().for_each(|p| p.zero());
    }
}

/// Common interface of the evaluator operands; ciphertexts have
/// degree >= 1, plaintexts degree 0.
pub trait Operand {
    fn element(&self) -> &Element;

    fn degree(&self) -> usize {
        self.element().degree()
    }

    fn level(&self) -> usize {
        self.element().level()
    }

    fn scale(&self) -> usize {
        self.element().scale
    }
}
