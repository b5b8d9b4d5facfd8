use crate::context::Context;
use math::poly::PolyRNS;
use math::ring::RingRNS;

/// Element is the common representation of ciphertexts and
/// plaintexts: a sequence of RNS polynomials over Q and the advisory
/// evaluation-domain flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub value: Vec<PolyRNS<u64>>,
    pub is_ntt: bool,
}

impl Element {
    pub fn new(context: &Context, degree: usize) -> Element {
        Self::new_from_ring(context.ring_q(), degree)
    }

    pub fn new_from_ring(ring: &RingRNS<u64>, degree: usize) -> Element {
        Element {
            value: (0..degree + 1).map(|_| ring.new_polyrns()).collect(),
            is_ntt: false,
        }
    }

    #[inline(always)]
    pub fn degree(&self) -> usize {
        self.value.len() - 1
    }

    /// Grows or truncates the number of polynomials.
    pub fn resize(&mut self, ring: &RingRNS<u64>, degree: usize) {
        while self.degree() > degree {
            self.value.pop();
        }
        while self.degree() < degree {
            self.value.push(ring.new_polyrns());
        }
    }

    pub fn copy_from(&mut self, other: &Element) {
        debug_assert!(self.degree() >= other.degree(), "receiver degree too small");
        for (a, b) in self.value.iter_mut().zip(other.value.iter()) {
            a.copy_from(b);
        }
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
}
