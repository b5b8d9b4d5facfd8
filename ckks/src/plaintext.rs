use crate::context::Context;
use crate::elem::{Element, Operand};
use math::poly::PolyRNS;

/// Plaintext: an element of degree 0 carrying the scaled message in
/// the evaluation domain.
#[derive(Clone, Debug, PartialEq)]
pub struct Plaintext(pub Element);

impl Plaintext {
    pub fn new(context: &Context, level: usize, scale: usize) -> Plaintext {
        Plaintext(Element::new(context, 0, level, scale))
    }

    #[inline(always)]
    pub fn value(&self) -> &PolyRNS<u64> {
        &self.0.value[0]
    }

    #[inline(always)]
    pub fn value_mut(&mut self) -> &mut PolyRNS<u64> {
        &mut self.0.value[0]
    }

    #[inline(always)]
    pub fn scale(&self) -> usize {
        self.0.scale
    }

    #[inline(always)]
    pub fn level(&self) -> usize {
        self.0.level()
    }
}

impl Operand for Plaintext {
    fn element(&self) -> &Element {
        &self.0
    }
}
