use crate::context::Context;
use crate::elem::{Element, Operand};
use math::poly::PolyRNS;

/// Plaintext: an element of degree 0. The encoder stores the
/// Q/t-lifted message, so that additions and multiplications with
/// ciphertexts need no further scaling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plaintext(pub Element);

impl Plaintext {
    pub fn new(context: &Context) -> Plaintext {
        Plaintext(Element::new(context, 0))
    }

    #[inline(always)]
    pub fn value(&self) -> &PolyRNS<u64> {
        &self.0.value[0]
    }

    #[inline(always)]
    pub fn value_mut(&mut self) -> &mut PolyRNS<u64> {
        &mut self.0.value[0]
    }
}

impl Operand for Plaintext {
    fn element(&self) -> &Element {
        &self.0
    }
}
