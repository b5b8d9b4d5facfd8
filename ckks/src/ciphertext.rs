use crate::context::Context;
use crate::elem::{Element, Operand};

/// Ciphertext over the first level+1 moduli of the chain, kept in
/// the evaluation domain during the whole computation.
#[derive(Clone, Debug, PartialEq)]
pub struct Ciphertext(pub Element);

impl Ciphertext {
    pub fn new(context: &Context, degree: usize, level: usize, scale: usize) -> Ciphertext {
        assert!(degree >= 1, "invalid degree=0: ciphertexts have degree >= 1");
        Ciphertext(Element::new(context, degree, level, scale))
    }

    #[inline(always)]
    pub fn is_ntt(&self) -> bool {
        self.0.is_ntt
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

impl Operand for Ciphertext {
    fn element(&self) -> &Element {
        &self.0
    }
}
