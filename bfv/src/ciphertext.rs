use crate::context::Context;
use crate::elem::{Element, Operand};
use sampling::source::Source;

/// Ciphertext of arbitrary degree over the chain Q, kept in the
/// coefficient domain outside of multiplications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext(pub Element);

impl Ciphertext {
    pub fn new(context: &Context, degree: usize) -> Ciphertext {
        assert!(degree >= 1, "invalid degree=0: ciphertexts have degree >= 1");
        Ciphertext(Element::new(context, degree))
    }

    /// Ciphertext with uniform polynomials, used by tests and as a
    /// common reference string.
    pub fn new_random(context: &Context, degree: usize, source: &mut Source) -> Ciphertext {
        let mut ct: Ciphertext = Ciphertext::new(context, degree);
        for poly in ct.0.value.iter_mut() {
            context.ring_q().fill_uniform(source, poly);
        }
        ct
    }

    #[inline(always)]
    pub fn is_ntt(&self) -> bool {
        self.0.is_ntt
    }
}

impl Operand for Ciphertext {
    fn element(&self) -> &Element {
        &self.0
    }
}
