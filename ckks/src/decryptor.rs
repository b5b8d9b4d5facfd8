use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::keys::SecretKey;
use crate::plaintext::Plaintext;
use math::modulus::ONCE;
use math::ring::RingRNS;
use std::sync::Arc;

/// Decrypts ciphertexts of arbitrary degree: evaluates the phase
/// c0 + c1*s + ... + cd*s^d at the ciphertext level; the encoding
/// layer inverts the canonical embedding.
pub struct Decryptor {
    context: Arc<Context>,
    sk: Arc<SecretKey>,
}

impl Decryptor {
    pub fn new(context: Arc<Context>, sk: Arc<SecretKey>) -> Decryptor {
        Decryptor { context, sk }
    }

    pub fn decrypt_new(&mut self, ciphertext: &Ciphertext) -> Plaintext {
        let mut plaintext: Plaintext =
            Plaintext::new(&self.context, ciphertext.level(), ciphertext.scale());
        self.decrypt(ciphertext, &mut plaintext);
        plaintext
    }

    /// Horner evaluation of the phase in the evaluation domain; the
    /// result stays in the evaluation domain.
    pub fn decrypt(&mut self, ciphertext: &Ciphertext, plaintext: &mut Plaintext) {
        let context: Arc<Context> = self.context.clone();
        let ring: RingRNS<u64> = context.ring_q().at_level(ciphertext.level());
        let degree: usize = ciphertext.0.degree();

        ring.copy(&ciphertext.0.value[degree], plaintext.value_mut());
        for i in (0..degree).rev() {
            ring.a_mul_b_montgomery_into_b::<ONCE>(&self.sk.sk, plaintext.value_mut());
            ring.a_add_b_into_b::<ONCE>(&ciphertext.0.value[i], plaintext.value_mut());
        }

        plaintext.0.scale = ciphertext.scale();
        plaintext.0.current_modulus = ring.modulus();
        plaintext.0.is_ntt = true;
    }
}
