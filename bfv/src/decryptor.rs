use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::keys::SecretKey;
use crate::plaintext::Plaintext;
use math::modulus::ONCE;
use math::poly::PolyRNS;
use math::ring::RingRNS;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::sync::Arc;

/// Decrypts ciphertexts of arbitrary degree: evaluates the phase
/// c0 + c1*s + ... + cd*s^d over Q, then scales by t/Q with rounding.
pub struct Decryptor {
    context: Arc<Context>,
    sk: Arc<SecretKey>,
    polypool: [PolyRNS<u64>; 2],
    coeffs_big: Vec<BigInt>,
}

impl Decryptor {
    pub fn new(context: Arc<Context>, sk: Arc<SecretKey>) -> Decryptor {
        let polypool: [PolyRNS<u64>; 2] = std::array::from_fn(|_| context.ring_q().new_polyrns());
        let n: usize = context.n();
        Decryptor {
            context,
            sk,
            polypool,
            coeffs_big: vec![BigInt::zero(); n],
        }
    }

    pub fn decrypt_new(&mut self, ciphertext: &Ciphertext) -> Plaintext {
        let mut plaintext: Plaintext = Plaintext::new(&self.context);
        self.decrypt(ciphertext, &mut plaintext);
        plaintext
    }

    pub fn decrypt(&mut self, ciphertext: &Ciphertext, plaintext: &mut Plaintext) {
        let context: Arc<Context> = self.context.clone();
        let ring_q: &RingRNS<u64> = context.ring_q();
        let degree: usize = ciphertext.0.degree();

        let [acc, tmp] = &mut self.polypool;

        // Horner evaluation of the phase in the NTT domain.
        ring_q.ntt::<false>(&ciphertext.0.value[degree], acc);
        for i in (0..degree).rev() {
            ring_q.a_mul_b_montgomery_into_b::<ONCE>(&self.sk.sk, acc);
            ring_q.ntt::<false>(&ciphertext.0.value[i], tmp);
            ring_q.a_add_b_into_b::<ONCE>(tmp, acc);
        }
        ring_q.intt_inplace::<false>(acc);

        // m = round(t * phase / Q) mod t.
        ring_q.to_bigint(acc, &mut self.coeffs_big);
        let q_big: BigInt = ring_q.modulus();
        let q_half: BigInt = &q_big >> 1;
        let t: u64 = context.t();
        let t_big: BigInt = BigInt::from(t);

        for (j, x) in self.coeffs_big.iter().enumerate() {
            let m: u64 = (((x * &t_big + &q_half) / &q_big) % &t_big).to_u64().unwrap();
            for i in 0..ring_q.level() + 1 {
                plaintext.value_mut().at_mut(i).0[j] = m;
            }
        }
        plaintext.0.is_ntt = false;
    }
}
