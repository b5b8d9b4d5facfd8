use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::keys::{PublicKey, SecretKey};
use crate::plaintext::Plaintext;
use math::modulus::ONCE;
use math::poly::PolyRNS;
use math::ring::impl_u64::sampling::{KYSampler, TernarySampler};
use math::ring::RingRNS;
use sampling::source::Source;
use std::sync::Arc;

/// Encrypts plaintexts under a public or a secret key; fresh
/// ciphertexts live at the plaintext's level, in the evaluation
/// domain.
pub struct Encryptor {
    context: Arc<Context>,
    pk: Option<Arc<PublicKey>>,
    sk: Option<Arc<SecretKey>>,
    source: Source,
    ternary_sampler: TernarySampler,
    gaussian_sampler: KYSampler,
    polypool: [PolyRNS<u64>; 3],
}

impl Encryptor {
    pub fn new_from_pk(context: Arc<Context>, pk: Arc<PublicKey>) -> Encryptor {
        Self::new_internal(context, Some(pk), None)
    }

    pub fn new_from_sk(context: Arc<Context>, sk: Arc<SecretKey>) -> Encryptor {
        Self::new_internal(context, None, Some(sk))
    }

    fn new_internal(
        context: Arc<Context>,
        pk: Option<Arc<PublicKey>>,
        sk: Option<Arc<SecretKey>>,
    ) -> Encryptor {
        let sigma: f64 = context.sigma();
        let polypool: [PolyRNS<u64>; 3] = std::array::from_fn(|_| context.ring_q().new_polyrns());
        Encryptor {
            context,
            pk,
            sk,
            source: Source::new(sampling::source::new_seed()),
            ternary_sampler: TernarySampler::new(1.0 / 3.0),
            gaussian_sampler: KYSampler::new(sigma, (6.0 * sigma).ceil() as usize),
            polypool,
        }
    }

    pub fn encrypt_new(&mut self, plaintext: &Plaintext) -> Ciphertext {
        let mut ct: Ciphertext =
            Ciphertext::new(&self.context, 1, plaintext.level(), plaintext.scale());
        self.encrypt(plaintext, &mut ct);
        ct
    }

    /// Public-key encryption: (pk0*u + e0 + m, pk1*u + e1), all in
    /// the evaluation domain.
    pub fn encrypt(&mut self, plaintext: &Plaintext, ct_out: &mut Ciphertext) {
        let context: Arc<Context> = self.context.clone();
        let ring: RingRNS<u64> = context.ring_q().at_level(plaintext.level());
        let pk: Arc<PublicKey> = self.pk.clone().expect("encryptor holds no public key");

        let [p0, p1, p2] = &mut self.polypool;

        self.ternary_sampler.fill(&ring, &mut self.source, p2);
        ring.ntt_inplace::<false>(p2);
        ring.a_prepare_montgomery_into_a::<ONCE>(p2);

        ring.a_mul_b_montgomery_into_c::<ONCE>(p2, &pk.pk.0, p0);
        ring.a_mul_b_montgomery_into_c::<ONCE>(p2, &pk.pk.1, p1);

        self.gaussian_sampler.fill_ntt(&ring, &mut self.source, p2);
        ring.a_add_b_into_b::<ONCE>(p2, p0);
        self.gaussian_sampler.fill_ntt(&ring, &mut self.source, p2);
        ring.a_add_b_into_b::<ONCE>(p2, p1);

        ring.a_add_b_into_b::<ONCE>(plaintext.value(), p0);

        ring.copy(p0, &mut ct_out.0.value[0]);
        ring.copy(p1, &mut ct_out.0.value[1]);
        ct_out.0.scale = plaintext.scale();
        ct_out.0.current_modulus = ring.modulus();
        ct_out.0.is_ntt = true;
    }

    /// Secret-key encryption with a fresh uniform mask:
    /// (-(a*s) + e + m, a).
    pub fn encrypt_from_sk(&mut self, plaintext: &Plaintext, ct_out: &mut Ciphertext) {
        let context: Arc<Context> = self.context.clone();
        let ring: RingRNS<u64> = context.ring_q().at_level(plaintext.level());
        let sk: Arc<SecretKey> = self.sk.clone().expect("encryptor holds no secret key");

        let [p0, p1, p2] = &mut self.polypool;

        ring.fill_uniform(&mut self.source, p1);

        ring.a_mul_b_montgomery_into_c::<ONCE>(&sk.sk, p1, p0);
        ring.a_neg_into_a::<1, ONCE>(p0);

        self.gaussian_sampler.fill_ntt(&ring, &mut self.source, p2);
        ring.a_add_b_into_b::<ONCE>(p2, p0);

        ring.a_add_b_into_b::<ONCE>(plaintext.value(), p0);

        ring.copy(p0, &mut ct_out.0.value[0]);
        ring.copy(p1, &mut ct_out.0.value[1]);
        ct_out.0.scale = plaintext.scale();
        ct_out.0.current_modulus = ring.modulus();
        ct_out.0.is_ntt = true;
    }
}
