use crate::context::Context;
use crate::ciphertext::Ciphertext;
use crate::keys::{PublicKey, SecretKey};
use crate::plaintext::Plaintext;
use math::modulus::barrett::Barrett;
use math::modulus::ONCE;
use math::poly::PolyRNS;
use math::ring::impl_u64::sampling::{KYSampler, TernarySampler};
use math::ring::RingRNS;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use sampling::source::Source;
use std::sync::Arc;

/// Encrypts plaintexts under a public or a secret key. The public-key
/// path works over the extended basis QP and divides the noise by P
/// with rounding; the fast path stays over Q at the cost of one
/// modulus level of extra noise in the fresh ciphertext.
pub struct Encryptor {
    context: Arc<Context>,
    pk: Option<Arc<PublicKey>>,
    sk: Option<Arc<SecretKey>>,
    source: Source,
    ternary_sampler: TernarySampler,
    gaussian_sampler: KYSampler,
    /// P mod q_i, prepared per q_i, for the message lift to QP.
    p_mod_qi: Vec<Barrett<u64>>,
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
        let p_big: BigUint = context.ring_p().modulus().to_biguint().unwrap();
        let p_mod_qi: Vec<Barrett<u64>> = context
            .ring_q()
            .0
            .iter()
            .map(|r| r.modulus.barrett.prepare((&p_big % r.modulus.q).to_u64().unwrap()))
            .collect();
        let polypool: [PolyRNS<u64>; 3] =
            std::array::from_fn(|_| context.ring_qp().new_polyrns());
        Encryptor {
            context,
            pk,
            sk,
            source: Source::new(sampling::source::new_seed()),
            ternary_sampler: TernarySampler::new(1.0 / 3.0),
            gaussian_sampler: KYSampler::new(sigma, (6.0 * sigma).ceil() as usize),
            p_mod_qi,
            polypool,
        }
    }

    /// Public-key encryption over QP: computes (pk0*u + e0 + P*m,
    /// pk1*u + e1) and divides by P with rounding, cancelling one
    /// modulus level of noise.
    pub fn encrypt(&mut self, plaintext: &Plaintext, ct_out: &mut Ciphertext) {
        let context: Arc<Context> = self.context.clone();
        let ring_qp: &RingRNS<u64> = context.ring_qp();
        let ring_q: &RingRNS<u64> = context.ring_q();
        let levels_q: usize = ring_q.level() + 1;
        let levels_p: usize = context.ring_p().level() + 1;
        let pk: Arc<PublicKey> = self.pk.clone().expect("encryptor holds no public key");

        let [p0, p1, p2] = &mut self.polypool;

        // u, ternary, in the evaluation and Montgomery domains.
        self.ternary_sampler.fill(ring_qp, &mut self.source, p2);
        ring_qp.ntt_inplace::<false>(p2);
        ring_qp.a_prepare_montgomery_into_a::<ONCE>(p2);

        ring_qp.a_mul_b_montgomery_into_c::<ONCE>(p2, &pk.pk.0, p0);
        ring_qp.a_mul_b_montgomery_into_c::<ONCE>(p2, &pk.pk.1, p1);

        ring_qp.intt_inplace::<false>(p0);
        ring_qp.intt_inplace::<false>(p1);

        // Fresh noise on both components.
        self.gaussian_sampler.fill(ring_qp, &mut self.source, p2);
        ring_qp.a_add_b_into_b::<ONCE>(p2, p0);
        self.gaussian_sampler.fill(ring_qp, &mut self.source, p2);
        ring_qp.a_add_b_into_b::<ONCE>(p2, p1);

        // P * m lives on the Q rows only: P = 0 mod p_j.
        for (i, r) in ring_q.0.iter().enumerate() {
            r.a_mul_b_scalar_barrett_into_c::<ONCE>(
                plaintext.value().at(i),
                &self.p_mod_qi[i],
                p2.at_mut(i),
            );
            r.a_add_b_into_b::<ONCE>(p2.at(i), p0.at_mut(i));
        }

        // Rounded division by P, back to the basis Q.
        for k in 0..levels_p {
            let ring_view: RingRNS<u64> = ring_qp.at_level(levels_q + levels_p - 1 - k);
            ring_view.div_by_last_modulus_inplace::<true, false>(p2, p0);
            ring_view.div_by_last_modulus_inplace::<true, false>(p2, p1);
        }

        for i in 0..levels_q {
            ct_out.0.value[0].at_mut(i).0.copy_from_slice(&p0.at(i).0);
            ct_out.0.value[1].at_mut(i).0.copy_from_slice(&p1.at(i).0);
        }
        ct_out.0.is_ntt = false;
    }

    /// Public-key encryption over Q only, skipping the P lift: one
    /// modulus level of extra fresh noise, no basis division.
    pub fn encrypt_fast(&mut self, plaintext: &Plaintext, ct_out: &mut Ciphertext) {
        let context: Arc<Context> = self.context.clone();
        let ring_q: &RingRNS<u64> = context.ring_q();
        let pk: Arc<PublicKey> = self.pk.clone().expect("encryptor holds no public key");

        let [p0, p1, p2] = &mut self.polypool;

        self.ternary_sampler.fill(ring_q, &mut self.source, p2);
        ring_q.ntt_inplace::<false>(p2);
        ring_q.a_prepare_montgomery_into_a::<ONCE>(p2);

        ring_q.a_mul_b_montgomery_into_c::<ONCE>(p2, &pk.pk.0, p0);
        ring_q.a_mul_b_montgomery_into_c::<ONCE>(p2, &pk.pk.1, p1);

        ring_q.intt_inplace::<false>(p0);
        ring_q.intt_inplace::<false>(p1);

        self.gaussian_sampler.fill(ring_q, &mut self.source, p2);
        ring_q.a_add_b_into_b::<ONCE>(p2, p0);
        self.gaussian_sampler.fill(ring_q, &mut self.source, p2);
        ring_q.a_add_b_into_b::<ONCE>(p2, p1);

        ring_q.a_add_b_into_b::<ONCE>(plaintext.value(), p0);

        ring_q.copy(p0, &mut ct_out.0.value[0]);
        ring_q.copy(p1, &mut ct_out.0.value[1]);
        ct_out.0.is_ntt = false;
    }

    /// Secret-key encryption with a fresh uniform mask:
    /// (-(a*s) + e + m, a).
    pub fn encrypt_from_sk(&mut self, plaintext: &Plaintext, ct_out: &mut Ciphertext) {
        let context: Arc<Context> = self.context.clone();
        let ring_q: &RingRNS<u64> = context.ring_q();
        let sk: Arc<SecretKey> = self.sk.clone().expect("encryptor holds no secret key");

        let [p0, p1, p2] = &mut self.polypool;

        // a, uniform in the evaluation domain.
        ring_q.fill_uniform(&mut self.source, p1);

        ring_q.a_mul_b_montgomery_into_c::<ONCE>(&sk.sk, p1, p0);
        ring_q.a_neg_into_a::<1, ONCE>(p0);

        ring_q.intt_inplace::<false>(p0);
        ring_q.intt_inplace::<false>(p1);

        self.gaussian_sampler.fill(ring_q, &mut self.source, p2);
        ring_q.a_add_b_into_b::<ONCE>(p2, p0);

        ring_q.a_add_b_into_b::<ONCE>(plaintext.value(), p0);

        ring_q.copy(p0, &mut ct_out.0.value[0]);
        ring_q.copy(p1, &mut ct_out.0.value[1]);
        ct_out.0.is_ntt = false;
    }
}
