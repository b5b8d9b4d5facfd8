use crate::context::Context;
use crate::keys::{EvaluationKey, PublicKey, RotationKeys, SecretKey, SwitchingKey};
use math::modulus::{WordOps, ONCE};
use math::poly::PolyRNS;
use math::ring::impl_u64::sampling::{KYSampler, TernarySampler};
use math::ring::RingRNS;
use sampling::source::Source;
use std::sync::Arc;
use tracing::instrument;

/// Generates all the key material of the scheme from a private
/// randomness source. Keys live at the top of the modulus chain;
/// evaluation at lower levels consumes their prefix rows.
pub struct KeyGenerator {
    context: Arc<Context>,
    source: Source,
    ternary_sampler: TernarySampler,
    gaussian_sampler: KYSampler,
    polypool: PolyRNS<u64>,
}

impl KeyGenerator {
    pub fn new(context: Arc<Context>) -> KeyGenerator {
        Self::new_from_seed(context, sampling::source::new_seed())
    }

    pub fn new_from_seed(context: Arc<Context>, seed: [u8; 32]) -> KeyGenerator {
        let sigma: f64 = context.sigma();
        let polypool: PolyRNS<u64> = context.ring_q().new_polyrns();
        KeyGenerator {
            context,
            source: Source::new(seed),
            ternary_sampler: TernarySampler::new(1.0 / 3.0),
            gaussian_sampler: KYSampler::new(sigma, (6.0 * sigma).ceil() as usize),
            polypool,
        }
    }

    /// Samples a ternary secret key, stored in the evaluation and
    /// Montgomery domains.
    pub fn gen_secret_key(&mut self) -> SecretKey {
        let ring_q: &RingRNS<u64> = self.context.ring_q();
        let mut sk: PolyRNS<u64> = ring_q.new_polyrns();
        self.ternary_sampler.fill(ring_q, &mut self.source, &mut sk);
        ring_q.ntt_inplace::<false>(&mut sk);
        ring_q.a_prepare_montgomery_into_a::<ONCE>(&mut sk);
        SecretKey { sk }
    }

    /// Public key (-(a*s) + e, a).
    pub fn gen_public_key(&mut self, sk: &SecretKey) -> PublicKey {
        let ring_q: &RingRNS<u64> = self.context.ring_q();

        let mut a: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.fill_uniform(&mut self.source, &mut a);

        let mut b: PolyRNS<u64> = ring_q.new_polyrns();
        self.gaussian_sampler
            .fill_ntt(ring_q, &mut self.source, &mut b);
        ring_q.a_mul_b_montgomery_sub_c_into_c::<ONCE>(&sk.sk, &a, &mut b);

        PublicKey { pk: (b, a) }
    }

    pub fn gen_key_pair(&mut self) -> (SecretKey, PublicKey) {
        let sk: SecretKey = self.gen_secret_key();
        let pk: PublicKey = self.gen_public_key(&sk);
        (sk, pk)
    }

    /// Switching key re-encrypting sk_in under sk_out.
    #[instrument(skip_all)]
    pub fn gen_switching_key(&mut self, sk_in: &SecretKey, sk_out: &SecretKey) -> SwitchingKey {
        let sk_in_clone: PolyRNS<u64> = sk_in.sk.clone();
        self.gen_switching_key_internal(&sk_in_clone, sk_out)
    }

    /// Relinearization key carrying s^2.
    #[instrument(skip_all)]
    pub fn gen_relin_key(&mut self, sk: &SecretKey) -> EvaluationKey {
        let ring_q: RingRNS<u64> = self.context.ring_q().clone();
        let mut sk_square: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.a_mul_b_montgomery_into_c::<ONCE>(&sk.sk, &sk.sk, &mut sk_square);
        EvaluationKey {
            key: self.gen_switching_key_internal(&sk_square, sk),
        }
    }

    /// Column-rotation key for a left rotation by k slots.
    pub fn gen_rot_col_left(&mut self, rot_keys: &mut RotationKeys, sk: &SecretKey, k: usize) {
        let k: usize = k & ((self.context.slots()) - 1);
        let gal_el: usize = self.context.gal_el_rot_col_left()[k];
        let key: SwitchingKey = self.gen_rotation_key(sk, gal_el);
        rot_keys.rot_col_left.insert(k, key);
    }

    /// Column-rotation key for a right rotation by k slots.
    pub fn gen_rot_col_right(&mut self, rot_keys: &mut RotationKeys, sk: &SecretKey, k: usize) {
        let k: usize = k & ((self.context.slots()) - 1);
        let gal_el: usize = self.context.gal_el_rot_col_right()[k];
        let key: SwitchingKey = self.gen_rotation_key(sk, gal_el);
        rot_keys.rot_col_right.insert(k, key);
    }

    /// Conjugation key.
    pub fn gen_conjugate_key(&mut self, rot_keys: &mut RotationKeys, sk: &SecretKey) {
        let key: SwitchingKey = self.gen_rotation_key(sk, self.context.gal_el_conjugate());
        rot_keys.conjugate = Some(key);
    }

    /// All power-of-two column rotations in both directions, plus the
    /// conjugation if requested.
    #[instrument(skip_all)]
    pub fn gen_rot_keys_pow2(&mut self, sk: &SecretKey, include_conjugate: bool) -> RotationKeys {
        let mut rot_keys: RotationKeys = RotationKeys::new();
        let mut k: usize = 1;
        while k < self.context.slots() {
            self.gen_rot_col_left(&mut rot_keys, sk, k);
            self.gen_rot_col_right(&mut rot_keys, sk, k);
            k <<= 1;
        }
        if include_conjugate {
            self.gen_conjugate_key(&mut rot_keys, sk);
        }
        rot_keys
    }

    fn gen_rotation_key(&mut self, sk: &SecretKey, gal_el: usize) -> SwitchingKey {
        let ring_q: RingRNS<u64> = self.context.ring_q().clone();
        let mut sk_rot: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.a_apply_automorphism_ntt_into_b(&sk.sk, gal_el, &mut sk_rot);
        self.gen_switching_key_internal(&sk_rot, sk)
    }

    /// Core switching-key generation: for each modulus index i and
    /// digit j, (-(a*s) + e + w^j * source * [row = i], a), all halves
    /// in the evaluation and Montgomery domains.
    fn gen_switching_key_internal(
        &mut self,
        sk_source: &PolyRNS<u64>,
        sk_out: &SecretKey,
    ) -> SwitchingKey {
        let ring_q: RingRNS<u64> = self.context.ring_q().clone();
        let log_base: usize = self.context.params().log_base;

        let mut key: Vec<Vec<(PolyRNS<u64>, PolyRNS<u64>)>> = Vec::with_capacity(ring_q.level() + 1);

        for (i, r) in ring_q.0.iter().enumerate() {
            let bit_log: usize = (r.modulus.q.log2() + log_base - 1) / log_base;
            let mut digits: Vec<(PolyRNS<u64>, PolyRNS<u64>)> = Vec::with_capacity(bit_log);

            for j in 0..bit_log {
                let mut a: PolyRNS<u64> = ring_q.new_polyrns();
                ring_q.fill_uniform(&mut self.source, &mut a);

                let mut b: PolyRNS<u64> = ring_q.new_polyrns();
                self.gaussian_sampler
                    .fill_ntt(&ring_q, &mut self.source, &mut b);
                ring_q.a_mul_b_montgomery_sub_c_into_c::<ONCE>(&sk_out.sk, &a, &mut b);

                ring_q.a_prepare_montgomery_into_a::<ONCE>(&mut b);
                ring_q.a_prepare_montgomery_into_a::<ONCE>(&mut a);

                let w_pow: u64 = r.modulus.pow(2, (j * log_base) as u64);
                let scratch = self.polypool.at_mut(0);
                r.a_mul_b_scalar_into_c::<ONCE>(sk_source.at(i), &w_pow, scratch);
                r.a_add_b_into_b::<ONCE>(scratch, b.at_mut(i));

                digits.push((b, a));
            }
            key.push(digits);
        }

        SwitchingKey { log_base, key }
    }
}
