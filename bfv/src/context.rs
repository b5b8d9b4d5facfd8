use crate::error::Error;
use crate::parameters::Parameters;
use math::modulus::montgomery::Montgomery;
use math::modulus::prime::NTTFriendlyPrimesGenerator;
use math::ring::RingRNS;
use math::scalar::ScalarRNS;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;

/// Context holds the ring chains Q, P and QP, the plaintext-modulus
/// ring used by the slot encoder, the lift Q/t and the Galois
/// elements of the slot rotations. Immutable after construction.
pub struct Context {
    params: Parameters,
    n: usize,
    t: u64,
    ring_q: RingRNS<u64>,
    ring_p: RingRNS<u64>,
    ring_qp: RingRNS<u64>,
    ring_t: Option<RingRNS<u64>>,
    /// floor(Q/t) mod q_i, in the Montgomery domain.
    delta_mont: ScalarRNS<Montgomery<u64>>,
    gal_el_rot_col_left: Vec<usize>,
    gal_el_rot_col_right: Vec<usize>,
    gal_el_rot_row: usize,
}

/// Draws pairwise-distinct NTT-friendly primes for the requested bit
/// sizes, walking downward from each size so that every prime stays
/// below its nominal 2^size.
pub(crate) fn gen_moduli(sizes: &[u8], nth_root: u64) -> Vec<u64> {
    let mut generators: BTreeMap<u8, NTTFriendlyPrimesGenerator<u64>> = BTreeMap::new();
    sizes
        .iter()
        .map(|&size| {
            generators
                .entry(size)
                .or_insert_with(|| NTTFriendlyPrimesGenerator::<u64>::new(size as usize, nth_root))
                .next_downstream_prime()
        })
        .collect()
}

impl Context {
    pub fn new(params: &Parameters) -> Result<Context, Error> {
        params.validate()?;

        let n: usize = params.n();
        let nth_root: u64 = (n as u64) << 1;

        let mut sizes: Vec<u8> = params.log_qi.clone();
        sizes.extend(params.log_pi.iter());
        let moduli: Vec<u64> = gen_moduli(&sizes, nth_root);
        let (moduli_q, moduli_p) = moduli.split_at(params.log_qi.len());

        let ring_q: RingRNS<u64> = RingRNS::<u64>::new(n, moduli_q.to_vec());
        let ring_p: RingRNS<u64> = RingRNS::<u64>::new(n, moduli_p.to_vec());
        let ring_qp: RingRNS<u64> = ring_q.merged(&ring_p);

        // The slot encoder needs t prime with t == 1 mod 2n.
        let ring_t: Option<RingRNS<u64>> =
            if math::modulus::impl_u64::prime::is_prime(params.t) && params.t % nth_root == 1 {
                Some(RingRNS::<u64>::new(n, vec![params.t]))
            } else {
                None
            };

        let q_big: BigUint = ring_q.modulus().to_biguint().unwrap();
        let delta_big: BigUint = &q_big / params.t;
        let delta_mont: ScalarRNS<Montgomery<u64>> = ScalarRNS(
            ring_q
                .0
                .iter()
                .map(|r| r.modulus.mform((&delta_big % r.modulus.q).to_u64().unwrap()))
                .collect(),
        );

        // Galois elements of the column rotations: powers of the
        // generator (left) and of its inverse (right) mod 2n.
        let mask: usize = (nth_root as usize) - 1;
        let gen: usize = math::GALOISGENERATOR as usize;
        // 5 has order 2n/4 mod 2n.
        let gen_inv: usize = mod_pow_2n(gen, (nth_root as usize >> 2) - 1, mask);

        let mut gal_el_rot_col_left: Vec<usize> = Vec::with_capacity(n >> 1);
        let mut gal_el_rot_col_right: Vec<usize> = Vec::with_capacity(n >> 1);
        let (mut left, mut right): (usize, usize) = (1, 1);
        for _ in 0..n >> 1 {
            gal_el_rot_col_left.push(left);
            gal_el_rot_col_right.push(right);
            left = left.wrapping_mul(gen) & mask;
            right = right.wrapping_mul(gen_inv) & mask;
        }

        Ok(Context {
            params: params.clone(),
            n,
            t: params.t,
            ring_q,
            ring_p,
            ring_qp,
            ring_t,
            delta_mont,
            gal_el_rot_col_left,
            gal_el_rot_col_right,
            gal_el_rot_row: (nth_root as usize) - 1,
        })
    }

    #[inline(always)]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn t(&self) -> u64 {
        self.t
    }

    #[inline(always)]
    pub fn sigma(&self) -> f64 {
        self.params.sigma
    }

    #[inline(always)]
    pub fn ring_q(&self) -> &RingRNS<u64> {
        &self.ring_q
    }

    #[inline(always)]
    pub fn ring_p(&self) -> &RingRNS<u64> {
        &self.ring_p
    }

    #[inline(always)]
    pub fn ring_qp(&self) -> &RingRNS<u64> {
        &self.ring_qp
    }

    pub fn ring_t(&self) -> Result<&RingRNS<u64>, Error> {
        self.ring_t.as_ref().ok_or(Error::PlaintextNTT)
    }

    #[inline(always)]
    pub fn delta_mont(&self) -> &ScalarRNS<Montgomery<u64>> {
        &self.delta_mont
    }

    #[inline(always)]
    pub fn gal_el_rot_col_left(&self) -> &[usize] {
        &self.gal_el_rot_col_left
    }

    #[inline(always)]
    pub fn gal_el_rot_col_right(&self) -> &[usize] {
        &self.gal_el_rot_col_right
    }

    #[inline(always)]
    pub fn gal_el_rot_row(&self) -> usize {
        self.gal_el_rot_row
    }
}

/// x^e mod 2n for the power-of-two mask 2n-1.
fn mod_pow_2n(x: usize, e: usize, mask: usize) -> usize {
    let mut acc: usize = 1;
    let mut base: usize = x & mask;
    let mut e: usize = e;
    while e > 0 {
        if e & 1 == 1 {
            acc = acc.wrapping_mul(base) & mask;
        }
        base = base.wrapping_mul(base) & mask;
        e >>= 1;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::default_parameters;

    #[test]
    fn test_context_construction() {
        let params: Parameters = default_parameters()[0].clone();
        let context: Context = Context::new(&params).unwrap();
        assert_eq!(context.n(), 1 << 12);
        assert_eq!(context.ring_q().level(), 1);
        assert_eq!(context.ring_qp().level(), 3);
        assert!(context.ring_t().is_ok());

        // The generator and its inverse cancel.
        let mask: usize = (context.n() << 1) - 1;
        let g: usize = context.gal_el_rot_col_left()[1];
        let g_inv: usize = context.gal_el_rot_col_right()[1];
        assert_eq!(g.wrapping_mul(g_inv) & mask, 1);
    }
}
