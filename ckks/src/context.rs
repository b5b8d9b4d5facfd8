use crate::error::Error;
use crate::parameters::Parameters;
use math::modulus::prime::NTTFriendlyPrimesGenerator;
use math::ring::RingRNS;
use std::collections::BTreeMap;

/// Context holds the ring chain Q, the per-level scale chain and the
/// Galois elements of the slot rotations. Immutable after
/// construction.
pub struct Context {
    params: Parameters,
    n: usize,
    ring_q: RingRNS<u64>,
    /// Nominal log2 of each modulus, consumed by the rescaling.
    scale_chain: Vec<usize>,
    gal_el_rot_col_left: Vec<usize>,
    gal_el_rot_col_right: Vec<usize>,
    gal_el_conjugate: usize,
}

impl Context {
    pub fn new(params: &Parameters) -> Result<Context, Error> {
        params.validate()?;

        let n: usize = params.n();
        let nth_root: u64 = (n as u64) << 1;

        // Moduli are drawn alternating around 2^size so that the
        // scale drift of each rescaling stays negligible.
        let mut generators: BTreeMap<u8, NTTFriendlyPrimesGenerator<u64>> = BTreeMap::new();
        let moduli: Vec<u64> = params
            .log_qi
            .iter()
            .map(|&size| {
                generators
                    .entry(size)
                    .or_insert_with(|| {
                        NTTFriendlyPrimesGenerator::<u64>::new(size as usize, nth_root)
                    })
                    .next_alternating_primes(1)[0]
            })
            .collect();

        let ring_q: RingRNS<u64> = RingRNS::<u64>::new(n, moduli);

        let mask: usize = (nth_root as usize) - 1;
        let gen: usize = math::GALOISGENERATOR as usize;
        let gen_inv: usize = mod_pow_2n(gen, (nth_root as usize >> 2) - 1, mask);

        let slots: usize = n >> 1;
        let mut gal_el_rot_col_left: Vec<usize> = Vec::with_capacity(slots);
        let mut gal_el_rot_col_right: Vec<usize> = Vec::with_capacity(slots);
        let (mut left, mut right): (usize, usize) = (1, 1);
        for _ in 0..slots {
            gal_el_rot_col_left.push(left);
            gal_el_rot_col_right.push(right);
            left = left.wrapping_mul(gen) & mask;
            right = right.wrapping_mul(gen_inv) & mask;
        }

        Ok(Context {
            params: params.clone(),
            n,
            ring_q,
            scale_chain: params.log_qi.iter().map(|&s| s as usize).collect(),
            gal_el_rot_col_left,
            gal_el_rot_col_right,
            gal_el_conjugate: (nth_root as usize) - 1,
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
    pub fn slots(&self) -> usize {
        self.n >> 1
    }

    #[inline(always)]
    pub fn levels(&self) -> usize {
        self.ring_q.max_level() + 1
    }

    #[inline(always)]
    pub fn max_level(&self) -> usize {
        self.ring_q.max_level()
    }

    #[inline(always)]
    pub fn log_scale(&self) -> usize {
        self.params.log_scale
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
    pub fn scale_chain(&self) -> &[usize] {
        &self.scale_chain
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
    pub fn gal_el_conjugate(&self) -> usize {
        self.gal_el_conjugate
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
        assert_eq!(context.n(), 1 << 13);
        assert_eq!(context.levels(), 5);
        assert_eq!(context.gal_el_conjugate(), (1 << 14) - 1);
    }
}
