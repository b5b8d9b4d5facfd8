use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use sampling::source::Source;

const KY_PRECISION: usize = 56;

impl Ring<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut Poly<u64>) {
        let max: u64 = self.modulus.q;
        let mask: u64 = max.mask();
        a.0.iter_mut().for_each(|a| *a = source.next_u64n(max, mask));
    }
}

impl RingRNS<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, r)| r.fill_uniform(source, a.at_mut(i)));
    }
}

/// Branch-free lift of a magnitude/sign pair into [0, q):
/// sign = 1 selects q - v (for v != 0), sign = 0 selects v.
#[inline(always)]
fn lift_signed(v: u64, sign: u64, q: u64) -> u64 {
    let sign_mask: u64 = sign.wrapping_neg();
    let nonzero_mask: u64 = ((v | v.wrapping_neg()) >> 63).wrapping_neg();
    (v & !sign_mask) | ((q.wrapping_sub(v) & nonzero_mask) & sign_mask)
}

/// Walks a Knuth-Yao probability matrix, consuming one random bit per
/// step; returns the sampled row (the magnitude) and a sign bit.
fn ky_sampling(matrix: &[Vec<u8>], source: &mut Source) -> (u64, u64) {
    let rows: usize = matrix.len();
    let mut d: i64 = 0;
    let mut col: usize = 0;
    loop {
        d = (d << 1) + 1 - (source.next_bit() as i64);

        // Out of the matrix bounds: restart the walk.
        if d > rows as i64 - 1 {
            d = 0;
            col = 0;
            continue;
        }

        for row in (0..rows).rev() {
            d -= matrix[row][col] as i64;
            if d == -1 {
                return (row as u64, source.next_bit());
            }
        }

        col += 1;
    }
}

/// Discrete Gaussian sampler over the RNS chain, walking the
/// Knuth-Yao matrix of the fixed-precision binary expansion of the
/// half-Gaussian probabilities.
pub struct KYSampler {
    pub sigma: f64,
    pub bound: usize,
    matrix: Vec<Vec<u8>>,
}

fn gaussian(x: f64, sigma: f64) -> f64 {
    (1.0 / (sigma * (2.0 * std::f64::consts::PI).sqrt())) * (-(x * x) / (2.0 * sigma * sigma)).exp()
}

impl KYSampler {
    pub fn new(sigma: f64, bound: usize) -> KYSampler {
        let mut matrix: Vec<Vec<u8>> = Vec::with_capacity(bound);
        for i in 0..bound {
            let mut g: f64 = gaussian(i as f64, sigma);
            // The sign bit covers zero twice, so its mass is halved.
            if i == 0 {
                g *= (2.0f64).powi(KY_PRECISION as i32 - 1);
            } else {
                g *= (2.0f64).powi(KY_PRECISION as i32);
            }
            let x: u64 = g as u64;
            if x == 0 {
                break;
            }
            let mut row: Vec<u8> = vec![0u8; KY_PRECISION - 1];
            for (j, bit) in row.iter_mut().enumerate() {
                *bit = ((x >> (KY_PRECISION - j - 2)) & 1) as u8;
            }
            matrix.push(row);
        }
        KYSampler { sigma, bound, matrix }
    }

    /// Fills a with fresh Gaussian coefficients lifted mod each modulus.
    pub fn fill(&self, ring: &RingRNS<u64>, source: &mut Source, a: &mut PolyRNS<u64>) {
        let level: usize = ring.level();
        for j in 0..ring.n() {
            let (v, sign) = ky_sampling(&self.matrix, source);
            for (i, r) in ring.0[..level + 1].iter().enumerate() {
                a.at_mut(i).0[j] = lift_signed(v, sign, r.modulus.q);
            }
        }
    }

    /// Same as fill, followed by the forward NTT.
    pub fn fill_ntt(&self, ring: &RingRNS<u64>, source: &mut Source, a: &mut PolyRNS<u64>) {
        self.fill(ring, source, a);
        ring.ntt_inplace::<false>(a);
    }
}

/// Ternary sampler over {-1, 0, 1} with Pr[0] = p, parameterized by
/// the Knuth-Yao matrix of (p, 1-p), or by unbiased bit pairs when
/// p = 0.5.
pub struct TernarySampler {
    pub p: f64,
    matrix: Vec<Vec<u8>>,
}

fn ternary_matrix(p: f64) -> Vec<Vec<u8>> {
    let mut matrix: Vec<Vec<u8>> = Vec::with_capacity(2);
    for probability in [p, 1.0 - p] {
        let x: u64 = (probability * (2.0f64).powi(KY_PRECISION as i32)) as u64;
        let mut row: Vec<u8> = vec![0u8; KY_PRECISION - 1];
        for (j, bit) in row.iter_mut().enumerate() {
            *bit = ((x >> (KY_PRECISION - j - 1)) & 1) as u8;
        }
        matrix.push(row);
    }
    matrix
}

impl TernarySampler {
    pub fn new(p: f64) -> TernarySampler {
        assert!(p > 0.0 && p < 1.0, "invalid p={}: must be in (0, 1)", p);
        TernarySampler {
            p,
            matrix: ternary_matrix(p),
        }
    }

    /// Fills a with ternary coefficients lifted mod each modulus.
    pub fn fill(&self, ring: &RingRNS<u64>, source: &mut Source, a: &mut PolyRNS<u64>) {
        self.fill_internal::<false>(ring, source, a);
    }

    /// Fills a with ternary coefficients in the Montgomery domain.
    pub fn fill_montgomery(&self, ring: &RingRNS<u64>, source: &mut Source, a: &mut PolyRNS<u64>) {
        self.fill_internal::<true>(ring, source, a);
    }

    fn fill_internal<const MONTGOMERY: bool>(
        &self,
        ring: &RingRNS<u64>,
        source: &mut Source,
        a: &mut PolyRNS<u64>,
    ) {
        let level: usize = ring.level();

        // Per-modulus lookup of the three lifted values {0, 1, -1}.
        let table: Vec<[u64; 3]> = ring.0[..level + 1]
            .iter()
            .map(|r| {
                let q: u64 = r.modulus.q;
                if MONTGOMERY {
                    [0, r.modulus.montgomery.one(), r.modulus.montgomery.minus_one()]
                } else {
                    [0, 1, q - 1]
                }
            })
            .collect();

        if self.p == 0.5 {
            for j in 0..ring.n() {
                let coeff: u64 = source.next_bit();
                let sign: u64 = source.next_bit();
                let index: usize = ((coeff & (sign ^ 1)) | ((sign & coeff) << 1)) as usize;
                for i in 0..level + 1 {
                    a.at_mut(i).0[j] = table[i][index];
                }
            }
        } else {
            for j in 0..ring.n() {
                let (coeff, sign) = ky_sampling(&self.matrix, source);
                let index: usize = ((coeff & (sign ^ 1)) | ((sign & coeff) << 1)) as usize;
                for i in 0..level + 1 {
                    a.at_mut(i).0[j] = table[i][index];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_test_ring() -> RingRNS<u64> {
        RingRNS::<u64>::new(1 << 8, vec![0x7fffffd8001, 0x7fffffc8001])
    }

    #[test]
    fn test_uniform_in_range() {
        let ring: RingRNS<u64> = new_test_ring();
        let mut source: Source = Source::new([0u8; 32]);
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_uniform(&mut source, &mut a);
        for (i, r) in ring.0.iter().enumerate() {
            assert!(a.at(i).0.iter().all(|&x| x < r.modulus.q));
        }
    }

    #[test]
    fn test_gaussian_bounded_and_consistent() {
        let ring: RingRNS<u64> = new_test_ring();
        let sampler: KYSampler = KYSampler::new(3.2, 19);
        let mut source: Source = Source::new([1u8; 32]);
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        sampler.fill(&ring, &mut source, &mut a);

        for j in 0..ring.n() {
            let c0: i64 = ring.0[0].center(a.at(0).0[j]);
            let c1: i64 = ring.0[1].center(a.at(1).0[j]);
            assert_eq!(c0, c1, "rows disagree at coefficient {}", j);
            assert!(c0.abs() < 19, "coefficient {} exceeds the bound", c0);
        }
    }

    #[test]
    fn test_ternary_values() {
        let ring: RingRNS<u64> = new_test_ring();
        let sampler: TernarySampler = TernarySampler::new(1.0 / 3.0);
        let mut source: Source = Source::new([2u8; 32]);
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        sampler.fill(&ring, &mut source, &mut a);

        let mut seen: [bool; 3] = [false; 3];
        for j in 0..ring.n() {
            let c: i64 = ring.0[0].center(a.at(0).0[j]);
            assert!((-1..=1).contains(&c));
            seen[(c + 1) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
