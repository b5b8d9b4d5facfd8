use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};

impl Ring<u64> {
    /// Applies the automorphism X -> X^gal_el on a polynomial in the
    /// evaluation domain: the value at the root with odd exponent e
    /// moves to the slot holding exponent e * gal_el mod nth_root.
    /// gal_el must be odd.
    pub fn a_apply_automorphism_ntt_into_b(&self, a: &Poly<u64>, gal_el: usize, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(gal_el & 1 == 1, "invalid gal_el={}: not odd", gal_el);

        let n: usize = self.n();
        let log_n: u32 = n.log2() as u32;
        let mask: usize = self.nth_root - 1;

        for j in 0..n {
            let exponent: usize = (2 * j.reverse_bits_msb(log_n) + 1).wrapping_mul(gal_el) & mask;
            let index: usize = ((exponent - 1) >> 1).reverse_bits_msb(log_n);
            b.0[j] = a.0[index];
        }
    }

    /// Applies the automorphism X -> X^gal_el on a polynomial in the
    /// coefficient domain, flipping the sign of the coefficients that
    /// cross the cyclotomic reduction. gal_el must be odd.
    pub fn a_apply_automorphism_into_b(&self, a: &Poly<u64>, gal_el: usize, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(gal_el & 1 == 1, "invalid gal_el={}: not odd", gal_el);

        let n: usize = self.n();
        let log_n: u32 = n.log2() as u32;
        let mask: usize = n - 1;
        let q: u64 = self.modulus.q;

        for i in 0..n {
            let index_raw: usize = i.wrapping_mul(gal_el);
            let index: usize = index_raw & mask;
            let sign: u64 = ((index_raw >> log_n) & 1) as u64;
            let v: u64 = a.0[i];
            // Branch-free select of v or q - v.
            b.0[index] = v * (sign ^ 1) | (q - v) * sign;
        }
    }
}

impl RingRNS<u64> {
    pub fn a_apply_automorphism_ntt_into_b(&self, a: &PolyRNS<u64>, gal_el: usize, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level());
        debug_assert!(b.level() >= self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_apply_automorphism_ntt_into_b(a.at(i), gal_el, b.at_mut(i)));
    }

    pub fn a_apply_automorphism_into_b(&self, a: &PolyRNS<u64>, gal_el: usize, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level());
        debug_assert!(b.level() >= self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_apply_automorphism_into_b(a.at(i), gal_el, b.at_mut(i)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::RingRNS;

    #[test]
    fn test_automorphism_domains_agree() {
        let ring: RingRNS<u64> = RingRNS::<u64>::new(32, vec![0x7fffffd8001]);
        let gal_el: usize = ring.galois_element(1, false);

        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.set_coefficients_u64(&(0..32).map(|i| i * i + 1).collect::<Vec<u64>>(), &mut a);

        // Coefficient-domain permutation.
        let mut want: PolyRNS<u64> = ring.new_polyrns();
        ring.a_apply_automorphism_into_b(&a, gal_el, &mut want);

        // Evaluation-domain permutation.
        let mut a_ntt: PolyRNS<u64> = ring.new_polyrns();
        let mut have: PolyRNS<u64> = ring.new_polyrns();
        ring.ntt::<false>(&a, &mut a_ntt);
        ring.a_apply_automorphism_ntt_into_b(&a_ntt, gal_el, &mut have);
        ring.intt_inplace::<false>(&mut have);

        assert!(ring.equal(&want, &have));
    }

    #[test]
    fn test_row_swap_automorphism_is_involution() {
        let ring: RingRNS<u64> = RingRNS::<u64>::new(32, vec![0x7fffffd8001]);
        let gal_el: usize = ring.galois_element(0, true);
        assert_eq!(gal_el, 2 * 32 - 1);

        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.set_coefficients_u64(&(0..32).map(|i| i + 3).collect::<Vec<u64>>(), &mut a);

        let mut b: PolyRNS<u64> = ring.new_polyrns();
        let mut c: PolyRNS<u64> = ring.new_polyrns();
        ring.a_apply_automorphism_into_b(&a, gal_el, &mut b);
        ring.a_apply_automorphism_into_b(&b, gal_el, &mut c);
        assert!(ring.equal(&a, &c));
    }
}
