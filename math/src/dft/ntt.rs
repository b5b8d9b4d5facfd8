use crate::dft::DFT;
use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::ReduceOnce;
use crate::modulus::WordOps;
use crate::modulus::{BARRETT, NONE, ONCE};
use itertools::izip;

/// Table stores the bit-reversed powers of a primitive nth_root-th
/// root of unity and its inverse, Shoup-prepared for the lazy
/// Harvey butterflies.
pub struct Table<O> {
    prime: Prime<O>,
    nth_root: u64,
    psi: O,
    psi_forward_rev: Vec<Barrett<O>>,
    psi_backward_rev: Vec<Barrett<O>>,
    n_inv: Barrett<O>,
    psi_inv_n_inv: Barrett<O>,
    q: O,
    two_q: O,
    four_q: O,
}

impl Table<u64> {
    pub fn new(prime: Prime<u64>, nth_root: u64) -> Table<u64> {
        assert!(
            nth_root & (nth_root - 1) == 0,
            "invalid argument: nth_root = {} is not a power of two",
            nth_root
        );

        let psi: u64 = prime.primitive_nth_root(nth_root);

        let psi_mont: Montgomery<u64> = prime.montgomery.prepare::<ONCE>(psi);
        let psi_inv_mont: Montgomery<u64> = prime.montgomery.pow(psi_mont, prime.phi - 1);

        let mut psi_forward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); (nth_root >> 1) as usize];
        let mut psi_backward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); (nth_root >> 1) as usize];

        psi_forward_rev[0] = prime.barrett.prepare(1);
        psi_backward_rev[0] = prime.barrett.prepare(1);

        let log_nth_root_half: u32 = (nth_root >> 1).log2() as _;

        let mut powers_forward: u64 = 1u64;
        let mut powers_backward: u64 = 1u64;

        for i in 1..(nth_root >> 1) as usize {
            let i_rev: usize = i.reverse_bits_msb(log_nth_root_half);

            prime
                .montgomery
                .mul_external_assign::<ONCE>(psi_mont, &mut powers_forward);
            prime
                .montgomery
                .mul_external_assign::<ONCE>(psi_inv_mont, &mut powers_backward);

            psi_forward_rev[i_rev] = prime.barrett.prepare(powers_forward);
            psi_backward_rev[i_rev] = prime.barrett.prepare(powers_backward);
        }

        let n: u64 = nth_root >> 1;
        let n_inv: Barrett<u64> = prime.barrett.prepare(prime.inv(n));
        let psi_inv_n_inv: Barrett<u64> = prime
            .barrett
            .prepare(prime.barrett.mul_external::<ONCE>(&n_inv, &psi_backward_rev[1].0));

        let q: u64 = prime.q();

        Self {
            prime,
            nth_root,
            psi,
            psi_forward_rev,
            psi_backward_rev,
            n_inv,
            psi_inv_n_inv,
            q,
            two_q: q << 1,
            four_q: q << 2,
        }
    }

    #[inline(always)]
    pub fn nth_root(&self) -> u64 {
        self.nth_root
    }

    #[inline(always)]
    pub fn psi(&self) -> u64 {
        self.psi
    }

    /// Bit-reversed forward table entry; index 1 holds psi^{n/2},
    /// the square root of -1 of the evaluation domain.
    #[inline(always)]
    pub fn psi_forward_rev(&self, i: usize) -> &Barrett<u64> {
        &self.psi_forward_rev[i]
    }
}

impl DFT<u64> for Table<u64> {
    fn forward_inplace(&self, a: &mut [u64]) {
        self.forward_inplace_core::<false>(a)
    }

    fn forward_inplace_lazy(&self, a: &mut [u64]) {
        self.forward_inplace_core::<true>(a)
    }

    fn backward_inplace(&self, a: &mut [u64]) {
        self.backward_inplace_core::<false>(a)
    }

    fn backward_inplace_lazy(&self, a: &mut [u64]) {
        self.backward_inplace_core::<true>(a)
    }
}

impl Table<u64> {
    pub fn forward_inplace_core<const LAZY: bool>(&self, a: &mut [u64]) {
        let n: usize = a.len();
        assert!(n & (n - 1) == 0, "invalid a.len()={}: not a power of two", n);
        let log_n: u32 = usize::BITS - (n - 1).leading_zeros();

        for layer in 0..log_n {
            let (m, size) = (1 << layer, 1 << (log_n - layer - 1));
            let t: usize = 2 * size;
            if layer == log_n - 1 {
                if LAZY {
                    izip!(a.chunks_exact_mut(t), &self.psi_forward_rev[m..]).for_each(
                        |(a, psi)| {
                            let (a, b) = a.split_at_mut(size);
                            self.dit_inplace::<false>(&mut a[0], &mut b[0], *psi);
                            debug_assert!(a[0] < self.two_q);
                            debug_assert!(b[0] < self.two_q);
                        },
                    );
                } else {
                    izip!(a.chunks_exact_mut(t), &self.psi_forward_rev[m..]).for_each(
                        |(a, psi)| {
                            let (a, b) = a.split_at_mut(size);
                            self.dit_inplace::<true>(&mut a[0], &mut b[0], *psi);
                            self.prime.barrett.reduce_assign::<BARRETT>(&mut a[0]);
                            self.prime.barrett.reduce_assign::<BARRETT>(&mut b[0]);
                            debug_assert!(a[0] < self.q);
                            debug_assert!(b[0] < self.q);
                        },
                    );
                }
            } else if t >= 16 {
                izip!(a.chunks_exact_mut(t), &self.psi_forward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a.chunks_exact_mut(8), b.chunks_exact_mut(8)).for_each(|(a, b)| {
                        self.dit_inplace::<true>(&mut a[0], &mut b[0], *psi);
                        self.dit_inplace::<true>(&mut a[1], &mut b[1], *psi);
                        self.dit_inplace::<true>(&mut a[2], &mut b[2], *psi);
                        self.dit_inplace::<true>(&mut a[3], &mut b[3], *psi);
                        self.dit_inplace::<true>(&mut a[4], &mut b[4], *psi);
                        self.dit_inplace::<true>(&mut a[5], &mut b[5], *psi);
                        self.dit_inplace::<true>(&mut a[6], &mut b[6], *psi);
                        self.dit_inplace::<true>(&mut a[7], &mut b[7], *psi);
                    });
                });
            } else {
                izip!(a.chunks_exact_mut(t), &self.psi_forward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a, b).for_each(|(a, b)| self.dit_inplace::<true>(a, b, *psi));
                });
            }
        }
    }

    /// Cooley-Tukey butterfly with inputs in [0, 4q) and lazy
    /// outputs in [0, 4q); the non-lazy tail maps to [0, 2q).
    #[inline(always)]
    fn dit_inplace<const LAZY: bool>(&self, a: &mut u64, b: &mut u64, t: Barrett<u64>) {
        debug_assert!(*a < self.four_q, "a:{} 4q:{}", a, self.four_q);
        debug_assert!(*b < self.four_q, "b:{} 4q:{}", b, self.four_q);
        a.reduce_once_assign(self.two_q);
        let bt: u64 = self.prime.barrett.mul_external::<NONE>(&t, b);
        *b = *a + self.two_q - bt;
        *a += bt;
        if !LAZY {
            a.reduce_once_assign(self.two_q);
            b.reduce_once_assign(self.two_q);
        }
    }

    pub fn backward_inplace_core<const LAZY: bool>(&self, a: &mut [u64]) {
        let n: usize = a.len();
        assert!(n & (n - 1) == 0, "invalid a.len()={}: not a power of two", n);
        let log_n: u32 = usize::BITS - (n - 1).leading_zeros();

        for layer in (0..log_n).rev() {
            let (m, size) = (1 << layer, 1 << (log_n - layer - 1));
            let t: usize = 2 * size;
            if layer == 0 {
                izip!(a.chunks_exact_mut(t)).for_each(|a| {
                    let (a, b) = a.split_at_mut(size);
                    if size >= 8 {
                        izip!(a.chunks_exact_mut(8), b.chunks_exact_mut(8)).for_each(|(a, b)| {
                            self.dif_last_inplace::<LAZY>(&mut a[0], &mut b[0]);
                            self.dif_last_inplace::<LAZY>(&mut a[1], &mut b[1]);
                            self.dif_last_inplace::<LAZY>(&mut a[2], &mut b[2]);
                            self.dif_last_inplace::<LAZY>(&mut a[3], &mut b[3]);
                            self.dif_last_inplace::<LAZY>(&mut a[4], &mut b[4]);
                            self.dif_last_inplace::<LAZY>(&mut a[5], &mut b[5]);
                            self.dif_last_inplace::<LAZY>(&mut a[6], &mut b[6]);
                            self.dif_last_inplace::<LAZY>(&mut a[7], &mut b[7]);
                        });
                    } else {
                        izip!(a, b).for_each(|(a, b)| self.dif_last_inplace::<LAZY>(a, b));
                    }
                });
            } else if t >= 16 {
                izip!(a.chunks_exact_mut(t), &self.psi_backward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a.chunks_exact_mut(8), b.chunks_exact_mut(8)).for_each(|(a, b)| {
                        self.dif_inplace::<true>(&mut a[0], &mut b[0], *psi);
                        self.dif_inplace::<true>(&mut a[1], &mut b[1], *psi);
                        self.dif_inplace::<true>(&mut a[2], &mut b[2], *psi);
                        self.dif_inplace::<true>(&mut a[3], &mut b[3], *psi);
                        self.dif_inplace::<true>(&mut a[4], &mut b[4], *psi);
                        self.dif_inplace::<true>(&mut a[5], &mut b[5], *psi);
                        self.dif_inplace::<true>(&mut a[6], &mut b[6], *psi);
                        self.dif_inplace::<true>(&mut a[7], &mut b[7], *psi);
                    });
                });
            } else {
                izip!(a.chunks_exact_mut(t), &self.psi_backward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a, b).for_each(|(a, b)| self.dif_inplace::<true>(a, b, *psi));
                });
            }
        }
    }

    /// Gentleman-Sande butterfly with inputs in [0, 2q).
    #[inline(always)]
    fn dif_inplace<const LAZY: bool>(&self, a: &mut u64, b: &mut u64, t: Barrett<u64>) {
        debug_assert!(*a < self.two_q, "a:{} 2q:{}", a, self.two_q);
        debug_assert!(*b < self.two_q, "b:{} 2q:{}", b, self.two_q);
        let d: u64 = self
            .prime
            .barrett
            .mul_external::<NONE>(&t, &(*a + self.two_q - *b));
        *a += *b;
        a.reduce_once_assign(self.two_q);
        *b = d;
        if !LAZY {
            a.reduce_once_assign(self.q);
            b.reduce_once_assign(self.q);
        }
    }

    /// Last inverse layer, folding in the multiplication by n^-1.
    #[inline(always)]
    fn dif_last_inplace<const LAZY: bool>(&self, a: &mut u64, b: &mut u64) {
        debug_assert!(*a < self.two_q);
        debug_assert!(*b < self.two_q);
        if LAZY {
            let d: u64 = self
                .prime
                .barrett
                .mul_external::<NONE>(&self.psi_inv_n_inv, &(*a + self.two_q - *b));
            *a = self.prime.barrett.mul_external::<NONE>(&self.n_inv, &(*a + *b));
            *b = d;
        } else {
            let d: u64 = self
                .prime
                .barrett
                .mul_external::<ONCE>(&self.psi_inv_n_inv, &(*a + self.two_q - *b));
            *a = self.prime.barrett.mul_external::<ONCE>(&self.n_inv, &(*a + *b));
            *b = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntt_round_trip() {
        let prime: Prime<u64> = Prime::<u64>::new(0x800000000004001, 1);
        let n: u64 = 32;
        let table: Table<u64> = Table::<u64>::new(prime, n << 1);
        let mut a: Vec<u64> = (0..n).collect();
        let b: Vec<u64> = a.clone();
        table.forward_inplace(&mut a);
        table.backward_inplace(&mut a);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ntt_negacyclic_convolution() {
        // (1 + X) * X^{n-1} = X^{n-1} - 1 mod X^n + 1.
        let prime: Prime<u64> = Prime::<u64>::new(0xffffee001, 1);
        let q: u64 = prime.q();
        let n: usize = 16;
        let table: Table<u64> = Table::<u64>::new(prime.clone(), (n as u64) << 1);

        let mut a: Vec<u64> = vec![0; n];
        a[0] = 1;
        a[1] = 1;
        let mut b: Vec<u64> = vec![0; n];
        b[n - 1] = 1;

        table.forward_inplace(&mut a);
        table.forward_inplace(&mut b);
        let mut c: Vec<u64> = vec![0; n];
        izip!(a.iter(), b.iter(), c.iter_mut())
            .for_each(|(x, y, z)| *z = prime.barrett.mul::<BARRETT>(x, y));
        table.backward_inplace(&mut c);

        let mut want: Vec<u64> = vec![0; n];
        want[0] = q - 1;
        want[n - 1] = 1;
        assert_eq!(c, want);
    }
}
