pub mod ntt;

/// Negacyclic transform between coefficient and evaluation domains.
/// The lazy variants keep outputs in [0, 2q).
pub trait DFT<O> {
    fn forward_inplace(&self, a: &mut [O]);
    fn forward_inplace_lazy(&self, a: &mut [O]);
    fn backward_inplace(&self, a: &mut [O]);
    fn backward_inplace_lazy(&self, a: &mut [O]);
}
