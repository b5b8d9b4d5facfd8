/// Scalar in RNS representation: one residue per modulus.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ScalarRNS<O>(pub Vec<O>);

impl<O> ScalarRNS<O> {
    #[inline(always)]
    pub fn at(&self, i: usize) -> &O {
        &self.0[i]
    }
}
