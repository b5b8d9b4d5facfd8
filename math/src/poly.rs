/// Dense polynomial over a single residue row.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Poly<O>(pub Vec<O>);

impl<O> Poly<O>
where
    O: Default + Clone,
{
    pub fn new(n: usize) -> Self {
        Self(vec![O::default(); n])
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.0.len()
    }

    pub fn zero(&mut self) {
        self.0.iter_mut().for_each(|a| *a = O::default());
    }

    pub fn copy_from(&mut self, a: &Poly<O>) {
        debug_assert!(self.n() == a.n(), "self.n()={} != a.n()={}", self.n(), a.n());
        self.0.clone_from_slice(&a.0);
    }
}

/// Polynomial in RNS representation: one residue row per modulus.
/// Row i holds the coefficients mod q_i; level is the number of
/// rows minus one.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PolyRNS<O>(pub Vec<Poly<O>>);

impl<O> PolyRNS<O>
where
    O: Default + Clone,
{
    pub fn new(n: usize, level: usize) -> Self {
        Self(vec![Poly::<O>::new(n); level + 1])
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.0[0].n()
    }

    #[inline(always)]
    pub fn level(&self) -> usize {
        self.0.len() - 1
    }

    #[inline(always)]
    pub fn at(&self, i: usize) -> &Poly<O> {
        &self.0[i]
    }

    #[inline(always)]
    pub fn at_mut(&mut self, i: usize) -> &mut Poly<O> {
        &mut self.0[i]
    }

    pub fn zero(&mut self) {
        self.0.iter_mut().for_each(|p| p.zero());
    }

    /// Copies the rows of a present in both polynomials.
    pub fn copy_from(&mut self, a: &PolyRNS<O>) {
        let level: usize = self.level().min(a.level());
        (0..level + 1).for_each(|i| self.0[i].copy_from(&a.0[i]));
    }

    /// Truncates to the given number of rows minus one.
    pub fn drop_level(&mut self, level: usize) {
        debug_assert!(level <= self.level());
        self.0.truncate(level + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape() {
        let a: PolyRNS<u64> = PolyRNS::<u64>::new(16, 2);
        assert_eq!(a.n(), 16);
        assert_eq!(a.level(), 2);
    }
}
