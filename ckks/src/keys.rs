use math::poly::PolyRNS;
use std::collections::BTreeMap;

/// Secret key: a ternary polynomial over the full chain Q, kept in
/// the evaluation and Montgomery domains after generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretKey {
    pub(crate) sk: PolyRNS<u64>,
}

impl SecretKey {
    /// The raw key polynomial (NTT + Montgomery domain), consumed by
    /// the multiparty protocols.
    pub fn value(&self) -> &PolyRNS<u64> {
        &self.sk
    }
}

/// Public key (b, a) = (-(a*s) + e, a) over the full chain Q, in the
/// evaluation domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) pk: (PolyRNS<u64>, PolyRNS<u64>),
}

impl PublicKey {
    pub fn value(&self) -> &(PolyRNS<u64>, PolyRNS<u64>) {
        &self.pk
    }
}

/// Switching key: for each modulus index i and digit j, the pair
/// (-(a_ij * s) + e_ij + w^j * s_source * [row = i], a_ij) over the
/// full chain, in the evaluation and Montgomery domains. Ciphertexts
/// at lower levels only consume the prefix rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchingKey {
    pub(crate) log_base: usize,
    pub(crate) key: Vec<Vec<(PolyRNS<u64>, PolyRNS<u64>)>>,
}

impl SwitchingKey {
    #[inline(always)]
    pub fn log_base(&self) -> usize {
        self.log_base
    }
}

/// Relinearization key for degree-2 ciphertexts, carrying s^2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationKey {
    pub(crate) key: SwitchingKey,
}

/// Rotation-key table: per-offset column-rotation keys for both
/// directions and the optional conjugation key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RotationKeys {
    pub(crate) rot_col_left: BTreeMap<usize, SwitchingKey>,
    pub(crate) rot_col_right: BTreeMap<usize, SwitchingKey>,
    pub(crate) conjugate: Option<SwitchingKey>,
}

impl RotationKeys {
    pub fn new() -> RotationKeys {
        RotationKeys::default()
    }

    /// True if both direction maps contain every power-of-two offset
    /// in [1, n/2).
    pub fn has_pow2_rotations(&self, n: usize) -> bool {
        let mut i: usize = 1;
        while i < n >> 1 {
            if !self.rot_col_left.contains_key(&i) || !self.rot_col_right.contains_key(&i) {
                return false;
            }
            i <<= 1;
        }
        true
    }
}
