use math::poly::PolyRNS;
use std::collections::BTreeMap;

/// Secret key: a ternary polynomial over the chain QP, kept in the
/// evaluation domain and in the Montgomery domain after generation.
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

/// Public key (b, a) = (-(a*s) + e, a) over the chain QP, in the
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
/// (-(a_ij * s) + e_ij + w^j * s_source * [row = i], a_ij) over Q, in
/// the evaluation and Montgomery domains.
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

/// Relinearization keys: the key at index k re-encrypts the
/// degree-(k+2) component, i.e. it carries s^(k+2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationKey {
    pub(crate) keys: Vec<SwitchingKey>,
}

impl EvaluationKey {
    /// Largest ciphertext degree this key can relinearize.
    #[inline(always)]
    pub fn max_degree(&self) -> usize {
        self.keys.len() + 1
    }
}

/// Rotation-key table: per-offset column-rotation keys for both
/// directions and the optional row-swap key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RotationKeys {
    pub(crate) rot_col_left: BTreeMap<usize, SwitchingKey>,
    pub(crate) rot_col_right: BTreeMap<usize, SwitchingKey>,
    pub(crate) rot_row: Option<SwitchingKey>,
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
