/// Errors returned by the scheme API. All are precondition or
/// structural failures; the receiver operand is left unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("operands cannot be both plaintext")]
    BothPlaintext,

    #[error("receiver operand degree is too small")]
    ReceiverDegreeTooSmall,

    #[error("invalid ring degree (must be a power of 2)")]
    InvalidRingDegree,

    #[error("invalid modulus size (must be in [2, 60] bits)")]
    InvalidModulusSize,

    #[error("invalid bit decomposition (must be in [1, 60] bits)")]
    InvalidBitDecomp,

    #[error("plaintext modulus does not allow the plaintext NTT")]
    PlaintextNTT,

    #[error("cannot relinearize -> input ciphertext degree too large to allow relinearization")]
    RelinKeyDegreeTooSmall,

    #[error("cannot switchkeys -> input and output must be of degree 1 to allow key switching")]
    SwitchKeysDegree,

    #[error("cannot rotate -> input and or output must be of degree 1")]
    RotateDegree,

    #[error("cannot rotate -> specific rotation and pow2 rotations have not been generated")]
    RotationKeysMissing,

    #[error("cannot rotate -> rows rotation key not generated")]
    RowRotationKeyMissing,

    #[error("cannot inner sum -> input and output must be of degree 1")]
    InnerSumDegree,
}
