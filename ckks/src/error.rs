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

    #[error("cannot mul -> input and output elements must be of degree 0 or 1")]
    MulDegree,

    #[error("cannot mul -> operands must be in NTT to multiply")]
    MulNotNTT,

    #[error("cannot relinearize -> input is not of degree 2")]
    RelinearizeDegree,

    #[error("cannot switchkeys -> input and output ciphertext must be of degree 1")]
    SwitchKeysDegree,

    #[error("cannot rotate -> input and output ciphertext must be of degree 1")]
    RotateDegree,

    #[error("cannot rotate -> specific rotation and pow2 rotations have not been generated")]
    RotationKeysMissing,

    #[error("cannot rotate -> rows rotation key not generated")]
    ConjugateKeyMissing,

    #[error("cannot rescale -> input ciphertext already at level 0")]
    RescaleLevelZero,

    #[error("cannot rescale -> input ciphertext not in NTT")]
    RescaleNotNTT,

    #[error("cannot drop level -> ciphertext already at level 0")]
    DropLevelZero,
}
