//! Integer-arithmetic homomorphic encryption over power-of-two
//! cyclotomic rings in RNS representation, with exact decryption
//! semantics mod the plaintext modulus t.

pub mod ciphertext;
pub mod context;
pub mod decryptor;
pub mod encoder;
pub mod encryptor;
pub mod elem;
pub mod error;
pub mod evaluator;
pub mod key_generator;
pub mod keys;
pub mod marshaller;
pub mod parameters;
pub mod plaintext;

pub use ciphertext::Ciphertext;
pub use context::Context;
pub use decryptor::Decryptor;
pub use encoder::BatchEncoder;
pub use encryptor::Encryptor;
pub use elem::{Element, Operand};
pub use error::Error;
pub use evaluator::Evaluator;
pub use key_generator::KeyGenerator;
pub use keys::{EvaluationKey, PublicKey, RotationKeys, SecretKey, SwitchingKey};
pub use parameters::Parameters;
pub use plaintext::Plaintext;
