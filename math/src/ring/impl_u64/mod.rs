pub mod automorphism;
pub mod basis_extension;
pub mod rescaling;
pub mod ring;
pub mod ring_rns;
pub mod sampling;
pub mod scaling;
