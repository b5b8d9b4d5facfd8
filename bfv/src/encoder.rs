use crate::context::Context;
use crate::error::Error;
use crate::plaintext::Plaintext;
use math::modulus::{WordOps, ONCE};
use math::poly::Poly;
use math::ring::Ring;
use std::sync::Arc;

/// Batch encoder packing n integers mod t into the n slots of a
/// plaintext, via the NTT over the plaintext modulus. The slots form
/// a 2 x n/2 grid indexed by the orbit of the Galois generator, so
/// that column rotations act as cyclic shifts on each row and the row
/// swap exchanges the two rows.
pub struct BatchEncoder {
    context: Arc<Context>,
    index_matrix: Vec<usize>,
}

impl BatchEncoder {
    pub fn new(context: Arc<Context>) -> Result<BatchEncoder, Error> {
        context.ring_t()?;

        let n: usize = context.n();
        let log_n: u32 = n.log2() as u32;
        let m: usize = n << 1;
        let row_size: usize = n >> 1;
        let gen: usize = math::GALOISGENERATOR as usize;

        let mut index_matrix: Vec<usize> = vec![0; n];
        let mut pos: usize = 1;
        for i in 0..row_size {
            let index1: usize = (pos - 1) >> 1;
            let index2: usize = (m - pos - 1) >> 1;
            index_matrix[i] = index1.reverse_bits_msb(log_n);
            index_matrix[i | row_size] = index2.reverse_bits_msb(log_n);
            pos = pos.wrapping_mul(gen) & (m - 1);
        }

        Ok(BatchEncoder { context, index_matrix })
    }

    /// Encodes n unsigned slot values (mod t) and lifts the plaintext
    /// by floor(Q/t).
    pub fn encode_uint(&self, coeffs: &[u64], plaintext: &mut Plaintext) -> Result<(), Error> {
        assert!(
            coeffs.len() == self.context.n(),
            "invalid coeffs.len()={}: must be n={}",
            coeffs.len(),
            self.context.n()
        );
        let ring_t: &Ring<u64> = &self.context.ring_t()?.0[0];
        let t: u64 = self.context.t();

        let mut poly_t: Poly<u64> = ring_t.new_poly();
        for (i, &c) in coeffs.iter().enumerate() {
            poly_t.0[self.index_matrix[i]] = c % t;
        }
        ring_t.intt_inplace::<false>(&mut poly_t);

        self.lift(&poly_t, plaintext);
        Ok(())
    }

    /// Encodes n signed slot values, centered mod t.
    pub fn encode_int(&self, coeffs: &[i64], plaintext: &mut Plaintext) -> Result<(), Error> {
        let t: i64 = self.context.t() as i64;
        let unsigned: Vec<u64> = coeffs.iter().map(|&c| c.rem_euclid(t) as u64).collect();
        self.encode_uint(&unsigned, plaintext)
    }

    /// Scales the message polynomial by floor(Q/t) onto every row of
    /// the plaintext.
    fn lift(&self, poly_t: &Poly<u64>, plaintext: &mut Plaintext) {
        let ring_q = self.context.ring_q();
        for (i, r) in ring_q.0.iter().enumerate() {
            let delta: u64 = *self.context.delta_mont().at(i);
            for (x, &m) in plaintext.value_mut().at_mut(i).0.iter_mut().zip(poly_t.0.iter()) {
                *x = r.modulus.montgomery.mul_external::<ONCE>(delta, m);
            }
        }
        plaintext.0.is_ntt = false;
    }

    /// Decodes a decrypted plaintext back into its n slot values.
    pub fn decode_uint(&self, plaintext: &Plaintext) -> Result<Vec<u64>, Error> {
        let ring_t: &Ring<u64> = &self.context.ring_t()?.0[0];

        let mut poly_t: Poly<u64> = ring_t.new_poly();
        poly_t.0.copy_from_slice(&plaintext.value().at(0).0);
        ring_t.ntt_inplace::<false>(&mut poly_t);

        Ok(self
            .index_matrix
            .iter()
            .map(|&index| poly_t.0[index])
            .collect())
    }

    /// Decodes into signed values centered mod t.
    pub fn decode_int(&self, plaintext: &Plaintext) -> Result<Vec<i64>, Error> {
        let t: u64 = self.context.t();
        let t_half: u64 = t >> 1;
        Ok(self
            .decode_uint(plaintext)?
            .into_iter()
            .map(|c| {
                if c > t_half {
                    -((t - c) as i64)
                } else {
                    c as i64
                }
            })
            .collect())
    }
}
