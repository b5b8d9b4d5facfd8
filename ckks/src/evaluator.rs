use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::elem::{Element, Operand};
use crate::error::Error;
use crate::keys::{EvaluationKey, RotationKeys, SwitchingKey};
use math::modulus::barrett::Barrett;
use math::modulus::{ScalarOperations, VectorOperations, BARRETT, NONE, ONCE};
use math::poly::PolyRNS;
use math::ring::{Ring, RingRNS};
use math::CHUNK;
use num_complex::Complex64;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

/// Evaluator of the homomorphic operations: add/sub with scale and
/// level alignment, multiplication with optional relinearization,
/// complex constants, rotations and rescaling. It owns a private
/// scratch pool invalidated on every call; instances are not
/// reentrant and must not be shared.
pub struct Evaluator {
    context: Arc<Context>,
    polypool: [PolyRNS<u64>; 6],
    ctpool: Ciphertext,
}

impl Evaluator {
    pub fn new(context: Arc<Context>) -> Evaluator {
        let polypool: [PolyRNS<u64>; 6] = std::array::from_fn(|_| context.ring_q().new_polyrns());
        let ctpool: Ciphertext =
            Ciphertext::new(&context, 2, context.max_level(), context.log_scale());
        Evaluator {
            context,
            polypool,
            ctpool,
        }
    }

    fn check_binary(
        op0: &impl Operand,
        op1: &impl Operand,
        ct_out: &Ciphertext,
        out_min_degree: usize,
    ) -> Result<(), Error> {
        if op0.degree() + op1.degree() == 0 {
            return Err(Error::BothPlaintext);
        }
        if ct_out.0.degree() < out_min_degree {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        Ok(())
    }

    /// Adds op0 to op1, aligning levels and scales.
    pub fn add(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        self.add_sub_internal::<false, ONCE>(op0, op1, ct_out)
    }

    /// Add without the modular reduction tail; the result must be
    /// reduced before any range-sensitive use.
    pub fn add_no_mod(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        self.add_sub_internal::<false, NONE>(op0, op1, ct_out)
    }

    /// Subtracts op1 from op0, aligning levels and scales.
    pub fn sub(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        self.add_sub_internal::<true, ONCE>(op0, op1, ct_out)
    }

    pub fn add_new(&mut self, op0: &impl Operand, op1: &impl Operand) -> Result<Ciphertext, Error> {
        let mut ct_out: Ciphertext = Ciphertext::new(
            &self.context,
            op0.degree().max(op1.degree()).max(1),
            op0.level().min(op1.level()),
            op0.scale().max(op1.scale()),
        );
        self.add(op0, op1, &mut ct_out)?;
        Ok(ct_out)
    }

    pub fn sub_new(&mut self, op0: &impl Operand, op1: &impl Operand) -> Result<Ciphertext, Error> {
        let mut ct_out: Ciphertext = Ciphertext::new(
            &self.context,
            op0.degree().max(op1.degree()).max(1),
            op0.level().min(op1.level()),
            op0.scale().max(op1.scale()),
        );
        self.sub(op0, op1, &mut ct_out)?;
        Ok(ct_out)
    }

    fn add_sub_internal<const SUB: bool, const REDUCE: u8>(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        let max_degree: usize = op0.degree().max(op1.degree());
        Self::check_binary(op0, op1, ct_out, max_degree)?;

        let context: Arc<Context> = self.context.clone();
        let min_level: usize = op0.level().min(op1.level()).min(ct_out.level());
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);

        ct_out.0.drop_to_level(&context, min_level);
        ct_out.0.resize(&context, max_degree);

        let (s0, s1) = (op0.scale(), op1.scale());

        // Aligns the smaller-scaled operand by a power-of-two
        // scale-up through the scratch ciphertext.
        if s0 == s1 {
            Self::combine::<SUB, REDUCE>(
                &ring,
                &op0.element().value,
                &op1.element().value,
                &mut ct_out.0,
            );
        } else if s0 > s1 {
            for i in 0..op1.degree() + 1 {
                ring.a_mul_b_pow2_into_c::<ONCE>(
                    &op1.element().value[i],
                    s0 - s1,
                    &mut self.ctpool.0.value[i],
                );
            }
            Self::combine::<SUB, REDUCE>(
                &ring,
                &op0.element().value,
                &self.ctpool.0.value[..op1.degree() + 1],
                &mut ct_out.0,
            );
        } else {
            for i in 0..op0.degree() + 1 {
                ring.a_mul_b_pow2_into_c::<ONCE>(
                    &op0.element().value[i],
                    s1 - s0,
                    &mut self.ctpool.0.value[i],
                );
            }
            Self::combine::<SUB, REDUCE>(
                &ring,
                &self.ctpool.0.value[..op0.degree() + 1],
                &op1.element().value,
                &mut ct_out.0,
            );
        }

        ct_out.0.scale = s0.max(s1);
        ct_out.0.is_ntt = true;
        Ok(())
    }

    fn combine<const SUB: bool, const REDUCE: u8>(
        ring: &RingRNS<u64>,
        v0: &[PolyRNS<u64>],
        v1: &[PolyRNS<u64>],
        el_out: &mut Element,
    ) {
        let min_len: usize = v0.len().min(v1.len());
        let max_len: usize = v0.len().max(v1.len());

        for i in 0..min_len {
            if SUB {
                ring.a_sub_b_into_c::<1, REDUCE>(&v0[i], &v1[i], &mut el_out.value[i]);
            } else {
                ring.a_add_b_into_c::<REDUCE>(&v0[i], &v1[i], &mut el_out.value[i]);
            }
        }

        if v0.len() > v1.len() {
            for i in min_len..max_len {
                ring.copy(&v0[i], &mut el_out.value[i]);
            }
        } else if v1.len() > v0.len() {
            for i in min_len..max_len {
                if SUB {
                    ring.a_neg_into_b::<1, ONCE>(&v1[i], &mut el_out.value[i]);
                } else {
                    ring.copy(&v1[i], &mut el_out.value[i]);
                }
            }
        }
    }

    /// Negates ct0.
    pub fn neg(&mut self, ct0: &Ciphertext, ct_out: &mut Ciphertext) -> Result<(), Error> {
        if ct_out.0.degree() < ct0.0.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        ct_out.0.resize(&context, ct0.0.degree());
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);
        for i in 0..ct0.0.degree() + 1 {
            ring.a_neg_into_b::<1, ONCE>(&ct0.0.value[i], &mut ct_out.0.value[i]);
        }
        ct_out.0.scale = ct0.scale();
        ct_out.0.is_ntt = ct0.is_ntt();
        Ok(())
    }

    /// Canonicalizes every residue of ct0 to [0, q_i).
    pub fn reduce(&mut self, ct0: &Ciphertext, ct_out: &mut Ciphertext) -> Result<(), Error> {
        if ct_out.0.degree() < ct0.0.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        ct_out.0.resize(&context, ct0.0.degree());
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);
        for i in 0..ct0.0.degree() + 1 {
            ring.copy(&ct0.0.value[i], &mut ct_out.0.value[i]);
            ring.a_reduce_into_a::<BARRETT>(&mut ct_out.0.value[i]);
        }
        ct_out.0.scale = ct0.scale();
        ct_out.0.is_ntt = ct0.is_ntt();
        Ok(())
    }

    /// Rounds the constant at the ciphertext scale and maps the pair
    /// (real, imag) onto the two conjugate halves of the slots:
    /// component-wise, the first n/2 evaluation points receive
    /// re + im * psi^(n/2) and the conjugate half re - im * psi^(n/2).
    pub fn add_const(
        &mut self,
        ct0: &Ciphertext,
        constant: Complex64,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct_out.0.degree() < ct0.0.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        ct_out.0.resize(&context, ct0.0.degree());
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);

        for i in 0..ct0.0.degree() + 1 {
            ring.copy(&ct0.0.value[i], &mut ct_out.0.value[i]);
        }

        let half: usize = context.n() >> 1;
        for (i, r) in ring.0.iter().enumerate() {
            let (const_lo, const_hi) = split_complex_constant(r, constant, ct0.scale());
            let row: &mut [u64] = &mut ct_out.0.value[0].at_mut(i).0;
            r.modulus
                .va_add_sb_into_va::<CHUNK, ONCE>(&const_lo, &mut row[..half]);
            r.modulus
                .va_add_sb_into_va::<CHUNK, ONCE>(&const_hi, &mut row[half..]);
        }

        ct_out.0.scale = ct0.scale();
        ct_out.0.is_ntt = true;
        Ok(())
    }

    /// Multiplies by a complex constant; the scale grows by the
    /// default scale if the constant has a fractional part.
    pub fn mult_const(
        &mut self,
        ct0: &Ciphertext,
        constant: Complex64,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct_out.0.degree() < ct0.0.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        ct_out.0.resize(&context, ct0.0.degree());
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);

        let scale: usize = if constant.re.fract() != 0.0 || constant.im.fract() != 0.0 {
            context.log_scale()
        } else {
            0
        };

        let half: usize = context.n() >> 1;
        for (i, r) in ring.0.iter().enumerate() {
            let (const_lo, const_hi) = split_complex_constant(r, constant, scale);
            let lo: Barrett<u64> = r.modulus.barrett.prepare(const_lo);
            let hi: Barrett<u64> = r.modulus.barrett.prepare(const_hi);
            for u in 0..ct0.0.degree() + 1 {
                let src: &[u64] = &ct0.0.value[u].at(i).0;
                let dst: &mut [u64] = &mut ct_out.0.value[u].at_mut(i).0;
                r.modulus
                    .va_mul_sb_barrett_into_vc::<CHUNK, ONCE>(&src[..half], &lo, &mut dst[..half]);
                r.modulus
                    .va_mul_sb_barrett_into_vc::<CHUNK, ONCE>(&src[half..], &hi, &mut dst[half..]);
            }
        }

        ct_out.0.scale = ct0.scale() + scale;
        ct_out.0.is_ntt = true;
        Ok(())
    }

    /// ct_out += ct0 * constant, at the level and scale of the
    /// receiver.
    pub fn mult_const_and_add(
        &mut self,
        ct0: &Ciphertext,
        constant: Complex64,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct_out.0.degree() < ct0.0.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);

        let scale: usize = ct_out.scale().saturating_sub(ct0.scale());

        let half: usize = context.n() >> 1;
        for (i, r) in ring.0.iter().enumerate() {
            let (const_lo, const_hi) = split_complex_constant(r, constant, scale);
            let lo: Barrett<u64> = r.modulus.barrett.prepare(const_lo);
            let hi: Barrett<u64> = r.modulus.barrett.prepare(const_hi);
            for u in 0..ct0.0.degree() + 1 {
                let src: &[u64] = &ct0.0.value[u].at(i).0;
                let dst: &mut [u64] = &mut ct_out.0.value[u].at_mut(i).0;
                for (x, y) in src[..half].iter().zip(dst[..half].iter_mut()) {
                    let mut t: u64 = 0;
                    r.modulus.sa_mul_sb_barrett_into_sc::<ONCE>(x, &lo, &mut t);
                    r.modulus.sa_add_sb_into_sb::<ONCE>(&t, y);
                }
                for (x, y) in src[half..].iter().zip(dst[half..].iter_mut()) {
                    let mut t: u64 = 0;
                    r.modulus.sa_mul_sb_barrett_into_sc::<ONCE>(x, &hi, &mut t);
                    r.modulus.sa_add_sb_into_sb::<ONCE>(&t, y);
                }
            }
        }
        Ok(())
    }

    /// Multiplies by the imaginary unit (a slot-wise multiplication
    /// by i, a monomial multiplication on the coefficients).
    pub fn mult_by_i(&mut self, ct0: &Ciphertext, ct_out: &mut Ciphertext) -> Result<(), Error> {
        self.mult_by_unit_imag::<false>(ct0, ct_out)
    }

    /// Multiplies by 1/i = -i.
    pub fn div_by_i(&mut self, ct0: &Ciphertext, ct_out: &mut Ciphertext) -> Result<(), Error> {
        self.mult_by_unit_imag::<true>(ct0, ct_out)
    }

    fn mult_by_unit_imag<const INV: bool>(
        &mut self,
        ct0: &Ciphertext,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct_out.0.degree() < ct0.0.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        ct_out.0.resize(&context, ct0.0.degree());
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);

        let half: usize = context.n() >> 1;
        for (i, r) in ring.0.iter().enumerate() {
            let psi: u64 = r.ntt.psi_forward_rev(1).0;
            let (lo_val, hi_val) = if INV {
                (r.modulus.q - psi, psi)
            } else {
                (psi, r.modulus.q - psi)
            };
            let lo: Barrett<u64> = r.modulus.barrett.prepare(lo_val);
            let hi: Barrett<u64> = r.modulus.barrett.prepare(hi_val);
            for u in 0..ct0.0.degree() + 1 {
                let src: &[u64] = &ct0.0.value[u].at(i).0;
                let dst: &mut [u64] = &mut ct_out.0.value[u].at_mut(i).0;
                r.modulus
                    .va_mul_sb_barrett_into_vc::<CHUNK, ONCE>(&src[..half], &lo, &mut dst[..half]);
                r.modulus
                    .va_mul_sb_barrett_into_vc::<CHUNK, ONCE>(&src[half..], &hi, &mut dst[half..]);
            }
        }

        ct_out.0.scale = ct0.scale();
        ct_out.0.is_ntt = true;
        Ok(())
    }

    /// Multiplies by 2^pow2 without changing the scale tag.
    pub fn mul_by_pow2(
        &mut self,
        ct0: &Ciphertext,
        pow2: usize,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct_out.0.degree() < ct0.0.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        ct_out.0.resize(&context, ct0.0.degree());
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);
        for i in 0..ct0.0.degree() + 1 {
            ring.a_mul_b_pow2_into_c::<ONCE>(&ct0.0.value[i], pow2, &mut ct_out.0.value[i]);
        }
        ct_out.0.scale = ct0.scale();
        ct_out.0.is_ntt = ct0.is_ntt();
        Ok(())
    }

    /// Multiplies by 2^pow2 and raises the scale tag accordingly.
    pub fn scale_up(
        &mut self,
        ct0: &Ciphertext,
        pow2: usize,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        self.mul_by_pow2(ct0, pow2, ct_out)?;
        ct_out.0.scale = ct0.scale() + pow2;
        Ok(())
    }

    /// Truncates levels rows without rescaling.
    pub fn drop_level(&mut self, ct0: &mut Ciphertext, levels: usize) -> Result<(), Error> {
        if ct0.level() == 0 {
            return Err(Error::DropLevelZero);
        }
        let context: Arc<Context> = self.context.clone();
        ct0.0.drop_to_level(&context, ct0.level() - levels);
        Ok(())
    }

    /// Divides by the top modulus and drops it, repeating while the
    /// scale exceeds the default scale plus the top modulus size.
    /// Requires the input in the evaluation domain.
    #[instrument(skip_all)]
    pub fn rescale(&mut self, ct0: &Ciphertext, ct_out: &mut Ciphertext) -> Result<(), Error> {
        if ct0.level() == 0 {
            return Err(Error::RescaleLevelZero);
        }
        if !ct0.is_ntt() {
            return Err(Error::RescaleNotNTT);
        }

        let context: Arc<Context> = self.context.clone();
        if ct_out.level() < ct0.level() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        ct_out.0.drop_to_level(&context, ct0.level());
        ct_out.0.resize(&context, ct0.0.degree());
        ct_out.0.copy_from(&ct0.0);

        let log_scale: usize = context.log_scale();
        let scale_chain: &[usize] = context.scale_chain();

        while ct_out.level() > 0
            && ct_out.0.scale >= log_scale + scale_chain[ct_out.level()]
        {
            let level: usize = ct_out.level();
            let ring: RingRNS<u64> = context.ring_q().at_level(level);
            let q_top: u64 = ring.0[level].modulus.q;

            for poly in ct_out.0.value.iter_mut() {
                ring.div_by_last_modulus_inplace::<true, true>(&mut self.polypool[0], poly);
                poly.drop_level(level - 1);
            }

            ct_out.0.scale -= scale_chain[level];
            ct_out.0.current_modulus /= num_bigint::BigInt::from(q_top);
        }
        Ok(())
    }

    /// Multiplies op0 by op1 (both of degree at most 1, in the
    /// evaluation domain); relinearizes immediately if an evaluation
    /// key is given, else the output has degree 2. The output scale
    /// is the sum of the input scales.
    #[instrument(skip_all)]
    pub fn mul_relin(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        rlk: Option<&EvaluationKey>,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        Self::check_binary(op0, op1, ct_out, op0.degree().max(op1.degree()))?;
        if op0.degree() > 1 || op1.degree() > 1 {
            return Err(Error::MulDegree);
        }
        if !op0.element().is_ntt || !op1.element().is_ntt {
            return Err(Error::MulNotNTT);
        }

        let context: Arc<Context> = self.context.clone();
        let min_level: usize = op0.level().min(op1.level()).min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);

        let new_scale: usize = op0.scale() + op1.scale();

        if op0.degree() + op1.degree() == 2 {
            let (el0, el1) = (op0.element(), op1.element());
            let squaring: bool = std::ptr::eq(el0, el1);

            let [c00, c01, c2, digit_buf, c2_coeff, _] = &mut self.polypool;
            ring.a_prepare_montgomery_into_b::<ONCE>(&el0.value[0], c00);
            ring.a_prepare_montgomery_into_b::<ONCE>(&el0.value[1], c01);

            if rlk.is_none() {
                ct_out.0.resize(&context, 2);
            } else {
                ct_out.0.resize(&context, 1);
            }

            ring.a_mul_b_montgomery_into_c::<ONCE>(c00, &el1.value[0], &mut ct_out.0.value[0]);
            ring.a_mul_b_montgomery_into_c::<ONCE>(c00, &el1.value[1], &mut ct_out.0.value[1]);
            if squaring {
                ring.a_mul_b_scalar_into_a::<ONCE>(&2, &mut ct_out.0.value[1]);
            } else {
                ring.a_mul_b_montgomery_add_c_into_c::<ONCE>(
                    c01,
                    &el1.value[0],
                    &mut ct_out.0.value[1],
                );
            }

            match rlk {
                None => {
                    ring.a_mul_b_montgomery_into_c::<ONCE>(c01, &el1.value[1], &mut ct_out.0.value[2]);
                }
                Some(rlk) => {
                    ring.a_mul_b_montgomery_into_c::<ONCE>(c01, &el1.value[1], c2);
                    ring.intt::<false>(c2, c2_coeff);
                    switch_keys_core(&ring, c2_coeff, &rlk.key, digit_buf, &mut ct_out.0);
                }
            }
        } else {
            // Plaintext times ciphertext.
            let (el_ct, el_pt) = if op0.degree() == 1 {
                (op0.element(), op1.element())
            } else {
                (op1.element(), op0.element())
            };
            ct_out.0.resize(&context, 1);
            let [c00, _, _, _, _, _] = &mut self.polypool;
            ring.a_prepare_montgomery_into_b::<ONCE>(&el_pt.value[0], c00);
            ring.a_mul_b_montgomery_into_c::<ONCE>(c00, &el_ct.value[0], &mut ct_out.0.value[0]);
            ring.a_mul_b_montgomery_into_c::<ONCE>(c00, &el_ct.value[1], &mut ct_out.0.value[1]);
        }

        ct_out.0.scale = new_scale;
        ct_out.0.is_ntt = true;
        Ok(())
    }

    pub fn mul_relin_new(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        rlk: Option<&EvaluationKey>,
    ) -> Result<Ciphertext, Error> {
        let mut ct_out: Ciphertext = Ciphertext::new(
            &self.context,
            1,
            op0.level().min(op1.level()),
            op0.scale() + op1.scale(),
        );
        self.mul_relin(op0, op1, rlk, &mut ct_out)?;
        Ok(ct_out)
    }

    /// Relinearizes a degree-2 ciphertext down to degree 1.
    #[instrument(skip_all)]
    pub fn relinearize(
        &mut self,
        ct0: &Ciphertext,
        rlk: &EvaluationKey,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct0.0.degree() != 2 {
            return Err(Error::RelinearizeDegree);
        }
        if ct_out.0.degree() < 1 {
            return Err(Error::ReceiverDegreeTooSmall);
        }

        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        ct_out.0.resize(&context, 1);
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);

        ring.copy(&ct0.0.value[0], &mut ct_out.0.value[0]);
        ring.copy(&ct0.0.value[1], &mut ct_out.0.value[1]);

        let [_, _, _, digit_buf, c2_coeff, _] = &mut self.polypool;
        ring.intt::<false>(&ct0.0.value[2], c2_coeff);
        switch_keys_core(&ring, c2_coeff, &rlk.key, digit_buf, &mut ct_out.0);

        ct_out.0.scale = ct0.scale();
        ct_out.0.is_ntt = true;
        Ok(())
    }

    /// Re-encrypts ct0 under the key targeted by the switching key.
    #[instrument(skip_all)]
    pub fn switch_keys(
        &mut self,
        ct0: &Ciphertext,
        switching_key: &SwitchingKey,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct0.0.degree() != 1 || ct_out.0.degree() != 1 {
            return Err(Error::SwitchKeysDegree);
        }

        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);

        // The c1 component is absorbed by the gadget inner product.
        ring.copy(&ct0.0.value[0], &mut ct_out.0.value[0]);
        ct_out.0.value[1].zero();

        let [_, _, _, digit_buf, c2_coeff, _] = &mut self.polypool;
        ring.intt::<false>(&ct0.0.value[1], c2_coeff);
        switch_keys_core(&ring, c2_coeff, switching_key, digit_buf, &mut ct_out.0);

        ct_out.0.scale = ct0.scale();
        ct_out.0.is_ntt = true;
        Ok(())
    }

    /// Rotates the slots of ct0 by k positions to the left. Requires
    /// either the specific rotation key or the full power-of-two set.
    pub fn rotate_columns(
        &mut self,
        ct0: &Ciphertext,
        k: usize,
        rot_keys: &RotationKeys,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        let slots: usize = self.context.slots();
        let k: usize = k & (slots - 1);

        if ct0.0.degree() != 1 || ct_out.0.degree() != 1 {
            return Err(Error::RotateDegree);
        }

        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);
        let ring: RingRNS<u64> = context.ring_q().at_level(min_level);

        if k == 0 {
            ring.copy(&ct0.0.value[0], &mut ct_out.0.value[0]);
            ring.copy(&ct0.0.value[1], &mut ct_out.0.value[1]);
            ct_out.0.scale = ct0.scale();
            ct_out.0.is_ntt = ct0.is_ntt();
            return Ok(());
        }

        if let Some(key) = rot_keys.rot_col_left.get(&k) {
            let gal_el: usize = context.gal_el_rot_col_left()[k];
            self.permute_ntt(ct0, gal_el, key, ct_out);
            return Ok(());
        }

        if rot_keys.has_pow2_rotations(context.n()) {
            ring.copy(&ct0.0.value[0], &mut ct_out.0.value[0]);
            ring.copy(&ct0.0.value[1], &mut ct_out.0.value[1]);
            ct_out.0.scale = ct0.scale();
            ct_out.0.is_ntt = true;
            if k.count_ones() <= (slots - k).count_ones() {
                self.rotate_columns_pow2::<true>(k, &rot_keys.rot_col_left, ct_out);
            } else {
                self.rotate_columns_pow2::<false>(slots - k, &rot_keys.rot_col_right, ct_out);
            }
            return Ok(());
        }

        Err(Error::RotationKeysMissing)
    }

    fn rotate_columns_pow2<const LEFT: bool>(
        &mut self,
        mut k: usize,
        keys: &BTreeMap<usize, SwitchingKey>,
        ct_out: &mut Ciphertext,
    ) {
        let context: Arc<Context> = self.context.clone();
        let mask: usize = (context.n() << 1) - 1;

        let mut generator: usize = if LEFT {
            context.gal_el_rot_col_left()[1]
        } else {
            context.gal_el_rot_col_right()[1]
        };

        let mut key_index: usize = 1;
        while k > 0 {
            if k & 1 == 1 {
                self.permute_ntt_inplace(generator, &keys[&key_index], ct_out);
            }
            generator = generator.wrapping_mul(generator) & mask;
            key_index <<= 1;
            k >>= 1;
        }
    }

    /// Conjugates the slots of ct0.
    pub fn conjugate(
        &mut self,
        ct0: &Ciphertext,
        rot_keys: &RotationKeys,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct0.0.degree() != 1 || ct_out.0.degree() != 1 {
            return Err(Error::RotateDegree);
        }
        let key: &SwitchingKey = rot_keys
            .conjugate
            .as_ref()
            .ok_or(Error::ConjugateKeyMissing)?;

        let context: Arc<Context> = self.context.clone();
        let min_level: usize = ct0.level().min(ct_out.level());
        ct_out.0.drop_to_level(&context, min_level);

        self.permute_ntt(ct0, context.gal_el_conjugate(), key, ct_out);
        Ok(())
    }

    fn permute_ntt(
        &mut self,
        ct0: &Ciphertext,
        gal_el: usize,
        key: &SwitchingKey,
        ct_out: &mut Ciphertext,
    ) {
        let context: Arc<Context> = self.context.clone();
        let ring: RingRNS<u64> = context.ring_q().at_level(ct_out.level());

        let [_, _, _, digit_buf, c2_coeff, perm] = &mut self.polypool;
        ring.a_apply_automorphism_ntt_into_b(&ct0.0.value[0], gal_el, &mut ct_out.0.value[0]);
        ring.a_apply_automorphism_ntt_into_b(&ct0.0.value[1], gal_el, perm);
        ring.intt::<false>(perm, c2_coeff);
        ct_out.0.value[1].zero();
        switch_keys_core(&ring, c2_coeff, key, digit_buf, &mut ct_out.0);

        ct_out.0.scale = ct0.scale();
        ct_out.0.is_ntt = true;
    }

    fn permute_ntt_inplace(&mut self, gal_el: usize, key: &SwitchingKey, ct_out: &mut Ciphertext) {
        let context: Arc<Context> = self.context.clone();
        let ring: RingRNS<u64> = context.ring_q().at_level(ct_out.level());

        let [p0, _, _, digit_buf, c2_coeff, perm] = &mut self.polypool;
        ring.a_apply_automorphism_ntt_into_b(&ct_out.0.value[0], gal_el, p0);
        ring.a_apply_automorphism_ntt_into_b(&ct_out.0.value[1], gal_el, perm);
        ring.copy(p0, &mut ct_out.0.value[0]);
        ring.intt::<false>(perm, c2_coeff);
        ct_out.0.value[1].zero();
        switch_keys_core(&ring, c2_coeff, key, digit_buf, &mut ct_out.0);
    }
}

/// Rounds re and im at the given log2 scale and returns the two
/// half-range constants (re + im * psi^(n/2), re - im * psi^(n/2))
/// mod the ring modulus.
fn split_complex_constant(r: &Ring<u64>, constant: Complex64, log_scale: usize) -> (u64, u64) {
    let q: u64 = r.modulus.q;
    let scale_f: f64 = (2.0f64).powi(log_scale as i32);
    let re: u64 = ((constant.re * scale_f).round() as i128).rem_euclid(q as i128) as u64;
    let im: u64 = ((constant.im * scale_f).round() as i128).rem_euclid(q as i128) as u64;

    let psi: u64 = r.ntt.psi_forward_rev(1).0;
    let im_psi: u64 = r.modulus.barrett.mul::<BARRETT>(&im, &psi);

    let mut lo: u64 = 0;
    let mut hi: u64 = 0;
    r.modulus.sa_add_sb_into_sc::<ONCE>(&re, &im_psi, &mut lo);
    r.modulus.sa_sub_sb_into_sc::<1, ONCE>(&re, &im_psi, &mut hi);
    (lo, hi)
}

/// Gadget inner product: decomposes c2 in base-2^w digit windows per
/// modulus, lifts each digit to the evaluation domain and accumulates
/// the products with both switching-key halves into (ct_out[0],
/// ct_out[1]), with a lazy reduction every 8 accumulations.
pub(crate) fn switch_keys_core(
    ring: &RingRNS<u64>,
    c2: &PolyRNS<u64>,
    key: &SwitchingKey,
    c2qiw: &mut PolyRNS<u64>,
    ct_out: &mut Element,
) {
    let mut reduce_count: usize = 0;

    for i in 0..ring.level() + 1 {
        for j in 0..key.key[i].len() {
            ring.a_row_ith_digit_base_b_broadcast_into_c(i, j, key.log_base, c2, c2qiw);
            ring.ntt_inplace::<false>(c2qiw);

            ring.a_mul_b_montgomery_add_c_into_c::<NONE>(&key.key[i][j].0, c2qiw, &mut ct_out.value[0]);
            ring.a_mul_b_montgomery_add_c_into_c::<NONE>(&key.key[i][j].1, c2qiw, &mut ct_out.value[1]);

            if reduce_count & 7 == 7 {
                ring.a_reduce_into_a::<BARRETT>(&mut ct_out.value[0]);
                ring.a_reduce_into_a::<BARRETT>(&mut ct_out.value[1]);
            }
            reduce_count += 1;
        }
    }

    if reduce_count == 0 || (reduce_count - 1) & 7 != 7 {
        ring.a_reduce_into_a::<BARRETT>(&mut ct_out.value[0]);
        ring.a_reduce_into_a::<BARRETT>(&mut ct_out.value[1]);
    }
}
