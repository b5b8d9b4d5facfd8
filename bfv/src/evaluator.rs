use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::elem::{Element, Operand};
use crate::error::Error;
use crate::keys::{EvaluationKey, RotationKeys, SwitchingKey};
use math::modulus::{BARRETT, NONE, ONCE};
use math::poly::PolyRNS;
use math::ring::impl_u64::basis_extension::BasisExtender;
use math::ring::impl_u64::scaling::ComplexScaler;
use math::ring::RingRNS;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

/// Evaluator of the homomorphic operations. It owns the basis
/// extender and the t/Q scaler of the tensoring, and a private
/// scratch pool invalidated on every call; instances are not
/// reentrant and must not be shared.
pub struct Evaluator {
    context: Arc<Context>,
    basis_extender: BasisExtender,
    complex_scaler: ComplexScaler,
    polypool: [PolyRNS<u64>; 4],
    ctpool: [Element; 3],
}

impl Evaluator {
    pub fn new(context: Arc<Context>) -> Evaluator {
        let basis_extender: BasisExtender = BasisExtender::new(context.ring_q(), context.ring_p());
        let complex_scaler: ComplexScaler =
            ComplexScaler::new(context.t(), context.ring_q(), context.ring_p());
        let polypool: [PolyRNS<u64>; 4] = std::array::from_fn(|_| context.ring_qp().new_polyrns());
        let ctpool: [Element; 3] =
            std::array::from_fn(|_| Element::new_from_ring(context.ring_qp(), 5));
        Evaluator {
            context,
            basis_extender,
            complex_scaler,
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

    fn check_unary(op0: &impl Operand, ct_out: &Ciphertext) -> Result<(), Error> {
        if op0.degree() == 0 {
            return Err(Error::BothPlaintext);
        }
        if ct_out.0.degree() < op0.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        Ok(())
    }

    /// Component-wise application of f over the matching degrees; the
    /// tail of the higher-degree operand is copied (negated for NEG_TAIL)
    /// onto the receiver.
    fn evaluate_binary<const NEG_TAIL: bool, F>(
        ring: &RingRNS<u64>,
        el0: &Element,
        el1: &Element,
        el_out: &mut Element,
        f: F,
    ) where
        F: Fn(&RingRNS<u64>, &PolyRNS<u64>, &PolyRNS<u64>, &mut PolyRNS<u64>),
    {
        let min_degree: usize = el0.degree().min(el1.degree());
        let max_degree: usize = el0.degree().max(el1.degree());

        for i in 0..min_degree + 1 {
            f(ring, &el0.value[i], &el1.value[i], &mut el_out.value[i]);
        }

        if el0.degree() > el1.degree() {
            for i in min_degree + 1..max_degree + 1 {
                ring.copy(&el0.value[i], &mut el_out.value[i]);
            }
        } else if el1.degree() > el0.degree() {
            for i in min_degree + 1..max_degree + 1 {
                if NEG_TAIL {
                    ring.a_neg_into_b::<1, ONCE>(&el1.value[i], &mut el_out.value[i]);
                } else {
                    ring.copy(&el1.value[i], &mut el_out.value[i]);
                }
            }
        }
        el_out.is_ntt = el0.is_ntt;
    }

    /// Adds op0 to op1 and returns the result on ct_out.
    pub fn add(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        Self::check_binary(op0, op1, ct_out, op0.degree().max(op1.degree()))?;
        Self::evaluate_binary::<false, _>(
            self.context.ring_q(),
            op0.element(),
            op1.element(),
            &mut ct_out.0,
            |ring, a, b, c| ring.a_add_b_into_c::<ONCE>(a, b, c),
        );
        Ok(())
    }

    pub fn add_new(&mut self, op0: &impl Operand, op1: &impl Operand) -> Result<Ciphertext, Error> {
        let mut ct_out: Ciphertext =
            Ciphertext::new(&self.context, op0.degree().max(op1.degree()).max(1));
        self.add(op0, op1, &mut ct_out)?;
        Ok(ct_out)
    }

    /// Adds op0 to op1 without modular reduction; the result must be
    /// reduced before any range-sensitive use.
    pub fn add_no_mod(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        Self::check_binary(op0, op1, ct_out, op0.degree().max(op1.degree()))?;
        Self::evaluate_binary::<false, _>(
            self.context.ring_q(),
            op0.element(),
            op1.element(),
            &mut ct_out.0,
            |ring, a, b, c| ring.a_add_b_into_c::<NONE>(a, b, c),
        );
        Ok(())
    }

    /// Adds op into the receiver.
    pub fn add_inplace(&mut self, op: &impl Operand, ct_rx: &mut Ciphertext) -> Result<(), Error> {
        if ct_rx.0.degree() < op.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        let ring: &RingRNS<u64> = self.context.ring_q();
        for i in 0..op.degree() + 1 {
            ring.a_add_b_into_b::<ONCE>(&op.element().value[i], &mut ct_rx.0.value[i]);
        }
        Ok(())
    }

    /// Subtracts op1 from op0 and returns the result on ct_out.
    pub fn sub(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        Self::check_binary(op0, op1, ct_out, op0.degree().max(op1.degree()))?;
        Self::evaluate_binary::<true, _>(
            self.context.ring_q(),
            op0.element(),
            op1.element(),
            &mut ct_out.0,
            |ring, a, b, c| ring.a_sub_b_into_c::<1, ONCE>(a, b, c),
        );
        Ok(())
    }

    pub fn sub_new(&mut self, op0: &impl Operand, op1: &impl Operand) -> Result<Ciphertext, Error> {
        let mut ct_out: Ciphertext =
            Ciphertext::new(&self.context, op0.degree().max(op1.degree()).max(1));
        self.sub(op0, op1, &mut ct_out)?;
        Ok(ct_out)
    }

    pub fn sub_no_mod(
        &mut self,
        op0: &impl Operand,
        op1: &impl Operand,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        Self::check_binary(op0, op1, ct_out, op0.degree().max(op1.degree()))?;
        Self::evaluate_binary::<true, _>(
            self.context.ring_q(),
            op0.element(),
            op1.element(),
            &mut ct_out.0,
            |ring, a, b, c| ring.a_sub_b_into_c::<1, NONE>(a, b, c),
        );
        Ok(())
    }

    /// Negates op and returns the result on ct_out.
    pub fn neg(&mut self, op: &impl Operand, ct_out: &mut Ciphertext) -> Result<(), Error> {
        Self::check_unary(op, ct_out)?;
        let ring: &RingRNS<u64> = self.context.ring_q();
        for i in 0..op.degree() + 1 {
            ring.a_neg_into_b::<1, ONCE>(&op.element().value[i], &mut ct_out.0.value[i]);
        }
        ct_out.0.is_ntt = op.element().is_ntt;
        Ok(())
    }

    /// Canonicalizes every residue of op to [0, q_i).
    pub fn reduce(&mut self, op: &impl Operand, ct_out: &mut Ciphertext) -> Result<(), Error> {
        Self::check_unary(op, ct_out)?;
        let ring: &RingRNS<u64> = self.context.ring_q();
        for i in 0..op.degree() + 1 {
            ring.copy(&op.element().value[i], &mut ct_out.0.value[i]);
            ring.a_reduce_into_a::<BARRETT>(&mut ct_out.0.value[i]);
        }
        ct_out.0.is_ntt = op.element().is_ntt;
        Ok(())
    }

    /// Multiplies op by a scalar.
    pub fn mul_scalar(
        &mut self,
        op: &impl Operand,
        scalar: u64,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        Self::check_unary(op, ct_out)?;
        let ring: &RingRNS<u64> = self.context.ring_q();
        for i in 0..op.degree() + 1 {
            ring.a_mul_b_scalar_into_c::<ONCE>(&op.element().value[i], &scalar, &mut ct_out.0.value[i]);
        }
        ct_out.0.is_ntt = op.element().is_ntt;
        Ok(())
    }

    /// Multiplies op0 by op1 with the tensoring over QP followed by
    /// the rounded t/Q rescaling; the output degree is the sum of the
    /// input degrees and no relinearization is applied.
    #[instrument(skip_all)]
    pub fn mul(
        &mut self,
        op0: &Ciphertext,
        op1: &impl Operand,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        Self::check_binary(op0, op1, ct_out, op0.degree() + op1.degree())?;
        self.tensor_and_rescale(&op0.0, op1.element(), &mut ct_out.0);
        Ok(())
    }

    pub fn mul_new(&mut self, op0: &Ciphertext, op1: &impl Operand) -> Result<Ciphertext, Error> {
        let mut ct_out: Ciphertext = Ciphertext::new(&self.context, op0.degree() + op1.degree());
        self.mul(op0, op1, &mut ct_out)?;
        Ok(ct_out)
    }

    /// Squares op0, halving the cross-term products of the tensoring.
    #[instrument(skip_all)]
    pub fn square(&mut self, op0: &Ciphertext, ct_out: &mut Ciphertext) -> Result<(), Error> {
        if ct_out.0.degree() < 2 * op0.degree() {
            return Err(Error::ReceiverDegreeTooSmall);
        }
        self.tensor_square_and_rescale(&op0.0, &mut ct_out.0);
        Ok(())
    }

    fn tensor_and_rescale(&mut self, el0: &Element, el1: &Element, el_out: &mut Element) {
        let context: Arc<Context> = self.context.clone();
        let ring_q: &RingRNS<u64> = context.ring_q();
        let ring_qp: &RingRNS<u64> = context.ring_qp();
        let (d0, d1) = (el0.degree(), el1.degree());

        el_out.resize(ring_q, d0 + d1);

        // Extends both operands from Q to QP and maps them to the
        // evaluation domain.
        for i in 0..d0 + 1 {
            self.basis_extender
                .extend_basis(&el0.value[i], &mut self.ctpool[0].value[i]);
            ring_qp.ntt_inplace::<false>(&mut self.ctpool[0].value[i]);
        }
        for i in 0..d1 + 1 {
            self.basis_extender
                .extend_basis(&el1.value[i], &mut self.ctpool[1].value[i]);
            ring_qp.ntt_inplace::<false>(&mut self.ctpool[1].value[i]);
        }

        let [cp0, cp1, cp2] = &mut self.ctpool;
        let [c00, c01, _, _] = &mut self.polypool;

        if d0 == 1 && d1 == 1 {
            ring_qp.a_prepare_montgomery_into_b::<ONCE>(&cp0.value[0], c00);
            ring_qp.a_prepare_montgomery_into_b::<ONCE>(&cp0.value[1], c01);

            ring_qp.a_mul_b_montgomery_into_c::<ONCE>(c00, &cp1.value[0], &mut cp2.value[0]);
            ring_qp.a_mul_b_montgomery_into_c::<ONCE>(c00, &cp1.value[1], &mut cp2.value[1]);
            ring_qp.a_mul_b_montgomery_add_c_into_c::<ONCE>(c01, &cp1.value[0], &mut cp2.value[1]);
            ring_qp.a_mul_b_montgomery_into_c::<ONCE>(c01, &cp1.value[1], &mut cp2.value[2]);
        } else {
            for i in 0..d0 + d1 + 1 {
                cp2.value[i].zero();
            }
            for i in 0..d0 + 1 {
                ring_qp.a_prepare_montgomery_into_a::<ONCE>(&mut cp0.value[i]);
                for j in 0..d1 + 1 {
                    ring_qp.a_mul_b_montgomery_add_c_into_c::<ONCE>(
                        &cp0.value[i],
                        &cp1.value[j],
                        &mut cp2.value[i + j],
                    );
                }
            }
        }

        // Back to the coefficient domain, then scales by t/Q with
        // rounding, shrinking the basis from QP to Q.
        for i in 0..d0 + d1 + 1 {
            ring_qp.intt_inplace::<false>(&mut cp2.value[i]);
            self.complex_scaler.scale(&cp2.value[i], &mut el_out.value[i]);
        }
        el_out.is_ntt = false;
    }

    fn tensor_square_and_rescale(&mut self, el0: &Element, el_out: &mut Element) {
        let context: Arc<Context> = self.context.clone();
        let ring_q: &RingRNS<u64> = context.ring_q();
        let ring_qp: &RingRNS<u64> = context.ring_qp();
        let d0: usize = el0.degree();

        el_out.resize(ring_q, 2 * d0);

        for i in 0..d0 + 1 {
            self.basis_extender
                .extend_basis(&el0.value[i], &mut self.ctpool[0].value[i]);
            ring_qp.ntt_inplace::<false>(&mut self.ctpool[0].value[i]);
        }

        let [cp0, cp1, cp2] = &mut self.ctpool;
        let [c00, c01, _, _] = &mut self.polypool;

        if d0 == 1 {
            ring_qp.a_prepare_montgomery_into_b::<ONCE>(&cp0.value[0], c00);
            ring_qp.a_prepare_montgomery_into_b::<ONCE>(&cp0.value[1], c01);

            ring_qp.a_mul_b_montgomery_into_c::<ONCE>(c00, &cp0.value[0], &mut cp2.value[0]);
            ring_qp.a_mul_b_montgomery_into_c::<ONCE>(c00, &cp0.value[1], &mut cp2.value[1]);
            ring_qp.a_mul_b_scalar_into_a::<ONCE>(&2, &mut cp2.value[1]);
            ring_qp.a_mul_b_montgomery_into_c::<ONCE>(c01, &cp0.value[1], &mut cp2.value[2]);
        } else {
            for i in 0..2 * d0 + 1 {
                cp2.value[i].zero();
            }
            for i in 0..d0 + 1 {
                ring_qp.a_prepare_montgomery_into_b::<ONCE>(&cp0.value[i], &mut cp1.value[i]);
            }
            for i in 0..d0 + 1 {
                // Cross terms count twice.
                for j in i + 1..d0 + 1 {
                    ring_qp.a_mul_b_montgomery_add_c_into_c::<ONCE>(
                        &cp1.value[i],
                        &cp0.value[j],
                        &mut cp2.value[i + j],
                    );
                    ring_qp.a_mul_b_montgomery_add_c_into_c::<ONCE>(
                        &cp1.value[i],
                        &cp0.value[j],
                        &mut cp2.value[i + j],
                    );
                }
                ring_qp.a_mul_b_montgomery_add_c_into_c::<ONCE>(
                    &cp1.value[i],
                    &cp0.value[i],
                    &mut cp2.value[2 * i],
                );
            }
        }

        for i in 0..2 * d0 + 1 {
            ring_qp.intt_inplace::<false>(&mut cp2.value[i]);
            self.complex_scaler.scale(&cp2.value[i], &mut el_out.value[i]);
        }
        el_out.is_ntt = false;
    }

    /// Relinearizes ct0 down to degree 1 using the evaluation key,
    /// which must carry switching keys for s^2 up to s^degree.
    #[instrument(skip_all)]
    pub fn relinearize(
        &mut self,
        ct0: &Ciphertext,
        rlk: &EvaluationKey,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        let context: Arc<Context> = self.context.clone();
        let ring_q: &RingRNS<u64> = context.ring_q();

        if ct0.0.degree() > rlk.max_degree() {
            return Err(Error::RelinKeyDegreeTooSmall);
        }

        if ct0.0.degree() < 2 {
            ct_out.0.resize(ring_q, ct0.0.degree());
            ct_out.0.copy_from(&ct0.0);
            return Ok(());
        }

        if ct_out.0.degree() < 1 {
            return Err(Error::ReceiverDegreeTooSmall);
        }

        ring_q.ntt::<false>(&ct0.0.value[0], &mut ct_out.0.value[0]);
        ring_q.ntt::<false>(&ct0.0.value[1], &mut ct_out.0.value[1]);

        for degree in (2..ct0.0.degree() + 1).rev() {
            let [_, _, p2, p3] = &mut self.polypool;
            let c2: &PolyRNS<u64> = if ct0.is_ntt() {
                ring_q.intt::<false>(&ct0.0.value[degree], p2);
                p2
            } else {
                &ct0.0.value[degree]
            };
            switch_keys_core(ring_q, c2, &rlk.keys[degree - 2], p3, &mut ct_out.0);
        }

        ct_out.0.resize(ring_q, 1);
        ring_q.intt_inplace::<false>(&mut ct_out.0.value[0]);
        ring_q.intt_inplace::<false>(&mut ct_out.0.value[1]);
        ct_out.0.is_ntt = false;
        Ok(())
    }

    pub fn relinearize_new(
        &mut self,
        ct0: &Ciphertext,
        rlk: &EvaluationKey,
    ) -> Result<Ciphertext, Error> {
        let mut ct_out: Ciphertext = Ciphertext::new(&self.context, 1);
        self.relinearize(ct0, rlk, &mut ct_out)?;
        Ok(ct_out)
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
        let ring_q: &RingRNS<u64> = context.ring_q();

        // The c1 component is absorbed by the gadget inner product.
        ring_q.ntt::<false>(&ct0.0.value[0], &mut ct_out.0.value[0]);
        ct_out.0.value[1].zero();

        let [_, _, p2, p3] = &mut self.polypool;
        let c2: &PolyRNS<u64> = if ct0.is_ntt() {
            ring_q.intt::<false>(&ct0.0.value[1], p2);
            p2
        } else {
            &ct0.0.value[1]
        };
        switch_keys_core(ring_q, c2, switching_key, p3, &mut ct_out.0);

        ring_q.intt_inplace::<false>(&mut ct_out.0.value[0]);
        ring_q.intt_inplace::<false>(&mut ct_out.0.value[1]);
        ct_out.0.is_ntt = false;
        Ok(())
    }

    /// Rotates the columns of ct0 by k slots to the left. Requires
    /// either the specific rotation key or the full power-of-two set.
    pub fn rotate_columns(
        &mut self,
        ct0: &Ciphertext,
        k: usize,
        rot_keys: &RotationKeys,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        let n: usize = self.context.n();
        let k: usize = k & ((n >> 1) - 1);

        if k == 0 {
            ct_out.0.resize(self.context.ring_q(), ct0.0.degree());
            ct_out.0.copy_from(&ct0.0);
            return Ok(());
        }

        if ct0.0.degree() != 1 || ct_out.0.degree() != 1 {
            return Err(Error::RotateDegree);
        }

        if let Some(key) = rot_keys.rot_col_left.get(&k) {
            let gal_el: usize = self.context.gal_el_rot_col_left()[k];
            self.permute(ct0, gal_el, key, ct_out);
            return Ok(());
        }

        if rot_keys.has_pow2_rotations(n) {
            if k.count_ones() <= ((n >> 1) - k).count_ones() {
                self.rotate_columns_pow2::<true>(ct0, k, &rot_keys.rot_col_left, ct_out);
            } else {
                self.rotate_columns_pow2::<false>(ct0, (n >> 1) - k, &rot_keys.rot_col_right, ct_out);
            }
            return Ok(());
        }

        Err(Error::RotationKeysMissing)
    }

    fn rotate_columns_pow2<const LEFT: bool>(
        &mut self,
        ct0: &Ciphertext,
        mut k: usize,
        keys: &BTreeMap<usize, SwitchingKey>,
        ct_out: &mut Ciphertext,
    ) {
        let context: Arc<Context> = self.context.clone();
        let ring_q: &RingRNS<u64> = context.ring_q();
        let mask: usize = (context.n() << 1) - 1;

        let mut generator: usize = if LEFT {
            context.gal_el_rot_col_left()[1]
        } else {
            context.gal_el_rot_col_right()[1]
        };

        let input_ntt: bool = ct0.is_ntt();
        if input_ntt {
            ct_out.0.copy_from(&ct0.0);
        } else {
            ring_q.ntt::<false>(&ct0.0.value[0], &mut ct_out.0.value[0]);
            ring_q.ntt::<false>(&ct0.0.value[1], &mut ct_out.0.value[1]);
            ct_out.0.is_ntt = true;
        }

        let mut key_index: usize = 1;
        while k > 0 {
            if k & 1 == 1 {
                self.permute_inplace(generator, &keys[&key_index], ct_out);
            }
            generator = generator.wrapping_mul(generator) & mask;
            key_index <<= 1;
            k >>= 1;
        }

        if !input_ntt {
            ring_q.intt_inplace::<false>(&mut ct_out.0.value[0]);
            ring_q.intt_inplace::<false>(&mut ct_out.0.value[1]);
            ct_out.0.is_ntt = false;
        }
    }

    /// Swaps the two rows of the slot grid.
    pub fn rotate_rows(
        &mut self,
        ct0: &Ciphertext,
        rot_keys: &RotationKeys,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct0.0.degree() != 1 || ct_out.0.degree() != 1 {
            return Err(Error::RotateDegree);
        }
        let key: &SwitchingKey = rot_keys.rot_row.as_ref().ok_or(Error::RowRotationKeyMissing)?;
        self.permute(ct0, self.context.gal_el_rot_row(), key, ct_out);
        Ok(())
    }

    /// Sums all the slots of ct0; every slot of the output holds the
    /// total. Requires the power-of-two rotations and the row swap.
    pub fn inner_sum(
        &mut self,
        ct0: &Ciphertext,
        rot_keys: &RotationKeys,
        ct_out: &mut Ciphertext,
    ) -> Result<(), Error> {
        if ct0.0.degree() != 1 || ct_out.0.degree() != 1 {
            return Err(Error::InnerSumDegree);
        }

        let mut ct_tmp: Ciphertext = Ciphertext::new(&self.context, 1);
        ct_out.0.copy_from(&ct0.0);

        let mut i: usize = 1;
        while i < self.context.n() >> 1 {
            self.rotate_columns(ct_out, i, rot_keys, &mut ct_tmp)?;
            self.add_inplace(&ct_tmp, ct_out)?;
            i <<= 1;
        }

        self.rotate_rows(ct_out, rot_keys, &mut ct_tmp)?;
        self.add_inplace(&ct_tmp, ct_out)?;
        Ok(())
    }

    /// Applies the Galois automorphism and re-encrypts under the
    /// original key with the matching switching key.
    fn permute(
        &mut self,
        ct0: &Ciphertext,
        gal_el: usize,
        key: &SwitchingKey,
        ct_out: &mut Ciphertext,
    ) {
        let context: Arc<Context> = self.context.clone();
        let ring_q: &RingRNS<u64> = context.ring_q();

        if ct0.is_ntt() {
            ring_q.a_apply_automorphism_ntt_into_b(&ct0.0.value[0], gal_el, &mut ct_out.0.value[0]);
            {
                let [_, p1, p2, p3] = &mut self.polypool;
                ring_q.a_apply_automorphism_ntt_into_b(&ct0.0.value[1], gal_el, p1);
                ring_q.intt::<false>(p1, p2);
                ct_out.0.value[1].zero();
                switch_keys_core(ring_q, p2, key, p3, &mut ct_out.0);
            }
            ct_out.0.is_ntt = true;
        } else {
            {
                let [p0, p1, _, p3] = &mut self.polypool;
                ring_q.a_apply_automorphism_into_b(&ct0.0.value[0], gal_el, p0);
                ring_q.a_apply_automorphism_into_b(&ct0.0.value[1], gal_el, p1);
                ring_q.ntt::<false>(p0, &mut ct_out.0.value[0]);
                ct_out.0.value[1].zero();
                switch_keys_core(ring_q, p1, key, p3, &mut ct_out.0);
            }
            ring_q.intt_inplace::<false>(&mut ct_out.0.value[0]);
            ring_q.intt_inplace::<false>(&mut ct_out.0.value[1]);
            ct_out.0.is_ntt = false;
        }
    }

    /// In-place permutation of a ciphertext already in the evaluation
    /// domain.
    fn permute_inplace(&mut self, gal_el: usize, key: &SwitchingKey, ct_out: &mut Ciphertext) {
        let context: Arc<Context> = self.context.clone();
        let ring_q: &RingRNS<u64> = context.ring_q();

        let [p0, p1, p2, p3] = &mut self.polypool;
        ring_q.a_apply_automorphism_ntt_into_b(&ct_out.0.value[0], gal_el, p0);
        ring_q.a_apply_automorphism_ntt_into_b(&ct_out.0.value[1], gal_el, p1);
        ring_q.copy(p0, &mut ct_out.0.value[0]);
        ring_q.intt::<false>(p1, p2);
        ct_out.0.value[1].zero();
        switch_keys_core(ring_q, p2, key, p3, &mut ct_out.0);
    }
}

/// Gadget inner product: decomposes c2 in base-2^w digit windows per
/// modulus, lifts each digit to the evaluation domain and accumulates
/// the products with both switching-key halves into (ct_out[0],
/// ct_out[1]), with a lazy reduction every 8 accumulations.
pub(crate) fn switch_keys_core(
    ring_q: &RingRNS<u64>,
    c2: &PolyRNS<u64>,
    key: &SwitchingKey,
    c2qiw: &mut PolyRNS<u64>,
    ct_out: &mut Element,
) {
    let mut reduce_count: usize = 0;

    for i in 0..ring_q.level() + 1 {
        for j in 0..key.key[i].len() {
            ring_q.a_row_ith_digit_base_b_broadcast_into_c(i, j, key.log_base, c2, c2qiw);
            ring_q.ntt_inplace::<false>(c2qiw);

            ring_q.a_mul_b_montgomery_add_c_into_c::<NONE>(
                &key.key[i][j].0,
                c2qiw,
                &mut ct_out.value[0],
            );
            ring_q.a_mul_b_montgomery_add_c_into_c::<NONE>(
                &key.key[i][j].1,
                c2qiw,
                &mut ct_out.value[1],
            );

            if reduce_count & 7 == 7 {
                ring_q.a_reduce_into_a::<BARRETT>(&mut ct_out.value[0]);
                ring_q.a_reduce_into_a::<BARRETT>(&mut ct_out.value[1]);
            }
            reduce_count += 1;
        }
    }

    if reduce_count == 0 || (reduce_count - 1) & 7 != 7 {
        ring_q.a_reduce_into_a::<BARRETT>(&mut ct_out.value[0]);
        ring_q.a_reduce_into_a::<BARRETT>(&mut ct_out.value[1]);
    }
}
