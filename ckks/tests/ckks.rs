use ckks::*;
use num_complex::Complex64;
use sampling::source::Source;
use std::sync::Arc;

struct TestContext {
    context: Arc<Context>,
    encoder: Encoder,
    sk: Arc<SecretKey>,
    kgen: KeyGenerator,
    encryptor: Encryptor,
    decryptor: Decryptor,
    evaluator: Evaluator,
    source: Source,
}

fn setup() -> TestContext {
    let params: Parameters = parameters::default_parameters()[parameters::PN13LV4].clone();
    let context: Arc<Context> = Arc::new(Context::new(&params).unwrap());
    let mut kgen: KeyGenerator = KeyGenerator::new(context.clone());
    let (sk, pk) = kgen.gen_key_pair();
    let (sk, pk) = (Arc::new(sk), Arc::new(pk));

    TestContext {
        context: context.clone(),
        encoder: Encoder::new(context.clone()),
        sk: sk.clone(),
        kgen,
        encryptor: Encryptor::new_from_pk(context.clone(), pk),
        decryptor: Decryptor::new(context.clone(), sk),
        evaluator: Evaluator::new(context),
        source: Source::new(sampling::source::new_seed()),
    }
}

fn random_values(tc: &mut TestContext) -> Vec<Complex64> {
    (0..tc.context.slots())
        .map(|_| Complex64::new(tc.source.next_f64(-1.0, 1.0), tc.source.next_f64(-1.0, 1.0)))
        .collect()
}

fn encrypt_values(tc: &mut TestContext, values: &[Complex64]) -> Ciphertext {
    let pt: Plaintext =
        tc.encoder
            .encode_complex_new(values, tc.context.max_level(), tc.context.log_scale());
    tc.encryptor.encrypt_new(&pt)
}

fn decrypt_values(tc: &mut TestContext, ct: &Ciphertext) -> Vec<Complex64> {
    let pt: Plaintext = tc.decryptor.decrypt_new(ct);
    tc.encoder.decode_complex(&pt)
}

fn assert_close(want: &[Complex64], have: &[Complex64], epsilon: f64) {
    for (i, (w, h)) in want.iter().zip(have.iter()).enumerate() {
        assert!(
            (w - h).norm() < epsilon,
            "slot {}: want {} have {} (|delta| = {:e})",
            i,
            w,
            h,
            (w - h).norm()
        );
    }
}

#[test]
fn test_encrypt_decrypt() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct: Ciphertext = encrypt_values(&mut tc, &values);
    let have: Vec<Complex64> = decrypt_values(&mut tc, &ct);
    assert_close(&values, &have, 1e-9);
}

#[test]
fn test_add_sub() {
    let mut tc: TestContext = setup();
    let values1: Vec<Complex64> = random_values(&mut tc);
    let values2: Vec<Complex64> = random_values(&mut tc);
    let ct1: Ciphertext = encrypt_values(&mut tc, &values1);
    let ct2: Ciphertext = encrypt_values(&mut tc, &values2);

    let ct_add: Ciphertext = tc.evaluator.add_new(&ct1, &ct2).unwrap();
    let want_add: Vec<Complex64> = values1.iter().zip(values2.iter()).map(|(a, b)| a + b).collect();
    assert_close(&want_add, &decrypt_values(&mut tc, &ct_add), 1e-9);

    let ct_sub: Ciphertext = tc.evaluator.sub_new(&ct1, &ct2).unwrap();
    let want_sub: Vec<Complex64> = values1.iter().zip(values2.iter()).map(|(a, b)| a - b).collect();
    assert_close(&want_sub, &decrypt_values(&mut tc, &ct_sub), 1e-9);
}

#[test]
fn test_add_plaintext() {
    let mut tc: TestContext = setup();
    let values1: Vec<Complex64> = random_values(&mut tc);
    let values2: Vec<Complex64> = random_values(&mut tc);
    let ct1: Ciphertext = encrypt_values(&mut tc, &values1);
    let pt2: Plaintext =
        tc.encoder
            .encode_complex_new(&values2, tc.context.max_level(), tc.context.log_scale());

    let ct_add: Ciphertext = tc.evaluator.add_new(&ct1, &pt2).unwrap();
    let want: Vec<Complex64> = values1.iter().zip(values2.iter()).map(|(a, b)| a + b).collect();
    assert_close(&want, &decrypt_values(&mut tc, &ct_add), 1e-9);
}

// Scenario: AddConst with (pi, -sqrt(2)) on an encryption of zero;
// every slot decrypts to pi - i*sqrt(2).
#[test]
fn test_add_const() {
    let mut tc: TestContext = setup();
    let zero: Vec<Complex64> = vec![Complex64::new(0.0, 0.0); tc.context.slots()];
    let ct: Ciphertext = encrypt_values(&mut tc, &zero);

    let constant: Complex64 = Complex64::new(std::f64::consts::PI, -(2.0f64).sqrt());
    let mut ct_out: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        tc.context.max_level(),
        tc.context.log_scale(),
    );
    tc.evaluator.add_const(&ct, constant, &mut ct_out).unwrap();

    let want: Vec<Complex64> = vec![constant; tc.context.slots()];
    assert_close(&want, &decrypt_values(&mut tc, &ct_out), 1e-9);
}

#[test]
fn test_mult_const() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct: Ciphertext = encrypt_values(&mut tc, &values);

    let constant: Complex64 = Complex64::new(0.5, -0.25);
    let mut ct_out: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        tc.context.max_level(),
        tc.context.log_scale(),
    );
    tc.evaluator.mult_const(&ct, constant, &mut ct_out).unwrap();

    let want: Vec<Complex64> = values.iter().map(|v| v * constant).collect();
    assert_close(&want, &decrypt_values(&mut tc, &ct_out), 1e-8);
}

#[test]
fn test_mult_by_i_div_by_i() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct: Ciphertext = encrypt_values(&mut tc, &values);

    let mut ct_i: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        tc.context.max_level(),
        tc.context.log_scale(),
    );
    tc.evaluator.mult_by_i(&ct, &mut ct_i).unwrap();
    let want_i: Vec<Complex64> = values.iter().map(|v| v * Complex64::new(0.0, 1.0)).collect();
    assert_close(&want_i, &decrypt_values(&mut tc, &ct_i), 1e-9);

    let mut ct_back: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        tc.context.max_level(),
        tc.context.log_scale(),
    );
    tc.evaluator.div_by_i(&ct_i, &mut ct_back).unwrap();
    assert_close(&values, &decrypt_values(&mut tc, &ct_back), 1e-9);
}

// Scenario: square twice with a rescale between the
// multiplications; the result matches the plaintext fourth powers.
#[test]
fn test_mul_relin_rescale_twice() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct: Ciphertext = encrypt_values(&mut tc, &values);

    let rlk: EvaluationKey = tc.kgen.gen_relin_key(&tc.sk.clone());

    let ct_sq: Ciphertext = tc.evaluator.mul_relin_new(&ct, &ct, Some(&rlk)).unwrap();
    let mut ct_sq_rescaled: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        ct_sq.level(),
        ct_sq.scale(),
    );
    tc.evaluator.rescale(&ct_sq, &mut ct_sq_rescaled).unwrap();
    assert_eq!(ct_sq_rescaled.level(), tc.context.max_level() - 1);

    let want_sq: Vec<Complex64> = values.iter().map(|v| v * v).collect();
    assert_close(&want_sq, &decrypt_values(&mut tc, &ct_sq_rescaled), 1e-5);

    let ct_4: Ciphertext = tc
        .evaluator
        .mul_relin_new(&ct_sq_rescaled, &ct_sq_rescaled, Some(&rlk))
        .unwrap();
    let mut ct_4_rescaled: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        ct_4.level(),
        ct_4.scale(),
    );
    tc.evaluator.rescale(&ct_4, &mut ct_4_rescaled).unwrap();

    let want_4: Vec<Complex64> = want_sq.iter().map(|v| v * v).collect();
    assert_close(&want_4, &decrypt_values(&mut tc, &ct_4_rescaled), 1e-4);
}

#[test]
fn test_mul_without_relin_then_relinearize() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct1: Ciphertext = encrypt_values(&mut tc, &values);
    let ct2: Ciphertext = encrypt_values(&mut tc, &values);

    let mut ct_mul: Ciphertext = Ciphertext::new(
        &tc.context,
        2,
        tc.context.max_level(),
        2 * tc.context.log_scale(),
    );
    tc.evaluator.mul_relin(&ct1, &ct2, None, &mut ct_mul).unwrap();
    assert_eq!(ct_mul.0.degree(), 2);

    let want: Vec<Complex64> = values.iter().map(|v| v * v).collect();
    assert_close(&want, &decrypt_values(&mut tc, &ct_mul), 1e-5);

    let rlk: EvaluationKey = tc.kgen.gen_relin_key(&tc.sk.clone());
    let mut ct_relin: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        ct_mul.level(),
        ct_mul.scale(),
    );
    tc.evaluator.relinearize(&ct_mul, &rlk, &mut ct_relin).unwrap();
    assert_eq!(ct_relin.0.degree(), 1);
    assert_close(&want, &decrypt_values(&mut tc, &ct_relin), 1e-5);
}

#[test]
fn test_rescale_at_level_zero_rejected() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let pt: Plaintext = tc.encoder.encode_complex_new(&values, 0, tc.context.log_scale());
    let ct: Ciphertext = tc.encryptor.encrypt_new(&pt);

    let mut ct_out: Ciphertext = Ciphertext::new(&tc.context, 1, 0, tc.context.log_scale());
    assert_eq!(
        tc.evaluator.rescale(&ct, &mut ct_out),
        Err(Error::RescaleLevelZero)
    );
}

#[test]
fn test_key_switch() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct: Ciphertext = encrypt_values(&mut tc, &values);

    let sk2: Arc<SecretKey> = Arc::new(tc.kgen.gen_secret_key());
    let switching_key: SwitchingKey = tc.kgen.gen_switching_key(&tc.sk.clone(), &sk2);

    let mut ct_switched: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        ct.level(),
        ct.scale(),
    );
    tc.evaluator.switch_keys(&ct, &switching_key, &mut ct_switched).unwrap();

    let mut decryptor2: Decryptor = Decryptor::new(tc.context.clone(), sk2);
    let pt: Plaintext = decryptor2.decrypt_new(&ct_switched);
    assert_close(&values, &tc.encoder.decode_complex(&pt), 1e-8);
}

#[test]
fn test_rotate_columns() {
    let mut tc: TestContext = setup();
    let slots: usize = tc.context.slots();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct: Ciphertext = encrypt_values(&mut tc, &values);

    let rot_keys: RotationKeys = tc.kgen.gen_rot_keys_pow2(&tc.sk.clone(), false);

    for k in [1usize, 2, 8, 5] {
        let mut ct_rot: Ciphertext = Ciphertext::new(
            &tc.context,
            1,
            ct.level(),
            ct.scale(),
        );
        tc.evaluator.rotate_columns(&ct, k, &rot_keys, &mut ct_rot).unwrap();

        let want: Vec<Complex64> = (0..slots).map(|i| values[(i + k) % slots]).collect();
        assert_close(&want, &decrypt_values(&mut tc, &ct_rot), 1e-8);
    }
}

#[test]
fn test_conjugate() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct: Ciphertext = encrypt_values(&mut tc, &values);

    let mut rot_keys: RotationKeys = RotationKeys::new();
    tc.kgen.gen_conjugate_key(&mut rot_keys, &tc.sk.clone());

    let mut ct_conj: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        ct.level(),
        ct.scale(),
    );
    tc.evaluator.conjugate(&ct, &rot_keys, &mut ct_conj).unwrap();

    let want: Vec<Complex64> = values.iter().map(|v| v.conj()).collect();
    assert_close(&want, &decrypt_values(&mut tc, &ct_conj), 1e-8);
}

#[test]
fn test_rotation_keys_missing() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct: Ciphertext = encrypt_values(&mut tc, &values);

    let rot_keys: RotationKeys = RotationKeys::new();
    let mut ct_rot: Ciphertext = Ciphertext::new(
        &tc.context,
        1,
        ct.level(),
        ct.scale(),
    );
    assert_eq!(
        tc.evaluator.rotate_columns(&ct, 3, &rot_keys, &mut ct_rot),
        Err(Error::RotationKeysMissing)
    );
}

#[test]
fn test_drop_level() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let mut ct: Ciphertext = encrypt_values(&mut tc, &values);

    let level: usize = ct.level();
    tc.evaluator.drop_level(&mut ct, 1).unwrap();
    assert_eq!(ct.level(), level - 1);
    assert_close(&values, &decrypt_values(&mut tc, &ct), 1e-9);
}

#[test]
fn test_marshalling() {
    let mut tc: TestContext = setup();
    let values: Vec<Complex64> = random_values(&mut tc);
    let ct: Ciphertext = encrypt_values(&mut tc, &values);

    let mut buf: Vec<u8> = Vec::new();
    ct.write_to(&mut buf).unwrap();
    let ct2: Ciphertext = Ciphertext::read_from(&mut buf.as_slice(), &tc.context).unwrap();
    assert_eq!(ct, ct2);

    let mut buf: Vec<u8> = Vec::new();
    tc.sk.write_to(&mut buf).unwrap();
    let sk2: SecretKey = SecretKey::read_from(&mut buf.as_slice(), &tc.context).unwrap();
    assert_eq!(*tc.sk, sk2);

    let rlk: EvaluationKey = tc.kgen.gen_relin_key(&tc.sk.clone());
    let mut buf: Vec<u8> = Vec::new();
    rlk.write_to(&mut buf).unwrap();
    let rlk2: EvaluationKey = EvaluationKey::read_from(&mut buf.as_slice(), &tc.context).unwrap();
    assert_eq!(rlk, rlk2);
}
