use bfv::*;
use rand_core::RngCore;
use sampling::source::Source;
use std::sync::Arc;

struct TestContext {
    context: Arc<Context>,
    encoder: BatchEncoder,
    sk: Arc<SecretKey>,
    pk: Arc<PublicKey>,
    kgen: KeyGenerator,
    encryptor_pk: Encryptor,
    encryptor_sk: Encryptor,
    decryptor: Decryptor,
    evaluator: Evaluator,
    source: Source,
}

fn setup(preset: usize) -> TestContext {
    let params: Parameters = parameters::default_parameters()[preset].clone();
    let context: Arc<Context> = Arc::new(Context::new(&params).unwrap());
    let mut kgen: KeyGenerator = KeyGenerator::new(context.clone());
    let (sk, pk) = kgen.gen_key_pair();
    let (sk, pk) = (Arc::new(sk), Arc::new(pk));

    TestContext {
        context: context.clone(),
        encoder: BatchEncoder::new(context.clone()).unwrap(),
        sk: sk.clone(),
        pk: pk.clone(),
        kgen,
        encryptor_pk: Encryptor::new_from_pk(context.clone(), pk.clone()),
        encryptor_sk: Encryptor::new_from_sk(context.clone(), sk.clone()),
        decryptor: Decryptor::new(context.clone(), sk.clone()),
        evaluator: Evaluator::new(context),
        source: Source::new(sampling::source::new_seed()),
    }
}

fn random_plaintext_coeffs(tc: &mut TestContext) -> Vec<u64> {
    let t: u64 = tc.context.t();
    (0..tc.context.n()).map(|_| tc.source.next_u64() % t).collect()
}

fn encrypt_coeffs(tc: &mut TestContext, coeffs: &[u64]) -> Ciphertext {
    let mut pt: Plaintext = Plaintext::new(&tc.context);
    tc.encoder.encode_uint(coeffs, &mut pt).unwrap();
    let mut ct: Ciphertext = Ciphertext::new(&tc.context, 1);
    tc.encryptor_pk.encrypt(&pt, &mut ct);
    ct
}

fn decrypt_coeffs(tc: &mut TestContext, ct: &Ciphertext) -> Vec<u64> {
    let pt: Plaintext = tc.decryptor.decrypt_new(ct);
    tc.encoder.decode_uint(&pt).unwrap()
}

#[test]
fn test_encoder_round_trip() {
    let mut tc: TestContext = setup(parameters::PN12QP171);
    let coeffs: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let mut pt: Plaintext = Plaintext::new(&tc.context);
    tc.encoder.encode_uint(&coeffs, &mut pt).unwrap();

    // Decoding requires the unlifted message, recovered by a
    // decryption of a noiseless encryption.
    let mut ct: Ciphertext = Ciphertext::new(&tc.context, 1);
    tc.encryptor_pk.encrypt(&pt, &mut ct);
    assert_eq!(decrypt_coeffs(&mut tc, &ct), coeffs);
}

#[test]
fn test_encrypt_decrypt_pk() {
    let mut tc: TestContext = setup(parameters::PN12QP171);
    let coeffs: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let ct: Ciphertext = encrypt_coeffs(&mut tc, &coeffs);
    assert_eq!(decrypt_coeffs(&mut tc, &ct), coeffs);
}

#[test]
fn test_encrypt_decrypt_pk_fast() {
    let mut tc: TestContext = setup(parameters::PN12QP171);
    let coeffs: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let mut pt: Plaintext = Plaintext::new(&tc.context);
    tc.encoder.encode_uint(&coeffs, &mut pt).unwrap();
    let mut ct: Ciphertext = Ciphertext::new(&tc.context, 1);
    tc.encryptor_pk.encrypt_fast(&pt, &mut ct);
    assert_eq!(decrypt_coeffs(&mut tc, &ct), coeffs);
}

#[test]
fn test_encrypt_decrypt_sk() {
    let mut tc: TestContext = setup(parameters::PN12QP171);
    let coeffs: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let mut pt: Plaintext = Plaintext::new(&tc.context);
    tc.encoder.encode_uint(&coeffs, &mut pt).unwrap();
    let mut ct: Ciphertext = Ciphertext::new(&tc.context, 1);
    tc.encryptor_sk.encrypt_from_sk(&pt, &mut ct);
    assert_eq!(decrypt_coeffs(&mut tc, &ct), coeffs);
}

#[test]
fn test_add_sub() {
    let mut tc: TestContext = setup(parameters::PN12QP171);
    let t: u64 = tc.context.t();
    let coeffs1: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let coeffs2: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let ct1: Ciphertext = encrypt_coeffs(&mut tc, &coeffs1);
    let ct2: Ciphertext = encrypt_coeffs(&mut tc, &coeffs2);

    let ct_add: Ciphertext = tc.evaluator.add_new(&ct1, &ct2).unwrap();
    let want_add: Vec<u64> = coeffs1
        .iter()
        .zip(coeffs2.iter())
        .map(|(a, b)| (a + b) % t)
        .collect();
    assert_eq!(decrypt_coeffs(&mut tc, &ct_add), want_add);

    let ct_sub: Ciphertext = tc.evaluator.sub_new(&ct1, &ct2).unwrap();
    let want_sub: Vec<u64> = coeffs1
        .iter()
        .zip(coeffs2.iter())
        .map(|(a, b)| (a + t - b) % t)
        .collect();
    assert_eq!(decrypt_coeffs(&mut tc, &ct_sub), want_sub);
}

#[test]
fn test_add_plaintext() {
    let mut tc: TestContext = setup(parameters::PN12QP171);
    let t: u64 = tc.context.t();
    let coeffs1: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let coeffs2: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let ct1: Ciphertext = encrypt_coeffs(&mut tc, &coeffs1);
    let mut pt2: Plaintext = Plaintext::new(&tc.context);
    tc.encoder.encode_uint(&coeffs2, &mut pt2).unwrap();

    let ct_add: Ciphertext = tc.evaluator.add_new(&ct1, &pt2).unwrap();
    let want: Vec<u64> = coeffs1
        .iter()
        .zip(coeffs2.iter())
        .map(|(a, b)| (a + b) % t)
        .collect();
    assert_eq!(decrypt_coeffs(&mut tc, &ct_add), want);
}

#[test]
fn test_both_plaintext_rejected() {
    let mut tc: TestContext = setup(parameters::PN12QP171);
    let pt1: Plaintext = Plaintext::new(&tc.context);
    let pt2: Plaintext = Plaintext::new(&tc.context);
    let mut ct_out: Ciphertext = Ciphertext::new(&tc.context, 1);
    assert_eq!(
        tc.evaluator.add(&pt1, &pt2, &mut ct_out),
        Err(Error::BothPlaintext)
    );
}

// Scenario: m1 = [1, 2, ..., n], m2 = [n, n-1, ..., 1]; Add and
// Mul-then-Relinearize decrypt to the componentwise sum and product
// mod t.
#[test]
fn test_mul_relinearize() {
    let mut tc: TestContext = setup(parameters::PN13QP339);
    let t: u64 = tc.context.t();
    let n: usize = tc.context.n();

    let coeffs1: Vec<u64> = (1..=n as u64).collect();
    let coeffs2: Vec<u64> = (1..=n as u64).rev().collect();
    let ct1: Ciphertext = encrypt_coeffs(&mut tc, &coeffs1);
    let ct2: Ciphertext = encrypt_coeffs(&mut tc, &coeffs2);

    let want: Vec<u64> = coeffs1
        .iter()
        .zip(coeffs2.iter())
        .map(|(a, b)| (a * b) % t)
        .collect();

    let ct_mul: Ciphertext = tc.evaluator.mul_new(&ct1, &ct2).unwrap();
    assert_eq!(ct_mul.0.degree(), 2);
    assert_eq!(decrypt_coeffs(&mut tc, &ct_mul), want);

    let rlk: EvaluationKey = tc.kgen.gen_relin_key(&tc.sk.clone(), 2);
    let ct_relin: Ciphertext = tc.evaluator.relinearize_new(&ct_mul, &rlk).unwrap();
    assert_eq!(ct_relin.0.degree(), 1);
    assert_eq!(decrypt_coeffs(&mut tc, &ct_relin), want);
}

#[test]
fn test_square() {
    let mut tc: TestContext = setup(parameters::PN13QP339);
    let t: u64 = tc.context.t();
    let coeffs: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let ct: Ciphertext = encrypt_coeffs(&mut tc, &coeffs);

    let mut ct_sq: Ciphertext = Ciphertext::new(&tc.context, 2);
    tc.evaluator.square(&ct, &mut ct_sq).unwrap();
    let want: Vec<u64> = coeffs.iter().map(|a| (a * a) % t).collect();
    assert_eq!(decrypt_coeffs(&mut tc, &ct_sq), want);
}

// Scenario: encrypt under s0, switch to s1, decrypt under s1.
#[test]
fn test_key_switch() {
    let mut tc: TestContext = setup(parameters::PN13QP339);
    let coeffs: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let ct: Ciphertext = encrypt_coeffs(&mut tc, &coeffs);

    let sk2: Arc<SecretKey> = Arc::new(tc.kgen.gen_secret_key());
    let switching_key: SwitchingKey = tc.kgen.gen_switching_key(&tc.sk.clone(), &sk2);

    let mut ct_switched: Ciphertext = Ciphertext::new(&tc.context, 1);
    tc.evaluator.switch_keys(&ct, &switching_key, &mut ct_switched).unwrap();

    let mut decryptor2: Decryptor = Decryptor::new(tc.context.clone(), sk2);
    let pt: Plaintext = decryptor2.decrypt_new(&ct_switched);
    assert_eq!(tc.encoder.decode_uint(&pt).unwrap(), coeffs);
}

fn rotated_columns(coeffs: &[u64], k: usize) -> Vec<u64> {
    let row_size: usize = coeffs.len() >> 1;
    let mut want: Vec<u64> = vec![0; coeffs.len()];
    for i in 0..row_size {
        want[i] = coeffs[(i + k) % row_size];
        want[i + row_size] = coeffs[((i + k) % row_size) + row_size];
    }
    want
}

// Scenario: rotate-columns on an encryption of [0, 1, ..., n-1]
// cyclically shifts each of the two slot rows.
#[test]
fn test_rotate_columns() {
    let mut tc: TestContext = setup(parameters::PN13QP339);
    let n: usize = tc.context.n();
    let coeffs: Vec<u64> = (0..n as u64).collect();
    let ct: Ciphertext = encrypt_coeffs(&mut tc, &coeffs);

    let rot_keys: RotationKeys = tc.kgen.gen_rot_keys_pow2(&tc.sk.clone(), true);

    let mut k: usize = 1;
    while k < n >> 2 {
        let mut ct_rot: Ciphertext = Ciphertext::new(&tc.context, 1);
        tc.evaluator.rotate_columns(&ct, k, &rot_keys, &mut ct_rot).unwrap();
        assert_eq!(
            decrypt_coeffs(&mut tc, &ct_rot),
            rotated_columns(&coeffs, k),
            "rotation by {}",
            k
        );
        k <<= 1;
    }

    // Non-power-of-two offset, composed from the power-of-two set.
    let mut ct_rot: Ciphertext = Ciphertext::new(&tc.context, 1);
    tc.evaluator.rotate_columns(&ct, 3, &rot_keys, &mut ct_rot).unwrap();
    assert_eq!(decrypt_coeffs(&mut tc, &ct_rot), rotated_columns(&coeffs, 3));
}

// Scenario: RotateRows swaps the two halves of the slot vector.
#[test]
fn test_rotate_rows() {
    let mut tc: TestContext = setup(parameters::PN13QP339);
    let n: usize = tc.context.n();
    let coeffs: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let ct: Ciphertext = encrypt_coeffs(&mut tc, &coeffs);

    let mut rot_keys: RotationKeys = RotationKeys::new();
    tc.kgen.gen_rot_row(&mut rot_keys, &tc.sk.clone());

    let mut ct_rot: Ciphertext = Ciphertext::new(&tc.context, 1);
    tc.evaluator.rotate_rows(&ct, &rot_keys, &mut ct_rot).unwrap();

    let row_size: usize = n >> 1;
    let mut want: Vec<u64> = coeffs[row_size..].to_vec();
    want.extend_from_slice(&coeffs[..row_size]);
    assert_eq!(decrypt_coeffs(&mut tc, &ct_rot), want);
}

#[test]
fn test_rotation_keys_missing() {
    let mut tc: TestContext = setup(parameters::PN12QP171);
    let coeffs: Vec<u64> = random_plaintext_coeffs(&mut tc);
    let ct: Ciphertext = encrypt_coeffs(&mut tc, &coeffs);

    let mut rot_keys: RotationKeys = RotationKeys::new();
    tc.kgen.gen_rot_col_left(&mut rot_keys, &tc.sk.clone(), 1);

    let mut ct_rot: Ciphertext = Ciphertext::new(&tc.context, 1);
    assert_eq!(
        tc.evaluator.rotate_columns(&ct, 3, &rot_keys, &mut ct_rot),
        Err(Error::RotationKeysMissing)
    );
}

#[test]
fn test_inner_sum() {
    let mut tc: TestContext = setup(parameters::PN12QP171);
    let t: u64 = tc.context.t();
    let n: usize = tc.context.n();
    let coeffs: Vec<u64> = (0..n as u64).map(|i| i % 97).collect();
    let ct: Ciphertext = encrypt_coeffs(&mut tc, &coeffs);

    let rot_keys: RotationKeys = tc.kgen.gen_rot_keys_pow2(&tc.sk.clone(), true);

    let mut ct_sum: Ciphertext = Ciphertext::new(&tc.context, 1);
    tc.evaluator.inner_sum(&ct, &rot_keys, &mut ct_sum).unwrap();

    let total: u64 = coeffs.iter().fold(0, |acc, c| (acc + c) % t);
    assert_eq!(decrypt_coeffs(&mut tc, &ct_sum), vec![total; n]);
}

#[test]
fn test_marshalling() {
    let mut tc: TestContext = setup(parameters::PN12QP171);

    let ct: Ciphertext = Ciphertext::new_random(&tc.context, 2, &mut tc.source);
    let mut buf: Vec<u8> = Vec::new();
    ct.write_to(&mut buf).unwrap();
    let ct2: Ciphertext = Ciphertext::read_from(&mut buf.as_slice(), &tc.context).unwrap();
    assert_eq!(ct, ct2);

    let mut buf: Vec<u8> = Vec::new();
    tc.sk.write_to(&mut buf).unwrap();
    let sk2: SecretKey = SecretKey::read_from(&mut buf.as_slice(), &tc.context).unwrap();
    assert_eq!(*tc.sk, sk2);

    let mut buf: Vec<u8> = Vec::new();
    tc.pk.write_to(&mut buf).unwrap();
    let pk2: PublicKey = PublicKey::read_from(&mut buf.as_slice(), &tc.context).unwrap();
    assert_eq!(*tc.pk, pk2);

    let sk_out: SecretKey = tc.kgen.gen_secret_key();
    let switching_key: SwitchingKey = tc.kgen.gen_switching_key(&tc.sk.clone(), &sk_out);
    let mut buf: Vec<u8> = Vec::new();
    switching_key.write_to(&mut buf).unwrap();
    let switching_key2: SwitchingKey =
        SwitchingKey::read_from(&mut buf.as_slice(), &tc.context).unwrap();
    assert_eq!(switching_key, switching_key2);

    let mut rot_keys: RotationKeys = RotationKeys::new();
    tc.kgen.gen_rot_col_left(&mut rot_keys, &tc.sk.clone(), 1);
    tc.kgen.gen_rot_row(&mut rot_keys, &tc.sk.clone());
    let mut buf: Vec<u8> = Vec::new();
    rot_keys.write_to(&mut buf).unwrap();
    let rot_keys2: RotationKeys = RotationKeys::read_from(&mut buf.as_slice(), &tc.context).unwrap();
    assert_eq!(rot_keys, rot_keys2);
}
