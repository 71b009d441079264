//! Round-trip and compatibility tests across every local Crypto method.

mod support;

use cfgseal::core::cipher::AesCbcCrypto;
use cfgseal::core::envelope;
use cfgseal::error::{CipherError, EnvelopeError, Error};
use cfgseal::{Crypto, CryptoOpts, Registry};
use support::*;

fn build(opts: &CryptoOpts) -> Box<dyn Crypto> {
    Registry::with_defaults().crypto(opts).unwrap()
}

#[test]
fn test_roundtrip_every_local_method() {
    for opts in local_crypto_opts() {
        let crypto = build(&opts);
        for value in SAMPLE_VALUES {
            let sealed = crypto.encrypt(value).unwrap();
            assert!(sealed.starts_with(PREFIX), "{}", opts.method);
            assert_eq!(crypto.decrypt(&sealed).unwrap(), *value, "{}", opts.method);
        }
    }
}

#[test]
fn test_envelope_names_the_method() {
    for opts in local_crypto_opts() {
        let sealed = build(&opts).encrypt("x").unwrap();
        let parsed = envelope::unwrap(&sealed, &opts.method, sealed.split(':').count() - 3).unwrap();
        assert_eq!(parsed.method, opts.method);
        assert_eq!(parsed.version, "1");
    }
}

#[test]
fn test_segment_counts() {
    let count = |opts: CryptoOpts| build(&opts).encrypt("v").unwrap().split(':').count();
    assert_eq!(count(aes_cbc_opts(AES_KEY)), 4);
    assert_eq!(count(rsa_opts()), 4);
    assert_eq!(count(sm2_opts()), 4);
    assert_eq!(count(aes_gcm_opts(AES_KEY)), 5);
    assert_eq!(count(sm4_gcm_opts(SM4_KEY)), 5);
}

#[test]
fn test_plaintext_passthrough() {
    for opts in local_crypto_opts() {
        let crypto = build(&opts);
        for plain in ["", "root", "not:an:envelope", "ENC_other:31:31:00"] {
            assert_eq!(crypto.decrypt(plain).unwrap(), plain, "{}", opts.method);
        }
    }
}

#[test]
fn test_encrypt_is_idempotent() {
    for opts in local_crypto_opts() {
        let crypto = build(&opts);
        let once = crypto.encrypt("v").unwrap();
        assert_eq!(crypto.encrypt(&once).unwrap(), once, "{}", opts.method);
    }
}

#[test]
fn test_fixed_salt_vector() {
    let crypto = AesCbcCrypto::new("aes-256-cbc", AES_KEY.as_bytes()).unwrap();
    let sealed = crypto.encrypt_with_salt("hunter2", b"abc").unwrap();

    let parts: Vec<&str> = sealed.split(':').collect();
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], PREFIX);
    assert_eq!(parts[1], hex::encode("aes-256-cbc"));
    assert_eq!(parts[2], "31");
    // 1 + 3 + 7 bytes pad to one block.
    assert_eq!(parts[3].len(), 32);

    assert_eq!(
        crypto.encrypt_with_salt("hunter2", b"abc").unwrap(),
        sealed
    );
    assert_eq!(crypto.decrypt(&sealed).unwrap(), "hunter2");

    let other = AesCbcCrypto::new("aes-256-cbc", OTHER_AES_KEY.as_bytes()).unwrap();
    assert!(other.decrypt(&sealed).is_err());
}

#[test]
fn test_wrong_key_is_error() {
    let pairs = [
        (aes_gcm_opts(AES_KEY), aes_gcm_opts(OTHER_AES_KEY)),
        (sm4_gcm_opts(SM4_KEY), sm4_gcm_opts("fedcba9876543210")),
        (sm2_opts(), sm2_opts()),
    ];
    for (a, b) in pairs {
        let sealed = build(&a).encrypt("secret").unwrap();
        assert!(build(&b).decrypt(&sealed).is_err(), "{}", a.method);
    }
}

#[test]
fn test_gcm_tamper_is_integrity_error() {
    let crypto = build(&aes_gcm_opts(AES_KEY));
    let sealed = crypto.encrypt("secret").unwrap();
    let mut parts: Vec<String> = sealed.split(':').map(str::to_string).collect();
    let last = parts.len() - 1;
    let flipped = if parts[last].starts_with('0') { "1" } else { "0" };
    parts[last].replace_range(0..1, flipped);
    let err = crypto.decrypt(&parts.join(":")).unwrap_err();
    assert!(matches!(err, Error::Cipher(CipherError::Integrity)));
}

#[test]
fn test_method_mismatch() {
    let aes = build(&aes_gcm_opts(AES_KEY));
    let sm4 = build(&sm4_gcm_opts(SM4_KEY));
    let sealed = sm4.encrypt("v").unwrap();
    let err = aes.decrypt(&sealed).unwrap_err();
    assert!(matches!(err, Error::Envelope(EnvelopeError::MethodMismatch { .. })));
}

#[test]
fn test_wrong_segment_count_is_format_error() {
    let cbc = build(&aes_cbc_opts(AES_KEY));
    let bad = format!("{}:{}:31:00:00", PREFIX, hex::encode("aes-256-cbc"));
    let err = cbc.decrypt(&bad).unwrap_err();
    assert!(matches!(err, Error::Envelope(EnvelopeError::Format(_))));
}

#[test]
fn test_legacy_format_cbc_only() {
    let cbc = AesCbcCrypto::new("aes-256-cbc", AES_KEY.as_bytes()).unwrap();
    let sealed = cbc.encrypt_with_salt("legacy-pass", b"xy").unwrap();
    let payload = sealed.rsplit(':').next().unwrap();
    let legacy = format!("AES+V1+{}", payload);

    assert_eq!(cbc.decrypt(&legacy).unwrap(), "legacy-pass");
    // Other methods treat it as plaintext.
    assert_eq!(build(&aes_gcm_opts(AES_KEY)).decrypt(&legacy).unwrap(), legacy);
}

#[test]
fn test_legacy_prefixed_plaintext_passes_through() {
    let cbc = build(&aes_cbc_opts(AES_KEY));
    for plain in ["AES+mypassword", "AES+V1+zz", "AES+V1+", "AES+V1+00ff"] {
        assert_eq!(cbc.decrypt(plain).unwrap(), plain);
    }
}

#[test]
fn test_rsa_2048_roundtrip_and_limit() {
    let crypto = build(&rsa_2048_opts());
    assert_eq!(crypto.method(), "rsa-2048");
    let sealed = crypto.encrypt("db-password").unwrap();
    assert_eq!(crypto.decrypt(&sealed).unwrap(), "db-password");

    // 256-byte modulus minus 11 bytes of PKCS#1 v1.5 padding.
    let max = "m".repeat(245);
    let sealed = crypto.encrypt(&max).unwrap();
    assert_eq!(crypto.decrypt(&sealed).unwrap(), max);
    let err = crypto.encrypt(&"m".repeat(246)).unwrap_err();
    assert!(matches!(err, Error::Cipher(CipherError::EncryptionFailed(_))));
}

#[test]
fn test_long_plaintext() {
    let long = "k".repeat(4096);
    for opts in [aes_cbc_opts(AES_KEY), aes_gcm_opts(AES_KEY), sm4_gcm_opts(SM4_KEY), sm2_opts()] {
        let crypto = build(&opts);
        let sealed = crypto.encrypt(&long).unwrap();
        assert_eq!(crypto.decrypt(&sealed).unwrap(), long, "{}", opts.method);
    }
}
