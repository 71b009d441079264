//! Tests for encrypt and decrypt.

use crate::support::*;

#[test]
fn test_encrypt_decrypt_roundtrip() {
    let t = Test::with_config(&sample_config());

    for section in ["passwd", "storage", "transport"] {
        let output = t.encrypt(section, "s3cr3t");
        assert_success(&output);
        let sealed = stdout_line(&output);
        assert!(sealed.starts_with(PREFIX), "{}", section);

        let output = t.decrypt(section, &sealed);
        assert_success(&output);
        assert_eq!(stdout_line(&output), "s3cr3t");
    }
}

#[test]
fn test_default_section_is_storage() {
    let t = Test::with_config(&sample_config());
    let output = t.cmd().args(["encrypt", "v"]).output().unwrap();
    assert_success(&output);
    assert!(stdout_line(&output).contains(&hex::encode("aes-256-gcm")));
}

#[test]
fn test_plain_value_passes_through() {
    let t = Test::with_config(&sample_config());
    let output = t.decrypt("storage", "plain-password");
    assert_success(&output);
    assert_eq!(stdout_line(&output), "plain-password");
}

#[test]
fn test_explicit_config_path() {
    let t = Test::new();
    let path = t.write("other.json", &sample_config());
    let output = t
        .cmd()
        .args(["encrypt", "v", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert_success(&output);
}

#[test]
fn test_config_env_var() {
    let t = Test::new();
    let path = t.write("elsewhere.json", &sample_config());
    let output = t
        .cmd()
        .env("CFGSEAL_CONFIG", &path)
        .args(["encrypt", "v"])
        .output()
        .unwrap();
    assert_success(&output);
}

#[test]
fn test_storage_override_env_without_file() {
    let t = Test::new();
    let section = format!(r#"{{"method":"aes-256-cbc","aes_key":"{}"}}"#, AES_KEY);

    let output = t
        .cmd()
        .env("CFGSEAL_STORAGE_SECRET", &section)
        .args(["encrypt", "from-env"])
        .output()
        .unwrap();
    assert_success(&output);
    let sealed = stdout_line(&output);

    let output = t
        .cmd()
        .env("CFGSEAL_STORAGE_SECRET", &section)
        .args(["decrypt", &sealed])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout_line(&output), "from-env");
}

#[test]
fn test_wrong_section_fails_with_decrypt_code() {
    let t = Test::with_config(&sample_config());
    let sealed = stdout_line(&t.encrypt("storage", "v"));
    let output = t.decrypt("transport", &sealed);
    assert_exit_code(&output, 200);
    assert_stderr_contains(&output, "method mismatch");
}

#[test]
fn test_hash_and_methods() {
    let t = Test::with_config(&sample_config());
    let output = t.hash("abc");
    assert_success(&output);
    assert_eq!(
        stdout_line(&output),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );

    let output = t.cmd().args(["methods", "--json"]).output().unwrap();
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["signer"], serde_json::json!(["kms-sign", "tsm-sign"]));
}
