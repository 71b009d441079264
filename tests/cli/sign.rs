//! Tests for sign and verify.

use crate::support::*;

#[test]
fn test_sign_then_verify() {
    let t = Test::with_config(&sample_config());
    let output = t.sign("release-7");
    assert_success(&output);
    let sig = stdout_line(&output);
    assert!(sig.starts_with(PREFIX));

    assert_success(&t.verify("release-7", &sig));
    let output = t.verify("release-8", &sig);
    assert_exit_code(&output, 1);
}

#[test]
fn test_plain_signature_does_not_verify() {
    let t = Test::with_config(&sample_config());
    assert_failure(&t.verify("m", "deadbeef"));
}
