/// Skip a test if live KMS credentials are not configured.
#[macro_export]
macro_rules! skip_without_kms {
    () => {
        for var in [
            "CFGSEAL_TEST_KMS_SERVER",
            "CFGSEAL_TEST_KMS_SECRET_ID",
            "CFGSEAL_TEST_KMS_SECRET_KEY",
            "CFGSEAL_TEST_KMS_KEY_ID",
        ] {
            if std::env::var(var).is_err() {
                eprintln!("SKIPPED: {} not set", var);
                return;
            }
        }
    };
}
