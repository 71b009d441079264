//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a cfgseal command running in the test directory.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("cfgseal").expect("failed to find cfgseal binary");
        for var in [
            "CFGSEAL_CONFIG",
            "CFGSEAL_STORAGE_SECRET",
            "CFGSEAL_TRANSPORT_SECRET",
            "CFGSEAL_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `cfgseal encrypt --section <section>`.
    pub fn encrypt(&self, section: &str, value: &str) -> Output {
        self.cmd()
            .args(["encrypt", "--section", section, value])
            .output()
            .expect("failed to run cfgseal encrypt")
    }

    /// Shortcut for `cfgseal decrypt --section <section>`.
    pub fn decrypt(&self, section: &str, value: &str) -> Output {
        self.cmd()
            .args(["decrypt", "--section", section, value])
            .output()
            .expect("failed to run cfgseal decrypt")
    }

    /// Shortcut for `cfgseal sign`.
    pub fn sign(&self, msg: &str) -> Output {
        self.cmd()
            .args(["sign", msg])
            .output()
            .expect("failed to run cfgseal sign")
    }

    /// Shortcut for `cfgseal verify`.
    pub fn verify(&self, msg: &str, sig: &str) -> Output {
        self.cmd()
            .args(["verify", msg, sig])
            .output()
            .expect("failed to run cfgseal verify")
    }

    /// Shortcut for `cfgseal hash`.
    pub fn hash(&self, msg: &str) -> Output {
        self.cmd()
            .args(["hash", msg])
            .output()
            .expect("failed to run cfgseal hash")
    }
}
