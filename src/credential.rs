// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installation credential.
//!
//! The installer is gated behind a shared installation password. Only the
//! SHA-256 digest of that password ships with the binary, and only the
//! digest is ever persisted. The secret itself is read once from the user,
//! hashed, and dropped.

use inquire::{error::InquireError, Password, PasswordDisplayMode};
use sha2::{Digest, Sha256};
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    io::{stdin, BufRead},
};

/// SHA-256 digest of the distributed installation password.
const BUILTIN_HASH: &str = "bb30f0ac65d69ee8ec3fc22f1214f3c5cdf40b42c5a05c1b02da314bc9e4a0ad";

/// Hashed installation credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    hash: String,
}

impl Credential {
    /// Credential matching the distributed installation password.
    pub fn builtin() -> Self {
        Self {
            hash: BUILTIN_HASH.into(),
        }
    }

    /// Construct credential from a plaintext secret.
    pub fn from_secret(secret: impl AsRef<str>) -> Self {
        Self {
            hash: digest(secret),
        }
    }

    /// Hex encoded SHA-256 digest of credential.
    pub fn hash(&self) -> &str {
        self.hash.as_str()
    }

    /// Check if secret hashes to this credential.
    pub fn verify_password(&self, secret: impl AsRef<str>) -> bool {
        digest(secret) == self.hash
    }
}

// INVARIANT: Never expose anything beyond the digest.
impl Debug for Credential {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.debug_struct("Credential")
            .field("hash", &self.hash)
            .finish()
    }
}

/// Prompt user for installation password.
///
/// Input is masked when attached to a terminal. Otherwise, a single line is
/// read from standard input as-is, minus the trailing newline.
///
/// # Errors
///
/// - Return [`CredentialError::Prompt`] if prompt was cancelled or failed.
/// - Return [`CredentialError::Stdin`] if standard input cannot be read.
pub fn prompt_secret() -> Result<String> {
    let prompt = Password::new("Password:")
        .with_help_message("installation password for the ccgj toolchain")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt();

    match prompt {
        Ok(secret) => Ok(secret),
        Err(InquireError::NotTTY) => read_secret_line(stdin().lock()),
        Err(error) => Err(CredentialError::Prompt(error)),
    }
}

fn read_secret_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    // INVARIANT: Chomp trailing newlines.
    let secret = line
        .strip_suffix("\r\n")
        .or(line.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(line);

    Ok(secret)
}

fn digest(secret: impl AsRef<str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_ref().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Credential error types.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Interactive prompt failed or was cancelled.
    #[error("failed to prompt for installation password")]
    Prompt(#[source] InquireError),

    /// Standard input could not be read.
    #[error("failed to read installation password from standard input")]
    Stdin(#[from] std::io::Error),
}

/// Friendly result alias :3
type Result<T, E = CredentialError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test]
    fn builtin_credential_accepts_distributed_password() {
        assert!(Credential::builtin().verify_password("datouguai"));
    }

    #[test_case(""; "empty")]
    #[test_case("datouguai "; "trailing space")]
    #[test_case("DATOUGUAI"; "wrong case")]
    #[test_case("hunter2"; "unrelated")]
    #[test]
    fn builtin_credential_rejects_other_input(secret: &str) {
        assert!(!Credential::builtin().verify_password(secret));
    }

    #[test]
    fn builtin_hash_matches_digest_of_password() {
        assert_eq!(Credential::from_secret("datouguai"), Credential::builtin());
    }

    #[test]
    fn debug_output_only_shows_digest() {
        let result = format!("{:?}", Credential::from_secret("swordfish"));
        assert!(!result.contains("swordfish"));
        assert!(result.contains(Credential::from_secret("swordfish").hash()));
    }

    #[test_case("datouguai\n", "datouguai"; "unix newline")]
    #[test_case("datouguai\r\n", "datouguai"; "windows newline")]
    #[test_case("datouguai", "datouguai"; "no newline")]
    #[test]
    fn read_secret_line_chomps_newline(input: &str, expect: &str) -> anyhow::Result<()> {
        use pretty_assertions::assert_eq;

        let result = read_secret_line(input.as_bytes())?;
        assert_eq!(result, expect);
        Ok(())
    }
}
