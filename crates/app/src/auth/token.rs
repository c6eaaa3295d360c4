//! Bearer tokens for the admin console.
//!
//! A token reads `th_v1_<token uuid>.<secret>`: the uuid locates the stored
//! row, the 32 byte secret is hex encoded and never stored. Storage keeps a
//! SHA-256 verifier that also covers the owning admin.

use std::{
    fmt::{self, Write as _},
    str::FromStr,
};

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use crate::auth::models::AdminUuid;

const PREFIX: &str = "th";
const SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTokenVersion {
    V1,
}

impl ApiTokenVersion {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl TryFrom<i16> for ApiTokenVersion {
    type Error = ApiTokenError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiTokenError {
    #[error("api token format is invalid")]
    InvalidFormat,

    #[error("api token uses an unsupported version")]
    UnsupportedVersion,

    #[error("api token secret encoding is invalid")]
    InvalidSecretEncoding,
}

/// A bearer token with its secret in memory. Zeroed on drop.
#[derive(Clone)]
pub struct BearerToken {
    pub uuid: Uuid,
    pub version: ApiTokenVersion,
    secret: [u8; SECRET_LEN],
}

impl BearerToken {
    /// A fresh current-version token with a random secret.
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = [0_u8; SECRET_LEN];

        OsRng.fill_bytes(&mut secret);

        Self {
            uuid: Uuid::now_v7(),
            version: ApiTokenVersion::V1,
            secret,
        }
    }

    /// Hex SHA-256 over `{uuid}:{version}:{admin}:{secret}`.
    #[must_use]
    pub fn verifier(&self, admin: AdminUuid) -> String {
        let input = Zeroizing::new(format!(
            "{}:{}:{}:{}",
            self.uuid.simple(),
            self.version.as_i16(),
            admin.into_uuid().simple(),
            hex(&self.secret),
        ));

        hex(&Sha256::digest(input.as_bytes()))
    }

    /// Whether this token matches a stored verifier for `admin`.
    #[must_use]
    pub fn verifies(&self, admin: AdminUuid, stored: &str) -> bool {
        self.verifier(admin)
            .as_bytes()
            .ct_eq(stored.as_bytes())
            .into()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("uuid", &self.uuid)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}_{}_{}.{}",
            self.version.tag(),
            self.uuid.simple(),
            hex(&self.secret)
        )
    }
}

impl FromStr for BearerToken {
    type Err = ApiTokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (id, secret) = token.split_once('.').ok_or(ApiTokenError::InvalidFormat)?;

        let mut parts = id.splitn(3, '_');

        let (Some(PREFIX), Some(version), Some(uuid)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ApiTokenError::InvalidFormat);
        };

        let version = match version {
            "v1" => ApiTokenVersion::V1,
            _ => return Err(ApiTokenError::UnsupportedVersion),
        };

        Ok(Self {
            uuid: Uuid::try_parse(uuid).or(Err(ApiTokenError::InvalidFormat))?,
            version,
            secret: unhex_secret(secret).ok_or(ApiTokenError::InvalidSecretEncoding)?,
        })
    }
}

impl Drop for BearerToken {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            write!(out, "{byte:02x}").ok();
            out
        })
}

fn unhex_secret(encoded: &str) -> Option<[u8; SECRET_LEN]> {
    let encoded = encoded.as_bytes();

    if encoded.len() != SECRET_LEN * 2 || !encoded.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }

    let mut secret = [0_u8; SECRET_LEN];

    for (byte, pair) in secret.iter_mut().zip(encoded.chunks_exact(2)) {
        *byte = u8::from_str_radix(std::str::from_utf8(pair).ok()?, 16).ok()?;
    }

    Some(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_parses_back() {
        let token = BearerToken::generate();
        let rendered = token.to_string();
        let parsed: BearerToken = rendered.parse().expect("token should parse");

        assert!(rendered.starts_with("th_v1_"), "unexpected token shape: {rendered}");
        assert_eq!(parsed.uuid, token.uuid);
        assert_eq!(parsed.secret, token.secret);
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let token = BearerToken::generate();

        assert!(!format!("{token:?}").contains(&hex(&token.secret)));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let uuid = Uuid::nil().simple();

        assert_eq!(
            "nope".parse::<BearerToken>().err(),
            Some(ApiTokenError::InvalidFormat)
        );
        assert_eq!(
            format!("xx_v1_{uuid}.{}", "ab".repeat(32)).parse::<BearerToken>().err(),
            Some(ApiTokenError::InvalidFormat)
        );
        assert_eq!(
            format!("th_v9_{uuid}.{}", "ab".repeat(32)).parse::<BearerToken>().err(),
            Some(ApiTokenError::UnsupportedVersion)
        );
        assert_eq!(
            format!("th_v1_{uuid}.{}", "zz".repeat(32)).parse::<BearerToken>().err(),
            Some(ApiTokenError::InvalidSecretEncoding)
        );
        assert_eq!(
            format!("th_v1_{uuid}.+a{}", "ab".repeat(31)).parse::<BearerToken>().err(),
            Some(ApiTokenError::InvalidSecretEncoding)
        );
    }

    #[test]
    fn verifier_is_bound_to_the_admin() {
        let token = BearerToken::generate();
        let admin = AdminUuid::from_uuid(Uuid::nil());
        let other = AdminUuid::from_uuid(Uuid::max());

        let stored = token.verifier(admin);

        assert_eq!(stored.len(), 64, "verifier must be a hex sha-256 digest");
        assert!(token.verifies(admin, &stored));
        assert!(!token.verifies(other, &stored));
    }

    #[test]
    fn truncated_or_altered_verifiers_do_not_match() {
        let token = BearerToken::generate();
        let admin = AdminUuid::from_uuid(Uuid::nil());
        let stored = token.verifier(admin);

        let mut altered = stored.clone();
        let last = if altered.ends_with('0') { "1" } else { "0" };
        altered.replace_range(63.., last);

        assert!(!token.verifies(admin, &stored[..63]));
        assert!(!token.verifies(admin, &altered));
        assert!(!token.verifies(admin, ""));
    }
}
