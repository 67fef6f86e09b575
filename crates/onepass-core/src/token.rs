use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::fmt::Display;

/// Number of random bytes behind every token.
pub const TOKEN_BYTES: usize = 32;

/// Length of the encoded token (unpadded URL-safe base64 of [`TOKEN_BYTES`]).
pub const TOKEN_LENGTH: usize = 43;

const FINGERPRINT_LENGTH: usize = 8;

/// An opaque, single-use access token.
///
/// Tokens are [`TOKEN_BYTES`] random bytes encoded with the URL-safe base64
/// alphabet without padding, so they are always [`TOKEN_LENGTH`] characters
/// of `[A-Za-z0-9_-]` and can be placed in a query string verbatim.
///
/// `Debug` never prints the full value; use [`AccessToken::fingerprint`] in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    /// Encodes raw random bytes as a token.
    pub fn from_bytes(bytes: &[u8; TOKEN_BYTES]) -> Self {
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Parses a token presented by a client.
    ///
    /// Returns `None` for anything that could not have been issued: wrong
    /// length, characters outside the URL-safe alphabet, or non-canonical
    /// trailing bits.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != TOKEN_LENGTH {
            return None;
        }
        let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
        (bytes.len() == TOKEN_BYTES).then(|| Self(raw.to_string()))
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short prefix that identifies the token in logs without revealing it.
    pub fn fingerprint(&self) -> &str {
        &self.0[..FINGERPRINT_LENGTH]
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken({}…)", self.fingerprint())
    }
}

impl Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(fill: u8) -> AccessToken {
        AccessToken::from_bytes(&[fill; TOKEN_BYTES])
    }

    #[test]
    fn encoded_length_is_fixed() {
        assert_eq!(token(0).as_str().len(), TOKEN_LENGTH);
        assert_eq!(token(0xff).as_str().len(), TOKEN_LENGTH);
    }

    #[test]
    fn encoding_is_url_safe() {
        let t = token(0xfb);
        assert!(t
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn parse_accepts_issued_tokens() {
        let issued = token(42);
        let parsed = AccessToken::parse(issued.as_str()).unwrap();
        assert_eq!(parsed, issued);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(AccessToken::parse("").is_none());
        assert!(AccessToken::parse("abc").is_none());
        let too_long = format!("{}A", token(1));
        assert!(AccessToken::parse(&too_long).is_none());
    }

    #[test]
    fn parse_rejects_foreign_alphabet() {
        let mut raw = token(1).to_string();
        raw.replace_range(0..1, "+");
        assert!(AccessToken::parse(&raw).is_none());
        raw.replace_range(0..1, "/");
        assert!(AccessToken::parse(&raw).is_none());
    }

    #[test]
    fn debug_does_not_leak_token() {
        let t = token(7);
        let debug = format!("{:?}", t);
        assert!(!debug.contains(t.as_str()));
        assert!(debug.contains(t.fingerprint()));
    }
}
