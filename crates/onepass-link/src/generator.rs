use onepass_core::token::TOKEN_BYTES;
use onepass_core::AccessToken;
use rand::RngCore;

/// Source of fresh access tokens.
///
/// Implementations are pure generators; they never consult the store.
pub trait TokenGenerator: Send + Sync + 'static {
    fn generate(&self) -> AccessToken;
}

/// Draws 32 bytes per token from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> AccessToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        AccessToken::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onepass_core::token::TOKEN_LENGTH;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_fixed_length_and_parse_back() {
        let generator = RandomTokenGenerator;
        for _ in 0..100 {
            let token = generator.generate();
            assert_eq!(token.as_str().len(), TOKEN_LENGTH);
            assert_eq!(AccessToken::parse(token.as_str()), Some(token));
        }
    }

    #[test]
    fn tokens_do_not_repeat() {
        let generator = RandomTokenGenerator;
        let seen: HashSet<String> = (0..10_000)
            .map(|_| generator.generate().as_str().to_string())
            .collect();
        assert_eq!(seen.len(), 10_000);
    }
}
