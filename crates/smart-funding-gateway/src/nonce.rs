use base64::Engine;

/// Produces a fresh CSP nonce per response.
pub trait NonceSource: Send + Sync {
    fn generate(&self) -> String;
}

/// 128 random bits from a v4 UUID, base64 encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn generate(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(uuid::Uuid::new_v4().as_bytes())
    }
}

/// Always the same nonce. Used in tests.
#[derive(Debug, Clone)]
pub struct FixedNonce(pub String);

impl NonceSource for FixedNonce {
    fn generate(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_nonces_differ() {
        let a = RandomNonce.generate();
        let b = RandomNonce.generate();
        assert_ne!(a, b);
        assert_eq!(a.len(), 24);
    }
}
