use rand::{distr::Alphanumeric, Rng};

/// Trait for generating opaque refresh token values
pub trait RefreshTokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Alphanumeric tokens drawn from the thread-local CSPRNG
pub struct RandomTokenGenerator {
    length: usize,
}

impl RandomTokenGenerator {
    /// 64 characters of a 62-symbol alphabet, roughly 380 bits
    pub const DEFAULT_LENGTH: usize = 64;

    pub fn new() -> Self {
        Self::with_length(Self::DEFAULT_LENGTH)
    }

    pub fn with_length(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshTokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}
