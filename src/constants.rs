// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

// Token configuration constants
pub const DEFAULT_JWT_ALGORITHM: &str = "HS256";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86400;
pub const TOKEN_TYPE: &str = "bearer";
pub const MAX_TOKEN_LENGTH: usize = 4096;
pub const MIN_SECRET_LENGTH: usize = 32;

// Argon2 accepts longer inputs, but passwords are capped at the classic bcrypt ceiling
pub const MAX_PASSWORD_BYTES: usize = 72;
