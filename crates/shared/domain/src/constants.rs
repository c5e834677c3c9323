//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_USER: &str = "user";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// Delivery driver role
pub const ROLE_DRIVER: &str = "driver";

// =============================================================================
// Validation
// =============================================================================

// Lengths are counted in characters, as the request validators count them.

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: u64 = 6;
pub const MAX_PASSWORD_LENGTH: u64 = 128;

pub const MIN_FULL_NAME_LENGTH: u64 = 2;
pub const MIN_ADDRESS_LENGTH: u64 = 5;

/// Maximum lengths mirrored by the `users` table columns
pub const MAX_FULL_NAME_LENGTH: u64 = 100;
pub const MAX_EMAIL_LENGTH: u64 = 255;
pub const MAX_ADDRESS_LENGTH: u64 = 500;
pub const MAX_PHONE_NUMBER_LENGTH: u64 = 20;

// =============================================================================
// Authentication
// =============================================================================

/// Default access token lifetime
pub const DEFAULT_ACCESS_TOKEN_EXPIRATION: &str = "15m";

/// Default refresh token lifetime
pub const DEFAULT_REFRESH_TOKEN_EXPIRATION: &str = "7d";

/// Upper bound for a configured token lifetime (ten years)
pub const MAX_TOKEN_EXPIRATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Minimum signing secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authorization scheme for Bearer tokens
pub const BEARER_SCHEME: &str = "Bearer";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
