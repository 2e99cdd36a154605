// 🔐 Identity & Role Resolver - passwords, credential tokens, signup/login
//
// The credential token is a signed HS256 JWT binding (account id, role) for a
// fixed 24h window. Role is only ever read back out of a verified token; no
// request field can claim one. Passwords are stored as "salt$sha256" and are
// compared digest-to-digest in constant time.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::db;
use crate::entities::{Account, AccountPublic, AccountStatus, Role};
use crate::error::{GatewayError, Result};

/// Fixed credential validity window: 24 hours.
pub const TOKEN_TTL_SECS: i64 = 60 * 60 * 24;

// ============================================================================
// PASSWORD HASHING
// ============================================================================

/// Hash a password with a fresh random salt. The result is one-way; the only
/// supported operation on it is `verify_password`.
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    format!("{salt}${}", digest_hex(&salt, password))
}

/// Check a submitted password against a stored "salt$digest" hash. The digest
/// comparison is constant-time with respect to content.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    constant_time_eq(digest_hex(salt, password).as_bytes(), digest.as_bytes())
}

fn digest_hex(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ============================================================================
// CREDENTIAL TOKENS
// ============================================================================

/// Signing and verification keys, built once at startup from the configured
/// secret and passed wherever tokens are issued or checked.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Claims carried by the credential token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub role: Role,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// The verified caller identity for the duration of one request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: String,
    pub role: Role,
}

/// Issue a token binding (account id, role), valid for 24h.
pub fn issue_token(keys: &TokenKeys, account_id: &str, role: Role) -> Result<String> {
    let claims = Claims {
        sub: account_id.to_string(),
        role,
        exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
    };

    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| GatewayError::Internal(e.into()))
}

/// Verify a token and return the identity it binds. Missing, expired,
/// malformed, and tampered tokens all fail the same way; the role comes from
/// the verified claims and nowhere else.
pub fn verify_token(keys: &TokenKeys, token: &str) -> Result<AuthContext> {
    let data = decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map_err(|_| GatewayError::Unauthenticated)?;

    Ok(AuthContext {
        account_id: data.claims.sub,
        role: data.claims.role,
    })
}

// ============================================================================
// SIGNUP
// ============================================================================

/// Signup request body. Role arrives as a string and is validated against the
/// closed set; everything else is trimmed before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub organization_name: Option<String>,
}

fn validate_email(email: &str) -> bool {
    // Minimal shape check: something@something.something
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Register a new account and return its public projection. The password is
/// hashed before it touches the store and is never echoed back.
pub fn signup(conn: &rusqlite::Connection, request: &SignupRequest) -> Result<AccountPublic> {
    let full_name = request.full_name.trim();
    let email = request.email.trim().to_lowercase();

    if full_name.is_empty()
        || email.is_empty()
        || request.password.is_empty()
        || request.confirm_password.is_empty()
        || request.role.is_empty()
    {
        return Err(GatewayError::Validation(
            "Please provide all required fields.".to_string(),
        ));
    }

    if request.password != request.confirm_password {
        return Err(GatewayError::Validation(
            "Passwords do not match.".to_string(),
        ));
    }

    if request.password.len() < 6 {
        return Err(GatewayError::Validation(
            "Password must be at least 6 characters long.".to_string(),
        ));
    }

    if !validate_email(&email) {
        return Err(GatewayError::Validation(
            "Please fill a valid email address.".to_string(),
        ));
    }

    let role = Role::parse(&request.role).ok_or_else(|| {
        GatewayError::Validation(format!("'{}' is not a valid role.", request.role))
    })?;

    let organization_name = request
        .organization_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if role.requires_organization() && organization_name.is_none() {
        return Err(GatewayError::Validation(format!(
            "Organization name is required for the {role} role."
        )));
    }

    let account = Account {
        id: uuid::Uuid::new_v4().to_string(),
        full_name: full_name.to_string(),
        email,
        password_hash: hash_password(&request.password),
        role,
        organization_name,
        status: (role == Role::Startup).then_some(AccountStatus::Pending),
        created_at: Utc::now(),
    };

    db::insert_account(conn, &account)?;

    Ok(AccountPublic::from(&account))
}

// ============================================================================
// LOGIN
// ============================================================================

/// Authenticate by email + password and issue a credential token.
///
/// Unknown email and wrong password take the same failure path on purpose, so
/// a caller cannot enumerate registered addresses.
pub fn login(
    conn: &rusqlite::Connection,
    keys: &TokenKeys,
    email: &str,
    password: &str,
) -> Result<(String, Role)> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(GatewayError::Validation(
            "Email and password are required.".to_string(),
        ));
    }

    let account = db::find_account_by_email(conn, email)?.ok_or(GatewayError::InvalidCredentials)?;

    if !verify_password(password, &account.password_hash) {
        return Err(GatewayError::InvalidCredentials);
    }

    let token = issue_token(keys, &account.id, account.role)?;
    Ok((token, account.role))
}
