//! Sign-in, refresh rotation, sign-out and gate behaviour against an
//! in-memory user directory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use auth_service_lib::client::UserDirectory;
use auth_service_lib::config::AuthServiceConfig;
use auth_service_lib::gate::{admit, AccessPolicy, AuthenticatedUser};
use auth_service_lib::service::{
    HashedRefreshTokenStore, RefreshTokenStore, TokenIssuer, TokenKind,
};
use auth_service_lib::AuthModule;
use common::{AppError, AppResult};
use domain::{CreateUser, HashCost, NewUser, SecretHasher, User, UserRole};

// =============================================================================
// In-memory user directory
// =============================================================================

#[derive(Default)]
struct InMemoryUsers {
    users: Mutex<HashMap<i32, User>>,
    next_id: Mutex<i32>,
}

impl InMemoryUsers {
    fn insert(&self, email: &str, password: &str, role: UserRole) -> User {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let user = User {
            id: *next_id,
            email: email.to_string(),
            password_hash: hasher().hash(password).unwrap(),
            full_name: "Test User".to_string(),
            address: "1 Market Street".to_string(),
            phone_number: format!("07000000{:02}", *next_id),
            role,
            refresh_token_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        user
    }

    fn remove(&self, id: i32) {
        self.users.lock().unwrap().remove(&id);
    }

    fn set_role(&self, id: i32, role: UserRole) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.role = role;
        }
    }

    fn get(&self, id: i32) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUsers {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let user = User {
            id: *next_id,
            email: new_user.email,
            password_hash: new_user.password,
            full_name: new_user.full_name,
            address: new_user.address,
            phone_number: new_user.phone_number,
            role: new_user.role,
            refresh_token_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_refresh_token_hash(&self, id: i32, hash: Option<String>) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.refresh_token_hash = hash;
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn cheap_cost() -> HashCost {
    HashCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

fn hasher() -> SecretHasher {
    SecretHasher::new(cheap_cost()).unwrap()
}

fn config() -> AuthServiceConfig {
    AuthServiceConfig::from_lookup(|key| {
        let value = match key {
            "JWT_ACCESS_TOKEN_SECRET" => Some("access-secret-for-tests-only-0123456789"),
            "JWT_REFRESH_TOKEN_SECRET" => Some("refresh-secret-for-tests-only-0123456789"),
            "HASH_MEMORY_KIB" => Some("1024"),
            "HASH_ITERATIONS" => Some("1"),
            "HASH_PARALLELISM" => Some("1"),
            _ => None,
        };
        value.map(String::from)
    })
    .unwrap()
}

struct Harness {
    users: Arc<InMemoryUsers>,
    auth: AuthModule,
    issuer: TokenIssuer,
}

fn harness() -> Harness {
    let users = Arc::new(InMemoryUsers::default());
    let config = config();
    let auth = AuthModule::new(&config, users.clone()).unwrap();
    Harness {
        users,
        auth,
        issuer: TokenIssuer::new(&config),
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

fn admin_only() -> AccessPolicy {
    AccessPolicy::roles([UserRole::Admin]).unwrap()
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_sign_in_admin_claims() {
    let h = harness();
    let admin = h.users.insert("a@b.com", "Secret1!", UserRole::Admin);

    let pair = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();
    let claims = h.issuer.verify(&pair.access_token, TokenKind::Access).unwrap();

    assert_eq!(claims.sub, admin.id);
    assert_eq!(claims.role, UserRole::Admin);
    assert_eq!(pair.token_type, "Bearer");
    assert!(h.users.get(admin.id).unwrap().has_active_session());
}

#[tokio::test]
async fn test_sign_in_email_is_case_insensitive() {
    let h = harness();
    h.users.insert("a@b.com", "Secret1!", UserRole::User);

    assert!(h.auth.service.sign_in("  A@B.COM ", "Secret1!").await.is_ok());
}

#[tokio::test]
async fn test_sign_in_wrong_password_or_unknown_email() {
    let h = harness();
    h.users.insert("a@b.com", "Secret1!", UserRole::User);

    let wrong_password = h.auth.service.sign_in("a@b.com", "Secret2!").await;
    let unknown_email = h.auth.service.sign_in("nobody@b.com", "Secret1!").await;

    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
    assert!(matches!(unknown_email, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_stored_refresh_hash_is_not_the_token() {
    let h = harness();
    let user = h.users.insert("a@b.com", "Secret1!", UserRole::User);

    let pair = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();
    let stored = h.users.get(user.id).unwrap().refresh_token_hash.unwrap();

    assert_ne!(stored, pair.refresh_token);
    assert!(SecretHasher::is_hashed(&stored));
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let h = harness();
    let user = h.users.insert("a@b.com", "Secret1!", UserRole::User);
    let first = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();

    let second = h
        .auth
        .service
        .refresh(user.id, &first.refresh_token)
        .await
        .unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
    // The old refresh token was rotated out.
    let reuse = h.auth.service.refresh(user.id, &first.refresh_token).await;
    assert!(matches!(reuse, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_second_sign_in_invalidates_first_refresh_token() {
    let h = harness();
    let user = h.users.insert("a@b.com", "Secret1!", UserRole::User);

    let first = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();
    let second = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();

    let stale = h.auth.service.refresh(user.id, &first.refresh_token).await;
    assert!(matches!(stale, Err(AppError::InvalidCredentials)));
    assert!(h
        .auth
        .service
        .refresh(user.id, &second.refresh_token)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_refresh_after_sign_out_fails() {
    let h = harness();
    let user = h.users.insert("a@b.com", "Secret1!", UserRole::User);
    let pair = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();

    h.auth.service.sign_out(user.id).await.unwrap();
    h.auth.service.sign_out(user.id).await.unwrap();

    let result = h.auth.service.refresh(user.id, &pair.refresh_token).await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_refresh_rejects_wrong_subject_and_wrong_kind() {
    let h = harness();
    let alice = h.users.insert("alice@b.com", "Secret1!", UserRole::User);
    let bob = h.users.insert("bob@b.com", "Secret1!", UserRole::User);
    let pair = h.auth.service.sign_in("alice@b.com", "Secret1!").await.unwrap();

    let other_subject = h.auth.service.refresh(bob.id, &pair.refresh_token).await;
    let access_as_refresh = h.auth.service.refresh(alice.id, &pair.access_token).await;
    let garbage = h.auth.service.refresh(alice.id, "garbage").await;

    assert!(matches!(other_subject, Err(AppError::InvalidCredentials)));
    assert!(matches!(access_as_refresh, Err(AppError::InvalidCredentials)));
    assert!(matches!(garbage, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_refresh_for_deleted_user_is_not_found() {
    let h = harness();
    let user = h.users.insert("a@b.com", "Secret1!", UserRole::User);
    let pair = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();

    h.users.remove(user.id);

    let result = h.auth.service.refresh(user.id, &pair.refresh_token).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert!(matches!(
        h.auth.service.sign_out(user.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_refresh_uses_current_role() {
    let h = harness();
    let user = h.users.insert("a@b.com", "Secret1!", UserRole::User);
    let pair = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();

    h.users.set_role(user.id, UserRole::Driver);
    let refreshed = h
        .auth
        .service
        .refresh(user.id, &pair.refresh_token)
        .await
        .unwrap();

    let claims = h
        .issuer
        .verify(&refreshed.access_token, TokenKind::Access)
        .unwrap();
    assert_eq!(claims.role, UserRole::Driver);
}

// =============================================================================
// Refresh token store
// =============================================================================

#[tokio::test]
async fn test_refresh_store_save_match_clear() {
    let users = Arc::new(InMemoryUsers::default());
    let user = users.insert("a@b.com", "Secret1!", UserRole::User);
    let store = HashedRefreshTokenStore::new(users.clone(), hasher());

    assert!(!store.matches(user.id, "t1").await.unwrap());

    store.save(user.id, "t1").await.unwrap();
    assert!(store.matches(user.id, "t1").await.unwrap());
    assert!(!store.matches(user.id, "other").await.unwrap());

    store.save(user.id, "t2").await.unwrap();
    assert!(!store.matches(user.id, "t1").await.unwrap());
    assert!(store.matches(user.id, "t2").await.unwrap());

    store.clear(user.id).await.unwrap();
    assert!(!store.matches(user.id, "t2").await.unwrap());
}

#[tokio::test]
async fn test_refresh_store_missing_user() {
    let users = Arc::new(InMemoryUsers::default());
    let store = HashedRefreshTokenStore::new(users, hasher());

    assert!(matches!(store.matches(99, "t").await, Err(AppError::NotFound)));
    assert!(matches!(store.save(99, "t").await, Err(AppError::NotFound)));
    assert!(matches!(store.clear(99).await, Err(AppError::NotFound)));
}

// =============================================================================
// Registration
// =============================================================================

fn registration(email: &str, password: &str) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        password: password.to_string(),
        full_name: "New Customer".to_string(),
        address: "5 Market Street".to_string(),
        phone_number: "0712345678".to_string(),
    }
}

#[tokio::test]
async fn test_register_creates_user_role_with_hashed_password() {
    let h = harness();

    let user = h
        .auth
        .service
        .register(registration(" New@Example.com ", "Secret1!"))
        .await
        .unwrap();

    assert_eq!(user.email, "new@example.com");
    assert_eq!(user.role, UserRole::User);
    assert!(hasher().verify("Secret1!", &user.password_hash));
    assert!(h
        .auth
        .service
        .sign_in("new@example.com", "Secret1!")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_register_rejects_duplicate_and_short_password() {
    let h = harness();
    h.users.insert("taken@example.com", "Secret1!", UserRole::User);

    let duplicate = h
        .auth
        .service
        .register(registration("TAKEN@example.com", "Secret1!"))
        .await;
    let short = h
        .auth
        .service
        .register(registration("fresh@example.com", "abc"))
        .await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    assert!(matches!(short, Err(AppError::Validation(_))));
}

// =============================================================================
// Gates
// =============================================================================

#[tokio::test]
async fn test_public_route_needs_no_header() {
    let h = harness();

    let admitted = admit(&h.auth.gate, &AccessPolicy::Public, None).await.unwrap();
    assert!(admitted.is_none());
}

#[tokio::test]
async fn test_admin_route_decisions() {
    let h = harness();
    h.users.insert("admin@b.com", "Secret1!", UserRole::Admin);
    h.users.insert("user@b.com", "Secret1!", UserRole::User);
    let admin = h.auth.service.sign_in("admin@b.com", "Secret1!").await.unwrap();
    let user = h.auth.service.sign_in("user@b.com", "Secret1!").await.unwrap();
    let policy = admin_only();

    let no_token = admit(&h.auth.gate, &policy, None).await;
    let as_user = admit(&h.auth.gate, &policy, Some(&bearer(&user.access_token))).await;
    let as_admin = admit(&h.auth.gate, &policy, Some(&bearer(&admin.access_token))).await;

    assert!(matches!(no_token, Err(AppError::Unauthorized)));
    assert!(matches!(as_user, Err(AppError::Forbidden)));
    assert!(matches!(
        as_admin,
        Ok(Some(AuthenticatedUser { role: UserRole::Admin, .. }))
    ));
}

#[tokio::test]
async fn test_gate_rejects_deleted_user_and_refresh_token() {
    let h = harness();
    let user = h.users.insert("a@b.com", "Secret1!", UserRole::User);
    let pair = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();

    let with_refresh = h.auth.gate.authenticate(Some(&bearer(&pair.refresh_token))).await;
    assert!(matches!(with_refresh, Err(AppError::Unauthorized)));

    h.users.remove(user.id);
    let deleted = h.auth.gate.authenticate(Some(&bearer(&pair.access_token))).await;
    assert!(matches!(deleted, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_gate_uses_live_role() {
    let h = harness();
    let user = h.users.insert("a@b.com", "Secret1!", UserRole::Admin);
    let pair = h.auth.service.sign_in("a@b.com", "Secret1!").await.unwrap();

    h.users.set_role(user.id, UserRole::User);

    let result = admit(&h.auth.gate, &admin_only(), Some(&bearer(&pair.access_token))).await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}
