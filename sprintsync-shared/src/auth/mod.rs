/// Authentication and authorization utilities
///
/// This module provides the security primitives for SprintSync:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Bearer-token resolution into an [`middleware::AuthContext`]
/// - [`authorization`]: The pure ownership/admin decision policy
///
/// # Example
///
/// ```no_run
/// use sprintsync_shared::auth::password::{hash_password, verify_password};
/// use sprintsync_shared::auth::jwt::{create_token, Claims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), Duration::hours(24));
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
