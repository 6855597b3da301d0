use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Fixed by the handler path that created the record; the
/// Postgres enum rejects anything else at the store level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Investor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Investor => "investor",
        }
    }

    /// Key used for list envelopes ("farmers" / "investors").
    pub fn plural(self) -> &'static str {
        match self {
            Role::Farmer => "farmers",
            Role::Investor => "investors",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub role: Role,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>, // storage object key
    pub profile: serde_json::Value,
    pub created_at: OffsetDateTime,
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub full_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub profile: serde_json::Value,
}

/// Typed profile changes plus free-form attributes, already stripped of
/// reserved fields by the service layer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("This email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

const USER_COLUMNS: &str =
    "id, email, password_hash, role, full_name, phone, image, profile, created_at";

impl User {
    /// Find a user by email, hash included (needed for login).
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. The unique index on email is the source of truth
    /// for uniqueness; a violation here maps to `DuplicateEmail` so the
    /// check-then-act window in the handler cannot produce two records.
    pub async fn create(db: &PgPool, new: NewUser<'_>) -> Result<User, CreateUserError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, role, full_name, phone, profile)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role)
        .bind(new.full_name)
        .bind(new.phone)
        .bind(new.profile)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation()) {
                CreateUserError::DuplicateEmail
            } else {
                CreateUserError::Db(e)
            }
        })?;
        Ok(user)
    }

    /// All users with the given role, store-native order.
    pub async fn list_by_role(db: &PgPool, role: Role) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1"
        ))
        .bind(role)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Lookup by id, scoped to a role. Uniform for both roles: an id that
    /// belongs to the other role is a miss, not a silent cross-role hit.
    pub async fn find_by_id_and_role(
        db: &PgPool,
        id: Uuid,
        role: Role,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = $2"
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Single atomic find-and-update, role-scoped, returning post-update
    /// state. `None` means no user with that id and role exists.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        role: Role,
        changes: &ProfileChanges,
        image: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                full_name = COALESCE($3, full_name),
                phone     = COALESCE($4, phone),
                image     = COALESCE($5, image),
                profile   = profile || $6
            WHERE id = $1 AND role = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(role)
        .bind(changes.full_name.as_deref())
        .bind(changes.phone.as_deref())
        .bind(image)
        .bind(serde_json::Value::Object(changes.extra.clone()))
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
