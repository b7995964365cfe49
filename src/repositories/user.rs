use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::Result,
    models::user::{Role, User},
};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        role: row.try_get("role")?,
        skills: row.try_get("skills")?,
        experience_years: row.try_get("experience_years")?,
        company_name: row.try_get("company_name")?,
        company_size: row.try_get("company_size")?,
        industry: row.try_get("industry")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Creates a new user in the database.
pub async fn create(
    pool: &Pool,
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    role: Role,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password, role, skills)
            VALUES ($1, $2, $3, $4, $5, $6, '{}')
            RETURNING *
            "#,
            &[&id, &first_name, &last_name, &email, &password_hash, &role],
        )
        .await?;
    row_to_user(&row)
}

/// Whether any account, active or not, already uses this email.
pub async fn email_exists(pool: &Pool, email: &str) -> Result<bool> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT 1 AS present
            FROM users
            WHERE email = $1
            "#,
            &[&email],
        )
        .await?;
    Ok(row.is_some())
}

/// Finds an active user by their email address.
pub async fn find_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM users
            WHERE email = $1 AND is_active = true
            "#,
            &[&email],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: &Uuid) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM users
            WHERE id = $1
            "#,
            &[user_id],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// The replaceable profile fields of an account.
pub struct ProfileChanges {
    pub first_name: String,
    pub last_name: String,
    pub skills: Vec<String>,
    pub experience_years: Option<i32>,
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
}

/// Replaces a user's profile fields and returns the updated row.
pub async fn update_profile(
    pool: &Pool,
    user_id: &Uuid,
    changes: &ProfileChanges,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            UPDATE users
            SET
                first_name = $1,
                last_name = $2,
                skills = $3,
                experience_years = $4,
                company_name = $5,
                company_size = $6,
                industry = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING *
            "#,
            &[
                &changes.first_name,
                &changes.last_name,
                &changes.skills,
                &changes.experience_years,
                &changes.company_name,
                &changes.company_size,
                &changes.industry,
                user_id,
            ],
        )
        .await?;
    row_to_user(&row)
}

/// Lists all users, newest first. Moderation view.
pub async fn list(pool: &Pool) -> Result<Vec<User>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT *
            FROM users
            ORDER BY created_at DESC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(row_to_user).collect()
}

/// Activates or deactivates a user account.
pub async fn set_active(pool: &Pool, user_id: &Uuid, active: bool) -> Result<u64> {
    let client = pool.get().await?;
    let updated = client
        .execute(
            r#"
            UPDATE users
            SET is_active = $1, updated_at = NOW()
            WHERE id = $2
            "#,
            &[&active, user_id],
        )
        .await?;
    Ok(updated)
}
