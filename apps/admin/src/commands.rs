//! Subcommand bodies. Each returns the lines to print so they can be tested
//! without capturing stdout.

use anyhow::Context;
use chrono::{DateTime, Utc};
use gistshare_database::{User, UserDto, UserError, USERS_PAGE_SIZE};
use gistshare_runtime::Services;
use tracing::{info, warn};

use crate::password::hash_password;

fn format_user(user: &User) -> String {
    let created = DateTime::<Utc>::from_timestamp(user.created_at, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| user.created_at.to_string());

    format!(
        "{:<6} {:<24} {:<6} {:<30} {}",
        user.id,
        user.username,
        if user.is_admin { "admin" } else { "-" },
        user.email.as_deref().unwrap_or("NULL"),
        created
    )
}

pub async fn list_users(services: &Services, page: u32) -> anyhow::Result<Vec<String>> {
    let mut users = services
        .users
        .list_page(page)
        .await
        .context("failed to list users")?;

    let has_more = users.len() > USERS_PAGE_SIZE as usize;
    users.truncate(USERS_PAGE_SIZE as usize);

    if users.is_empty() {
        return Ok(vec![format!("No users on page {page}")]);
    }

    let mut lines = vec![
        format!(
            "{:<6} {:<24} {:<6} {:<30} {}",
            "ID", "Username", "Admin", "Email", "Created At"
        ),
        "-".repeat(100),
    ];
    lines.extend(users.iter().map(format_user));

    if has_more {
        lines.push(format!("more users on page {}", page + 1));
    }

    Ok(lines)
}

pub async fn create_user(
    services: &Services,
    username: String,
    password: &str,
    email: Option<String>,
) -> anyhow::Result<Vec<String>> {
    let dto = UserDto {
        username,
        password: password.to_string(),
    };
    dto.validate()?;

    if services.users.exists(&dto.username).await? {
        return Err(UserError::UsernameAlreadyExists.into());
    }

    let hashed = hash_password(password)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    let mut user = dto.into_user();
    user.password = hashed;
    user.set_email(email);

    let created = services
        .users
        .create(&user)
        .await
        .context("failed to create user")?;

    Ok(vec![format!(
        "created user {} with id {}",
        created.username, created.id
    )])
}

pub async fn set_admin(services: &Services, username: &str) -> anyhow::Result<Vec<String>> {
    let user = services
        .users
        .find_by_username(username)
        .await
        .with_context(|| format!("no user named {username}"))?;

    if user.is_admin {
        return Ok(vec![format!("{} is already an admin", user.username)]);
    }

    services.users.set_admin(&user).await?;
    Ok(vec![format!("{} is now an admin", user.username)])
}

pub async fn delete_user(services: &Services, username: &str) -> anyhow::Result<Vec<String>> {
    let user = services
        .users
        .find_by_username(username)
        .await
        .with_context(|| format!("no user named {username}"))?;

    if user.is_admin {
        warn!(user_id = user.id, "deleting an admin account");
    }

    services
        .users
        .delete(&user)
        .await
        .with_context(|| format!("failed to delete user {}", user.username))?;

    info!(user_id = user.id, "user removed from console");
    Ok(vec![format!("deleted user {}", user.username)])
}

pub async fn has_liked(
    services: &Services,
    username: &str,
    gist_id: i64,
) -> anyhow::Result<Vec<String>> {
    let user = services
        .users
        .find_by_username(username)
        .await
        .with_context(|| format!("no user named {username}"))?;
    let gist = services
        .gists
        .find_by_id(gist_id)
        .await
        .with_context(|| format!("no gist with id {gist_id}"))?;

    let liked = services.users.has_liked(&user, &gist).await?;
    Ok(vec![format!(
        "{} {} gist {}",
        user.username,
        if liked { "liked" } else { "has not liked" },
        gist.id
    )])
}
