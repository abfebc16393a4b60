use crate::constants::*;

pub fn validate_post_body(body: &str) -> Result<(), String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("Post body is required".into());
    }
    if trimmed.chars().count() > MAX_POST_LENGTH {
        return Err(format!(
            "Post body must be at most {} characters",
            MAX_POST_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_reply_body(body: &str) -> Result<(), String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("Reply body is required".into());
    }
    if trimmed.chars().count() > MAX_REPLY_LENGTH {
        return Err(format!(
            "Reply body must be at most {} characters",
            MAX_REPLY_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_message_body(body: &str) -> Result<(), String> {
    if body.trim().is_empty() {
        return Err("Message body is required".into());
    }
    if body.chars().count() > MAX_MESSAGE_LENGTH {
        return Err("Message too long".into());
    }
    Ok(())
}

pub fn validate_channel_label(label: &str) -> Result<(), String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err("Channel label is required".into());
    }
    if trimmed.chars().count() > MAX_CHANNEL_LABEL_LENGTH {
        return Err(format!(
            "Channel label must be at most {} characters",
            MAX_CHANNEL_LABEL_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username must be {}-{} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(
            "Username can only contain letters, numbers, dots, hyphens, and underscores".into(),
        );
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name is required".into());
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name must be at most {} characters", MAX_NAME_LENGTH));
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), String> {
    if bio.chars().count() > MAX_BIO_LENGTH {
        return Err(format!("Bio must be at most {} characters", MAX_BIO_LENGTH));
    }
    Ok(())
}

/// Clamp a client-supplied page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}
