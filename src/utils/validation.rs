use anyhow::Result;

pub const DESCRIPTION_MAX_CHARS: usize = 500;

pub fn validate_description(description: &str) -> Result<&str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("The description must not be empty"));
    }
    if trimmed.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(anyhow::anyhow!(
            "The description is limited to {} characters",
            DESCRIPTION_MAX_CHARS
        ));
    }
    Ok(trimmed)
}

pub fn is_image_attachment(content_type: Option<&str>, filename: &str) -> bool {
    if let Some(content_type) = content_type {
        return content_type.starts_with("image/");
    }
    let lower = filename.to_lowercase();
    [".png", ".jpg", ".jpeg", ".gif", ".webp"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}
