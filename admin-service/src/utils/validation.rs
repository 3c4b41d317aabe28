use anyhow::bail;

/// Minimum super-admin password length unless overridden in configuration.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 12;

/// Check the `local@domain.tld` shape: exactly one `@`, at least one `.` in
/// the domain (neither leading nor trailing), no whitespace anywhere.
pub fn validate_email(email: &str) -> Result<(), anyhow::Error> {
    if email.chars().any(char::is_whitespace) {
        bail!("email must not contain whitespace");
    }

    let Some((local, domain)) = email.split_once('@') else {
        bail!("email must contain a single '@'");
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        bail!("email must contain a single '@'");
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        bail!("email domain must contain a '.'");
    }

    Ok(())
}

pub fn validate_password(password: &str, min_length: usize) -> Result<(), anyhow::Error> {
    // Character count, not byte count: multi-byte passwords must not get a
    // free pass on length.
    if password.chars().count() < min_length {
        bail!("password must be at least {min_length} characters long");
    }
    Ok(())
}
