use nix::unistd::{getuid, User};

/// Returns the name of the current user.
///
/// Prefers `$USER`, then the passwd entry for the real uid, then `"unknown"`.
pub fn get_username() -> String {
    if let Ok(name) = std::env::var("USER") {
        if !name.is_empty() {
            return name;
        }
    }

    User::from_uid(getuid())
        .ok()
        .flatten()
        .map(|user| user.name)
        .unwrap_or_else(|| "unknown".to_string())
}
