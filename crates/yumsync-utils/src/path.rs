//! Expansion of user-supplied paths from the configuration and command line.

use std::{env, iter::Peekable, path::PathBuf, str::Chars};

use crate::{
    error::{PathError, PathResult},
    user::get_username,
};

/// Expands `$VAR`, `${VAR}` and a leading `~`, then anchors relative paths at
/// the working directory.
///
/// `HOME`, `XDG_CONFIG_HOME` and `XDG_CACHE_HOME` fall back to their usual
/// defaults when unset; any other undefined variable is an error.
///
/// ```
/// use yumsync_utils::path::resolve_path;
///
/// let cache = resolve_path("/srv/mirror/${USER}").unwrap_or_default();
/// assert!(cache.is_absolute() || cache.as_os_str().is_empty());
/// ```
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let expanded = PathBuf::from(expand(path)?);
    if expanded.is_absolute() {
        return Ok(expanded);
    }
    env::current_dir()
        .map(|cwd| cwd.join(expanded))
        .map_err(PathError::CurrentDir)
}

/// `$HOME`, or `/home/<user>` when unset.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("/home/{}", get_username())))
}

pub fn xdg_config_home() -> PathBuf {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
}

pub fn xdg_cache_home() -> PathBuf {
    env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".cache"))
}

fn expand(path: &str) -> PathResult<String> {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '~' if out.is_empty() => out.push_str(&home_dir().to_string_lossy()),
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let name = braced_name(&mut chars).ok_or_else(|| {
                    PathError::UnterminatedBrace {
                        path: path.to_string(),
                    }
                })?;
                out.push_str(&lookup(&name, path)?);
            }
            '$' => {
                let name = bare_name(&mut chars);
                if name.is_empty() {
                    out.push('$');
                } else {
                    out.push_str(&lookup(&name, path)?);
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn braced_name(chars: &mut Peekable<Chars>) -> Option<String> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            return Some(name);
        }
        name.push(c);
    }
    None
}

fn bare_name(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

fn lookup(name: &str, path: &str) -> PathResult<String> {
    let value = match name {
        "HOME" => home_dir(),
        "XDG_CONFIG_HOME" => xdg_config_home(),
        "XDG_CACHE_HOME" => xdg_cache_home(),
        _ => {
            return env::var(name).map_err(|_| {
                PathError::UndefinedVariable {
                    name: name.to_string(),
                    path: path.to_string(),
                }
            })
        }
    };
    Ok(value.to_string_lossy().into_owned())
}
