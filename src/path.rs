use std::path::{Component, Path, PathBuf};

/// Fully expand a user-supplied path: `~`, `$VAR` / `${VAR}`, relative
/// components and symlinks. Never fails; whatever cannot be resolved is
/// kept as written.
pub fn normalize_path(raw: &str) -> PathBuf {
    let expanded = expand_vars(&expand_home(raw));
    let path = PathBuf::from(expanded);

    let absolute = if path.is_absolute() {
        path
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path,
        }
    };

    let cleaned = clean(&absolute);
    std::fs::canonicalize(&cleaned).unwrap_or(cleaned)
}

fn expand_home(raw: &str) -> String {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return raw.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.display(), rest),
        None => raw.to_string(),
    }
}

fn expand_vars(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match std::env::var(name) {
            Ok(value) if !name.is_empty() => out.push_str(&value),
            // unset or malformed: leave the reference as written
            _ => out.push_str(&rest[idx..idx + 1 + consumed]),
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                // ".." at the root stays at the root
                if !matches!(out.components().next_back(), Some(Component::RootDir | Component::Prefix(_)) | None) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_removes_dots() {
        assert_eq!(clean(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(clean(Path::new("/a/b/../../..")), PathBuf::from("/"));
    }

    #[test]
    fn vars_expand_when_set() {
        let path = std::env::var("PATH").unwrap_or_default();
        assert_eq!(expand_vars("$PATH/x"), format!("{path}/x"));
        assert_eq!(expand_vars("${PATH}x"), format!("{path}x"));
    }

    #[test]
    fn unset_vars_are_kept() {
        assert_eq!(
            expand_vars("/a/$BYTERANGE_SURELY_UNSET/b"),
            "/a/$BYTERANGE_SURELY_UNSET/b"
        );
        assert_eq!(expand_vars("/a/${BYTERANGE_SURELY_UNSET}"), "/a/${BYTERANGE_SURELY_UNSET}");
        assert_eq!(expand_vars("cost$"), "cost$");
        assert_eq!(expand_vars("${open"), "${open");
    }

    #[test]
    fn tilde_only_at_start() {
        assert_eq!(expand_home("a/~/b"), "a/~/b");
        assert_eq!(expand_home("~user/x"), "~user/x");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x"), format!("{}/x", home.display()));
        }
    }

    #[test]
    fn relative_paths_become_absolute() {
        let p = normalize_path("some/../nonexistent-byterange-file");
        assert!(p.is_absolute());
        assert!(p.ends_with("nonexistent-byterange-file"));
    }
}
