//! POSIX shell quoting for command lines built from untrusted values.

/// Quote a single argument for `/bin/sh`.
///
/// Plain words made of safe characters pass through unchanged; anything
/// else is wrapped in single quotes with embedded quotes escaped.
pub fn quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_safe) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Quote each argument and join with spaces.
pub fn join<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|a| quote(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '=' | ':' | ',' | '@' | '+')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_words_are_unchanged() {
        assert_eq!(quote("/srv/www/example_com"), "/srv/www/example_com");
        assert_eq!(quote("755"), "755");
    }

    #[test]
    fn spaces_are_quoted() {
        assert_eq!(quote("ssh-ed25519 AAAA key"), "'ssh-ed25519 AAAA key'");
    }

    #[test]
    fn empty_string_is_quoted() {
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn single_quotes_are_escaped() {
        assert_eq!(quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn shell_metacharacters_are_neutralised() {
        let quoted = quote("$(rm -rf /)");
        assert!(quoted.starts_with('\''));
        assert!(quoted.ends_with('\''));
    }

    #[test]
    fn join_quotes_each_argument() {
        assert_eq!(join(["ln", "-sfn", "a b", "c"]), "ln -sfn 'a b' c");
    }
}
