// ABOUTME: POSIX shell quoting for commands sent over SSH.
// ABOUTME: Every user-supplied value in a remote command goes through quote().

/// Wrap a value in single quotes, escaping embedded single quotes.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Quote each argument and join with spaces.
pub fn join<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| quote(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
