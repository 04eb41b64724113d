// ABOUTME: In-place rewriting of KEY=value lines in a dotenv file.
// ABOUTME: Replaces existing keys, appends absent ones, leaves every other line alone.

/// Set each `(key, value)` in `contents`. Applying the same updates twice
/// gives the same text as applying them once.
pub fn rewrite(contents: &str, updates: &[(&str, &str)]) -> String {
    let mut seen = vec![false; updates.len()];
    let mut lines: Vec<String> = Vec::new();

    for line in contents.lines() {
        match assignment_key(line).and_then(|(prefix, key)| {
            updates
                .iter()
                .position(|(k, _)| *k == key)
                .map(|idx| (prefix, idx))
        }) {
            Some((prefix, idx)) => {
                seen[idx] = true;
                let (key, value) = updates[idx];
                lines.push(format!("{}{}={}", prefix, key, value));
            }
            None => lines.push(line.to_string()),
        }
    }

    for (idx, (key, value)) in updates.iter().enumerate() {
        if !seen[idx] {
            lines.push(format!("{}={}", key, value));
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// For `[export ]KEY=...`, the prefix to keep and the key.
fn assignment_key(line: &str) -> Option<(&str, &str)> {
    let indent = line.len() - line.trim_start().len();
    let body = &line[indent..];
    if body.starts_with('#') {
        return None;
    }
    let (prefix_len, rest) = match body.strip_prefix("export ") {
        Some(rest) => (indent + "export ".len(), rest),
        None => (indent, body),
    };
    let (key, _) = rest.split_once('=')?;
    let key = key.trim_end();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((&line[..prefix_len], key))
}
