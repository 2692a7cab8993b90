// Excerpt generation for posts stored without one

const MORE: &str = " [&hellip;]";

/// Build an excerpt from post content: markup removed, trimmed to `num_words`
pub fn generate(content: &str, num_words: usize) -> String {
    let text = strip_tags(content);
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() > num_words {
        format!("{}{}", words[..num_words].join(" "), MORE)
    } else {
        words.join(" ")
    }
}

/// Remove `<...>` markup, leaving a space where a tag stood. A `<` that
/// cannot open a tag (e.g. `a < b`) is kept as text.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();
    let mut in_tag = false;

    while let Some(c) = chars.next() {
        match c {
            '<' if !in_tag && chars.peek().is_some_and(|&next| opens_tag(next)) => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out
}

fn opens_tag(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')
}
