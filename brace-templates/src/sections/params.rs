/// Split tag content into parameters.
///
/// Parameters are separated by whitespace, except inside quotes and
/// brackets, so `fun(a, b)` and `'two words'` stay in one piece.
pub(crate) fn split_params(src: &str) -> Vec<&str> {
    let mut params = vec![];
    let mut start = None;
    let mut quote = None;
    let mut depth = 0usize;
    let mut chars = src.char_indices();

    while let Some((index, c)) = chars.next() {
        if start.is_none() {
            if c.is_whitespace() {
                continue;
            }
            start = Some(index);
        }

        match (quote, c) {
            (Some(_), '\\') => {
                let _ = chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth = depth.saturating_sub(1),
            (None, c) if c.is_whitespace() && depth == 0 => {
                if let Some(start) = start.take() {
                    params.push(&src[start..index]);
                }
            }
            _ => {}
        }
    }

    if let Some(start) = start {
        params.push(&src[start..]);
    }

    params
}

/// `key=value` parameters. Comparisons such as `a==b` or `a>=b` are not named parameters.
pub(crate) fn named_param(param: &str) -> Option<(&str, &str)> {
    let index = param.find('=')?;
    let (key, value) = (&param[..index], &param[index + 1..]);

    let valid_key = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !key.starts_with(|c: char| c.is_ascii_digit());

    match valid_key && !value.starts_with('=') {
        true => Some((key, value)),
        false => None,
    }
}
