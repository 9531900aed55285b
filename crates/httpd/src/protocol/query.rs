use std::collections::HashMap;

/// Parses a raw query string such as `a=1&b=2` into a map.
///
/// Pairs without `=` or with an empty value are skipped, keys and values are
/// trimmed, and a repeated key keeps its last value. Values are not
/// percent-decoded.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut data = HashMap::new();

    for kv in raw.split('&') {
        let Some((key, value)) = kv.split_once('=') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        data.insert(key.trim().to_string(), value.trim().to_string());
    }

    data
}

/// Parses `Cookie` header values (`uuid=123456; HOME=1`) into a map.
///
/// Unlike query pairs, a cookie with an empty value is kept.
pub fn parse_cookies<'a, I>(lines: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut cookies = HashMap::new();

    for line in lines {
        for kv in line.split(';') {
            if let Some((key, value)) = kv.split_once('=') {
                cookies.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    cookies
}
