use std::fmt::Write;

/// Strips every trailing `/` from a configured base url.
pub(crate) fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

pub(crate) fn construct_url(
    base_url: &str,
    path: &str,
    params: &[(String, String)],
) -> Result<String, std::fmt::Error> {
    let base_url = trim_base(base_url);
    let guessed_length = base_url.len() + path.len() + 1 + (params.len() * 20);
    let mut url = String::with_capacity(guessed_length);

    url.push_str(base_url);

    if !path.starts_with('/') {
        url.push('/');
    }
    url.push_str(path);

    if params.is_empty() {
        return Ok(url);
    }

    let mut prefix = "?";

    for (key, value) in params {
        url.push_str(prefix);

        encode_into(&mut url, key)?;
        url.push('=');
        encode_into(&mut url, value)?;

        prefix = "&";
    }

    Ok(url)
}

/// Percent-encodes a single path segment taken from caller input.
pub(crate) fn encode_segment(input: &str) -> String {
    let mut buffer = String::with_capacity(input.len());
    // Writing into a String cannot fail.
    let _ = encode_into(&mut buffer, input);
    buffer
}

fn encode_into(buffer: &mut String, input: &str) -> Result<(), std::fmt::Error> {
    for b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                buffer.push(*b as char);
            }
            _ => {
                write!(buffer, "%{:02X}", b)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_on_base_are_dropped() {
        let url = construct_url("https://api.example.edu///", "/course/7/", &[]).unwrap();
        assert_eq!(url, "https://api.example.edu/course/7/");
    }

    #[test]
    fn relative_path_gets_a_separator() {
        let url = construct_url("http://127.0.0.1:8000", "notifications/", &[]).unwrap();
        assert_eq!(url, "http://127.0.0.1:8000/notifications/");
    }

    #[test]
    fn params_are_percent_encoded() {
        let params = vec![
            ("email".to_string(), "ana+1@uni.edu".to_string()),
            ("q".to_string(), "data science".to_string()),
        ];
        let url = construct_url("http://h", "/explore/", &params).unwrap();
        assert_eq!(url, "http://h/explore/?email=ana%2B1%40uni.edu&q=data%20science");
    }

    #[test]
    fn segments_cannot_escape_the_path() {
        assert_eq!(encode_segment("../admin"), "..%2Fadmin");
        assert_eq!(encode_segment("jane_doe"), "jane_doe");
    }
}
