use percent_encoding::percent_decode_str;

pub const CSRF_COOKIE_NAME: &str = "csrftoken";

pub fn get_cookie(cookie_string: &str, name: &str) -> Option<String> {
    if cookie_string.is_empty() {
        return None;
    }
    let prefix = format!("{}=", name);
    cookie_string
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .map(|value| percent_decode_str(value).decode_utf8_lossy().into_owned())
}

pub fn get_csrf_token(cookie_string: &str) -> Option<String> {
    get_cookie(cookie_string, CSRF_COOKIE_NAME)
}
