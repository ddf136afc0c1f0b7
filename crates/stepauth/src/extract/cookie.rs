//! Cookie strategy: a `Set-Cookie` entry with exactly the parameter's name.

use crate::transport::HttpResponse;

/// Value of the first cookie named `name` (case-sensitive).
pub fn from_cookies(response: &HttpResponse, name: &str) -> Option<String> {
    response
        .cookies()
        .into_iter()
        .find(|(cname, _)| cname == name)
        .map(|(_, value)| value)
}
