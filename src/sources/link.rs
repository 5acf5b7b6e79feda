//! `Link` header parsing (`<url>; rel="next", <url>; rel="last"`).

use std::collections::HashMap;

/// Parse a `Link` header into a map from relation name to URL.
///
/// Entries without a `<url>` or a `rel` parameter are skipped. A parameter
/// like `rel="next last"` registers the URL under both names.
pub fn parse_link_header(value: &str) -> HashMap<String, String> {
    let mut links = HashMap::new();

    for entry in value.split(',') {
        let mut parts = entry.split(';');
        let Some(target) = parts.next().map(str::trim) else {
            continue;
        };
        let Some(url) = target
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        else {
            continue;
        };

        for param in parts {
            let Some((key, val)) = param.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            for rel in val.trim().trim_matches('"').split_whitespace() {
                links.insert(rel.to_ascii_lowercase(), url.to_string());
            }
        }
    }

    links
}

/// The `rel="next"` URL of a `Link` header, if any.
pub fn next_link(value: Option<&str>) -> Option<String> {
    value.and_then(|v| parse_link_header(v).remove("next"))
}
