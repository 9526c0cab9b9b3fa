use crate::prelude::*;

/// Longest-prefix match of the (query-stripped) request path against the
/// ordered location table. Ties keep the earlier entry.
pub fn match_location<'a>(
    locations: &'a [LocationConfig],
    path: &str,
) -> Option<&'a LocationConfig> {
    let mut best: Option<&LocationConfig> = None;
    let mut best_len = 0;

    for location in locations {
        let prefix = &location.location;
        if !prefix.is_empty() && path.starts_with(prefix.as_str()) && prefix.len() > best_len {
            best = Some(location);
            best_len = prefix.len();
        }
    }
    best
}

pub fn is_method_allowed(methods: &[String], method: &str) -> bool {
    methods.iter().any(|m| m == method)
}

pub fn allow_header(methods: &[String]) -> String {
    methods.join(", ")
}

/// Filesystem base for a matched location. GET prefers the explicit `path`;
/// POST and DELETE prefer `upload_dir` so uploads land where they are
/// deleted from.
pub fn resolve_base_dir(location: Option<&LocationConfig>, root: &str, upload_first: bool) -> String {
    let Some(loc) = location else {
        return root.to_string();
    };

    let (first, second) = if upload_first {
        (&loc.upload_dir, &loc.path)
    } else {
        (&loc.path, &loc.upload_dir)
    };

    if !first.is_empty() {
        first.clone()
    } else if !second.is_empty() {
        second.clone()
    } else if loc.location == "/" {
        root.to_string()
    } else {
        format!("{}/{}", root, loc.location.trim_start_matches('/'))
    }
}

/// Request path with the matched prefix removed and the leading slash
/// stripped; the whole path (minus leading slash) when nothing matched.
pub fn resolve_suffix(location: Option<&LocationConfig>, path: &str) -> String {
    match location {
        Some(loc) => path[loc.location.len()..]
            .trim_start_matches('/')
            .to_string(),
        None => path.trim_start_matches('/').to_string(),
    }
}
