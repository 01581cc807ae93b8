//! Resolving resources to source URLs.
//!
//! A base-URL table maps folders to templates containing a `{path}`
//! placeholder. The closest entry with a URL wins; attribution breakpoints
//! cut the lookup off.

use crate::error::Result;
use crate::model::{BaseUrlsForSources, ResourceId, get_parents};
use std::collections::HashSet;

/// Placeholder replaced by the path relative to the matched folder.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Opens URLs outside the process, e.g. in a browser.
pub trait LinkOpener {
    /// Open `url`. An error makes the caller show an invalid-link popup.
    fn open(&self, url: &str) -> Result<()>;
}

/// URL of `resource_id`, or `None` if no folder on the way up has one.
///
/// The resource itself is checked first. Entries mapped to `null` are
/// skipped; a breakpoint without its own URL stops the walk.
#[must_use]
pub fn get_url_for_resource(
    resource_id: &str,
    base_urls: &BaseUrlsForSources,
    attribution_breakpoints: &HashSet<ResourceId>,
) -> Option<String> {
    let mut candidates = get_parents(resource_id);
    candidates.push(resource_id.to_string());

    for candidate in candidates.iter().rev() {
        if let Some(Some(template)) = base_urls.get(candidate) {
            let relative = resource_id
                .strip_prefix(candidate.as_str())
                .unwrap_or_default()
                .trim_matches('/');
            return Some(template.replace(PATH_PLACEHOLDER, relative));
        }
        if attribution_breakpoints.contains(candidate) {
            tracing::debug!(resource_id, breakpoint = %candidate, "URL lookup stopped at breakpoint");
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_urls(entries: &[(&str, Option<&str>)]) -> BaseUrlsForSources {
        entries
            .iter()
            .map(|(path, url)| ((*path).to_string(), url.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_closest_ancestor_wins() {
        let urls = base_urls(&[
            ("/", Some("https://root/{path}")),
            ("/repo/", Some("https://github.com/org/repo/blob/main/{path}")),
        ]);
        assert_eq!(
            get_url_for_resource("/repo/src/lib.rs", &urls, &HashSet::new()).as_deref(),
            Some("https://github.com/org/repo/blob/main/src/lib.rs")
        );
        assert_eq!(
            get_url_for_resource("/other/", &urls, &HashSet::new()).as_deref(),
            Some("https://root/other")
        );
    }

    #[test]
    fn test_null_entry_is_skipped() {
        let urls = base_urls(&[("/", Some("https://root/{path}")), ("/repo/", None)]);
        assert_eq!(
            get_url_for_resource("/repo/a.js", &urls, &HashSet::new()).as_deref(),
            Some("https://root/repo/a.js")
        );
    }

    #[test]
    fn test_breakpoint_stops_lookup() {
        let urls = base_urls(&[("/", Some("https://root/{path}"))]);
        let breakpoints: HashSet<ResourceId> = ["/node_modules/".to_string()].into_iter().collect();
        assert_eq!(
            get_url_for_resource("/node_modules/lodash/index.js", &urls, &breakpoints),
            None
        );
    }

    #[test]
    fn test_no_base_urls() {
        assert_eq!(get_url_for_resource("/a", &BaseUrlsForSources::new(), &HashSet::new()), None);
    }
}
