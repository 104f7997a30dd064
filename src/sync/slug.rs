//! Title to URL slug.

/// Turn a dashboard title into a URL slug.
///
/// Lowercases the title, collapses every run of characters that are not
/// ASCII letters or digits into one `-`, and trims leading and trailing
/// hyphens. `"Name of Dashboard"` becomes `"name-of-dashboard"`.
///
/// Slugs are not checked for uniqueness.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Name of Dashboard"), "name-of-dashboard");
        assert_eq!(slugify("CPU"), "cpu");
    }

    #[test]
    fn test_slugify_collapses_runs_and_trims() {
        assert_eq!(slugify("  PRs -- opened / merged (k8s)  "), "prs-opened-merged-k8s");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_non_ascii_is_a_separator() {
        assert_eq!(slugify("Café Ünits"), "caf-nits");
    }

    #[test]
    fn test_slugify_is_stable() {
        let once = slugify("Issues age (Repository groups)");
        assert_eq!(slugify(&once), once);
    }
}
