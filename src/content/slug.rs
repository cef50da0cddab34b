/// Derive a URL-safe slug from a title.
///
/// Keeps `[a-z0-9]`, turns whitespace runs into a single hyphen, collapses
/// hyphen runs and trims hyphens at both ends. Characters outside that set
/// (punctuation, non-ASCII letters) are dropped, not transliterated.
/// Collisions are not disambiguated here; the `posts.slug` unique constraint
/// rejects them.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_hyphen = false;
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug
}
