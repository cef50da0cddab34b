use std::collections::{HashMap, HashSet};

/// Tags that survive sanitization.
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "em", "u", "s", "h1", "h2", "h3", "ul", "ol", "li", "blockquote", "code",
    "pre", "a", "img", "span", "div",
];

/// Attributes that survive on any allowed tag.
const ALLOWED_ATTRIBUTES: &[&str] = &["href", "src", "alt", "title", "class", "target", "rel"];

/// Tags removed together with everything inside them.
const STRIPPED_CONTENT_TAGS: &[&str] = &["script", "style"];

/// URL schemes accepted in `href`/`src`; `data:` and `javascript:` are not among them.
const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Strip everything outside the rich-text allow-list.
///
/// Disallowed tags are removed (their text is kept, except for script and
/// style whose content goes too), disallowed attributes including inline
/// event handlers are dropped, and URLs with non-allow-listed schemes are
/// removed from the attribute. Pure function of its input.
pub fn sanitize_html(input: &str) -> String {
    ammonia::Builder::default()
        .tags(ALLOWED_TAGS.iter().copied().collect::<HashSet<_>>())
        .clean_content_tags(STRIPPED_CONTENT_TAGS.iter().copied().collect::<HashSet<_>>())
        .tag_attributes(HashMap::new())
        .generic_attributes(ALLOWED_ATTRIBUTES.iter().copied().collect::<HashSet<_>>())
        .url_schemes(ALLOWED_URL_SCHEMES.iter().copied().collect::<HashSet<_>>())
        .link_rel(None)
        .clean(input)
        .to_string()
}
