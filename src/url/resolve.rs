use url::Url;

/// Schemes that make a reference absolute on its own
const ABSOLUTE_SCHEMES: &[&str] = &["http://", "https://"];

/// Returns true if `reference` carries a recognized scheme and should replace
/// the base URL instead of being joined against it
pub fn is_absolute(reference: &str) -> bool {
    let reference = reference.trim_start();
    ABSOLUTE_SCHEMES.iter().any(|scheme| {
        reference
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Resolves `reference` against `base_url` into an absolute URL without a
/// fragment
///
/// # Resolution Steps
///
/// 1. If the reference is itself absolute (`http://` or `https://`), it becomes
///    the base and nothing is joined
/// 2. The base URL's fragment is dropped
/// 3. The reference is joined per standard URL resolution rules (relative
///    paths, `..` segments, query-only and fragment-only references)
/// 4. The fragment of the result is dropped, since fragments never denote a
///    distinct crawlable resource
///
/// Malformed input never fails: if the base cannot be parsed or the join is
/// rejected, a best-effort string join is returned and the eventual fetch
/// surfaces the problem.
///
/// # Examples
///
/// ```
/// use trawl::url::resolve;
///
/// assert_eq!(resolve("http://a.com/x/y", "../z"), "http://a.com/z");
/// assert_eq!(resolve("http://a.com/x", "http://b.com/y"), "http://b.com/y");
/// assert_eq!(resolve("http://a.com/x#frag", ""), "http://a.com/x");
/// ```
pub fn resolve(base_url: &str, reference: &str) -> String {
    let reference = reference.trim();
    let (base, reference) = if is_absolute(reference) {
        (reference, "")
    } else {
        (base_url.trim(), reference)
    };

    let mut base_parsed = match Url::parse(base) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Unparseable base URL {:?}: {}", base, e);
            return naive_join(base, reference);
        }
    };
    base_parsed.set_fragment(None);

    match base_parsed.join(reference) {
        Ok(mut joined) => {
            joined.set_fragment(None);
            joined.into()
        }
        Err(e) => {
            tracing::trace!("Cannot join {:?} onto {}: {}", reference, base_parsed, e);
            naive_join(base_parsed.as_str(), reference)
        }
    }
}

/// Removes everything from the first `#` onwards
pub fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(head, _)| head)
}

/// Joins by replacing the last path segment of `base` with `reference`
fn naive_join(base: &str, reference: &str) -> String {
    let base = strip_fragment(base);
    let reference = strip_fragment(reference);

    if reference.is_empty() {
        return base.to_string();
    }

    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], reference.trim_start_matches('/')),
        None => reference.to_string(),
    }
}
