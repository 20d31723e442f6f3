//! Query string composition.
//!
//! Query parameters are always merged into the URL before dispatch, never
//! into the body.

use crate::models::Query;
use url::Url;

/// Appends `query` to `base` as URL query items.
///
/// Returns `None` when `base` cannot be parsed into an absolute URL. An empty
/// query returns the parsed base unchanged. Existing query items on `base`
/// are kept; new items follow them in map iteration order.
///
/// # Examples
///
/// ```
/// use networkable::models::Query;
/// use networkable::query::append_query;
///
/// let mut query = Query::new();
/// query.insert("page".to_string(), "2".to_string());
///
/// let url = append_query("https://api.example.com/items", &query).unwrap();
/// assert_eq!(url.as_str(), "https://api.example.com/items?page=2");
///
/// assert!(append_query("not a url", &query).is_none());
/// ```
pub fn append_query(base: &str, query: &Query) -> Option<Url> {
    let mut url = match Url::parse(base) {
        Ok(url) => url,
        Err(e) => {
            log::debug!("cannot compose query for {:?}: {}", base, e);
            return None;
        }
    };

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter());
    }

    Some(url)
}

/// Reads the query component of `url` back into a mapping.
///
/// Later duplicates of a key win.
pub fn query_pairs(url: &Url) -> Query {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
