//! Paginated list envelopes.
//!
//! List responses wrap the result page in `{count, next, previous,
//! results}`. Pages are requested with a 1-based `page` query parameter;
//! `next` and `previous` are same-path links with the `page` parameter
//! swapped, preserving the remaining query string.

use axum::http::Uri;
use serde::Serialize;

use carbon_usage_core::ValidationErrors;

/// A paginated list response.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    /// Total number of results matching the filter, across all pages.
    pub count: i64,
    /// Link to the next page, if any.
    pub next: Option<String>,
    /// Link to the previous page, if any.
    pub previous: Option<String>,
    /// The result page, in the resolved order.
    pub results: Vec<T>,
}

/// Extract the 1-based page number from decoded query pairs (default 1).
///
/// # Errors
///
/// Returns a field error when `page` is present but not a positive
/// integer.
pub fn page_number(pairs: &[(String, String)]) -> Result<u32, ValidationErrors> {
    let mut page = 1;
    for (key, value) in pairs {
        if key == "page" {
            match value.parse::<u32>() {
                Ok(n) if n >= 1 => page = n,
                _ => {
                    return Err(ValidationErrors::single(
                        "page",
                        "a valid page number is required",
                    ))
                }
            }
        }
    }
    Ok(page)
}

/// Build the envelope for one result page.
#[must_use]
pub fn envelope<T>(uri: &Uri, page: u32, page_size: u32, count: i64, results: Vec<T>) -> Page<T> {
    let has_next = i64::from(page) * i64::from(page_size) < count;
    let next = has_next.then(|| page_link(uri, page + 1));
    let previous = (page > 1).then(|| page_link(uri, page - 1));

    Page {
        count,
        next,
        previous,
        results,
    }
}

/// Rebuild the request target with the `page` parameter replaced.
///
/// Query segments other than `page` are carried over still encoded, so no
/// re-encoding is needed.
fn page_link(uri: &Uri, page: u32) -> String {
    let mut params: Vec<String> = uri
        .query()
        .map(|q| {
            q.split('&')
                .filter(|segment| !segment.is_empty() && !segment.starts_with("page="))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    params.push(format!("page={page}"));

    format!("{}?{}", uri.path(), params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(page_number(&[]).unwrap(), 1);
        assert_eq!(page_number(&pairs(&[("page", "3")])).unwrap(), 3);
    }

    #[test]
    fn invalid_page_is_a_field_error() {
        assert!(page_number(&pairs(&[("page", "0")])).is_err());
        assert!(page_number(&pairs(&[("page", "last")])).is_err());
    }

    #[test]
    fn single_page_has_no_links() {
        let uri: Uri = "/usage_types".parse().unwrap();
        let page = envelope(&uri, 1, 50, 5, vec![(); 5]);
        assert_eq!(page.count, 5);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn middle_page_links_both_ways() {
        let uri: Uri = "/usage?min_amount=3&page=2".parse().unwrap();
        let page = envelope(&uri, 2, 2, 5, vec![(); 2]);
        assert_eq!(page.next.as_deref(), Some("/usage?min_amount=3&page=3"));
        assert_eq!(page.previous.as_deref(), Some("/usage?min_amount=3&page=1"));
    }

    #[test]
    fn last_page_has_only_previous() {
        let uri: Uri = "/usage?page=3".parse().unwrap();
        let page = envelope(&uri, 3, 2, 5, vec![(); 1]);
        assert!(page.next.is_none());
        assert_eq!(page.previous.as_deref(), Some("/usage?page=2"));
    }
}
