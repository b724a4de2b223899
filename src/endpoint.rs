// Endpoint URL composition.
// Sonarr is often mounted behind a reverse proxy (`http://host/sonarr`), so
// the configured base URL may carry a path prefix that must survive when an
// API path is appended to it.

use url::Url;

use crate::error::{Error, Result};

/// Query parameter carrying the API key on every request.
pub const API_KEY_PARAM: &str = "apikey";

/// Parse a user supplied base URL, rejecting anything that cannot serve as
/// the root of an HTTP API.
pub fn parse_base(base: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidUrl {
        input: base.to_string(),
        reason,
    };

    let url = Url::parse(base.trim()).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http or https address".into()));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    Ok(url)
}

/// Resolve `endpoint` against `base`, keeping any path prefix of `base`.
///
/// `http://h:8989`, `http://h:8989/` and `http://h:8989/sonarr` joined with
/// `api/series` give `http://h:8989/api/series` and
/// `http://h:8989/sonarr/api/series` respectively.
pub fn compose(base: &str, endpoint: &str) -> Result<Url> {
    let mut url = parse_base(base)?;

    // A base without a trailing slash would have its last segment replaced
    // by the relative reference.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    let relative = endpoint.trim_start_matches('/');
    url.join(relative).map_err(|err| Error::InvalidUrl {
        input: endpoint.to_string(),
        reason: err.to_string(),
    })
}

/// Compose the full request URL including query parameters and the API key.
pub fn compose_request(
    base: &str,
    endpoint: &str,
    params: &[(&str, &str)],
    api_key: &str,
) -> Result<Url> {
    let mut url = compose(base, endpoint)?;
    {
        let mut query = url.query_pairs_mut();
        for (name, value) in params {
            query.append_pair(name, value);
        }
        query.append_pair(API_KEY_PARAM, api_key);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "api/series";

    #[test]
    fn joins_without_doubling_or_dropping_slashes() {
        let expected = "http://192.168.1.25:8989/api/series";
        let expected_with_prefix = "http://192.168.1.25:8989/sonarr/api/series";

        for base in [
            "http://192.168.1.25:8989",
            "http://192.168.1.25:8989/",
            "http://192.168.1.25:8989/sonarr",
        ] {
            let full = compose(base, ENDPOINT).unwrap().to_string();
            assert!(
                full == expected || full == expected_with_prefix,
                "unexpected url {full} for base {base}"
            );
            assert!(!full.contains("//api"));
        }
    }

    #[test]
    fn keeps_path_prefix() {
        let url = compose("http://192.168.1.25:8989/sonarr", ENDPOINT).unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.25:8989/sonarr/api/series");

        let url = compose("https://media.example.com/tv/sonarr/", ENDPOINT).unwrap();
        assert_eq!(url.as_str(), "https://media.example.com/tv/sonarr/api/series");
    }

    #[test]
    fn leading_slash_on_endpoint_does_not_escape_prefix() {
        let url = compose("http://localhost:8989/sonarr", "/api/profile").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8989/sonarr/api/profile");
    }

    #[test]
    fn rejects_unparseable_base() {
        for base in ["", "192.168.1.25:8989", "not a url", "mailto:me@example.com"] {
            let err = compose(base, ENDPOINT).unwrap_err();
            assert!(
                matches!(err, Error::InvalidUrl { .. }),
                "expected InvalidUrl for {base:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn request_url_carries_params_and_api_key_last() {
        let url = compose_request(
            "http://localhost:8989/",
            "api/series/lookup",
            &[("term", "the wire")],
            "abc123",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8989/api/series/lookup?term=the+wire&apikey=abc123"
        );
    }

    #[test]
    fn base_query_is_not_carried_over() {
        let url = compose_request("http://localhost:8989/?apikey=old", ENDPOINT, &[], "new").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8989/api/series?apikey=new");
    }
}
