//! Home page data: the random-user demo and the technology grid.

use crate::core::http::{ApiError, HttpClient, RequestOptions};
use serde::Deserialize;

/// Public demo endpoint; absolute, so it bypasses the configured API base URL.
pub const RANDOM_USER_URL: &str = "https://randomuser.me/api/";

/// Entry in the "included technologies" grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Technology {
    /// Display name.
    pub name: &'static str,
    /// Translation key for the one-line description.
    pub description_key: &'static str,
}

/// Technologies shown on the home page.
pub const TECHNOLOGIES: [Technology; 9] = [
    Technology {
        name: "Yew",
        description_key: "home.tech.yew",
    },
    Technology {
        name: "yew-router",
        description_key: "home.tech.router",
    },
    Technology {
        name: "yewdux",
        description_key: "home.tech.yewdux",
    },
    Technology {
        name: "gloo",
        description_key: "home.tech.gloo",
    },
    Technology {
        name: "gloo-net",
        description_key: "home.tech.http",
    },
    Technology {
        name: "serde",
        description_key: "home.tech.serde",
    },
    Technology {
        name: "thiserror",
        description_key: "home.tech.thiserror",
    },
    Technology {
        name: "tracing",
        description_key: "home.tech.tracing",
    },
    Technology {
        name: "Trunk",
        description_key: "home.tech.trunk",
    },
];

/// Envelope returned by the random-user API.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RandomUserResponse {
    /// Generated users; the demo requests one.
    #[serde(default)]
    pub results: Vec<RandomUser>,
}

/// Subset of a generated user the demo renders.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RandomUser {
    /// Name parts.
    pub name: PersonName,
    /// Email address.
    pub email: String,
    /// Location details.
    pub location: Location,
    /// Avatar URLs.
    pub picture: Picture,
}

/// Name parts.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PersonName {
    /// Given name.
    pub first: String,
    /// Family name.
    pub last: String,
}

/// Location details.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// Country name.
    pub country: String,
}

/// Avatar URLs.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Picture {
    /// Medium-size avatar.
    pub medium: String,
}

/// Flattened card contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSummary {
    /// Given name (used as image alt text).
    pub first_name: String,
    /// "First Last".
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Country name.
    pub country: String,
    /// Avatar URL.
    pub avatar_url: String,
}

impl RandomUserResponse {
    /// Summary of the first result, if any.
    #[must_use]
    pub fn first_summary(&self) -> Option<UserSummary> {
        self.results.first().map(|user| UserSummary {
            first_name: user.name.first.clone(),
            full_name: format!("{} {}", user.name.first, user.name.last),
            email: user.email.clone(),
            country: user.location.country.clone(),
            avatar_url: user.picture.medium.clone(),
        })
    }
}

/// Fetch one generated user through the shared client.
///
/// `Ok(None)` means the service answered with an empty result list.
///
/// # Errors
///
/// Propagates the client's [`ApiError`], including [`ApiErrorKind::Aborted`] when the
/// caller cancels through `options`.
///
/// [`ApiErrorKind::Aborted`]: crate::core::http::ApiErrorKind::Aborted
pub async fn fetch_random_user(
    client: &HttpClient,
    options: RequestOptions,
) -> Result<Option<UserSummary>, ApiError> {
    let response: RandomUserResponse = client.get(RANDOM_USER_URL, options).await?;
    Ok(response.first_summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;
    use crate::core::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};
    use crate::core::storage::{AUTH_TOKEN_KEY, KeyValueStore, MemoryStorage};
    use crate::i18n::LocaleCatalog;
    use futures_util::future::{LocalBoxFuture, pending, ready};
    use std::cell::RefCell;
    use std::error::Error;
    use std::rc::Rc;
    use std::time::Duration;

    const SAMPLE: &str = r#"{
        "results": [{
            "gender": "female",
            "name": {"title": "Ms", "first": "Lina", "last": "Moreau"},
            "email": "lina.moreau@example.com",
            "location": {"city": "Lyon", "country": "France"},
            "picture": {"large": "l.jpg", "medium": "m.jpg", "thumbnail": "t.jpg"}
        }],
        "info": {"seed": "abc", "results": 1}
    }"#;

    struct FixedTransport {
        status: u16,
        body: &'static str,
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl FixedTransport {
        fn new(status: u16, body: &'static str) -> Rc<Self> {
            Rc::new(Self {
                status,
                body,
                sent: RefCell::new(Vec::new()),
            })
        }
    }

    impl HttpTransport for FixedTransport {
        fn send(
            &self,
            request: HttpRequest,
        ) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
            self.sent.borrow_mut().push(request);
            Box::pin(ready(Ok(HttpResponse {
                status: self.status,
                status_text: String::new(),
                body: self.body.to_string(),
            })))
        }

        fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
            Box::pin(pending())
        }
    }

    #[test]
    fn sample_payload_summarises_first_user() -> Result<(), Box<dyn Error>> {
        let response: RandomUserResponse = serde_json::from_str(SAMPLE)?;
        let summary = response.first_summary().ok_or("no user")?;
        assert_eq!(summary.full_name, "Lina Moreau");
        assert_eq!(summary.country, "France");
        assert_eq!(summary.avatar_url, "m.jpg");
        Ok(())
    }

    #[test]
    fn empty_results_yield_no_summary() -> Result<(), Box<dyn Error>> {
        let response: RandomUserResponse = serde_json::from_str(r#"{"info":{}}"#)?;
        assert_eq!(response.first_summary(), None);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_uses_absolute_url_and_decodes() -> Result<(), Box<dyn Error>> {
        let transport = FixedTransport::new(200, SAMPLE);
        let client = HttpClient::new(
            &AppConfig::default(),
            transport.clone(),
            Rc::new(MemoryStorage::new()),
        );
        let summary = fetch_random_user(&client, RequestOptions::new()).await?;
        assert_eq!(summary.map(|user| user.email).as_deref(), Some("lina.moreau@example.com"));
        let urls: Vec<String> = transport.sent.borrow().iter().map(|req| req.url.clone()).collect();
        assert_eq!(urls, vec![RANDOM_USER_URL.to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn app_token_never_reaches_the_demo_host() -> Result<(), Box<dyn Error>> {
        let transport = FixedTransport::new(200, SAMPLE);
        let storage = Rc::new(MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "app-secret")]));
        let client = HttpClient::new(&AppConfig::default(), transport.clone(), storage);
        fetch_random_user(&client, RequestOptions::new()).await?;
        let sent = transport.sent.borrow();
        let request = sent.first().ok_or("no request recorded")?;
        assert_eq!(request.url, RANDOM_USER_URL);
        assert_eq!(request.header("Authorization"), None);
        Ok(())
    }

    #[tokio::test]
    async fn demo_host_401_keeps_the_app_token() {
        let transport = FixedTransport::new(401, r#"{"error":"unauthorized"}"#);
        let storage = Rc::new(MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "app-secret")]));
        let client = HttpClient::new(&AppConfig::default(), transport, storage.clone());
        let err = fetch_random_user(&client, RequestOptions::new()).await.err();
        assert_eq!(err.as_ref().and_then(|err| err.status), Some(401));
        assert!(!err.as_ref().is_some_and(ApiError::is_auth_expired));
        assert_eq!(storage.get(AUTH_TOKEN_KEY).as_deref(), Some("app-secret"));
    }

    #[test]
    fn technology_descriptions_are_translated() {
        let catalog = LocaleCatalog::bundled();
        for tech in TECHNOLOGIES {
            assert!(
                catalog.lookup(tech.description_key, "en").is_some(),
                "{}",
                tech.name
            );
        }
    }
}
