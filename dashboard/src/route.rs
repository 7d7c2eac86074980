use std::fmt;

use url::Url;

use crate::auth::OAuthCallback;

/// Dashboard sections addressed by path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Dashboard,
    Brands,
    Brand(String),
    Evaluations,
    Evaluation(String),
    History,
    Prompts,
    Learn,
    Report(String),
    AuthCallback(OAuthCallback),
    NotFound(String),
}

/// The screen a route is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Overview,
    Evaluations,
    History,
    Prompts,
    Learn,
    Report,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Overview,
        View::Evaluations,
        View::History,
        View::Prompts,
        View::Learn,
        View::Report,
    ];

    /// i18n key for the tab title.
    pub fn title_key(&self) -> &'static str {
        match self {
            View::Overview => "nav.dashboard",
            View::Evaluations => "nav.evaluations",
            View::History => "nav.history",
            View::Prompts => "nav.prompts",
            View::Learn => "nav.learn",
            View::Report => "nav.report",
        }
    }
}

impl Route {
    /// Parse a path such as `/brands/3` or `/auth/callback?token=...`.
    /// Full URLs are accepted too; only the path and query matter.
    pub fn parse(input: &str) -> Route {
        let url = match Url::parse(input)
            .or_else(|_| Url::parse("http://localhost").and_then(|base| base.join(input)))
        {
            Ok(url) => url,
            Err(_) => return Route::NotFound(input.to_string()),
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [] => Route::Home,
            ["dashboard"] => Route::Dashboard,
            ["dashboard", "history"] => Route::History,
            ["brands"] => Route::Brands,
            ["brands", id] => Route::Brand(id.to_string()),
            ["evaluations"] => Route::Evaluations,
            ["evaluations", id] => Route::Evaluation(id.to_string()),
            ["prompts"] => Route::Prompts,
            ["learn"] => Route::Learn,
            ["report", id] => Route::Report(id.to_string()),
            ["auth", "callback"] => Route::AuthCallback(OAuthCallback::from_url(&url)),
            _ => Route::NotFound(url.path().to_string()),
        }
    }

    pub fn view(&self) -> View {
        match self {
            Route::Home
            | Route::Dashboard
            | Route::Brands
            | Route::Brand(_)
            | Route::AuthCallback(_)
            | Route::NotFound(_) => View::Overview,
            Route::Evaluations | Route::Evaluation(_) => View::Evaluations,
            Route::History => View::History,
            Route::Prompts => View::Prompts,
            Route::Learn => View::Learn,
            Route::Report(_) => View::Report,
        }
    }

    pub fn brand_id(&self) -> Option<&str> {
        match self {
            Route::Brand(id) => Some(id),
            _ => None,
        }
    }

    pub fn run_id(&self) -> Option<&str> {
        match self {
            Route::Evaluation(id) => Some(id),
            _ => None,
        }
    }

    pub fn report_id(&self) -> Option<&str> {
        match self {
            Route::Report(id) => Some(id),
            _ => None,
        }
    }

    /// The plain route for a view, without any selected id.
    pub fn for_view(view: View) -> Route {
        match view {
            View::Overview => Route::Dashboard,
            View::Evaluations => Route::Evaluations,
            View::History => Route::History,
            View::Prompts => Route::Prompts,
            View::Learn => Route::Learn,
            View::Report => Route::History,
        }
    }

    /// Where Backspace goes.
    pub fn parent(&self) -> Route {
        match self {
            Route::Brand(_) => Route::Brands,
            Route::Evaluation(_) => Route::Evaluations,
            Route::Report(_) => Route::History,
            _ => Route::Dashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Dashboard => f.write_str("/dashboard"),
            Route::Brands => f.write_str("/brands"),
            Route::Brand(id) => write!(f, "/brands/{}", id),
            Route::Evaluations => f.write_str("/evaluations"),
            Route::Evaluation(id) => write!(f, "/evaluations/{}", id),
            Route::History => f.write_str("/dashboard/history"),
            Route::Prompts => f.write_str("/prompts"),
            Route::Learn => f.write_str("/learn"),
            Route::Report(id) => write!(f, "/report/{}", id),
            Route::AuthCallback(_) => f.write_str("/auth/callback"),
            Route::NotFound(path) => f.write_str(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/dashboard"), Route::Dashboard);
        assert_eq!(Route::parse("/dashboard/history"), Route::History);
        assert_eq!(Route::parse("/prompts/"), Route::Prompts);
        assert_eq!(Route::parse("/learn"), Route::Learn);
        assert_eq!(Route::parse("/nowhere"), Route::NotFound("/nowhere".into()));
    }

    #[test]
    fn dynamic_segments_round_trip() {
        for path in ["/brands/3", "/evaluations/run-42", "/report/diag-7"] {
            assert_eq!(Route::parse(path).to_string(), path);
        }
        assert_eq!(Route::parse("/report/diag-7").report_id(), Some("diag-7"));
        assert_eq!(Route::parse("/brands/3").brand_id(), Some("3"));
    }

    #[test]
    fn callback_query_is_kept() {
        assert_eq!(
            Route::parse("/auth/callback?token=t0k"),
            Route::AuthCallback(OAuthCallback::Token("t0k".into()))
        );
        assert_eq!(
            Route::parse("https://app.example.com/auth/callback?error=denied").view(),
            View::Overview
        );
    }

    #[test]
    fn views_and_parents() {
        assert_eq!(Route::parse("/evaluations/r1").view(), View::Evaluations);
        assert_eq!(Route::Evaluation("r1".into()).parent(), Route::Evaluations);
        assert_eq!(Route::Report("x".into()).parent(), Route::History);
        assert_eq!(Route::for_view(View::Learn), Route::Learn);
    }
}
