//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::Stop;
use crate::route::{RouteMap, total_distance};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Journal page: stop timeline, map and total distance.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub stops: Vec<StopView>,
    pub total_distance_km: u64,
    /// Route map as JSON, safe to inline in a `<script>` element
    pub map_json: String,
}

/// Shown when the request carries no usable session token.
///
/// With a project configured the page signs in with email and password;
/// otherwise it offers a local demo session.
#[derive(Template)]
#[template(path = "sign_in.html")]
pub struct SignInTemplate {
    pub supabase_url: Option<String>,
    pub anon_key: Option<String>,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
    pub details: Option<String>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Stop view model for templates.
#[derive(Debug, Clone)]
pub struct StopView {
    pub id: String,
    /// 1-based position in the route
    pub number: usize,
    pub location: String,
    /// e.g. "Jan 15, 2024"
    pub date: String,
    pub description: String,
}

impl StopView {
    pub fn from_stop(number: usize, stop: &Stop) -> Self {
        Self {
            id: stop.id.to_string(),
            number,
            location: stop.location.clone(),
            date: stop.date.format("%b %-d, %Y").to_string(),
            description: stop.description.clone(),
        }
    }
}

impl IndexTemplate {
    pub fn from_stops(stops: &[Stop]) -> Self {
        let map = RouteMap::from_stops(stops);

        Self {
            stops: stops
                .iter()
                .enumerate()
                .map(|(i, s)| StopView::from_stop(i + 1, s))
                .collect(),
            total_distance_km: total_distance(stops),
            map_json: script_safe_json(&map),
        }
    }

    /// "1 stop" / "3 stops"
    pub fn stop_count_label(&self) -> String {
        match self.stops.len() {
            1 => "1 stop".to_string(),
            n => format!("{n} stops"),
        }
    }
}

/// Serialise for embedding inside a `<script>` element.
///
/// Every `<` becomes `\u003c`, so user text can neither close the element
/// nor open a comment. `<` only appears inside JSON strings, where the
/// escape decodes to the same character.
fn script_safe_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, StopId};
    use chrono::NaiveDate;

    fn stop(id: &str, description: &str) -> Stop {
        Stop {
            id: StopId::new(id),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            location: "Paris, France".into(),
            point: GeoPoint::new(48.8566, 2.3522).unwrap(),
            description: description.into(),
        }
    }

    #[test]
    fn stop_view_formats_date() {
        let view = StopView::from_stop(1, &stop("a", "x"));
        assert_eq!(view.date, "Jan 5, 2024");
        assert_eq!(view.number, 1);
    }

    #[test]
    fn stop_count_label() {
        assert_eq!(IndexTemplate::from_stops(&[]).stop_count_label(), "0 stops");
        assert_eq!(
            IndexTemplate::from_stops(&[stop("a", "x")]).stop_count_label(),
            "1 stop"
        );
        assert_eq!(
            IndexTemplate::from_stops(&[stop("a", "x"), stop("b", "y")]).stop_count_label(),
            "2 stops"
        );
    }

    #[test]
    fn map_json_cannot_close_script() {
        let page = IndexTemplate::from_stops(&[stop("a", "</script><script>alert(1)")]);
        assert!(!page.map_json.contains('<'));
        assert!(page.map_json.contains("\\u003c/script>"));
    }

    #[test]
    fn map_json_cannot_open_comment() {
        let description = "<!--<script>";
        let page = IndexTemplate::from_stops(&[stop("a", description)]);
        assert!(!page.map_json.contains("<!--"));

        // Still decodes to the original text
        let map: serde_json::Value = serde_json::from_str(&page.map_json).unwrap();
        assert_eq!(map["markers"][0]["description"], description);
    }

    #[test]
    fn index_renders_total_distance() {
        let mut rome = stop("b", "Colosseum");
        rome.location = "Rome, Italy".into();
        rome.point = GeoPoint::new(41.9028, 12.4964).unwrap();

        let html = IndexTemplate::from_stops(&[stop("a", "Eiffel Tower"), rome])
            .render()
            .unwrap();

        assert!(html.contains("Total Distance"));
        assert!(html.contains("1105 km"));
        assert!(html.contains("Rome, Italy"));
        assert!(html.contains("2 stops"));
    }

    #[test]
    fn sign_in_offers_demo_without_project() {
        let html = SignInTemplate {
            supabase_url: None,
            anon_key: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("demo-sign-in"));

        let html = SignInTemplate {
            supabase_url: Some("https://demo.supabase.co".into()),
            anon_key: Some("anon".into()),
        }
        .render()
        .unwrap();
        assert!(html.contains("demo.supabase.co"));
        assert!(!html.contains("demo-sign-in"));
    }

    #[test]
    fn index_escapes_descriptions() {
        let html = IndexTemplate::from_stops(&[stop("a", "<b>bold</b>")])
            .render()
            .unwrap();
        assert!(html.contains("&lt;b&gt;bold"));
        assert!(!html.contains("<b>bold</b></p>"));
    }
}
