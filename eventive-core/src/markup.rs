//! Markup written into a donations container once its fetch resolves

use crate::progress::ProgressResult;

pub const PROGRESS_HEADING: &str = "Fundraising Progress";

/// Shown inside the saved container until the page is hydrated
pub const LOADING_MESSAGE: &str = "Loading donation progress...";

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of `escape_html` for the entities it produces (plus `&#x27;`)
pub fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Heading, progress bar and caption
pub fn render_progress(result: &ProgressResult) -> String {
    let percent = result.percent_display();
    format!(
        concat!(
            "<h3>{heading}</h3>",
            "<div class=\"eventive-progress-bar\" role=\"progressbar\" aria-valuemin=\"0\" aria-valuemax=\"100\" aria-valuenow=\"{percent}\">",
            "<div class=\"eventive-progress-bar-fill\" style=\"width: {percent}%;\"></div>",
            "</div>",
            "<p class=\"eventive-progress-caption\">{caption}</p>"
        ),
        heading = PROGRESS_HEADING,
        percent = percent,
        caption = escape_html(&result.caption()),
    )
}

/// A single paragraph carrying the message
pub fn render_error(message: &str) -> String {
    format!(
        "<p class=\"eventive-donations-error\">{}</p>",
        escape_html(message)
    )
}

pub fn render_loading() -> String {
    format!("<p class=\"eventive-donations-loading\">{}</p>", LOADING_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Goal;

    #[test]
    fn test_progress_markup() {
        let result = ProgressResult::from_total(250.0, Goal::new(1000.0));
        let html = render_progress(&result);
        assert!(html.starts_with("<h3>Fundraising Progress</h3>"));
        assert!(html.contains("style=\"width: 25.00%;\""));
        assert!(html.contains("$250.00 of $1000.00 raised (25.00%)"));
    }

    #[test]
    fn test_error_markup_is_escaped() {
        let html = render_error("bad <input> & \"quotes\"");
        assert_eq!(
            html,
            "<p class=\"eventive-donations-error\">bad &lt;input&gt; &amp; &quot;quotes&quot;</p>"
        );
        assert!(!html.contains("eventive-progress-bar"));
    }

    #[test]
    fn test_unescape_reverses_escape() {
        let raw = "a & b <c> \"d\" 'e'";
        assert_eq!(unescape_html(&escape_html(raw)), raw);
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
    }
}
