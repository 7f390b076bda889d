//! Fundraiser block containers: the markup the block saves, and discovery of
//! saved containers in a rendered page.
//!
//! Saved form:
//!   <div id="eventive-donations-container" class="eventive-donations"
//!        data-start-time="..." data-end-time="..." data-goal-amount="...">
//!     <p class="eventive-donations-loading">...</p>
//!   </div>

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::markup::{escape_html, render_loading, unescape_html};
use crate::progress::{DateRange, Goal};

/// Element id every fundraiser container carries
pub const CONTAINER_ID: &str = "eventive-donations-container";

pub const ATTR_START_TIME: &str = "data-start-time";
pub const ATTR_END_TIME: &str = "data-end-time";
pub const ATTR_GOAL_AMOUNT: &str = "data-goal-amount";

static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?P<tag>[A-Za-z][A-Za-z0-9]*)(?P<attrs>(?:\s[^>]*)?)>").expect("valid regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?P<name>[A-Za-z_:][-A-Za-z0-9_:.]*)"#,
        r#"(?:\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"'=<>`]+)))?"#
    ))
    .expect("valid regex")
});

/// Block attributes as the host stores them; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAttributes {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub goal_amount: Option<String>,
}

impl BlockAttributes {
    pub fn new(
        start_time: Option<impl Into<String>>,
        end_time: Option<impl Into<String>>,
        goal_amount: Option<f64>,
    ) -> Self {
        Self {
            start_time: start_time.map(Into::into),
            end_time: end_time.map(Into::into),
            goal_amount: goal_amount.map(|g| g.to_string()),
        }
    }

    /// `None` when either date is missing or empty
    pub fn date_range(&self) -> Option<DateRange> {
        DateRange::new(self.start_time.as_deref(), self.end_time.as_deref())
    }

    pub fn goal(&self) -> Goal {
        Goal::parse(self.goal_amount.as_deref())
    }

    /// The container markup the block saves into post content
    pub fn placeholder_markup(&self) -> String {
        let mut html = format!("<div id=\"{}\" class=\"eventive-donations\"", CONTAINER_ID);
        for (name, value) in [
            (ATTR_START_TIME, &self.start_time),
            (ATTR_END_TIME, &self.end_time),
            (ATTR_GOAL_AMOUNT, &self.goal_amount),
        ] {
            if let Some(value) = value {
                html.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
            }
        }
        html.push('>');
        html.push_str(&render_loading());
        html.push_str("</div>");
        html
    }
}

/// One container found in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInstance {
    /// Position among the page's containers, in document order
    pub index: usize,
    /// Byte span of the container element, tags included
    pub outer: Range<usize>,
    /// Byte span of the container's content, replaced on hydration
    pub inner: Range<usize>,
    pub attributes: BlockAttributes,
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .map(|caps| {
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("bare"))
                .map(|m| unescape_html(m.as_str()))
                .unwrap_or_default();
            (caps["name"].to_ascii_lowercase(), value)
        })
        .collect()
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Find the byte offset of the tag closing an element opened just before
/// `from`, honouring nested elements with the same tag name.
/// Returns (start of closing tag, end of closing tag).
fn find_close(html: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let re = Regex::new(&format!(r"(?i)<(/?){}(?:\s[^>]*)?>", regex::escape(tag))).ok()?;
    let mut depth = 1usize;
    for caps in re.captures_iter(&html[from..]) {
        let m = caps.get(0)?;
        let closing = caps.get(1).is_some_and(|c| !c.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return Some((from + m.start(), from + m.end()));
            }
        } else if !m.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

/// Discover every fundraiser container in `html`, in document order.
///
/// Containers are matched by id. A container nested inside another one is
/// ignored, as is a container with no closing tag.
pub fn discover_blocks(html: &str) -> Vec<BlockInstance> {
    let mut found = Vec::new();
    let mut cursor = 0;

    for caps in OPEN_TAG_RE.captures_iter(html) {
        let Some(open) = caps.get(0) else { continue };
        if open.start() < cursor {
            continue;
        }

        let attrs = parse_attrs(caps.name("attrs").map_or("", |m| m.as_str()));
        if attr(&attrs, "id") != Some(CONTAINER_ID) {
            continue;
        }

        let tag = &caps["tag"];
        let Some((close_start, close_end)) = find_close(html, tag, open.end()) else {
            warn!(offset = open.start(), "donations container has no closing tag; skipping");
            continue;
        };

        found.push(BlockInstance {
            index: found.len(),
            outer: open.start()..close_end,
            inner: open.end()..close_start,
            attributes: BlockAttributes {
                start_time: attr(&attrs, ATTR_START_TIME).map(str::to_string),
                end_time: attr(&attrs, ATTR_END_TIME).map(str::to_string),
                goal_amount: attr(&attrs, ATTR_GOAL_AMOUNT).map(str::to_string),
            },
        });
        cursor = close_end;
    }

    found
}
