use std::fmt::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use url::Url;

use crate::models::{time_ago, Story};

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Hacker News: top stories</title>
<style>
body { font-family: Verdana, Geneva, sans-serif; font-size: 10pt; background: #f6f6ef; margin: 0 auto; max-width: 85%; }
header { background: #ff6600; padding: 4px 8px; font-weight: bold; }
ol { padding-left: 2.5em; }
li { margin: 6px 0; color: #828282; }
li > a.title, li > span.title { color: #000; text-decoration: none; }
.host, .host a, .meta, .meta a { color: #828282; font-size: 8pt; }
footer { border-top: 2px solid #ff6600; color: #828282; font-size: 8pt; padding: 8px 0; }
</style>
</head>
<body>
<header>Hacker News</header>
"#;

/// Renders the full page. `elapsed` is how long producing the list took.
pub fn render_page(stories: &[Story], elapsed: Duration) -> String {
    render_page_at(stories, elapsed, Utc::now())
}

pub fn render_page_at(stories: &[Story], elapsed: Duration, now: DateTime<Utc>) -> String {
    let mut html = String::with_capacity(1024 + stories.len() * 512);
    html.push_str(HEAD);
    html.push_str("<ol>\n");
    for story in stories {
        render_story(&mut html, story, now);
    }
    html.push_str("</ol>\n");
    // writing into a String can't fail
    let _ = write!(
        html,
        "<footer>{} stories in {:.2?}</footer>\n</body>\n</html>\n",
        stories.len(),
        elapsed
    );
    html
}

fn render_story(html: &mut String, story: &Story, now: DateTime<Utc>) {
    match web_link(story.url()) {
        Some(href) => {
            let _ = write!(
                html,
                r#"<li><a class="title" href="{}">{}</a>"#,
                encode_double_quoted_attribute(href),
                encode_text(story.title())
            );
        }
        None => {
            let _ = write!(
                html,
                r#"<li><span class="title">{}</span>"#,
                encode_text(story.title())
            );
        }
    }

    if !story.host.is_empty() {
        let _ = write!(
            html,
            r#" <span class="host">(<a href="https://news.ycombinator.com/from?site={}">{}</a>)</span>"#,
            urlencoding::encode(&story.host),
            encode_text(&story.host)
        );
    }

    let age = story
        .posted_at()
        .map(|posted| time_ago(posted, now))
        .unwrap_or_default();
    let _ = write!(
        html,
        r#"<div class="meta">{} points by {} {} | <a href="{}">{}</a></div></li>"#,
        story.score(),
        encode_text(story.by()),
        age,
        encode_double_quoted_attribute(&story.discussion_url()),
        comments_label(story.comments())
    );
    html.push('\n');
}

/// Only http(s) targets are linked; anything else (javascript:, data:, or an
/// unparsable string) leaves the title as plain text.
fn web_link(raw: &str) -> Option<&str> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(raw),
        _ => None,
    }
}

fn comments_label(count: i64) -> String {
    match count {
        0 => "discuss".to_string(),
        1 => "1 comment".to_string(),
        n => format!("{} comments", n),
    }
}
