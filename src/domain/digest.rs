use chrono::{DateTime, SecondsFormat, Utc};

use super::{ArticleRecord, DigestRequest};

const TITLE_MAX_CHARS: usize = 90;
const EMPTY_NOTICE: &str = "오늘은 조건에 맞는 기사가 없습니다.";

const STYLE: &str = "body{margin:0;background:#f6f7f9;color:#1f2937;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;}\
.wrap{max-width:760px;margin:0 auto;padding:24px 16px 40px;}\
.hero{background:#ffffff;border:1px solid #e5e7eb;border-radius:14px;padding:18px 18px 14px;}\
.headline{margin:0;font-size:22px;line-height:1.25;letter-spacing:-0.02em;}\
.sub{margin:8px 0 0;color:#6b7280;font-size:13px;}\
.section{margin-top:16px;}\
.card{background:#fff;border:1px solid #e5e7eb;border-radius:12px;padding:14px;margin:10px 0;}\
.title{display:block;font-size:16px;line-height:1.45;}\
.link{margin-top:8px;word-break:break-all;}\
.link a{color:#0f766e;font-size:14px;font-weight:700;text-decoration:none;}\
.link a:hover{text-decoration:underline;}\
.meta{margin-top:6px;font-size:12px;color:#6b7280;word-break:break-all;}\
.foot{margin-top:14px;color:#6b7280;font-size:12px;}";

/// Plain text and HTML alternatives of one mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailBody {
    pub text: String,
    pub html: String,
}

/// Rendered email for one keyword
#[derive(Debug, Clone)]
pub struct Digest {
    pub keyword: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub item_count: usize,
}

impl Digest {
    /// Render records in the given order. An empty slice still yields a
    /// complete digest carrying the "no articles" notice.
    pub fn build(records: &[ArticleRecord], request: &DigestRequest, now: DateTime<Utc>) -> Self {
        Self {
            keyword: request.keyword.clone(),
            subject: Self::subject(records.len(), request),
            text: Self::text_body(records, request, now),
            html: Self::html_body(records, request, now),
            item_count: records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    pub fn body(&self) -> MailBody {
        MailBody {
            text: self.text.clone(),
            html: self.html.clone(),
        }
    }

    fn subject(count: usize, request: &DigestRequest) -> String {
        format!(
            "[Stablecoin News:{}] '{}' Last {}h - {} items",
            request.label, request.keyword, request.lookback_hours, count
        )
    }

    fn text_body(records: &[ArticleRecord], request: &DigestRequest, now: DateTime<Utc>) -> String {
        let mut lines = vec![
            format!("Google News Daily Digest - '{}'", request.keyword),
            String::new(),
            format!(
                "총 {}개 기사 (최근 {}시간, 최신순)",
                records.len(),
                request.lookback_hours
            ),
            String::new(),
        ];

        if records.is_empty() {
            lines.push(EMPTY_NOTICE.to_string());
            lines.push(String::new());
        }

        for (idx, record) in records.iter().enumerate() {
            lines.push(format!("[{}] {}", idx + 1, compact_title(&record.title)));
            lines.push(format!("- 링크: {}", record.link));
            lines.push(format!("- 게시시각(UTC): {}", timestamp(&record.published_at)));
            lines.push(String::new());
        }

        lines.push(format!("Generated at (UTC): {}", timestamp(&now)));
        lines.join("\n")
    }

    fn html_body(records: &[ArticleRecord], request: &DigestRequest, now: DateTime<Utc>) -> String {
        let mut cards = String::new();

        if records.is_empty() {
            cards.push_str(&format!(
                "<article class=\"card\"><strong class=\"title\">{}</strong></article>",
                EMPTY_NOTICE
            ));
        }

        for (idx, record) in records.iter().enumerate() {
            let link = escape_html(&record.link);
            cards.push_str(&format!(
                "<article class=\"card\">\
                 <strong class=\"title\">[{}] {}</strong>\
                 <div class=\"link\"><a href=\"{}\">{}</a></div>\
                 <div class=\"meta\">게시시각(UTC): {}</div>\
                 </article>",
                idx + 1,
                escape_html(&compact_title(&record.title)),
                link,
                link,
                timestamp(&record.published_at)
            ));
        }

        format!(
            "<!doctype html>\
             <html><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
             <style>{style}</style></head><body>\
             <div class=\"wrap\">\
             <header class=\"hero\">\
             <h1 class=\"headline\">Google News Daily Digest - '{keyword}'</h1>\
             <p class=\"sub\">총 {count}개 기사 (최근 {hours}시간, 최신순, 최대 {cap}개)</p>\
             </header>\
             <section class=\"section\">{cards}</section>\
             <div class=\"foot\">Generated at (UTC): {generated}</div>\
             </div></body></html>",
            style = STYLE,
            keyword = escape_html(&request.keyword),
            count = records.len(),
            hours = request.lookback_hours,
            cap = request.effective_cap(),
            cards = cards,
            generated = timestamp(&now),
        )
    }
}

/// Collapse whitespace and cut to 90 characters with a trailing ellipsis
pub fn compact_title(title: &str) -> String {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= TITLE_MAX_CHARS {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(TITLE_MAX_CHARS - 1).collect();
    format!("{}…", cut.trim_end())
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
