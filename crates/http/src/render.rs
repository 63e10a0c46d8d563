//! Server-rendered chat and RAG pages.

use std::fmt::Write as _;

use ragchat_core::{Role, Turn};
use ragchat_service::Outcome;

const PAGE_HTML: &str = include_str!("page.html");

/// Page-level message shown above the input form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice<'a> {
    Info(&'a str),
    Warn(&'a str),
    Error(&'a str),
}

impl<'a> Notice<'a> {
    /// Notice for a submission outcome. Answers need none; the history shows them.
    #[must_use]
    pub fn from_outcome(outcome: &'a Outcome) -> Option<Self> {
        match outcome {
            Outcome::Warned(msg) => Some(Self::Warn(msg)),
            Outcome::Failed(msg) => Some(Self::Error(msg)),
            Outcome::Answered(_) | Outcome::Ignored => None,
        }
    }

    const fn parts(self) -> (&'static str, &'a str) {
        match self {
            Self::Info(msg) => ("info", msg),
            Self::Warn(msg) => ("warn", msg),
            Self::Error(msg) => ("error", msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Chat,
    Rag,
}

#[must_use]
pub fn chat_page(history: &[Turn], notice: Option<Notice<'_>>) -> String {
    let mut body = String::from("<h1>Chat</h1>\n");
    push_history(&mut body, history);
    push_notice(&mut body, notice);
    body.push_str(
        r#"<form method="post" action="/chat">
  <input type="text" name="message" placeholder="What would you like to ask?" autofocus>
  <button type="submit">Send</button>
</form>
<form method="post" action="/chat/reset"><button class="secondary" type="submit">New conversation</button></form>
"#,
    );
    layout("Chat", Tab::Chat, &body)
}

/// `loaded_rows` is `Some` once the session has ingested a file.
#[must_use]
pub fn rag_page(history: &[Turn], loaded_rows: Option<usize>, notice: Option<Notice<'_>>) -> String {
    let mut body = String::from("<h1>Ask your CSV</h1>\n");
    body.push_str(
        r#"<form method="post" action="/rag/upload" enctype="multipart/form-data">
  <input type="file" name="file" accept=".csv,text/csv">
  <button type="submit">Upload</button>
</form>
"#,
    );
    if let Some(rows) = loaded_rows {
        let _ = writeln!(body, "<p>Loaded {rows} rows.</p>");
    }
    push_history(&mut body, history);
    push_notice(&mut body, notice);
    body.push_str(
        r#"<form method="post" action="/rag/ask">
  <input type="text" name="question" placeholder="Ask a question about the data">
  <button type="submit">Ask</button>
</form>
<form method="post" action="/rag/reset"><button class="secondary" type="submit">Clear data</button></form>
"#,
    );
    layout("Ask your CSV", Tab::Rag, &body)
}

fn layout(title: &str, active: Tab, body: &str) -> String {
    let link = |href: &str, label: &str, tab: Tab| {
        let class = if tab == active { " class=\"active\"" } else { "" };
        format!("<a href=\"{href}\"{class}>{label}</a>")
    };
    let nav = format!("{}{}", link("/", "Chat", Tab::Chat), link("/rag", "RAG", Tab::Rag));
    PAGE_HTML
        .replace("{{title}}", &escape(title))
        .replace("{{nav}}", &nav)
        .replace("{{body}}", body)
}

fn push_history(out: &mut String, history: &[Turn]) {
    for turn in history.iter().filter(|t| t.role() != Role::System) {
        let _ = writeln!(
            out,
            "<div class=\"turn {}\"><span class=\"who\">{}</span>{}</div>",
            turn.role().as_str(),
            turn.role().label(),
            escape(turn.content())
        );
    }
}

fn push_notice(out: &mut String, notice: Option<Notice<'_>>) {
    if let Some((class, msg)) = notice.map(Notice::parts) {
        let _ = writeln!(out, "<div class=\"notice {class}\">{}</div>", escape(msg));
    }
}

/// Escapes text for use in element content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
