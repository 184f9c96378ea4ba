//! Page shell: header, sidebar and shared styles

use crate::auth::{QuotaStatus, RequestContext};

const STYLE: &str = r#"
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
        }
        header {
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 20px;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }
        h1 {
            font-size: 26px;
            color: #4a9eff;
        }
        h2, h3, h4 {
            color: #4a9eff;
            margin: 18px 0 8px;
        }
        .build-info {
            text-align: right;
            font-size: 13px;
            color: #888;
            font-family: 'Courier New', monospace;
            line-height: 1.2;
        }
        .layout {
            display: flex;
        }
        nav {
            width: 240px;
            min-height: calc(100vh - 80px);
            background-color: #222;
            border-right: 1px solid #3a3a3a;
            padding: 20px;
        }
        nav a {
            display: block;
            color: #e0e0e0;
            text-decoration: none;
            padding: 4px 0;
        }
        nav a:hover {
            color: #4a9eff;
        }
        .status {
            margin-top: 20px;
            padding-top: 12px;
            border-top: 1px solid #3a3a3a;
            font-size: 14px;
            color: #aaa;
        }
        .content {
            flex: 1;
            padding: 20px 30px;
            max-width: 900px;
        }
        .subtitle {
            color: #888;
            margin-bottom: 16px;
        }
        form {
            margin: 12px 0 20px;
        }
        label {
            display: block;
            margin-top: 10px;
            color: #aaa;
        }
        select, input[type=text] {
            background: #2a2a2a;
            color: #e0e0e0;
            border: 1px solid #3a3a3a;
            padding: 6px;
            min-width: 320px;
        }
        .button, button {
            display: inline-block;
            padding: 8px 18px;
            background: #4a9eff;
            color: white;
            border: none;
            text-decoration: none;
            border-radius: 4px;
            margin-top: 10px;
            font-weight: 600;
            cursor: pointer;
        }
        .clip {
            background: #242424;
            border: 1px solid #3a3a3a;
            border-radius: 4px;
            padding: 10px 14px;
            margin-bottom: 10px;
        }
        .clip a {
            color: #4a9eff;
        }
        table.distribution {
            border-collapse: collapse;
            margin-right: 30px;
        }
        table.distribution td {
            padding: 2px 10px;
            border-bottom: 1px solid #333;
        }
        .distributions {
            display: flex;
            flex-wrap: wrap;
        }
        .hashtags {
            color: #10b981;
        }
        .error {
            color: #ef4444;
        }
"#;

const NAV_LINKS: [(&str, &str); 6] = [
    ("/", "Home"),
    ("/topics", "Topics"),
    ("/sentiments", "Sentiments"),
    ("/tldr", "TLDR"),
    ("/search", "Search"),
    ("/entities", "Entities"),
];

/// Escape text for HTML element content and attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Login state shown under the navigation
pub enum SidebarStatus<'a> {
    SignedOut,
    SignInAt(&'a str),
    SignedIn {
        ctx: &'a RequestContext,
        support_email: &'a str,
    },
}

fn render_status(status: &SidebarStatus) -> String {
    match status {
        SidebarStatus::SignedOut => "<p>Not logged in yet</p>".to_string(),
        SidebarStatus::SignInAt(url) => format!(
            "<p>Not logged in yet</p><p><a class=\"button\" href=\"{}\">Sign in with Google</a></p>",
            escape_html(url)
        ),
        SidebarStatus::SignedIn { ctx, support_email } => {
            let usage = match ctx.quota {
                QuotaStatus::Allowed { used, limit } => format!("<p>Usage: {}/{}</p>", used, limit),
                QuotaStatus::Exceeded { .. } => format!(
                    "<p class=\"error\">Usage quota exceeded, {}</p>",
                    support_link(support_email)
                ),
            };
            format!(
                "<p>Signed in as {}</p>{}<p><a href=\"/logout\">Sign out</a></p>",
                escape_html(&ctx.email),
                usage
            )
        }
    }
}

pub fn support_link(support_email: &str) -> String {
    format!(
        "<a href=\"mailto:{}\">contact support</a> for more credits.",
        escape_html(support_email)
    )
}

fn build_info() -> String {
    let git_hash = env!("GIT_HASH");
    format!(
        "<div>podindex-web v{}</div><div>{} ({})</div><div>{}</div>",
        env!("CARGO_PKG_VERSION"),
        git_hash.get(..8).unwrap_or(git_hash),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    )
}

/// Full HTML document with navigation, login status and page body
pub fn render_page(title: &str, subtitle: &str, status: &SidebarStatus, body: &str) -> String {
    let nav: String = NAV_LINKS
        .iter()
        .map(|(href, label)| format!("<a href=\"{}\">{}</a>", href, label))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - The Podcast Index</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <h1>The Podcast Index</h1>
        <div class="build-info">{build_info}</div>
    </header>
    <div class="layout">
        <nav>
            {nav}
            <div class="status">{status}</div>
        </nav>
        <main class="content">
            <h2>{title}</h2>
            <p class="subtitle">{subtitle}</p>
            {body}
        </main>
    </div>
</body>
</html>"#,
        title = escape_html(title),
        style = STYLE,
        build_info = build_info(),
        nav = nav,
        status = render_status(status),
        subtitle = escape_html(subtitle),
        body = body,
    )
}

/// Page with no login status, used for errors
pub fn render_message_page(title: &str, body: &str) -> String {
    render_page(title, "", &SidebarStatus::SignedOut, body)
}

/// Sign-in prompt shown instead of any gated content
pub fn render_login_prompt(authorization_url: &str) -> String {
    let body = format!(
        "<p>Please sign in to use our app.</p><p><a class=\"button\" href=\"{}\">Sign in with Google</a></p>",
        escape_html(authorization_url)
    );
    render_page(
        "Sign in",
        "",
        &SidebarStatus::SignInAt(authorization_url),
        &body,
    )
}

/// Terminal message for a caller over quota
pub fn render_quota_exceeded(ctx: &RequestContext, support_email: &str) -> String {
    let body = format!(
        "<p class=\"error\">Usage quota exceeded, {}</p>",
        support_link(support_email)
    );
    render_page(
        "Usage quota exceeded",
        "",
        &SidebarStatus::SignedIn { ctx, support_email },
        &body,
    )
}
