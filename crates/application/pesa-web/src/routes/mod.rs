pub mod admin;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod popup;
pub mod watch;
pub mod withdraw;

use axum::response::Html;

use crate::state::{Notice, NoticeKind};

/// HTML-escape a string to prevent XSS in hand-built HTML responses.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub fn fmt_ksh(amount: f64) -> String {
    format!("KSH {amount:.2}")
}

const CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{background:#0b1410;color:#d2ddd6;font-family:'Segoe UI',system-ui,sans-serif}
a{color:#34d399;text-decoration:none}a:hover{text-decoration:underline}
.nav{background:#10201a;border-bottom:1px solid #1f3a2e;padding:0.75rem 2rem;display:flex;align-items:center;gap:1.5rem}
.nav h1{font-size:1.2rem;color:#ecfdf5}.nav a{color:#86a596}.nav a:hover{color:#ecfdf5}
.nav .who{margin-left:auto;color:#6b8578;font-size:0.85rem}
.container{max-width:1100px;margin:0 auto;padding:1.5rem}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(280px,1fr));gap:1.25rem}
.card{background:#10201a;border:1px solid #1f3a2e;border-radius:8px;overflow:hidden;transition:border-color .2s}
.card:hover{border-color:#34d399}
.card-body{padding:1rem}
.card-body h3{color:#ecfdf5;font-size:1rem;margin-bottom:0.25rem}
.card-body .meta{color:#6b8578;font-size:0.8rem;display:flex;justify-content:space-between;margin-top:0.5rem}
.thumb{background:linear-gradient(135deg,#0f2b1f 0%,#10201a 100%);padding:2.5rem;text-align:center;font-size:3rem;position:relative}
.premium-badge{position:absolute;top:12px;right:12px;background:#b45309;color:#fff;padding:3px 10px;border-radius:4px;font-size:0.75rem;font-weight:700}
.earn-badge{position:absolute;top:12px;left:12px;background:#065f46;color:#ecfdf5;padding:3px 10px;border-radius:4px;font-size:0.75rem}
.stats-row{display:grid;grid-template-columns:repeat(3,1fr);gap:1rem;margin-bottom:2rem}
.stat-card{background:#10201a;border:1px solid #1f3a2e;border-radius:8px;padding:1.25rem;text-align:center}
.stat-card .number{font-size:1.6rem;font-weight:700;color:#ecfdf5}.stat-card .label{color:#86a596;font-size:0.85rem}
.btn{background:#059669;color:#fff;border:none;padding:0.5rem 1rem;border-radius:6px;cursor:pointer;font-size:0.9rem}
.btn:hover{background:#10b981}
.btn-outline{background:transparent;border:1px solid #1f3a2e;color:#d2ddd6}.btn-outline:hover{border-color:#34d399}
.btn-danger{background:#991b1b}.btn-danger:hover{background:#b91c1c}
input,select,textarea{background:#0b1410;color:#d2ddd6;border:1px solid #1f3a2e;border-radius:6px;padding:0.5rem;font-size:0.9rem;width:100%}
label{color:#86a596;font-size:0.85rem;display:block;margin:0.6rem 0 0.2rem}
.notice{border-radius:8px;padding:0.75rem 1rem;margin-bottom:1.25rem}
.notice.success{background:rgba(16,185,129,0.12);border:1px solid #065f46;color:#6ee7b7}
.notice.error{background:rgba(220,38,38,0.12);border:1px solid #7f1d1d;color:#fca5a5}
.bar-chart{display:flex;align-items:flex-end;gap:0.6rem;height:140px;padding:1rem 0}
.bar-chart .bar{flex:1;background:#059669;border-radius:4px 4px 0 0;min-height:2px}
.bar-chart .day{text-align:center;color:#6b8578;font-size:0.75rem;margin-top:0.3rem}
.activity{padding:0.6rem 0;border-bottom:1px solid #16281f;display:flex;justify-content:space-between}
.activity .amount{color:#34d399;font-weight:600}
.activity .when{color:#6b8578;font-size:0.8rem}
.progress-track{background:#16281f;border-radius:6px;height:10px;overflow:hidden;margin:0.75rem 0}
.progress-fill{background:#059669;height:100%;width:0;transition:width 1s linear}
.player{aspect-ratio:16/9;width:100%;border:1px solid #1f3a2e;border-radius:8px}
.overlay{display:none;position:fixed;inset:0;background:rgba(5,20,14,0.92);align-items:center;justify-content:center;flex-direction:column;gap:1rem;z-index:40}
.overlay h2{color:#34d399;font-size:2rem}
.tier-card{background:#10201a;border:1px solid #1f3a2e;border-radius:8px;padding:1.5rem}
.tier-card.current{border-color:#34d399}
.tier-card .price{font-size:1.6rem;font-weight:700;color:#ecfdf5;margin:0.5rem 0}
.tier-card ul{list-style:none;margin-top:0.75rem}
.tier-card li{color:#86a596;font-size:0.85rem;padding:0.25rem 0}
.tier-card li:before{content:'\2713  ';color:#34d399}
.popup-toast{display:none;position:fixed;bottom:20px;left:20px;background:#10201a;border:1px solid #34d399;border-radius:8px;padding:0.75rem 1rem;font-size:0.85rem;z-index:50;max-width:320px}
table{width:100%;border-collapse:collapse}th,td{padding:0.6rem;text-align:left;border-bottom:1px solid #16281f}
th{color:#86a596;font-weight:600;font-size:0.85rem}
.locked{opacity:0.65}
"#;

fn nav_html(user_name: Option<&str>) -> String {
    let who = match user_name {
        Some(name) => format!(
            r#"<span class="who">{} &middot; <a href="/withdraw">Withdraw</a></span>
            <form method="POST" action="/logout" style="display:inline"><button class="btn-outline btn" type="submit">Sign out</button></form>"#,
            html_escape(name)
        ),
        None => r#"<span class="who"><a href="/login">Sign in</a></span>"#.to_string(),
    };
    format!(
        r#"<nav class="nav"><h1>&#128176; WatchPesa</h1>
        <a href="/">Dashboard</a><a href="/videos">Videos</a><a href="/premium">Premium</a><a href="/admin">Admin</a>
        {who}</nav>"#
    )
}

fn notice_html(notice: Option<&Notice>) -> String {
    match notice {
        Some(n) => {
            let class = match n.kind {
                NoticeKind::Success => "success",
                NoticeKind::Error => "error",
            };
            format!(
                r#"<div class="notice {class}">{}</div>"#,
                html_escape(&n.message)
            )
        }
        None => String::new(),
    }
}

// Written with string concatenation so the shell's format placeholders stay
// out of the JS.
const POPUP_SCRIPT: &str = r#"<div id="popup-toast" class="popup-toast"></div>
<script>
setInterval(async () => {
    try {
        const r = await fetch('/api/popup');
        if (!r.ok) return;
        const p = await r.json();
        const el = document.getElementById('popup-toast');
        el.textContent = p.name + ' just earned KSH ' + p.amount + ' · ' + p.minutes_ago + ' minutes ago';
        el.style.display = 'block';
        setTimeout(() => { el.style.display = 'none'; }, 4000);
    } catch (e) {}
}, __POPUP_MS__);
</script>"#;

/// Wrap a page body in the site shell. `__`-placeholders instead of format
/// strings keep the CSS/JS braces inert.
pub fn wrap(
    title: &str,
    body: &str,
    user_name: Option<&str>,
    notice: Option<&Notice>,
    popup_interval_secs: u64,
) -> Html<String> {
    let base = r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>__TITLE__ &mdash; WatchPesa</title><style>__CSS__</style></head>
<body>__NAV__<div class="container">__NOTICE____BODY__</div>__POPUP__</body></html>"#;
    Html(
        base.replace("__TITLE__", &html_escape(title))
            .replace("__CSS__", CSS)
            .replace("__NAV__", &nav_html(user_name))
            .replace("__NOTICE__", &notice_html(notice))
            .replace("__BODY__", body)
            .replace(
                "__POPUP__",
                &POPUP_SCRIPT.replace("__POPUP_MS__", &(popup_interval_secs * 1000).to_string()),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            html_escape(r#"<b a="c">&'"#),
            "&lt;b a=&quot;c&quot;&gt;&amp;&#x27;"
        );
    }

    #[test]
    fn ksh_formatting() {
        assert_eq!(fmt_ksh(1250.0), "KSH 1250.00");
        assert_eq!(fmt_ksh(0.5), "KSH 0.50");
    }

    #[test]
    fn wrap_inlines_body_and_popup_interval() {
        let page = wrap("Dashboard", "<p>hi</p>", Some("jane"), None, 5);
        assert!(page.0.contains("<p>hi</p>"));
        assert!(page.0.contains("}, 5000);"));
        assert!(page.0.contains("jane"));
    }
}
