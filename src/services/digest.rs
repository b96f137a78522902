//! Renders a list of matches into the subject and bodies sent by the
//! notification channels.

use serde::Serialize;

use crate::models::ScoredListing;
use crate::services::notifier::NotifyError;

const DIGEST_HTML: &str = r#"<html>
<body style="font-family: Arial, sans-serif; color: #333;">
    <h2 style="color: #0073b1;">Job Matches</h2>
    <p>Found <strong>{{ count }}</strong> new job(s) matching your criteria:</p>
    <table style="border-collapse: collapse; width: 100%;">
        <tr style="background: #0073b1; color: white;">
            <th style="padding:8px; text-align:left;">Title</th>
            <th style="padding:8px; text-align:left;">Company</th>
            <th style="padding:8px; text-align:left;">Location</th>
            <th style="padding:8px; text-align:left;">Score</th>
        </tr>
        {%- for row in rows %}
        <tr>
            <td style="padding:8px; border-bottom:1px solid #eee;">
                <a href="{{ row.url }}" style="color:#0073b1; text-decoration:none; font-weight:bold;">{{ row.title }}</a>
            </td>
            <td style="padding:8px; border-bottom:1px solid #eee;">{{ row.company }}</td>
            <td style="padding:8px; border-bottom:1px solid #eee;">{{ row.location }}</td>
            <td style="padding:8px; border-bottom:1px solid #eee;">{{ row.score }}</td>
        </tr>
        {%- endfor %}
    </table>
    <p style="margin-top:16px; font-size:12px; color:#999;">Sent by Job Scout</p>
</body>
</html>
"#;

#[derive(Debug, Serialize)]
struct DigestRow<'a> {
    title: &'a str,
    company: &'a str,
    location: &'a str,
    url: &'a str,
    score: String,
}

/// Score as a whole percentage, e.g. `93%`
pub fn format_score(score: f64) -> String {
    format!("{:.0}%", score)
}

fn plural_suffix(count: usize) -> &'static str {
    if count == 1 { "" } else { "es" }
}

/// Email subject line
pub fn subject(matches: &[ScoredListing]) -> String {
    format!(
        "🔔 {} New Job Match{} Found!",
        matches.len(),
        plural_suffix(matches.len())
    )
}

/// HTML table of matches, auto-escaped
pub fn render_html(matches: &[ScoredListing]) -> Result<String, NotifyError> {
    let rows: Vec<DigestRow<'_>> = matches
        .iter()
        .map(|m| DigestRow {
            title: &m.listing.title,
            company: &m.listing.company,
            location: &m.listing.location,
            url: &m.listing.url,
            score: format_score(m.score),
        })
        .collect();

    let mut env = minijinja::Environment::new();
    env.add_template("digest.html", DIGEST_HTML)?;

    let html = env
        .get_template("digest.html")?
        .render(minijinja::context! { count => matches.len(), rows => rows })?;

    Ok(html)
}

/// Plain-text digest for chat channels
pub fn render_text(matches: &[ScoredListing]) -> String {
    let mut lines = vec![format!(
        "*{} New Job Match{}!*\n",
        matches.len(),
        plural_suffix(matches.len())
    )];

    for (i, m) in matches.iter().enumerate() {
        lines.push(format!(
            "{}. *{}*\n   Company: {}\n   Location: {}\n   Score: {}\n   Link: {}\n",
            i + 1,
            m.listing.title,
            m.listing.company,
            m.listing.location,
            format_score(m.score),
            m.listing.url
        ));
    }

    lines.join("\n")
}
