use ammonia::clean_text;
use std::fmt::Write;

use crate::store::ScriptRecord;

const LISTING_DATE_FORMAT: &str = "%B %d, %Y at %I:%M %p";

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Saved Scripts</title>
<link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
<main class="container">
<header class="page-header">
<h1>Saved Scripts</h1>
<a class="button" href="/">New script</a>
</header>
"#;

const PAGE_TAIL: &str = r#"</main>
<script>
function cardOf(button) {
  return button.closest('.script-card');
}
async function deleteScript(button) {
  if (!confirm('Delete this script?')) return;
  const card = cardOf(button);
  const response = await fetch('/delete_script/' + encodeURIComponent(card.dataset.filename), { method: 'DELETE' });
  const body = await response.json();
  if (body.success) {
    card.remove();
  } else {
    alert(body.error);
  }
}
async function viewScript(button) {
  const card = cardOf(button);
  const response = await fetch('/get_script_content/' + encodeURIComponent(card.dataset.filename));
  const body = await response.json();
  const target = card.querySelector('.script-content');
  if (body.success) {
    target.innerHTML = body.content;
    target.hidden = !target.hidden;
  } else {
    alert(body.error);
  }
}
</script>
</body>
</html>
"#;

/// Renders the saved-scripts page. Every value taken from a record is
/// escaped. Scripts are addressed through the card's `data-filename`, never
/// spliced into inline script.
pub fn saved_scripts_page(records: &[ScriptRecord], error: Option<&str>) -> String {
    let mut html = String::from(PAGE_HEAD);

    if let Some(error) = error {
        let _ = writeln!(html, r#"<p class="error">{}</p>"#, clean_text(error));
    }

    if records.is_empty() {
        html.push_str("<p class=\"empty\">No saved scripts yet.</p>\n");
    } else {
        html.push_str("<ul class=\"script-list\">\n");
        for record in records {
            let filename = clean_text(&record.filename);
            let _ = write!(
                html,
                r#"<li class="script-card" data-filename="{filename}">
<h2>{title}</h2>
<p class="date">{date}</p>
<p class="preview">{preview}</p>
<div class="actions">
<a class="button" href="/download_script/{filename}">Download PDF</a>
<button type="button" onclick="viewScript(this)">View</button>
<button type="button" class="danger" onclick="deleteScript(this)">Delete</button>
</div>
<div class="script-content" hidden></div>
</li>
"#,
                title = clean_text(&record.title),
                date = record.timestamp.format(LISTING_DATE_FORMAT),
                preview = clean_text(&record.preview),
            );
        }
        html.push_str("</ul>\n");
    }

    html.push_str(PAGE_TAIL);
    html
}
