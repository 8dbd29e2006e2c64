//! HTML rendering for the editor page.

use crate::ui::{EditorView, ResultPane, Screen};

const TITLE: &str = "Gemini Image Editor";
const TAGLINE: &str = "Transform images with AI. Raw power. No frills.";

/// Seconds between reloads while a generation is in flight.
const LOADING_REFRESH_SECS: u32 = 2;

const STYLE: &str = r#"
body { font-family: ui-monospace, monospace; background: #fef9c3; color: #000; margin: 0; }
.container { max-width: 1100px; margin: 0 auto; padding: 2rem 1rem; }
header { text-align: center; margin-bottom: 2rem; }
h1 { font-size: 2.5rem; font-weight: 800; text-transform: uppercase; margin: 0; }
.tagline { color: #374151; }
.card { background: #fff; border: 2px solid #000; box-shadow: 8px 8px 0 #000; padding: 1.5rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 2rem; }
.frame { aspect-ratio: 1; display: flex; align-items: center; justify-content: center; padding: .5rem; }
.frame img { max-width: 100%; max-height: 100%; object-fit: contain; }
textarea { width: 100%; box-sizing: border-box; height: 6rem; border: 2px solid #000; padding: .75rem; font: inherit; resize: none; }
.actions { display: flex; gap: 1rem; margin-top: 1rem; }
button { font: inherit; font-weight: 700; border: 2px solid #000; box-shadow: 4px 4px 0 #000; padding: .6rem 1.2rem; cursor: pointer; background: #fff; }
button.primary { background: #facc15; flex: 1; }
button:disabled { background: #d1d5db; color: #6b7280; box-shadow: none; cursor: not-allowed; }
.error { background: #ef4444; color: #fff; border: 2px solid #000; padding: 1rem; text-align: center; }
.notice { background: #fff; border: 2px solid #000; padding: .75rem; margin-bottom: 1.5rem; }
.muted { color: #4b5563; text-align: center; }
.spinner { width: 3rem; height: 3rem; border: 6px solid #000; border-top-color: #facc15; border-radius: 50%; animation: spin 1s linear infinite; margin: 0 auto; }
@keyframes spin { to { transform: rotate(360deg); } }
"#;

/// Renders the full page for `screen`, with an optional one-off notice.
pub fn render(screen: &Screen, notice: Option<&str>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if screen.is_loading() {
        html.push_str(&format!(
            "<meta http-equiv=\"refresh\" content=\"{LOADING_REFRESH_SECS}\">\n"
        ));
    }
    html.push_str(&format!(
        "<title>{TITLE}</title>\n<style>{STYLE}</style>\n</head>\n"
    ));
    html.push_str(&format!(
        "<body>\n<div class=\"container\">\n<header><h1>{TITLE}</h1><p class=\"tagline\">{TAGLINE}</p></header>\n<main>\n"
    ));

    if let Some(notice) = notice {
        html.push_str(&format!("<div class=\"notice\">{}</div>\n", escape(notice)));
    }

    match screen {
        Screen::Upload => render_upload(&mut html),
        Screen::Editor(view) => render_editor(&mut html, view),
    }

    html.push_str("</main>\n</div>\n</body>\n</html>\n");
    html
}

fn render_upload(html: &mut String) {
    html.push_str(concat!(
        "<form class=\"card\" method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n",
        "<h2>Upload an image</h2>\n",
        "<input type=\"file\" name=\"image\" accept=\"image/*\" required onchange=\"this.form.submit()\">\n",
        "<div class=\"actions\"><button class=\"primary\" type=\"submit\">Upload</button></div>\n",
        "</form>\n",
    ));
}

fn render_editor(html: &mut String, view: &EditorView) {
    html.push_str(&format!(
        "<div class=\"grid\">\n<div>\n<div class=\"card frame\"><img src=\"{}\" alt=\"Original\"></div>\n",
        escape(&view.original_url)
    ));

    html.push_str(&format!(
        concat!(
            "<form class=\"card\" method=\"post\" action=\"/generate\" style=\"margin-top:2rem\">\n",
            "<h2>EDIT YOUR IMAGE</h2>\n",
            "<textarea name=\"prompt\" placeholder=\"e.g., Add a retro filter, make it black and white...\"",
            " oninput=\"document.getElementById('generate').disabled = this.value.length === 0\"{}>{}</textarea>\n",
            "<div class=\"actions\">\n",
            "<button id=\"generate\" class=\"primary\" type=\"submit\"{}>{}</button>\n",
            "<button type=\"submit\" formaction=\"/clear\" formnovalidate{}>Start Over</button>\n",
            "</div>\n</form>\n</div>\n",
        ),
        disabled(!view.prompt_enabled),
        escape(&view.prompt),
        disabled(!view.generate_enabled),
        view.generate_label,
        disabled(!view.start_over_enabled),
    ));

    html.push_str("<div class=\"card frame\">\n");
    match &view.result {
        ResultPane::Spinner => html.push_str(
            "<div><div class=\"spinner\"></div><p class=\"muted\">Gemini is thinking...</p></div>\n",
        ),
        ResultPane::Error(message) => html.push_str(&format!(
            "<div class=\"error\"><p><strong>ERROR</strong></p><p>{}</p></div>\n",
            escape(message)
        )),
        ResultPane::Image(url) => {
            html.push_str(&format!("<img src=\"{}\" alt=\"Edited\">\n", escape(url)))
        }
        ResultPane::Placeholder => {
            html.push_str("<p class=\"muted\">Your generated image will appear here.</p>\n")
        }
    }
    html.push_str("</div>\n</div>\n");
}

fn disabled(flag: bool) -> &'static str {
    if flag {
        " disabled"
    } else {
        ""
    }
}

/// Escapes text for HTML content and double-quoted attributes.
fn escape(text: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn view(result: ResultPane) -> EditorView {
        EditorView {
            original_url: "data:image/png;base64,AAAA".into(),
            prompt: "<b>bold</b>".into(),
            prompt_enabled: true,
            generate_enabled: true,
            generate_label: "Generate",
            start_over_enabled: true,
            result,
        }
    }

    #[test]
    fn test_upload_screen() {
        let html = render(&Screen::Upload, None);
        assert!(html.contains("action=\"/upload\""));
        assert!(html.contains(TITLE));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_editor_escapes_user_text() {
        let html = render(
            &Screen::Editor(view(ResultPane::Error("bad <script>".into()))),
            Some("a & b"),
        );
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;</textarea>"));
        assert!(html.contains("bad &lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[test]
    fn test_loading_page_refreshes() {
        let mut loading = view(ResultPane::Spinner);
        loading.generate_enabled = false;
        loading.generate_label = "Generating...";
        let html = render(&Screen::Editor(loading), None);

        assert!(html.contains("http-equiv=\"refresh\""));
        assert!(html.contains("Gemini is thinking..."));
        assert!(html.contains("type=\"submit\" disabled>Generating...</button>"));
    }

    #[test]
    fn test_document_layout() {
        let html = render(&Screen::Upload, Some("hi"));
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains("<title>Gemini Image Editor</title>\n<style>"));
        assert!(html.contains("</header>\n<main>\n<div class=\"notice\">hi</div>\n<form"));
        assert!(html.ends_with("</main>\n</div>\n</body>\n</html>\n"));
    }

    #[test]
    fn test_result_image() {
        let html = render(
            &Screen::Editor(view(ResultPane::Image("data:image/jpeg;base64,/9j/".into()))),
            None,
        );
        assert!(html.contains("<img src=\"data:image/jpeg;base64,/9j/\" alt=\"Edited\">"));
    }
}
