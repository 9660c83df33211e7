//! HTML form served at `/`

use crate::core::languages::LanguageTable;

const TITLE: &str = "AI-Powered Language Translator";
const DESCRIPTION: &str =
    "Translate text from one language to another using Helsinki-NLP MarianMT models.";

/// Values to render into the form
#[derive(Debug, Default, Clone)]
pub struct PageState {
    pub text: String,
    pub source: String,
    pub target: String,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl PageState {
    /// Empty form with the table's default selections
    pub fn initial(languages: &LanguageTable) -> Self {
        Self {
            source: languages.default_source().to_string(),
            target: languages.default_target().to_string(),
            ..Default::default()
        }
    }
}

/// Escape text for HTML element and attribute content
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

fn render_options(languages: &LanguageTable, selected: &str) -> String {
    languages
        .names()
        .into_iter()
        .map(|name| {
            let marker = if name == selected { " selected" } else { "" };
            format!(
                "<option value=\"{0}\"{1}>{0}</option>",
                escape_html(name),
                marker
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the full translator page
pub fn render_page(languages: &LanguageTable, state: &PageState) -> String {
    let output = state.output.as_deref().map(escape_html).unwrap_or_default();
    let error = state
        .error
        .as_deref()
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
textarea {{ width: 100%; }}
label {{ display: block; margin-top: 1rem; font-weight: bold; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p>{description}</p>
<form method="post" action="/">
<label for="text">Input Text</label>
<textarea id="text" name="text" rows="2" placeholder="Enter text here...">{text}</textarea>
<label for="source">Source Language</label>
<select id="source" name="source">
{source_options}
</select>
<label for="target">Target Language</label>
<select id="target" name="target">
{target_options}
</select>
<p><button type="submit">Translate</button></p>
</form>
<label for="output">Translated Text</label>
<textarea id="output" rows="2" readonly>{output}</textarea>
{error}
</body>
</html>
"#,
        title = TITLE,
        description = DESCRIPTION,
        text = escape_html(&state.text),
        source_options = render_options(languages, &state.source),
        target_options = render_options(languages, &state.target),
        output = output,
        error = error,
    )
}
