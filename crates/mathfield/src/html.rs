//! Splicing rendered math back into escaped text.

use markdown_weaver_escape::escape_html;

use crate::error::{MathFieldError, Result};
use crate::renderer::MathRenderer;
use crate::span::{
    ESCAPED_DOLLAR, MathSpan, extract_spans, strip_stray_delimiters, unescape_dollars,
};

/// Render `raw` to HTML.
///
/// Math spans are replaced by the renderer's output, everything else is
/// HTML-escaped with `\$` turned into `$`. Text without spans comes back
/// untouched unless it contains `\$`, in which case it is escaped as a single
/// plain segment. The renderer runs at most once.
#[tracing::instrument(level = "debug", skip_all, fields(len = raw.len()))]
pub fn render_to_html<R>(raw: &str, renderer: &R) -> Result<String>
where
    R: MathRenderer + ?Sized,
{
    if raw.is_empty() {
        return Ok(String::new());
    }

    let spans = extract_spans(raw);
    if spans.is_empty() {
        if raw.contains(ESCAPED_DOLLAR) {
            return Ok(escape_plain(raw));
        }
        return Ok(raw.to_owned());
    }
    tracing::debug!(spans = spans.len(), "found math spans");

    let fragments: Vec<String> = spans.iter().map(|span| span.fragment.clone()).collect();
    let rendered = renderer.render(&fragments)?;
    if rendered.len() != spans.len() {
        return Err(MathFieldError::RenderOutputMismatch {
            expected: spans.len(),
            actual: rendered.len(),
        });
    }

    Ok(assemble(raw, &spans, &rendered))
}

/// Interleave escaped plain segments with rendered fragments.
///
/// `rendered[i]` replaces `spans[i]` verbatim, delimiters included.
pub fn assemble(raw: &str, spans: &[MathSpan], rendered: &[String]) -> String {
    let rendered_len: usize = rendered.iter().map(String::len).sum();
    let mut html = String::with_capacity(raw.len() + rendered_len);
    let mut cursor = 0;

    for (span, fragment) in spans.iter().zip(rendered) {
        let plain = strip_stray_delimiters(&raw[cursor..span.start]);
        push_escaped(&mut html, plain);
        html.push_str(fragment);
        cursor = span.end + 1;
    }
    push_escaped(&mut html, &raw[cursor..]);

    html
}

fn escape_plain(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    push_escaped(&mut html, text);
    html
}

fn push_escaped(html: &mut String, plain: &str) {
    // Won't fail writing to String
    let _ = escape_html(&mut *html, &unescape_dollars(plain));
}
