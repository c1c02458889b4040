//! In-process LaTeX rendering via pulldown-latex → MathML

use pulldown_latex::{
    Parser, Storage, config::DisplayMode, config::RenderConfig, mathml::push_mathml,
};

use crate::error::{MathFieldError, Result};
use crate::renderer::MathRenderer;

/// Renders fragments to MathML without spawning anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMlRenderer {
    /// Render as display (block) math instead of inline
    pub display_mode: bool,
}

impl MathMlRenderer {
    pub fn inline() -> Self {
        Self {
            display_mode: false,
        }
    }

    pub fn display() -> Self {
        Self { display_mode: true }
    }

    fn mode(&self) -> DisplayMode {
        match self.display_mode {
            true => DisplayMode::Block,
            false => DisplayMode::Inline,
        }
    }

    /// Render one LaTeX fragment (without `$` delimiters) to MathML.
    ///
    /// Every parse error in the fragment is reported, not just the first.
    pub fn render_fragment(&self, latex: &str) -> Result<String> {
        let storage = Storage::new();
        let (events, errors): (Vec<_>, Vec<_>) =
            Parser::new(latex, &storage).partition(|event| event.is_ok());
        if !errors.is_empty() {
            let message = errors
                .into_iter()
                .filter_map(|event| event.err())
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MathFieldError::ExternalRenderError { message });
        }

        let config = RenderConfig {
            display_mode: self.mode(),
            ..Default::default()
        };
        let mut mathml = String::new();
        push_mathml(&mut mathml, events.into_iter(), config).map_err(|err| {
            MathFieldError::ExternalRenderError {
                message: format!("writing mathml for {latex:?}: {err}"),
            }
        })?;
        Ok(mathml)
    }
}

impl MathRenderer for MathMlRenderer {
    fn render(&self, fragments: &[String]) -> Result<Vec<String>> {
        tracing::debug!(fragments = fragments.len(), "rendering math to mathml");
        fragments
            .iter()
            .map(|fragment| self.render_fragment(fragment))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::render_to_html;

    fn batch(fragments: &[&str]) -> Vec<String> {
        fragments.iter().map(|f| (*f).to_owned()).collect()
    }

    #[test]
    fn batch_keeps_input_order() {
        let renderer = MathMlRenderer::inline();
        let fragments = batch(&["1", "y", "2"]);
        let out = renderer.render(&fragments).unwrap();
        let one_by_one: Vec<_> = fragments
            .iter()
            .map(|f| renderer.render_fragment(f).unwrap())
            .collect();
        assert_eq!(out, one_by_one);
        assert!(out[0].contains(">1<"));
        assert!(out[1].contains(">y<"));
        assert!(out[2].contains(">2<"));
    }

    #[test]
    fn one_bad_fragment_fails_the_whole_batch() {
        let renderer = MathMlRenderer::inline();
        assert!(renderer.render(&batch(&["a", "b"])).is_ok());
        let err = renderer.render(&batch(&["a", r"\frac{b", "c"])).unwrap_err();
        match err {
            MathFieldError::ExternalRenderError { message } => assert!(!message.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_batch_renders_nothing() {
        assert!(MathMlRenderer::display().render(&[]).unwrap().is_empty());
    }

    #[test]
    fn display_mode_changes_output() {
        let inline = MathMlRenderer::inline().render_fragment("n").unwrap();
        let block = MathMlRenderer::display().render_fragment("n").unwrap();
        assert_ne!(inline, block);
    }

    #[test]
    fn spliced_between_escaped_text() {
        let html = render_to_html("if $n$ < 3 & ok", &MathMlRenderer::inline()).unwrap();
        assert!(html.starts_with("if <math"), "{html}");
        assert!(html.ends_with("</math> &lt; 3 &amp; ok"), "{html}");
    }

    #[test]
    fn bad_fragment_leaves_no_partial_html() {
        let err = render_to_html("$x$ then $\\frac{y$", &MathMlRenderer::inline()).unwrap_err();
        assert!(matches!(err, MathFieldError::ExternalRenderError { .. }));
    }
}
