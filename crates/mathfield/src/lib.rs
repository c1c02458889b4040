//! Math-aware text fields.
//!
//! Text may contain inline LaTeX between dollar signs (`\$` for a literal
//! dollar). A [`MathValue`] keeps that raw text next to its rendered HTML so
//! the HTML is computed once, when the value is stored, rather than on every
//! read. Rendering goes through a [`MathRenderer`]: by default an external
//! KaTeX process ([`CommandRenderer`]), optionally pulldown-latex in process.
//!
//! ```no_run
//! use mathfield::{CommandRenderer, store_math};
//!
//! let renderer = CommandRenderer::default();
//! let value = store_math("The answer is $2+2$", None, &renderer)?;
//! println!("{}", value.html());
//! # Ok::<(), mathfield::MathFieldError>(())
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod html;
#[cfg(feature = "mathml")]
pub mod mathml;
pub mod renderer;
pub mod span;
pub mod value;

pub use crate::config::{FileStore, Loader, RendererConfig, Saver};
pub use crate::error::{MathFieldError, Result, SerDeError};
pub use crate::field::{FieldInput, MathField};
pub use crate::html::render_to_html;
#[cfg(feature = "mathml")]
pub use crate::mathml::MathMlRenderer;
pub use crate::renderer::{CommandRenderer, MathRenderer};
pub use crate::span::MathSpan;
pub use crate::value::MathValue;

/// Build the value to store for `raw`.
///
/// Pass `html` when it's already known to skip rendering; blocks of math
/// must be enclosed in dollar signs.
pub fn store_math<R>(raw: &str, html: Option<&str>, renderer: &R) -> Result<MathValue>
where
    R: MathRenderer + ?Sized,
{
    MathValue::construct(raw, html, renderer)
}
