use std::{fs, io, path::PathBuf};

use log::{debug, warn};
use typst_as_lib::TypstEngine;

/// Семейства шрифтов для текста документа, в порядке предпочтения.
/// Последнее семейство всегда есть среди встроенных шрифтов.
pub const FONT_FALLBACK: [&str; 2] = ["Arial", "Libertinus Serif"];

/// Превращает разметку в PDF.
pub trait Renderer {
    fn render(&self, markup: &str) -> RenderResult;
}

/// Рендерер на основе Typst.
///
/// Шрифты читаются один раз при создании: сначала пользовательские из
/// конфига, затем встроенные из `typst-assets`. Без шрифтов Typst
/// сформирует PDF без единого символа.
pub struct TypstRenderer {
    fonts: Vec<Vec<u8>>,
}

impl TypstRenderer {
    /// Создаёт рендерер с пользовательскими шрифтами и встроенными.
    pub fn load(font_paths: &[PathBuf]) -> std::result::Result<Self, RenderError> {
        let mut fonts = Vec::with_capacity(font_paths.len());

        for path in font_paths {
            debug!("Подгружаем шрифт из {:?}", path);
            let bytes = fs::read(path).map_err(|source| RenderError::Font {
                path: path.clone(),
                source,
            })?;
            fonts.push(bytes);
        }

        fonts.extend(typst_assets::fonts().map(<[u8]>::to_vec));

        Ok(Self { fonts })
    }
}

impl Renderer for TypstRenderer {
    fn render(&self, markup: &str) -> RenderResult {
        // `fonts` у билдера заменяет ранее добавленные шрифты, поэтому
        // передаём их все за один вызов.
        let engine = TypstEngine::builder()
            .main_file(markup.to_owned())
            .fonts(self.fonts.iter().map(Vec::as_slice))
            .build();

        let compiled = engine.compile();
        if !compiled.warnings.is_empty() {
            warn!("Typst warnings: {:?}", compiled.warnings);
        }

        let document = compiled
            .output
            .map_err(|e| RenderError::Compilation(format!("{:?}", e)))?;

        let bytes = typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
            .map_err(|e| RenderError::Compilation(format!("pdf export: {:?}", e)))?;

        Ok(bytes.into())
    }
}

pub type RenderResult = std::result::Result<Vec<u8>, RenderError>;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("typst compilation failed: {0}")]
    Compilation(String),

    #[error("read font {path:?}")]
    Font {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn render_simple_markup() {
        let renderer = TypstRenderer::load(&[]).unwrap();

        let pdf = renderer.render("= Bill\n\n*Name:* #\"Acme\"").unwrap();

        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn default_renderer_embeds_font() {
        let renderer = TypstRenderer::load(&[]).unwrap();

        let pdf = renderer
            .render("#set text(font: (\"Arial\", \"Libertinus Serif\"))\n= Bill\n\n*Name:* #\"Acme\"")
            .unwrap();

        assert!(contains(&pdf, b"/FontFile"));
    }

    #[test]
    fn missing_font_is_render_error() {
        let err = TypstRenderer::load(&[PathBuf::from("/nonexistent/font.ttf")])
            .err()
            .unwrap();

        assert!(matches!(err, RenderError::Font { .. }));
    }
}
