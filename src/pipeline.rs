use std::{
    fmt,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use chrono::{Local, NaiveDateTime};
use log::{debug, info};

use crate::{
    document::Document,
    markup::{self, Transpiler},
    model::{DateFormat, DocumentRequest, FormModel},
    pdf::{RenderError, Renderer},
    share::{ShareError, Sharer},
    storage::{FileNaming, StorageError, Storage},
};

/// Формирует документ из формы: вёрстка, PDF, сохранение, передача
/// пользователю. Шаги выполняются строго по очереди.
pub struct Generator {
    renderer: Box<dyn Renderer>,
    storage: Box<dyn Storage>,
    sharer: Box<dyn Sharer>,
    naming: FileNaming,
    date_format: DateFormat,
    in_flight: AtomicBool,
}

/// Результат успешного формирования.
#[derive(Debug)]
pub struct Generated {
    pub path: PathBuf,
    pub document: Document,
}

impl Generator {
    pub fn new(
        renderer: Box<dyn Renderer>,
        storage: Box<dyn Storage>,
        sharer: Box<dyn Sharer>,
        naming: FileNaming,
        date_format: DateFormat,
    ) -> Self {
        Self {
            renderer,
            storage,
            sharer,
            naming,
            date_format,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Собирает документ и разметку без рендеринга в PDF.
    pub fn markup(&self, form: &FormModel, request: &DocumentRequest) -> (Document, String) {
        let document = Document::build(form, request, &self.date_format);
        let blocks = markup::layout(&document);
        let markup = Transpiler::transpile(&document.title, &blocks);
        (document, markup)
    }

    /// Формирует документ и передаёт его пользователю.
    pub fn generate(&self, form: &FormModel, request: &DocumentRequest) -> GenerateResult {
        let _guard = self.acquire()?;

        debug!("Собираем документ \"{}\"", request.pdf_title);
        let (document, markup) = self.markup(form, request);

        debug!("Рендерим PDF");
        let pdf = self.renderer.render(&markup)?;

        let path = self.store(RenderedPdf(pdf), request)?;
        self.share(&path)?;

        Ok(Generated { path, document })
    }

    /// Сохраняет уже отрендеренный PDF и передаёт его пользователю.
    /// Позволяет повторить сохранение без повторного рендеринга.
    pub fn store_and_share(&self, pdf: RenderedPdf, request: &DocumentRequest) -> GenerateResult<PathBuf> {
        let _guard = self.acquire()?;

        let path = self.store(pdf, request)?;
        self.share(&path)?;

        Ok(path)
    }

    /// Повторно передаёт сохранённый файл пользователю.
    pub fn share(&self, path: &Path) -> GenerateResult<()> {
        debug!("Передаём {:?} пользователю", path);

        self.sharer
            .share(path)
            .map_err(|source| GenerateError::Share {
                path: path.to_path_buf(),
                source,
            })
    }

    fn store(&self, pdf: RenderedPdf, request: &DocumentRequest) -> GenerateResult<PathBuf> {
        let file_name = self.naming.file_name(&request.pdf_title, now());

        debug!("Сохраняем PDF как {}", file_name);
        match self.storage.store(&pdf.0, &file_name) {
            Ok(path) => {
                info!("Документ сохранён в {:?}", path);
                Ok(path)
            }
            Err(source) => Err(GenerateError::Storage { pdf, source }),
        }
    }

    fn acquire(&self) -> GenerateResult<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GenerateError::Busy)?;

        Ok(InFlight(&self.in_flight))
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Флаг выполняющегося формирования. Снимается при уничтожении.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Отрендеренный PDF.
pub struct RenderedPdf(pub Vec<u8>);

impl fmt::Debug for RenderedPdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderedPdf({} bytes)", self.0.len())
    }
}

pub type GenerateResult<T = Generated> = std::result::Result<T, GenerateError>;

/// Ошибка формирования с указанием шага, на котором она произошла.
#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error("generation is already in progress")]
    Busy,

    #[error("render")]
    Render(#[from] RenderError),

    #[error("store")]
    Storage {
        /// PDF, который не удалось сохранить.
        pdf: RenderedPdf,
        #[source]
        source: StorageError,
    },

    #[error("share {path:?}")]
    Share {
        /// Уже сохранённый файл.
        path: PathBuf,
        #[source]
        source: ShareError,
    },
}

/// Итоговое уведомление для пользователя.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Failed,
}

impl Notice {
    pub fn title(self) -> &'static str {
        match self {
            Self::Created => "PDF created",
            Self::Failed => "Error",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Created => "The PDF was successfully created and shared.",
            Self::Failed => "An error occurred while creating the PDF.",
        }
    }
}

impl<T> From<&GenerateResult<T>> for Notice {
    fn from(value: &GenerateResult<T>) -> Self {
        match value {
            Ok(_) => Self::Created,
            Err(_) => Self::Failed,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.message())
    }
}
