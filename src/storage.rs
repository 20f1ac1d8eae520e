use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Имя файла при фиксированном именовании.
pub const FIXED_FILE_NAME: &str = "GeneratedDocument.pdf";

/// Сколько раз пробуем подобрать свободное имя файла.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Способ именования сформированных файлов.
#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileNaming {
    /// Вид документа плюс время формирования. Существующие файлы не
    /// перезаписываются.
    #[default]
    Timestamped,

    /// Всегда `GeneratedDocument.pdf`, предыдущий файл перезаписывается.
    Fixed,
}

impl FileNaming {
    /// Возвращает базовое имя файла для документа.
    pub fn file_name(self, pdf_title: &str, now: NaiveDateTime) -> String {
        match self {
            Self::Timestamped => format!("{}-{}.pdf", pdf_title, now.format("%Y%m%d-%H%M%S")),
            Self::Fixed => FIXED_FILE_NAME.to_owned(),
        }
    }

    fn overwrites(self) -> bool {
        matches!(self, Self::Fixed)
    }
}

/// Сохраняет сформированный PDF в постоянное место.
pub trait Storage {
    fn store(&self, pdf: &[u8], file_name: &str) -> StoreResult;
}

/// Хранилище в каталоге на диске.
///
/// Файл сначала пишется во временный файл в том же каталоге и только затем
/// атомарно переименовывается, поэтому по целевому пути никогда не бывает
/// недописанного файла.
pub struct FsStorage {
    dir: PathBuf,
    naming: FileNaming,
}

impl FsStorage {
    pub fn new(dir: PathBuf, naming: FileNaming) -> Self {
        Self { dir, naming }
    }

    fn write_temp(&self, pdf: &[u8]) -> std::result::Result<NamedTempFile, StorageError> {
        fs::create_dir_all(&self.dir).map_err(StorageError::CreateDir)?;

        let mut file = NamedTempFile::new_in(&self.dir).map_err(StorageError::TempFile)?;
        file.write_all(pdf).map_err(StorageError::Write)?;
        file.as_file().sync_all().map_err(StorageError::Write)?;

        Ok(file)
    }
}

impl Storage for FsStorage {
    fn store(&self, pdf: &[u8], file_name: &str) -> StoreResult {
        let mut file = self.write_temp(pdf)?;

        if self.naming.overwrites() {
            let path = self.dir.join(file_name);
            debug!("Перемещаем {:?} в {:?}", file.path(), path);
            file.persist(&path).map_err(|e| StorageError::Persist(e.error))?;
            return Ok(path);
        }

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(candidate_name(file_name, attempt));
            debug!("Перемещаем {:?} в {:?}", file.path(), path);

            match file.persist_noclobber(&path) {
                Ok(_) => return Ok(path),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => file = e.file,
                Err(e) => return Err(StorageError::Persist(e.error)),
            }
        }

        Err(StorageError::NamesExhausted(file_name.to_owned()))
    }
}

/// `Bill-20240501-120000.pdf`, `Bill-20240501-120000-1.pdf`, ...
fn candidate_name(file_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return file_name.to_owned();
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, attempt, ext.to_string_lossy()),
        None => format!("{}-{}", stem, attempt),
    }
}

pub type StoreResult = std::result::Result<PathBuf, StorageError>;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("create output directory")]
    CreateDir(#[source] io::Error),

    #[error("create temporary file")]
    TempFile(#[source] io::Error),

    #[error("write temporary file")]
    Write(#[source] io::Error),

    #[error("move file into place")]
    Persist(#[source] io::Error),

    #[error("no free file name for {0}")]
    NamesExhausted(String),
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn file_names() {
        assert_eq!(
            FileNaming::Timestamped.file_name("Bill", noon()),
            "Bill-20240501-120000.pdf"
        );
        assert_eq!(
            FileNaming::Fixed.file_name("Bill", noon()),
            "GeneratedDocument.pdf"
        );
    }

    #[test]
    fn candidate_names() {
        assert_eq!(candidate_name("Bill.pdf", 0), "Bill.pdf");
        assert_eq!(candidate_name("Bill.pdf", 2), "Bill-2.pdf");
        assert_eq!(candidate_name("Bill", 1), "Bill-1");
    }

    #[test]
    fn timestamped_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path().join("docs"), FileNaming::Timestamped);

        let first = storage.store(b"first", "Bill-20240501-120000.pdf").unwrap();
        let second = storage.store(b"second", "Bill-20240501-120000.pdf").unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read(&first).unwrap(), b"first");
        assert_eq!(fs::read(&second).unwrap(), b"second");
        assert_eq!(second.file_name().unwrap(), "Bill-20240501-120000-1.pdf");
    }

    #[test]
    fn fixed_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path().to_path_buf(), FileNaming::Fixed);

        let first = storage.store(b"first", FIXED_FILE_NAME).unwrap();
        let second = storage.store(b"second", FIXED_FILE_NAME).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"second");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_store_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        // Каталог вывода указывает на обычный файл.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let storage = FsStorage::new(blocker.clone(), FileNaming::Fixed);

        let err = storage.store(b"pdf", FIXED_FILE_NAME).unwrap_err();

        assert!(matches!(err, StorageError::CreateDir(_)));
        assert!(!blocker.join(FIXED_FILE_NAME).exists());
    }
}
