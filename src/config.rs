use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    model::{DateFormat, MobileNumber},
    share::ShareMethod,
    storage::FileNaming,
};
use resolve_path::PathResolveExt;

/// Префикс номера телефона по-умолчанию.
const DEFAULT_MOBILE_PREFIX: &str = "+91";

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// Каталог, в который складываются сформированные документы.
    pub output_dir: PathBuf,

    /// Способ именования файлов.
    pub file_naming: FileNaming,

    /// Формат даты в документе (strftime).
    pub date_format: DateFormat,

    /// Начальное значение номера телефона, обычно код страны.
    pub mobile_prefix: MobileNumber,

    /// Файлы шрифтов для рендеринга PDF.
    pub font_paths: Vec<PathBuf>,

    /// Способ передачи готового документа пользователю.
    pub share: ShareMethod,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./documents"),
            file_naming: FileNaming::default(),
            date_format: DateFormat::short(),
            mobile_prefix: MobileNumber::new(DEFAULT_MOBILE_PREFIX).unwrap_or_default(),
            font_paths: Vec::new(),
            share: ShareMethod::default(),
        }
    }
}

/// Загружает конфигурацию.
pub fn load(path: PathBuf) -> anyhow::Result<Config> {
    let mut cfg: Config = confy::load_path(path)?;

    normalize(&mut cfg)?;

    Ok(cfg)
}

pub fn normalize(cfg: &mut Config) -> anyhow::Result<()> {
    // Чтобы правильно обработать относительные пути.
    cfg.output_dir = cfg.output_dir.try_resolve()?.into_owned();

    cfg.font_paths = cfg
        .font_paths
        .iter()
        .map(|p| p.try_resolve().map(|p| p.into_owned()))
        .collect::<Result<_, _>>()?;

    Ok(())
}
