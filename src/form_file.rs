use std::{fs, io, path::Path};

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::model::{FormField, FormModel, MenuItem, MobileNumber, ModelError};

/// Форма, заполненная заранее и сохранённая в JSON.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FormFile {
    #[serde(default)]
    name: String,

    #[serde(default)]
    address: String,

    /// Если номер не указан, берётся префикс из конфига.
    mobile_number: Option<MobileNumber>,

    /// Если дата не указана, берётся сегодняшняя.
    date: Option<NaiveDate>,

    #[serde(default)]
    menu_items: Vec<MenuItem>,

    quantity_of_table: Option<String>,
    quantity_of_chair: Option<String>,
    quantity_of_people: Option<String>,

    #[serde(default)]
    total_amount: String,
}

/// Загружает форму из указанного файла.
pub fn load(path: &Path, mobile_prefix: &MobileNumber) -> LoadResult {
    let content = fs::read_to_string(path)?;

    let raw: FormFile = serde_json::from_str(&content)?;

    replay(raw, mobile_prefix)
}

/// Воспроизводит заполнение формы теми же операциями, что и при вводе
/// вручную.
fn replay(raw: FormFile, mobile_prefix: &MobileNumber) -> LoadResult {
    let date = raw.date.unwrap_or_else(|| Local::now().date_naive());
    let mobile_number = raw.mobile_number.unwrap_or_else(|| mobile_prefix.clone());
    let mut form = FormModel::new(date, mobile_number)
        .set_field(FormField::Name, &raw.name)
        .set_field(FormField::Address, &raw.address);

    for (i, item) in raw.menu_items.iter().enumerate() {
        if i > 0 {
            form = form.append_menu_item();
        }
        form = form.set_menu_item_name(i, &item.item_name)?;
    }

    let quantities = [
        raw.quantity_of_table,
        raw.quantity_of_chair,
        raw.quantity_of_people,
    ];
    for (field, value) in FormField::QUANTITIES.into_iter().zip(quantities) {
        form = form.set_field(field, value.as_deref().unwrap_or_default());
    }

    Ok(form.set_field(FormField::TotalAmount, &raw.total_amount))
}

pub type LoadResult = std::result::Result<FormModel, LoadError>;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("read form file")]
    ReadFile(#[from] io::Error),

    #[error("deserialize form")]
    Deserialize(#[from] serde_json::Error),

    #[error("fill form")]
    Model(#[from] ModelError),
}
