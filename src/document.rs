use serde::Serialize;

use crate::model::{DateFormat, DocumentRequest, FormModel};

/// Структурированный документ, собранный из снимка формы.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Заголовок документа ("Quotation" или "Bill").
    pub title: String,

    /// Имя клиента.
    pub name: String,

    pub address: String,

    pub mobile_number: String,

    /// Дата, уже отформатированная для вывода.
    pub date: String,

    /// Строки таблицы меню в порядке следования позиций.
    pub rows: Vec<Row>,

    pub total_amount: String,
}

/// Строка таблицы меню.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Порядковый номер позиции, начиная с единицы.
    pub sequence: usize,

    pub item_name: String,
}

impl Document {
    /// Собирает документ из снимка формы.
    pub fn build(form: &FormModel, request: &DocumentRequest, date_format: &DateFormat) -> Self {
        let rows = form
            .menu_items()
            .iter()
            .enumerate()
            .map(|(i, item)| Row {
                sequence: i + 1,
                item_name: item.item_name.clone(),
            })
            .collect();

        Self {
            title: request.pdf_title.clone(),
            name: form.name().to_owned(),
            address: form.address().to_owned(),
            mobile_number: form.mobile_number().to_string(),
            date: date_format.format(form.date()),
            rows,
            total_amount: form.total_amount().to_owned(),
        }
    }
}
