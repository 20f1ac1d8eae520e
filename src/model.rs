use std::fmt::Write;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::newtype;

/// Максимальная длина номера телефона вместе с кодом страны.
pub const MOBILE_NUMBER_MAX_LEN: usize = 13;

/// Короткий формат даты по-умолчанию (как `5/1/2024`).
pub const SHORT_DATE_FORMAT: &str = "%-m/%-d/%Y";

newtype!(MobileNumber, String, "String", mobile_number_validate);

fn mobile_number_validate(value: &str) -> anyhow::Result<()> {
    if value.chars().count() > MOBILE_NUMBER_MAX_LEN {
        return Err(anyhow!(
            "should be at most {} chars",
            MOBILE_NUMBER_MAX_LEN
        ));
    }

    Ok(())
}

newtype!(DateFormat, String, "String", date_format_validate);

impl DateFormat {
    /// Короткий формат даты.
    pub fn short() -> Self {
        Self(SHORT_DATE_FORMAT.to_owned())
    }

    /// Форматирует дату.
    pub fn format(&self, date: NaiveDate) -> String {
        date.format(&self.0).to_string()
    }
}

fn date_format_validate(value: &str) -> anyhow::Result<()> {
    // chrono паникует в `to_string`, если шаблон нельзя применить к дате:
    // неизвестные спецификаторы, а также время и смещение (`%H`, `%z`).
    let sample = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let mut out = String::new();
    if write!(out, "{}", sample.format(value)).is_err() {
        return Err(anyhow!("invalid date format \"{}\"", value));
    }

    Ok(())
}

/// Вид документа, который можно сформировать.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    enum_iterator::Sequence,
    clap::ValueEnum,
)]
pub enum DocumentKind {
    #[display(fmt = "Create Quotation")]
    Quotation,
    #[display(fmt = "Create Bill")]
    Bill,
}

impl DocumentKind {
    /// Возвращает набор заголовков для данного вида документа.
    pub fn request(self) -> DocumentRequest {
        let (form_title, pdf_title) = match self {
            Self::Quotation => ("Generate Quotation", "Quotation"),
            Self::Bill => ("Generate Bill", "Bill"),
        };

        DocumentRequest {
            form_title: form_title.to_owned(),
            pdf_title: pdf_title.to_owned(),
        }
    }
}

/// Запрос на формирование документа.
/// Влияет только на заголовки: заголовок формы и заголовок PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub form_title: String,
    pub pdf_title: String,
}

/// Позиция меню.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub item_name: String,
}

/// Количества для мероприятия.
///
/// Собираются вместе с формой, но в документ не попадают.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct EventQuantities {
    pub tables: Option<String>,
    pub chairs: Option<String>,
    pub people: Option<String>,
}

/// Скалярные поля формы.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum FormField {
    #[display(fmt = "Name")]
    Name,
    #[display(fmt = "Address")]
    Address,
    #[display(fmt = "Mobile Number")]
    MobileNumber,
    #[display(fmt = "Quantity of tables")]
    QuantityOfTable,
    #[display(fmt = "Quantity of chairs")]
    QuantityOfChair,
    #[display(fmt = "Quantity of people")]
    QuantityOfPeople,
    #[display(fmt = "Total Amount")]
    TotalAmount,
}

impl FormField {
    /// Поля, которые не выводятся в документ.
    pub const QUANTITIES: [FormField; 3] = [
        FormField::QuantityOfTable,
        FormField::QuantityOfChair,
        FormField::QuantityOfPeople,
    ];
}

/// Состояние заполняемой формы.
///
/// Каждая операция изменения возвращает новый снимок формы, исходный
/// при этом не меняется.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormModel {
    name: String,
    address: String,
    mobile_number: MobileNumber,
    date: NaiveDate,
    menu_items: Vec<MenuItem>,
    quantities: EventQuantities,
    total_amount: String,
}

impl FormModel {
    /// Создаёт пустую форму с одной пустой позицией меню.
    pub fn new(date: NaiveDate, mobile_number: MobileNumber) -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            mobile_number,
            date,
            menu_items: vec![MenuItem::default()],
            quantities: EventQuantities::default(),
            total_amount: String::new(),
        }
    }

    /// Заменяет значение скалярного поля.
    ///
    /// Слишком длинный номер телефона молча отбрасывается, поле остаётся
    /// прежним.
    #[must_use]
    pub fn set_field(&self, field: FormField, value: &str) -> Self {
        let mut next = self.clone();

        match field {
            FormField::Name => next.name = value.to_owned(),
            FormField::Address => next.address = value.to_owned(),
            FormField::MobileNumber => {
                if let Ok(number) = MobileNumber::new(value) {
                    next.mobile_number = number;
                }
            }
            FormField::QuantityOfTable => next.quantities.tables = optional(value),
            FormField::QuantityOfChair => next.quantities.chairs = optional(value),
            FormField::QuantityOfPeople => next.quantities.people = optional(value),
            FormField::TotalAmount => next.total_amount = value.to_owned(),
        }

        next
    }

    /// Добавляет пустую позицию в конец меню.
    #[must_use]
    pub fn append_menu_item(&self) -> Self {
        let mut next = self.clone();
        next.menu_items.push(MenuItem::default());
        next
    }

    /// Заменяет название позиции меню с указанным индексом.
    pub fn set_menu_item_name(&self, index: usize, value: &str) -> ModelResult<Self> {
        let len = self.menu_items.len();
        let mut next = self.clone();

        let item = next
            .menu_items
            .get_mut(index)
            .ok_or(ModelError::NoSuchMenuItem { index, len })?;
        item.item_name = value.to_owned();

        Ok(next)
    }

    /// Заменяет дату. Отменённый выбор даты (`None`) дату не меняет.
    #[must_use]
    pub fn set_date(&self, date: Option<NaiveDate>) -> Self {
        let mut next = self.clone();
        if let Some(d) = date {
            next.date = d;
        }
        next
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn mobile_number(&self) -> &MobileNumber {
        &self.mobile_number
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn menu_items(&self) -> &[MenuItem] {
        &self.menu_items
    }

    pub fn quantities(&self) -> &EventQuantities {
        &self.quantities
    }

    pub fn total_amount(&self) -> &str {
        &self.total_amount
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("menu item {index} not found, menu has {len} items")]
    NoSuchMenuItem { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_form() -> FormModel {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        FormModel::new(date, MobileNumber::new("+91").unwrap())
    }

    #[test]
    fn new_form_has_one_empty_menu_item() {
        let form = empty_form();

        assert_eq!(form.menu_items(), &[MenuItem::default()]);
        assert_eq!(form.mobile_number().as_str(), "+91");
    }

    #[test]
    fn append_menu_item_adds_empty_slot() {
        let form = empty_form().append_menu_item();

        assert_eq!(form.menu_items().len(), 2);
        assert_eq!(form.menu_items()[1].item_name, "");
    }

    #[test]
    fn mutation_keeps_previous_snapshot() {
        let before = empty_form();
        let after = before.set_field(FormField::Name, "Acme Caterers");

        assert_eq!(before.name(), "");
        assert_eq!(after.name(), "Acme Caterers");
    }

    #[test]
    fn too_long_mobile_number_is_rejected() {
        let form = empty_form().set_field(FormField::MobileNumber, "");
        let form = form.set_field(FormField::MobileNumber, "+91123456789012");

        assert_eq!(form.mobile_number().as_str(), "");
    }

    #[test]
    fn mobile_number_of_max_len_is_accepted() {
        let form = empty_form().set_field(FormField::MobileNumber, "+919876543210");

        assert_eq!(form.mobile_number().as_str(), "+919876543210");
    }

    #[test]
    fn mobile_number_never_exceeds_limit() {
        let inputs = ["+9", "+91987654321", "+9198765432101", "", "+9198765432", "12345678901234567"];
        let mut form = empty_form();

        for input in inputs {
            form = form.set_field(FormField::MobileNumber, input);
            assert!(form.mobile_number().as_str().chars().count() <= MOBILE_NUMBER_MAX_LEN);
        }

        assert_eq!(form.mobile_number().as_str(), "+9198765432");
    }

    #[test]
    fn menu_never_shrinks() {
        let mut form = empty_form();
        let mut len = form.menu_items().len();

        for i in 0..5 {
            form = if i % 2 == 0 {
                form.append_menu_item()
            } else {
                form.set_menu_item_name(0, "Samosa").unwrap()
            };
            assert!(form.menu_items().len() >= len);
            assert!(!form.menu_items().is_empty());
            len = form.menu_items().len();
        }
    }

    #[test]
    fn set_menu_item_name_by_position() {
        let form = empty_form()
            .append_menu_item()
            .set_menu_item_name(1, "Cake")
            .unwrap();

        assert_eq!(form.menu_items()[0].item_name, "");
        assert_eq!(form.menu_items()[1].item_name, "Cake");
    }

    #[test]
    fn set_menu_item_name_out_of_range() {
        let err = empty_form().set_menu_item_name(3, "Cake").unwrap_err();

        assert!(matches!(err, ModelError::NoSuchMenuItem { index: 3, len: 1 }));
    }

    #[test]
    fn cancelled_date_selection_keeps_date() {
        let form = empty_form().set_date(None);
        assert_eq!(form.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());

        let picked = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(form.set_date(Some(picked)).date(), picked);
    }

    #[test]
    fn quantities_are_optional() {
        let form = empty_form()
            .set_field(FormField::QuantityOfTable, "10")
            .set_field(FormField::QuantityOfChair, "");

        assert_eq!(form.quantities().tables.as_deref(), Some("10"));
        assert_eq!(form.quantities().chairs, None);
    }

    #[test]
    fn document_kind_titles() {
        let request = DocumentKind::Bill.request();
        assert_eq!(request.form_title, "Generate Bill");
        assert_eq!(request.pdf_title, "Bill");

        let request = DocumentKind::Quotation.request();
        assert_eq!(request.form_title, "Generate Quotation");
        assert_eq!(request.pdf_title, "Quotation");
    }

    #[test]
    fn date_format_validation() {
        assert!(DateFormat::new("%d.%m.%Y").is_ok());
        assert!(DateFormat::new("%Q").is_err());
        assert!(DateFormat::new("%A, %-d %B %Y").is_ok());

        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(DateFormat::short().format(date), "5/1/2024");
    }

    #[test]
    fn date_format_with_time_is_rejected() {
        assert!(DateFormat::new("%d.%m.%Y %H:%M").is_err());
        assert!(DateFormat::new("%Y-%m-%d %z").is_err());
        assert!(DateFormat::try_from("%H".to_owned()).is_err());
    }
}
