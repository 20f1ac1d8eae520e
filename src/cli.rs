use enum_iterator::all;
use inquire::validator::Validation;
use inquire::{Confirm, DateSelect, Select, Text};

use crate::model::{DocumentKind, FormField, FormModel, MOBILE_NUMBER_MAX_LEN};

/// Спрашивает, какой документ нужно сформировать.
pub fn ask_kind() -> anyhow::Result<DocumentKind> {
    let kind = Select::new("What You Want To Create?", all::<DocumentKind>().collect()).prompt()?;

    Ok(kind)
}

/// Запрашивает у пользователя значения для всех полей формы.
/// Поля спрашиваются в том же порядке, в котором они выводятся в документ.
pub fn ask(form: FormModel) -> anyhow::Result<FormModel> {
    let mut form = form;

    for field in [FormField::Name, FormField::Address, FormField::MobileNumber] {
        let current = current_value(&form, field);
        form = form.set_field(field, &prompt(field, &current)?);
    }

    let date = DateSelect::new("Date")
        .with_default(form.date())
        .prompt_skippable()?;
    form = form.set_date(date);

    form = ask_menu(form)?;

    // Количества в документ не попадают, поэтому их можно пропустить.
    for field in FormField::QUANTITIES {
        let value = Text::new(&field.to_string())
            .with_help_message("optional, not printed")
            .prompt_skippable()?;
        form = form.set_field(field, value.as_deref().unwrap_or_default());
    }

    let current = current_value(&form, FormField::TotalAmount);
    form = form.set_field(FormField::TotalAmount, &prompt(FormField::TotalAmount, &current)?);

    Ok(form)
}

fn ask_menu(form: FormModel) -> anyhow::Result<FormModel> {
    let mut form = form;
    let mut index = 0;

    loop {
        let title = format!("Item {}", index + 1);
        let name = Text::new(&title).prompt()?;
        form = form.set_menu_item_name(index, &name)?;

        let more = Confirm::new("Add Menu Item?").with_default(false).prompt()?;
        if !more {
            return Ok(form);
        }

        form = form.append_menu_item();
        index += 1;
    }
}

fn current_value(form: &FormModel, field: FormField) -> String {
    match field {
        FormField::Name => form.name().to_owned(),
        FormField::Address => form.address().to_owned(),
        FormField::MobileNumber => form.mobile_number().to_string(),
        FormField::TotalAmount => form.total_amount().to_owned(),
        FormField::QuantityOfTable => form.quantities().tables.clone().unwrap_or_default(),
        FormField::QuantityOfChair => form.quantities().chairs.clone().unwrap_or_default(),
        FormField::QuantityOfPeople => form.quantities().people.clone().unwrap_or_default(),
    }
}

fn prompt(field: FormField, default: &str) -> anyhow::Result<String> {
    let title = field.to_string();

    let mut prompt = Text::new(&title);

    if !default.is_empty() {
        prompt = prompt.with_initial_value(default);
    }

    // Форма сама отбрасывает слишком длинный номер, но пользователю лучше
    // сразу сказать об этом.
    if field == FormField::MobileNumber {
        prompt = prompt
            .with_help_message("+91XXXXXXXXXX")
            .with_validator(|s: &str| {
                if s.chars().count() > MOBILE_NUMBER_MAX_LEN {
                    return Ok(Validation::Invalid(
                        format!("at most {} characters", MOBILE_NUMBER_MAX_LEN).into(),
                    ));
                };
                Ok(Validation::Valid)
            });
    }

    let val = prompt.prompt()?;

    Ok(val)
}
