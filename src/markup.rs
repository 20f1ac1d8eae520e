//! Вёрстка документа.
//!
//! Документ сначала раскладывается в дерево блоков, а затем дерево
//! переводится в разметку Typst, которую уже можно компилировать в PDF.

use crate::{document::Document, pdf::FONT_FALLBACK};

/// Цвет заголовка документа.
const TITLE_COLOR: &str = "#ED070A";

/// Блок разметки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Заголовок документа, выводится по центру.
    Title(String),

    /// Подписанное поле вида "Label: value".
    Field { label: String, value: String },

    /// Заголовок раздела.
    Heading(String),

    /// Таблица с заголовочной строкой.
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// Раскладывает документ в дерево блоков.
pub fn layout(doc: &Document) -> Vec<Block> {
    let rows = doc
        .rows
        .iter()
        .map(|row| vec![row.sequence.to_string(), row.item_name.clone()])
        .collect();

    vec![
        Block::Title(doc.title.clone()),
        field("Name", &doc.name),
        field("Address", &doc.address),
        field("Mobile Number", &doc.mobile_number),
        field("Date", &doc.date),
        Block::Heading("Menu Items".to_owned()),
        Block::Table {
            // Во второй колонке выводится название позиции, хотя колонка
            // подписана как "Quantity".
            header: vec!["Item".to_owned(), "Quantity".to_owned()],
            rows,
        },
        field("Total Amount", &doc.total_amount),
    ]
}

fn field(label: &str, value: &str) -> Block {
    Block::Field {
        label: label.to_owned(),
        value: value.to_owned(),
    }
}

/// Переводит дерево блоков в разметку Typst.
pub struct Transpiler;

impl Transpiler {
    /// Разметка целого документа.
    pub fn transpile(title: &str, blocks: &[Block]) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "#set document(title: {})\n",
            string_literal(title)
        ));
        output.push_str("#set page(margin: 20pt)\n");
        let fonts: Vec<String> = FONT_FALLBACK.iter().map(|f| string_literal(f)).collect();
        output.push_str(&format!(
            "#set text(font: ({}), size: 11pt)\n\n",
            fonts.join(", ")
        ));

        for block in blocks {
            output.push_str(&Self::transpile_block(block));
            output.push('\n');
        }

        output
    }

    fn transpile_block(block: &Block) -> String {
        match block {
            Block::Title(text) => format!(
                "#align(center, text(fill: rgb(\"{}\"), size: 24pt, weight: \"bold\", {}))\n",
                TITLE_COLOR,
                string_literal(text)
            ),

            Block::Field { label, value } => {
                format!("*{}:* #{}\n", label, string_literal(value))
            }

            Block::Heading(text) => format!("== {}\n", text),

            Block::Table { header, rows } => Self::transpile_table(header, rows),
        }
    }

    fn transpile_table(header: &[String], rows: &[Vec<String>]) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "#table(\n  columns: {},\n  stroke: 1pt + black,\n  inset: 10pt,\n",
            header.len()
        ));

        let cells: Vec<String> = header
            .iter()
            .map(|h| format!("[*{}*]", h))
            .collect();
        output.push_str(&format!("  table.header{},\n", cells.concat()));

        for row in rows {
            let cells: Vec<String> = row
                .iter()
                .map(|c| format!("[#{}]", string_literal(c)))
                .collect();
            output.push_str(&format!("  {},\n", cells.join(", ")));
        }

        output.push_str(")\n");
        output
    }
}

/// Превращает пользовательский текст в строковый литерал Typst.
/// Так текст не может быть интерпретирован как разметка.
fn string_literal(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");

    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Row;

    fn doc() -> Document {
        Document {
            title: "Bill".to_owned(),
            name: "Acme Caterers".to_owned(),
            address: "12 Oak St".to_owned(),
            mobile_number: "+919876543210".to_owned(),
            date: "5/1/2024".to_owned(),
            rows: vec![
                Row { sequence: 1, item_name: "Samosa".to_owned() },
                Row { sequence: 2, item_name: "Cake".to_owned() },
            ],
            total_amount: "5000".to_owned(),
        }
    }

    #[test]
    fn layout_order() {
        let blocks = layout(&doc());

        assert_eq!(blocks[0], Block::Title("Bill".to_owned()));
        assert_eq!(blocks[1], field("Name", "Acme Caterers"));
        assert_eq!(blocks[2], field("Address", "12 Oak St"));
        assert_eq!(blocks[3], field("Mobile Number", "+919876543210"));
        assert_eq!(blocks[4], field("Date", "5/1/2024"));
        assert_eq!(blocks[5], Block::Heading("Menu Items".to_owned()));
        assert_eq!(
            blocks[6],
            Block::Table {
                header: vec!["Item".to_owned(), "Quantity".to_owned()],
                rows: vec![
                    vec!["1".to_owned(), "Samosa".to_owned()],
                    vec!["2".to_owned(), "Cake".to_owned()],
                ],
            }
        );
        assert_eq!(blocks[7], field("Total Amount", "5000"));
    }

    #[test]
    fn transpile_document() {
        let doc = doc();
        let typst = Transpiler::transpile(&doc.title, &layout(&doc));

        assert!(typst.starts_with("#set document(title: \"Bill\")\n"));
        assert!(typst.contains("rgb(\"#ED070A\")"));
        assert!(typst.contains("#set text(font: (\"Arial\", \"Libertinus Serif\"), size: 11pt)\n"));
        assert!(typst.contains("*Name:* #\"Acme Caterers\"\n"));
        assert!(typst.contains("*Date:* #\"5/1/2024\"\n"));
        assert!(typst.contains("table.header[*Item*][*Quantity*],\n"));
        assert!(typst.contains("  [#\"1\"], [#\"Samosa\"],\n"));
        assert!(typst.contains("  [#\"2\"], [#\"Cake\"],\n"));
        assert!(typst.contains("*Total Amount:* #\"5000\"\n"));
    }

    #[test]
    fn transpile_is_deterministic() {
        let doc = doc();

        assert_eq!(
            Transpiler::transpile(&doc.title, &layout(&doc)),
            Transpiler::transpile(&doc.title, &layout(&doc))
        );
    }

    #[test]
    fn user_text_cannot_inject_markup() {
        assert_eq!(string_literal("#pagebreak()"), "\"#pagebreak()\"");
        assert_eq!(string_literal("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(string_literal("a\\b"), "\"a\\\\b\"");
        assert_eq!(string_literal("line\nbreak"), "\"line\\nbreak\"");
    }
}
