use chrono::NaiveDate;

use crate::time_format::format_extraction_date;
use crate::CollectedItem;

pub const CSV_BOM: char = '\u{feff}';
pub const CSV_HEADERS: [&str; 3] = ["Texte", "Date d'extraction", "Date/Heure Publication"];
const CSV_DELIMITER: &str = ";";

/// Semicolon-separated export, prefixed with a UTF-8 BOM so spreadsheet
/// tools pick the right encoding. Only the text column is quoted.
pub fn build_csv(items: &[CollectedItem], extraction_date: NaiveDate) -> String {
    let date = format_extraction_date(extraction_date);
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(CSV_HEADERS.join(CSV_DELIMITER));
    for item in items {
        let row = [
            quote(&item.text),
            date.clone(),
            item.timestamp_display.clone(),
        ];
        lines.push(row.join(CSV_DELIMITER));
    }

    let mut out = String::new();
    out.push(CSV_BOM);
    out.push_str(&lines.join("\n"));
    out
}

/// `tweets_YYYY-MM-DD.csv`
pub fn csv_filename(date: NaiveDate) -> String {
    format!("tweets_{}.csv", date.format("%Y-%m-%d"))
}

/// Text placed on the clipboard: same columns as the CSV, no header, and the
/// text is wrapped in quotes without escaping.
pub fn clipboard_text(items: &[CollectedItem], extraction_date: NaiveDate) -> String {
    let date = format_extraction_date(extraction_date);
    items
        .iter()
        .map(|item| format!("\"{}\";{};{}", item.text, date, item.timestamp_display))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt to paste into an external summarizer.
pub fn summarization_prompt(items: &[CollectedItem]) -> String {
    let mut prompt = String::from(
        "Résume les tweets suivants en quelques phrases, en dégageant les thèmes principaux :\n\n",
    );
    for item in items {
        prompt.push_str(&format!("- [{}] {}\n", item.timestamp_display, item.text));
    }
    prompt
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
