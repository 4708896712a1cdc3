//! Word-compatible HTML rendering.

use crate::aggregate::grand_total;
use crate::calendar::traditional_subtitle;
use crate::store::record_store::RecordStore;
use chrono::NaiveDateTime;

/// Heading of exported documents.
pub const DOCUMENT_TITLE: &str = "电子礼薄书";

const CELL_STYLE: &str = "padding: 8px;";
const COLUMN_HEADERS: [&str; 5] = ["宾客姓名", "礼金", "礼金大写", "礼品", "地址"];

/// Renders every record plus event metadata and a grand-total footer.
pub fn render_word_document(store: &RecordStore, now: NaiveDateTime) -> String {
    let meta = store.meta();
    let mut html = String::new();

    html.push_str(&format!(
        "<html><head><meta charset=\"utf-8\"><title>{DOCUMENT_TITLE}</title></head><body>"
    ));
    html.push_str(&format!(
        "<h1 style=\"text-align: center; color: #C8102E;\">{DOCUMENT_TITLE}</h1>"
    ));
    html.push_str(&format!(
        "<p style=\"text-align: center; color: #666;\">{}</p>",
        traditional_subtitle(now)
    ));
    html.push_str(&format!(
        "<p><strong>礼事主题：</strong>{}</p>",
        escape_html(&meta.event_title)
    ));
    html.push_str(&format!(
        "<p><strong>地点：</strong>{}</p>",
        escape_html(&meta.event_location)
    ));
    html.push_str(&format!(
        "<p><strong>日期：</strong>{}</p>",
        escape_html(&meta.create_date)
    ));

    html.push_str(
        "<table border=\"1\" style=\"width: 100%; border-collapse: collapse; margin: 20px 0;\">",
    );
    html.push_str("<thead><tr>");
    for header in COLUMN_HEADERS {
        html.push_str(&format!("<th style=\"{CELL_STYLE}\">{header}</th>"));
    }
    html.push_str("</tr></thead><tbody>");

    for (_, record) in store.records() {
        html.push_str("<tr>");
        for cell in [
            &record.name,
            &record.amount,
            &record.amount_numeral,
            &record.gift,
            &record.address,
        ] {
            html.push_str(&format!(
                "<td style=\"{CELL_STYLE}\">{}</td>",
                escape_html(cell)
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");

    html.push_str(&format!(
        "<p style=\"text-align: right; margin-top: 20px;\"><strong>总计：¥{}</strong></p>",
        grand_total(store)
    ));
    html.push_str("</body></html>");
    html
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_html, render_word_document};
    use crate::model::ledger::Ledger;
    use crate::model::record::RecordField;
    use crate::store::page_manager::add_page;
    use crate::store::record_store::RecordStore;
    use chrono::NaiveDate;

    #[test]
    fn document_lists_records_in_index_order_with_total() {
        let mut store = RecordStore::new(Ledger::default());
        add_page(&mut store).unwrap();
        add_page(&mut store).unwrap();
        store.set(9, RecordField::Name, "second").unwrap();
        store.set(9, RecordField::Amount, "5").unwrap();
        store.set(0, RecordField::Name, "first").unwrap();
        store.set(0, RecordField::Amount, "10.5").unwrap();
        store.meta_mut().event_title = "寿宴".to_string();

        let now = NaiveDate::from_ymd_opt(2025, 5, 20)
            .and_then(|date| date.and_hms_opt(18, 0, 0))
            .unwrap();
        let html = render_word_document(&store, now);

        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
        assert!(html.contains("壹拾元伍角"));
        assert!(html.contains("<strong>礼事主题：</strong>寿宴"));
        assert!(html.contains("总计：¥15.50"));
        assert_eq!(html.matches("<tr>").count(), 17);
    }

    #[test]
    fn user_text_is_escaped() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }
}
