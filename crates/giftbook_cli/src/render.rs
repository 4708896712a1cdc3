//! Plain-text rendering of ledger views.

use chrono::NaiveDateTime;
use giftbook_core::calendar::traditional_subtitle;
use giftbook_core::{PageView, PrintView, Record};
use std::fmt::Write;

/// Renders the whole ledger: heading, one table per page, grand total.
pub fn render_print_view(view: &PrintView, now: NaiveDateTime) -> String {
    let mut out = String::new();
    let meta = &view.meta;
    let _ = writeln!(out, "电子礼薄书  {}", traditional_subtitle(now));
    let _ = writeln!(
        out,
        "礼事主题：{}  地点：{}  日期：{}  档案编号：{}",
        meta.event_title, meta.event_location, meta.create_date, meta.archive_number
    );
    for page in &view.pages {
        out.push('\n');
        render_page(&mut out, page);
    }
    let _ = writeln!(
        out,
        "\n总计：¥{}  {}",
        view.grand_total.amount, view.grand_total.numeral
    );
    out
}

fn render_page(out: &mut String, page: &PageView) {
    let _ = writeln!(out, "第 {} 页", page.page_number);
    for (index, record) in &page.rows {
        if record.is_blank() {
            continue;
        }
        let _ = writeln!(out, "  {}", render_row(*index, record));
    }
    let _ = writeln!(
        out,
        "  本页小计：¥{}  {}",
        page.page_total.amount, page.page_total.numeral
    );
}

fn render_row(index: u32, record: &Record) -> String {
    format!(
        "[{index:>3}] {} | {} | {} | {} | {}",
        record.name, record.amount, record.amount_numeral, record.gift, record.address
    )
}

#[cfg(test)]
mod tests {
    use super::render_print_view;
    use chrono::NaiveDate;
    use giftbook_core::{open_db_in_memory, LedgerService, RecordField, SqliteKeyValueStore};

    #[test]
    fn blank_rows_are_skipped_and_totals_printed() {
        let now = NaiveDate::from_ymd_opt(2025, 2, 14)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .unwrap();
        let conn = open_db_in_memory().unwrap();
        let mut service =
            LedgerService::open(SqliteKeyValueStore::try_new(&conn).unwrap(), now).unwrap();
        service.apply_edit(2, RecordField::Name, "张三").unwrap();
        service.apply_edit(2, RecordField::Amount, "600").unwrap();

        let text = render_print_view(&service.prepare_print().unwrap(), now);
        assert!(text.contains("第 1 页"));
        assert!(text.contains("[  2] 张三 | 600 | 陆佰元整 |  | "));
        assert!(!text.contains("[  0]"));
        assert!(text.contains("本页小计：¥600.00  陆佰元整"));
        assert!(text.contains("总计：¥600.00  陆佰元整"));
    }
}
