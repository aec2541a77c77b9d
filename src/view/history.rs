use crate::api::models::HistoryRecord;
use crate::view::result::result_class;
use crate::view::{Element, Node};

pub const EMPTY_HISTORY_MESSAGE: &str = "No history records found.";
pub const HISTORY_COLUMNS: [&str; 5] = ["Date", "News Summary", "Source", "Result", "Method"];

/// Rendered state of the history region: the current slice plus pager controls.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTable {
    pub records: Vec<HistoryRecord>,
    pub page_label: String,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            page_label: page_label(1),
            prev_disabled: true,
            next_disabled: true,
        }
    }
}

pub fn page_label(page: u32) -> String {
    format!("Page {}", page)
}

pub fn history_rows(records: &[HistoryRecord]) -> Vec<Node> {
    if records.is_empty() {
        return vec![
            Element::new("tr")
                .child(
                    Element::new("td")
                        .attr("colspan", HISTORY_COLUMNS.len().to_string())
                        .text(EMPTY_HISTORY_MESSAGE),
                )
                .into(),
        ];
    }

    records.iter().map(history_row).collect()
}

fn history_row(record: &HistoryRecord) -> Node {
    let source = record
        .source_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("-");

    Element::new("tr")
        .child(Element::new("td").text(record.created_at.as_str()))
        .child(Element::new("td").text(record.news_summary.as_str()))
        .child(Element::new("td").text(source))
        .child(
            Element::new("td").child(
                Element::new("span")
                    .class(result_class(&record.result))
                    .text(record.result.as_str()),
            ),
        )
        .child(Element::new("td").text(record.method.as_str()))
        .into()
}

pub fn history_table(table: &HistoryTable) -> Element {
    let head = HISTORY_COLUMNS
        .iter()
        .map(|col| Node::from(Element::new("th").text(*col)));

    Element::new("table")
        .id("historyTable")
        .child(Element::new("thead").child(Element::new("tr").children(head)))
        .child(Element::new("tbody").children(history_rows(&table.records)))
}

/// Prev/next controls. Each button posts to its own route.
pub fn pager(table: &HistoryTable) -> Element {
    Element::new("div")
        .class("pager")
        .child(pager_button("/history/prev", "prevPageBtn", "Previous", table.prev_disabled))
        .child(Element::new("span").id("pageInfo").text(table.page_label.as_str()))
        .child(pager_button("/history/next", "nextPageBtn", "Next", table.next_disabled))
}

fn pager_button(action: &str, id: &str, label: &str, disabled: bool) -> Element {
    Element::new("form")
        .attr("method", "post")
        .attr("action", action)
        .child(
            Element::new("button")
                .attr("type", "submit")
                .id(id)
                .flag("disabled", disabled)
                .text(label),
        )
}
