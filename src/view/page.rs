use crate::api::models::ResultCategory;
use crate::controller::{UiState, CLEAR_HISTORY_PROMPT};
use crate::view::history::{history_table, pager};
use crate::view::result::result_panel;
use crate::view::{render, Element, Node};

const TITLE: &str = "News Verification";

const STYLE: &str = "
body { font-family: sans-serif; margin: 0 auto; max-width: 960px; padding: 24px; color: #1f2933; }
textarea { width: 100%; min-height: 140px; }
input[type=url] { width: 100%; }
.result { margin: 16px 0; padding: 12px; border-radius: 6px; border: 1px solid #cbd2d9; }
.result div { margin: 4px 0; }
.result.verified { background: #e3f9e5; border-color: #31c48d; }
.result.suspicious { background: #fffbea; border-color: #f0b429; }
.result.fake { background: #ffe3e3; border-color: #e12d39; }
.result.error { background: #f5f7fa; color: #9b1c1c; }
.result.checking { background: #f5f7fa; }
.result-real { color: #057a55; font-weight: bold; }
.result-fake { color: #c81e1e; font-weight: bold; }
.result-unverified { color: #b7791f; font-weight: bold; }
table { width: 100%; border-collapse: collapse; }
th, td { border-bottom: 1px solid #e4e7eb; padding: 6px; text-align: left; }
.toolbar, .pager { display: flex; gap: 8px; align-items: center; margin: 8px 0; }
";

/// Full page for the current UI state.
pub fn document(state: &UiState) -> String {
    let body = Element::new("body")
        .child(Element::new("h1").text(TITLE))
        .child(analysis_form(state))
        .child(result_panel(&state.result))
        .child(history_section(state));

    wrap(TITLE, body)
}

/// Stand-in for a confirmation dialog before wiping history.
pub fn confirm_clear_document() -> String {
    let answer = |value: &str, label: &str| {
        Element::new("form")
            .attr("method", "post")
            .attr("action", "/history/clear")
            .child(
                Element::new("input")
                    .attr("type", "hidden")
                    .attr("name", "confirm")
                    .attr("value", value),
            )
            .child(Element::new("button").attr("type", "submit").text(label))
    };

    let body = Element::new("body")
        .child(Element::new("h1").text(TITLE))
        .child(Element::new("p").id("confirmPrompt").text(CLEAR_HISTORY_PROMPT))
        .child(
            Element::new("div")
                .class("toolbar")
                .child(answer("yes", "OK"))
                .child(answer("no", "Cancel")),
        );

    wrap(TITLE, body)
}

fn wrap(title: &str, body: Element) -> String {
    let head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(Element::new("title").text(title))
        .child(Element::new("style").child(Node::Static(STYLE)));

    let html = Element::new("html").attr("lang", "en").child(head).child(body);
    format!("<!DOCTYPE html>\n{}", render(&html.into()))
}

fn analysis_form(state: &UiState) -> Element {
    Element::new("form")
        .attr("method", "post")
        .attr("action", "/check")
        .child(Element::new("label").attr("for", "newsText").text("News text"))
        .child(
            Element::new("textarea")
                .id("newsText")
                .attr("name", "text")
                .text(state.draft_text.as_str()),
        )
        .child(Element::new("label").attr("for", "sourceUrl").text("Source URL (optional)"))
        .child(
            Element::new("input")
                .attr("type", "url")
                .id("sourceUrl")
                .attr("name", "source_url")
                .attr("value", state.draft_source_url.as_str()),
        )
        .child(
            Element::new("button")
                .attr("type", "submit")
                .id("checkBtn")
                .text("Check"),
        )
}

fn history_section(state: &UiState) -> Element {
    let selected = state.paging.current_filter;
    let mut select = Element::new("select")
        .id("resultFilter")
        .attr("name", "result")
        .child(
            Element::new("option")
                .attr("value", "")
                .flag("selected", selected.is_none())
                .text("All"),
        );
    for category in ResultCategory::ALL {
        select = select.child(
            Element::new("option")
                .attr("value", category.as_str())
                .flag("selected", selected == Some(category))
                .text(category.as_str()),
        );
    }

    let filter_form = Element::new("form")
        .attr("method", "post")
        .attr("action", "/filter")
        .child(select)
        .child(
            Element::new("button")
                .attr("type", "submit")
                .id("applyFilterBtn")
                .text("Apply Filter"),
        );

    let toolbar = Element::new("div")
        .class("toolbar")
        .child(filter_form)
        .child(
            Element::new("a")
                .id("clearHistoryBtn")
                .attr("href", "/history/clear")
                .text("Clear History"),
        )
        .child(
            Element::new("a")
                .id("exportHistoryBtn")
                .attr("href", "/history/export")
                .text("Export CSV"),
        );

    Element::new("section")
        .id("history")
        .child(Element::new("h2").text("Verification History"))
        .child(toolbar)
        .child(history_table(&state.history))
        .child(pager(&state.history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PagingState;

    #[test]
    fn selected_filter_is_marked() {
        let state = UiState {
            paging: PagingState {
                current_page: 1,
                current_filter: Some(ResultCategory::Fake),
            },
            ..Default::default()
        };
        let html = document(&state);
        assert!(html.contains("<option value=\"Fake\" selected=\"\">Fake</option>"));
        assert!(html.contains("<option value=\"\">All</option>"));
    }

    #[test]
    fn drafts_are_escaped_into_the_form() {
        let state = UiState {
            draft_text: "</textarea><script>x</script>".into(),
            draft_source_url: "\" autofocus onfocus=\"x".into(),
            ..Default::default()
        };
        let html = document(&state);
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;x&lt;/script&gt;</textarea>"));
        assert!(html.contains("value=\"&quot; autofocus onfocus=&quot;x\""));
    }

    #[test]
    fn confirmation_page_offers_both_answers() {
        let html = confirm_clear_document();
        assert!(html.contains(CLEAR_HISTORY_PROMPT));
        assert!(html.contains("name=\"confirm\" value=\"yes\""));
        assert!(html.contains("name=\"confirm\" value=\"no\""));
    }
}
