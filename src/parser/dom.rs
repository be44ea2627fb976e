use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

pub static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Element text with runs of whitespace collapsed.
pub fn text_of(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Visible text of every `<a>` under `el`, in document order.
pub fn link_texts(el: ElementRef) -> Vec<String> {
    el.select(&LINK_SEL).map(text_of).collect()
}

/// `title` attribute of every `<a>` under `el`, in document order.
pub fn link_titles(el: ElementRef) -> Vec<String> {
    el.select(&LINK_SEL)
        .filter_map(|a| a.value().attr("title"))
        .map(|t| t.trim().to_string())
        .collect()
}

/// Next element sibling, skipping text and comment nodes.
pub fn next_element_sibling(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().find_map(ElementRef::wrap)
}

pub fn has_class(el: ElementRef, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Split a comma separated cell into trimmed, non-empty parts.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
