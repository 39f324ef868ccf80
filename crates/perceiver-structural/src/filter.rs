//! Keyword extraction and relevance ranking.

use pagepilot_core_types::{PageElement, Rect};
use pagepilot_dom_adapter::Document;
use pagepilot_policy_center::{AgentPolicy, FilterPolicy};

use crate::model::{ElementCategory, ScoredElement, ViewportClass};
use crate::registry::CollectedElement;
use crate::rules;

const SEPARATORS: &[char] = &[',', '，', '。', '.', '!', '！', '?', '？', '、', ';', '；', ':', '：'];

/// Lowercased request tokens with stop words removed.
///
/// ASCII stop words drop whole tokens; other stop words are cut out wherever
/// they occur, since CJK requests carry no word boundaries.
pub fn extract_keywords(message: &str, stop_words: &[String]) -> Vec<String> {
    let mut text = message.to_lowercase();
    for word in stop_words.iter().filter(|w| !w.is_ascii() && !w.is_empty()) {
        text = text.replace(word.as_str(), " ");
    }
    text.split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|token| !token.is_empty())
        .filter(|token| {
            !stop_words
                .iter()
                .any(|word| word.is_ascii() && word.eq_ignore_ascii_case(token))
        })
        .map(str::to_string)
        .collect()
}

/// Number of keywords contained in the element's searchable text.
pub fn keyword_hits(element: &PageElement, keywords: &[String]) -> usize {
    if keywords.is_empty() {
        return 0;
    }
    let haystack = element.searchable_text();
    keywords.iter().filter(|k| haystack.contains(k.as_str())).count()
}

pub fn viewport_class(
    element: &PageElement,
    viewport_width: f64,
    viewport_height: f64,
    margin: f64,
) -> ViewportClass {
    if element.visible {
        return ViewportClass::Visible;
    }
    let near = Rect::new(
        -margin,
        -margin,
        viewport_width + margin * 2.0,
        viewport_height + margin * 2.0,
    );
    let rect = element.rect;
    let overlaps = rect.right() > near.x
        && rect.x < near.right()
        && rect.bottom() > near.y
        && rect.y < near.bottom();
    if overlaps {
        ViewportClass::Near
    } else {
        ViewportClass::Hidden
    }
}

fn category_weight(policy: &FilterPolicy, category: ElementCategory) -> i32 {
    let p = &policy.priorities;
    match category {
        ElementCategory::Form => p.form,
        ElementCategory::Button => p.button,
        ElementCategory::Tab => p.tab,
        ElementCategory::Menu => p.menu,
        ElementCategory::List => p.list,
        ElementCategory::Link => p.link,
        ElementCategory::Text => p.text,
    }
}

fn viewport_weight(policy: &FilterPolicy, class: ViewportClass) -> i32 {
    match class {
        ViewportClass::Visible => policy.viewport.visible,
        ViewportClass::Near => policy.viewport.near,
        ViewportClass::Hidden => policy.viewport.hidden,
    }
}

/// Score every collected element against `message`, in collection order.
pub fn score_elements(
    doc: &Document,
    collected: &[CollectedElement],
    message: &str,
    policy: &AgentPolicy,
) -> Vec<ScoredElement> {
    let filter = &policy.filter;
    let keywords = extract_keywords(message, &filter.stop_words);
    let window = doc.window();
    collected
        .iter()
        .map(|entry| {
            let category = rules::category(doc, entry.node);
            let viewport = viewport_class(
                &entry.element,
                window.viewport_width,
                window.viewport_height,
                policy.collection.near_viewport_margin,
            );
            let hits = keyword_hits(&entry.element, &keywords) as i32;
            let mut score = hits * filter.keyword_weight
                + category_weight(filter, category)
                + viewport_weight(filter, viewport);
            if entry.element.disabled {
                score -= filter.disabled_penalty;
            }
            ScoredElement {
                node: entry.node,
                element: entry.element.clone(),
                category,
                viewport,
                score,
            }
        })
        .collect()
}

/// Descending by score, ties in collection order, truncated to `max`.
pub fn rank(mut scored: Vec<ScoredElement>, max: usize) -> Vec<ScoredElement> {
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(max);
    scored
}
