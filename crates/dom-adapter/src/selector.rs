//! CSS selector parsing and matching.
//!
//! Supported: type, universal, `#id`, `.class`, attribute conditions
//! (`[a]`, `=`, `^=`, `$=`, `*=`, `~=`, `|=`, optional `i` flag), the four
//! combinators, selector groups and the pseudo-classes `:not()`, `:has()`,
//! `:first-child`, `:last-child`, `:nth-child()`, `:checked`, `:disabled`,
//! `:enabled`, `:empty` and `:focus`. Matching walks right-to-left.

use crate::document::Document;
use crate::errors::{DomError, DomResult};
use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    groups: Vec<Vec<SelectorPart>>,
}

#[derive(Debug, Clone, PartialEq)]
struct SelectorPart {
    step: CompoundSelector,
    /// Relation to the part on the left.
    combinator: Option<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    Adjacent,
    General,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CompoundSelector {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudo: Vec<PseudoClass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Eq,
    StartsWith,
    EndsWith,
    Contains,
    Includes,
    DashMatch,
}

#[derive(Debug, Clone, PartialEq)]
enum AttrCondition {
    Exists {
        key: String,
    },
    Match {
        key: String,
        op: AttrOp,
        value: String,
        case_insensitive: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nth {
    Odd,
    Even,
    AnPlusB(i64, i64),
}

impl Nth {
    fn matches(&self, position: usize) -> bool {
        let pos = position as i64;
        match *self {
            Nth::Odd => pos % 2 == 1,
            Nth::Even => pos % 2 == 0,
            Nth::AnPlusB(0, b) => pos == b,
            Nth::AnPlusB(a, b) => {
                let diff = pos - b;
                diff % a == 0 && diff / a >= 0
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PseudoClass {
    FirstChild,
    LastChild,
    NthChild(Nth),
    Checked,
    Disabled,
    Enabled,
    Empty,
    Focus,
    Not(SelectorList),
    Has(SelectorList),
}

impl SelectorList {
    pub fn parse(selector: &str) -> DomResult<SelectorList> {
        let groups = split_top_level(selector, |c| c == ',')
            .ok_or_else(|| invalid(selector))?
            .into_iter()
            .map(|group| parse_chain(&group, selector))
            .collect::<DomResult<Vec<_>>>()?;
        if groups.is_empty() {
            return Err(invalid(selector));
        }
        Ok(SelectorList { groups })
    }
}

fn invalid(selector: &str) -> DomError {
    DomError::InvalidSelector(selector.to_string())
}

/// Split on `is_sep` outside brackets, parentheses and quotes. Returns `None`
/// on unbalanced input or empty segments.
fn split_top_level(src: &str, is_sep: impl Fn(char) -> bool) -> Option<Vec<String>> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut brackets = 0usize;
    let mut parens = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = src.chars();
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == '\\' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\\' => {
                current.push(ch);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' | '\'' if brackets > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                brackets += 1;
                current.push(ch);
            }
            ']' => {
                brackets = brackets.checked_sub(1)?;
                current.push(ch);
            }
            '(' => {
                parens += 1;
                current.push(ch);
            }
            ')' => {
                parens = parens.checked_sub(1)?;
                current.push(ch);
            }
            c if brackets == 0 && parens == 0 && is_sep(c) => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return None;
                }
                out.push(trimmed.to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if brackets != 0 || parens != 0 || quote.is_some() {
        return None;
    }
    let trimmed = current.trim();
    if trimmed.is_empty() {
        return None;
    }
    out.push(trimmed.to_string());
    Some(out)
}

/// Break a complex selector into compound tokens and combinator tokens.
fn tokenize(selector: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut brackets = 0usize;
    let mut parens = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = selector.chars();
    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.trim().is_empty() {
            tokens.push(current.trim().to_string());
        }
        current.clear();
    };
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == '\\' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\\' => {
                current.push(ch);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' | '\'' if brackets > 0 || parens > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                brackets += 1;
                current.push(ch);
            }
            ']' => {
                brackets = brackets.checked_sub(1)?;
                current.push(ch);
            }
            '(' => {
                parens += 1;
                current.push(ch);
            }
            ')' => {
                parens = parens.checked_sub(1)?;
                current.push(ch);
            }
            '>' | '+' | '~' if brackets == 0 && parens == 0 => {
                flush(&mut current, &mut tokens);
                tokens.push(ch.to_string());
            }
            c if c.is_whitespace() && brackets == 0 && parens == 0 => {
                flush(&mut current, &mut tokens);
            }
            _ => current.push(ch),
        }
    }
    if brackets != 0 || parens != 0 {
        return None;
    }
    flush(&mut current, &mut tokens);
    Some(tokens)
}

fn parse_chain(group: &str, original: &str) -> DomResult<Vec<SelectorPart>> {
    let tokens = tokenize(group).ok_or_else(|| invalid(original))?;
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending: Option<Combinator> = None;
    for token in tokens {
        let combinator = match token.as_str() {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::Adjacent),
            "~" => Some(Combinator::General),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending.is_some() || parts.is_empty() {
                return Err(invalid(original));
            }
            pending = Some(combinator);
            continue;
        }
        let step = parse_compound(&token).ok_or_else(|| invalid(original))?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart { step, combinator });
    }
    if parts.is_empty() || pending.is_some() {
        return Err(invalid(original));
    }
    Ok(parts)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// Read an identifier with backslash escapes starting at `chars[*i]`.
fn read_ident(chars: &[char], i: &mut usize) -> Option<String> {
    let mut out = String::new();
    while *i < chars.len() {
        let ch = chars[*i];
        if ch == '\\' {
            let escaped = *chars.get(*i + 1)?;
            out.push(escaped);
            *i += 2;
        } else if is_ident_char(ch) {
            out.push(ch);
            *i += 1;
        } else {
            break;
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn parse_compound(token: &str) -> Option<CompoundSelector> {
    let chars: Vec<char> = token.chars().collect();
    let mut step = CompoundSelector::default();
    let mut i = 0usize;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                if step.universal || step.tag.is_some() {
                    return None;
                }
                step.universal = true;
                i += 1;
            }
            '#' => {
                i += 1;
                let id = read_ident(&chars, &mut i)?;
                if step.id.replace(id).is_some() {
                    return None;
                }
            }
            '.' => {
                i += 1;
                step.classes.push(read_ident(&chars, &mut i)?);
            }
            '[' => {
                let (condition, next) = parse_attr_condition(&chars, i)?;
                step.attrs.push(condition);
                i = next;
            }
            ':' => {
                let (pseudo, next) = parse_pseudo(&chars, i)?;
                step.pseudo.push(pseudo);
                i = next;
            }
            _ => {
                if i != 0 {
                    return None;
                }
                step.tag = Some(read_ident(&chars, &mut i)?.to_ascii_lowercase());
            }
        }
    }
    Some(step)
}

fn parse_attr_condition(chars: &[char], open: usize) -> Option<(AttrCondition, usize)> {
    let close = find_closing(chars, open, '[', ']')?;
    let inner: String = chars[open + 1..close].iter().collect();
    let inner = inner.trim();
    let op_pos = inner.find(|c: char| matches!(c, '=' | '^' | '$' | '*' | '~' | '|'));
    let Some(op_pos) = op_pos else {
        let key = inner.to_ascii_lowercase();
        if key.is_empty() || !key.chars().all(|c| is_ident_char(c) || c == ':') {
            return None;
        }
        return Some((AttrCondition::Exists { key }, close + 1));
    };

    let key = inner[..op_pos].trim().to_ascii_lowercase();
    if key.is_empty() {
        return None;
    }
    let rest = &inner[op_pos..];
    let (op, rest) = if let Some(r) = rest.strip_prefix("^=") {
        (AttrOp::StartsWith, r)
    } else if let Some(r) = rest.strip_prefix("$=") {
        (AttrOp::EndsWith, r)
    } else if let Some(r) = rest.strip_prefix("*=") {
        (AttrOp::Contains, r)
    } else if let Some(r) = rest.strip_prefix("~=") {
        (AttrOp::Includes, r)
    } else if let Some(r) = rest.strip_prefix("|=") {
        (AttrOp::DashMatch, r)
    } else if let Some(r) = rest.strip_prefix('=') {
        (AttrOp::Eq, r)
    } else {
        return None;
    };

    let rest = rest.trim();
    let (value, flags) = match rest.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let mut value = String::new();
            let mut iter = rest[1..].char_indices();
            let mut end = None;
            while let Some((idx, ch)) = iter.next() {
                if ch == '\\' {
                    if let Some((_, next)) = iter.next() {
                        value.push(next);
                    }
                } else if ch == q {
                    end = Some(idx + 1 + ch.len_utf8());
                    break;
                } else {
                    value.push(ch);
                }
            }
            (value, rest[end?..].trim())
        }
        _ => {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let value = parts.next().unwrap_or("").replace('\\', "");
            (value, parts.next().unwrap_or("").trim())
        }
    };
    let case_insensitive = match flags {
        "" | "s" | "S" => false,
        "i" | "I" => true,
        _ => return None,
    };
    Some((
        AttrCondition::Match {
            key,
            op,
            value,
            case_insensitive,
        },
        close + 1,
    ))
}

fn find_closing(chars: &[char], open: usize, open_ch: char, close_ch: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = open;
    while i < chars.len() {
        let ch = chars[i];
        if let Some(q) = quote {
            if ch == '\\' {
                i += 2;
                continue;
            }
            if ch == q {
                quote = None;
            }
        } else if ch == '"' || ch == '\'' {
            quote = Some(ch);
        } else if ch == open_ch {
            depth += 1;
        } else if ch == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

fn parse_pseudo(chars: &[char], colon: usize) -> Option<(PseudoClass, usize)> {
    let mut i = colon + 1;
    let name = read_ident(chars, &mut i)?.to_ascii_lowercase();
    let argument = if chars.get(i) == Some(&'(') {
        let close = find_closing(chars, i, '(', ')')?;
        let arg: String = chars[i + 1..close].iter().collect();
        i = close + 1;
        Some(arg)
    } else {
        None
    };
    let pseudo = match (name.as_str(), argument) {
        ("first-child", None) => PseudoClass::FirstChild,
        ("last-child", None) => PseudoClass::LastChild,
        ("checked", None) => PseudoClass::Checked,
        ("disabled", None) => PseudoClass::Disabled,
        ("enabled", None) => PseudoClass::Enabled,
        ("empty", None) => PseudoClass::Empty,
        ("focus", None) => PseudoClass::Focus,
        ("nth-child", Some(arg)) => PseudoClass::NthChild(parse_nth(&arg)?),
        ("not", Some(arg)) => PseudoClass::Not(SelectorList::parse(&arg).ok()?),
        ("has", Some(arg)) => PseudoClass::Has(SelectorList::parse(&arg).ok()?),
        _ => return None,
    };
    Some((pseudo, i))
}

fn parse_nth(raw: &str) -> Option<Nth> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.to_ascii_lowercase();
    match compact.as_str() {
        "odd" => return Some(Nth::Odd),
        "even" => return Some(Nth::Even),
        _ => {}
    }
    if let Ok(exact) = compact.parse::<i64>() {
        return Some(Nth::AnPlusB(0, exact));
    }
    let (a_part, b_part) = compact.split_once('n')?;
    let a = match a_part {
        "" | "+" => 1,
        "-" => -1,
        other => other.parse::<i64>().ok()?,
    };
    let b = if b_part.is_empty() {
        0
    } else {
        b_part.parse::<i64>().ok()?
    };
    Some(Nth::AnPlusB(a, b))
}

impl Document {
    pub fn query_selector(&self, selector: &str) -> DomResult<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub fn query_selector_all(&self, selector: &str) -> DomResult<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self.select_all(self.root(), &list))
    }

    /// Query among the descendants of `scope`.
    pub fn query_selector_from(&self, scope: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        Ok(self
            .query_selector_all_from(scope, selector)?
            .into_iter()
            .next())
    }

    pub fn query_selector_all_from(&self, scope: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self.select_all(scope, &list))
    }

    pub fn select_all(&self, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.matches_list(*n, list))
            .collect()
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> DomResult<bool> {
        let list = SelectorList::parse(selector)?;
        Ok(self.matches_list(node, &list))
    }

    pub fn matches_list(&self, node: NodeId, list: &SelectorList) -> bool {
        self.is_element(node)
            && list
                .groups
                .iter()
                .any(|parts| self.matches_chain(node, parts))
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let mut cursor = Some(node).filter(|n| self.is_element(*n));
        while let Some(current) = cursor {
            if self.matches_list(current, &list) {
                return Ok(Some(current));
            }
            cursor = self.parent_element(current);
        }
        Ok(None)
    }

    fn matches_chain(&self, node: NodeId, parts: &[SelectorPart]) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches_compound(node, &last.step) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        let combinator = last.combinator.unwrap_or(Combinator::Descendant);
        match combinator {
            Combinator::Child => self
                .parent_element(node)
                .is_some_and(|p| self.matches_chain(p, rest)),
            Combinator::Descendant => self
                .ancestors(node)
                .into_iter()
                .any(|a| self.matches_chain(a, rest)),
            Combinator::Adjacent => self
                .previous_element_sibling(node)
                .is_some_and(|s| self.matches_chain(s, rest)),
            Combinator::General => {
                let mut cursor = self.previous_element_sibling(node);
                while let Some(sibling) = cursor {
                    if self.matches_chain(sibling, rest) {
                        return true;
                    }
                    cursor = self.previous_element_sibling(sibling);
                }
                false
            }
        }
    }

    fn matches_compound(&self, node: NodeId, step: &CompoundSelector) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        if let Some(tag) = &step.tag {
            if element.tag() != tag {
                return false;
            }
        }
        if let Some(id) = &step.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !step.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        for condition in &step.attrs {
            let matched = match condition {
                AttrCondition::Exists { key } => element.attr(key).is_some(),
                AttrCondition::Match {
                    key,
                    op,
                    value,
                    case_insensitive,
                } => element
                    .attr(key)
                    .is_some_and(|actual| attr_matches(actual, *op, value, *case_insensitive)),
            };
            if !matched {
                return false;
            }
        }
        step.pseudo.iter().all(|p| self.matches_pseudo(node, p))
    }

    fn matches_pseudo(&self, node: NodeId, pseudo: &PseudoClass) -> bool {
        match pseudo {
            PseudoClass::FirstChild => self.previous_element_sibling(node).is_none(),
            PseudoClass::LastChild => self.next_element_sibling(node).is_none(),
            PseudoClass::NthChild(nth) => {
                let Some(parent) = self.parent(node) else {
                    return false;
                };
                self.element_children(parent)
                    .iter()
                    .position(|c| *c == node)
                    .is_some_and(|idx| nth.matches(idx + 1))
            }
            PseudoClass::Checked => {
                self.is_checked(node)
                    || (self.is_tag(node, "option")
                        && self
                            .ancestors(node)
                            .into_iter()
                            .find(|a| self.is_tag(*a, "select"))
                            .and_then(|s| self.selected_option(s))
                            == Some(node))
            }
            PseudoClass::Disabled => self.is_disabled(node),
            PseudoClass::Enabled => !self.is_disabled(node),
            PseudoClass::Empty => self.children(node).is_empty(),
            PseudoClass::Focus => self.focused() == Some(node),
            PseudoClass::Not(list) => !self.matches_list(node, list),
            PseudoClass::Has(list) => !self.select_all(node, list).is_empty(),
        }
    }
}

fn attr_matches(actual: &str, op: AttrOp, expected: &str, case_insensitive: bool) -> bool {
    let (actual, expected) = if case_insensitive {
        (actual.to_lowercase(), expected.to_lowercase())
    } else {
        (actual.to_string(), expected.to_string())
    };
    match op {
        AttrOp::Eq => actual == expected,
        AttrOp::StartsWith => !expected.is_empty() && actual.starts_with(&expected),
        AttrOp::EndsWith => !expected.is_empty() && actual.ends_with(&expected),
        AttrOp::Contains => !expected.is_empty() && actual.contains(&expected),
        AttrOp::Includes => actual.split_whitespace().any(|t| t == expected),
        AttrOp::DashMatch => actual == expected || actual.starts_with(&format!("{}-", expected)),
    }
}

/// Escape an identifier for use after `#` or `.` in a selector.
pub fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for (idx, ch) in ident.chars().enumerate() {
        let leading_digit = idx == 0 && ch.is_ascii_digit();
        if leading_digit || !is_ident_char(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Quote an attribute value for use inside `[name="..."]`.
pub fn quote_attr_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        Document::parse(
            r#"<div id="app" class="shell main">
                <form id="login">
                  <label for="user">User</label>
                  <input id="user" name="user" type="text" data-testid="user-field">
                  <input type="checkbox" name="remember" checked>
                  <button type="submit" class="btn btn-primary">Sign in</button>
                </form>
                <ul class="nav-tabs"><li class="active">A</li><li>B</li><li>C</li></ul>
                <p lang="en-US">Hello</p>
            </div>"#,
        )
        .unwrap()
    }

    #[test]
    fn matches_compound_and_attribute_operators() {
        let doc = page();
        assert_eq!(doc.query_selector_all("input[type=text]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[data-testid^=user]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[data-testid$=field]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[class*=btn-]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[class~=main]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[lang|=en]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("button.btn.btn-primary").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[type=SUBMIT i]").unwrap().len(), 1);
    }

    #[test]
    fn combinators_walk_the_tree() {
        let doc = page();
        assert_eq!(doc.query_selector_all("form#login > input").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("#app input").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("label + input").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("label ~ button").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all(".nav-tabs > li").unwrap().len(), 3);
    }

    #[test]
    fn groups_are_deduplicated_in_document_order() {
        let doc = page();
        let found = doc.query_selector_all("button, input, #user").unwrap();
        assert_eq!(found.len(), 3);
        assert!(doc.is_tag(found[0], "input"));
        assert!(doc.is_tag(found[2], "button"));
    }

    #[test]
    fn pseudo_classes() {
        let doc = page();
        assert_eq!(doc.query_selector_all("li:first-child").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("li:nth-child(2n+1)").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("li:not(.active)").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("form:has(button)").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("input:checked").unwrap().len(), 1);
        assert_eq!(
            doc.query_selector_all("[tabindex]:not([tabindex=\"-1\"])").unwrap().len(),
            0
        );
    }

    #[test]
    fn closest_includes_self() {
        let doc = page();
        let input = doc.get_element_by_id("user").unwrap();
        let form = doc.closest(input, "form").unwrap().unwrap();
        assert_eq!(doc.attr(form, "id"), Some("login"));
        assert_eq!(doc.closest(input, "input").unwrap(), Some(input));
    }

    #[test]
    fn invalid_selectors_are_errors() {
        let doc = page();
        for bad in ["", "div >", "[unclosed", "a,,b", ":unknown-pseudo", "p:nth-child(x)"] {
            assert!(
                matches!(doc.query_selector_all(bad), Err(DomError::InvalidSelector(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn escaped_identifiers_round_trip() {
        let doc = Document::parse(r#"<div id="a.b:c"></div><div id="1st"></div>"#).unwrap();
        let selector = format!("#{}", escape_ident("a.b:c"));
        assert_eq!(doc.query_selector_all(&selector).unwrap().len(), 1);
        let selector = format!("#{}", escape_ident("1st"));
        assert_eq!(doc.query_selector_all(&selector).unwrap().len(), 1);
        let selector = format!("[title={}]", quote_attr_value("say \"hi\""));
        assert!(SelectorList::parse(&selector).is_ok());
    }
}
