use pagepilot_core_types::InsertPosition;
use pagepilot_dom_adapter::{Document, DomError};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Checkout &amp; Pay</title><style>.x { color: red }</style></head>
<body>
  <form id="checkout" style="left:20px; top:200px; width:600px; height:300px">
    <label for="email">Email</label>
    <input id="email" name="email" placeholder="Email" style="left:120px; top:210px">
    <select name="country">
      <option value="us">United States
      <option value="uk" selected>United Kingdom
    </select>
    <fieldset disabled><input name="locked"></fieldset>
  </form>
  <div hidden><button id="ghost">Ghost</button></div>
</body>
</html>"#;

#[test]
fn parses_a_realistic_page() {
    let doc = Document::parse(PAGE).unwrap();
    assert_eq!(doc.title(), "Checkout & Pay");

    let email = doc.get_element_by_id("email").unwrap();
    assert_eq!(doc.attr(email, "placeholder"), Some("Email"));
    let rect = doc.page_rect(email);
    assert_eq!((rect.x, rect.y), (120.0, 210.0));

    let select = doc.query_selector("select[name=country]").unwrap().unwrap();
    assert_eq!(doc.select_options(select).len(), 2);
    assert_eq!(doc.value(select), "uk");

    let locked = doc.query_selector("input[name=locked]").unwrap().unwrap();
    assert!(doc.is_disabled(locked));
    assert!(doc.matches(locked, "input:disabled").unwrap());

    let ghost = doc.get_element_by_id("ghost").unwrap();
    assert!(!doc.is_rendered(ghost));
    assert!(doc.page_rect(ghost).is_empty());
}

#[test]
fn label_lookup_through_selectors() {
    let doc = Document::parse(PAGE).unwrap();
    let label = doc.query_selector(r#"label[for="email"]"#).unwrap().unwrap();
    assert_eq!(doc.normalized_text(label), "Email");
    let form = doc.closest(label, "form").unwrap();
    assert_eq!(form, doc.get_element_by_id("checkout"));
}

#[test]
fn adjacent_html_and_serialization() {
    let mut doc = Document::parse("<ul id=list><li>one</li></ul>").unwrap();
    let list = doc.get_element_by_id("list").unwrap();
    doc.insert_adjacent_html(list, InsertPosition::BeforeEnd, "<li>two</li>")
        .unwrap();
    doc.insert_adjacent_html(list, InsertPosition::AfterBegin, "<li>zero</li>")
        .unwrap();
    assert_eq!(
        doc.inner_html(list),
        "<li>zero</li><li>one</li><li>two</li>"
    );
}

#[test]
fn invalid_selector_is_a_typed_error() {
    let doc = Document::parse("<p>x</p>").unwrap();
    assert!(matches!(
        doc.query_selector("p[").unwrap_err(),
        DomError::InvalidSelector(_)
    ));
}

#[test]
fn window_state_survives_dom_mutation() {
    let mut doc = Document::parse("<p id=a>text</p>").unwrap();
    doc.window_mut().storage_set("k", "v");
    doc.window_mut().navigate("https://example.com/").unwrap();
    let p = doc.get_element_by_id("a").unwrap();
    doc.remove(p).unwrap();
    assert_eq!(doc.window().storage_get("k"), Some("v"));
    assert_eq!(doc.window().location().host_str(), Some("example.com"));
}
