//! Collection, ranking and follow-up requests against realistic pages.

use std::sync::Arc;

use pagepilot_core_types::{ElementTypeFilter, MoreElementsRequest, Region};
use pagepilot_dom_adapter::Document;
use pagepilot_perceiver_structural::{
    rank, score_elements, ContextAssembler, ElementRegistry, RegistryError, StructuralPerceiver,
};
use pagepilot_policy_center::default_policy;

const CHECKOUT: &str = r#"
<html><head><title>Checkout</title></head><body>
  <header><a href="/" style="left:10px;top:10px">Home</a>
    <button style="left:600px;top:20px">Cart</button></header>
  <main style="top:200px">
    <h2>Shipping</h2>
    <form id="ship">
      <label for="name">Full name</label><input id="name" name="name" style="top:240px">
      <label for="mail">E-mail</label><input id="mail" type="email" name="email" style="top:280px">
      <input type="password" name="pw" value="hunter2" style="top:320px">
      <select name="country" style="top:360px"><option value="us">United States</option></select>
      <button type="submit" style="top:400px">Place order</button>
    </form>
  </main>
  <footer style="top:2000px"><a href="/terms">Terms</a></footer>
</body></html>"#;

fn assembler() -> ContextAssembler {
    ContextAssembler::new(Arc::new(ElementRegistry::new()))
}

#[test]
fn one_visible_input_and_one_hidden_button() {
    let doc = Document::parse(
        r#"<input placeholder="Email"><button style="display:none">Send</button>"#,
    )
    .unwrap();
    let registry = ElementRegistry::new();
    let collected = registry.collect(&doc, &default_policy().collection);
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].element.tag, "input");
    assert_eq!(collected[0].element.placeholder.as_deref(), Some("Email"));
}

#[test]
fn header_region_only_returns_top_button() {
    let doc = Document::parse(
        r#"<button id="a" style="top:50px">Top</button><button id="b" style="top:400px">Lower</button>"#,
    )
    .unwrap();
    let policy = default_policy();
    assert_eq!(doc.window().viewport_height, 800.0);
    let request = MoreElementsRequest {
        region: Some(Region::Header),
        ..MoreElementsRequest::default()
    };
    let elements = assembler().more_elements(&doc, &request, &policy);
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].desc, "button:Top");
}

#[test]
fn password_values_never_leave_the_page() {
    let doc = Document::parse(CHECKOUT).unwrap();
    let collected = ElementRegistry::new().collect(&doc, &default_policy().collection);
    let password = collected
        .iter()
        .find(|c| c.element.input_type.as_deref() == Some("password"))
        .expect("password field collected");
    assert!(password.element.value.is_none());
    let json = serde_json::to_string(&password.element).unwrap();
    assert!(!json.contains("hunter2"));
}

#[test]
fn page_context_ranks_form_fields_for_a_form_request() {
    let doc = Document::parse(CHECKOUT).unwrap();
    let policy = default_policy();
    let context = assembler().page_context(&doc, "fill my e-mail", &policy);
    assert_eq!(context.title, "Checkout");
    assert_eq!(context.url, "about:blank");
    // links, buttons, form controls and the two `label[for]` elements
    assert_eq!(context.total_elements, 10);
    assert_eq!(context.elements.len(), 10);
    assert!(context.elements[0].desc.starts_with("email input:E-mail"));
    let ctx = context.elements[0].ctx.as_ref().expect("context");
    assert_eq!(ctx.section.as_deref(), Some("Shipping"));
    assert!(context.selected_text.is_none());
}

#[test]
fn filter_scores_never_increase() {
    let doc = Document::parse(CHECKOUT).unwrap();
    let policy = default_policy();
    let collected = ElementRegistry::new().collect(&doc, &policy.collection);
    for message in ["", "place order", "home terms", "请帮我选择国家"] {
        let ranked = rank(score_elements(&doc, &collected, message, &policy), 5);
        assert!(ranked.len() <= 5);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score), "{message}");
    }
}

#[test]
fn more_elements_invalidates_previous_ids() {
    let doc = Document::parse(CHECKOUT).unwrap();
    let policy = default_policy();
    let assembler = assembler();
    let first = assembler.page_context(&doc, "", &policy);
    let request = MoreElementsRequest {
        element_type: Some(ElementTypeFilter::Select),
        ..MoreElementsRequest::default()
    };
    let more = assembler.more_elements(&doc, &request, &policy);
    assert_eq!(more.len(), 1);
    assert!(more[0].desc.starts_with("dropdown:"));
    for element in &first.elements {
        assert!(matches!(
            assembler.registry().resolve(&doc, &element.id),
            Err(RegistryError::NotFound(_))
        ));
    }
    assert!(assembler.registry().resolve(&doc, &more[0].id).is_ok());
}

#[test]
fn keyword_requests_filter_without_scoring() {
    let doc = Document::parse(CHECKOUT).unwrap();
    let request = MoreElementsRequest {
        keyword: Some("ORDER".into()),
        ..MoreElementsRequest::default()
    };
    let more = assembler().more_elements(&doc, &request, &default_policy());
    assert_eq!(more.len(), 1);
    assert_eq!(more[0].desc, "button:Place order");
}
