//! End-to-end turns against a page session: perceive, act, perceive again.

use pagepilot::{ExtractKind, PageSession, SessionConfig};
use pagepilot_core_types::{ActionKind, ActionTarget, BatchEntry, ErrorCode, PageAction};
use pagepilot_policy_center::default_policy;

const SHOP: &str = r#"
<html>
  <head>
    <title>Checkout</title>
    <meta name="description" content="Finish your order">
  </head>
  <body>
    <header><nav><a href="/">Home</a> <a href="/cart">Cart</a></nav></header>
    <main>
      <h1>Shipping details</h1>
      <form id="shipping">
        <label for="name">Full name</label>
        <input id="name" name="name">
        <label for="city">City</label>
        <input id="city" name="city">
        <button id="place" type="button">Place order</button>
      </form>
      <table id="items">
        <tr><th>Item</th><th>Qty</th></tr>
        <tr><td>Lamp</td><td>1</td></tr>
      </table>
    </main>
  </body>
</html>
"#;

fn open() -> PageSession {
    let config = SessionConfig::default().with_url("https://shop.example/checkout");
    PageSession::from_html(SHOP, default_policy(), &config).expect("page parses")
}

#[tokio::test]
async fn agent_turn_fills_form_by_element_id() {
    let session = open();
    let context = session.get_page_context("fill in my full name");
    assert_eq!(context.title, "Checkout");
    assert_eq!(context.url, "https://shop.example/checkout");

    let name = context
        .elements
        .iter()
        .find(|e| e.desc.contains("Full name"))
        .expect("name field listed");

    let result = session
        .execute_action(
            &PageAction::new(ActionKind::Fill, ActionTarget::element(name.id.as_str()))
                .with_value("Ada Lovelace"),
        )
        .await;
    assert!(result.success, "{}", result.message);

    let doc = session.document().lock();
    let node = doc
        .query_selector("#name")
        .expect("valid selector")
        .expect("name input");
    assert_eq!(doc.value(node), "Ada Lovelace");
}

#[tokio::test]
async fn batch_reports_each_action() {
    let session = open();
    let actions = vec![
        PageAction::new(ActionKind::Fill, ActionTarget::selector("#city")).with_value("Paris"),
        PageAction::new(ActionKind::Click, ActionTarget::selector("#missing")),
    ];

    let batch = session.execute_batch(&actions).await;
    assert!(!batch.success);
    assert_eq!(batch.results.len(), 2);
    assert!(batch.results[0].success);
    assert_eq!(batch.results[1].error, Some(ErrorCode::ElementNotFound));
}

#[tokio::test]
async fn ids_from_latest_pass_resolve() {
    let session = open();
    session.get_page_context("place order");
    let second = session.get_page_context("place order");
    let button = second
        .elements
        .iter()
        .find(|e| e.desc.contains("Place order"))
        .expect("button listed");

    let result = session
        .execute_action(&PageAction::new(
            ActionKind::Click,
            ActionTarget::element(button.id.as_str()),
        ))
        .await;
    assert!(result.success, "{}", result.message);
}

#[test]
fn extraction_views_serialize() {
    let session = open();

    let tables = session.extract(ExtractKind::Tables).expect("tables");
    assert_eq!(tables[0]["headers"][0], "Item");
    assert_eq!(tables[0]["rows"][0]["Item"], "Lamp");

    let metadata = session.extract(ExtractKind::Metadata).expect("metadata");
    assert_eq!(metadata["title"], "Checkout");
    assert_eq!(metadata["description"], "Finish your order");

    let forms = session.extract(ExtractKind::Forms).expect("forms");
    assert_eq!(forms[0]["id"], "shipping");
}

#[tokio::test]
async fn malformed_entry_fails_in_place() {
    let session = open();
    let entries: Vec<BatchEntry> = serde_json::from_str(
        r##"[
            {"action": "fill", "target": {"selector": "#city"}, "params": {"value": "Paris"}},
            {"action": "scroll", "params": {"direction": "left"}},
            {"action": "click", "target": {"selector": "#place"}}
        ]"##,
    )
    .expect("entries decode one by one");

    let batch = session.execute_entries(&entries).await;
    assert_eq!(batch.results.len(), 3);
    assert!(!batch.success);
    assert!(batch.results[0].success, "{}", batch.results[0].message);
    assert_eq!(batch.results[1].error, Some(ErrorCode::ExecutionError));
    assert!(batch.results[1].message.contains("scroll"));
    assert!(batch.results[2].success, "{}", batch.results[2].message);
}
