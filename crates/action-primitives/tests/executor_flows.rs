use std::sync::Arc;

use pagepilot_action_primitives::{ActionExecutor, DefaultActionExecutor, MemoryClipboard};
use pagepilot_core_types::{ErrorCode, PageAction};
use pagepilot_dom_adapter::Document;
use pagepilot_perceiver_structural::ElementRegistry;
use pagepilot_policy_center::{default_policy, AgentPolicy};
use parking_lot::Mutex;
use serde_json::{json, Value};

const FORM: &str = r#"
<form id="signup">
  <input id="email" name="email" placeholder="Email">
  <input id="pw" type="password">
  <select id="country">
    <option value="us">United States</option>
    <option value="uk">United Kingdom</option>
  </select>
  <input id="agree" type="checkbox">
  <input id="avatar" type="file">
  <p id="intro">Hello brave world</p>
</form>
"#;

fn executor_with(html: &str, policy: &AgentPolicy) -> (DefaultActionExecutor, Arc<Mutex<Document>>) {
    let doc = Arc::new(Mutex::new(Document::parse(html).expect("parse page")));
    let exec = DefaultActionExecutor::new(Arc::clone(&doc), Arc::new(ElementRegistry::new()), policy);
    (exec, doc)
}

fn executor(html: &str) -> (DefaultActionExecutor, Arc<Mutex<Document>>) {
    executor_with(html, &default_policy())
}

fn action(value: Value) -> PageAction {
    serde_json::from_value(value).expect("valid action")
}

#[tokio::test]
async fn fill_then_read_back_value_and_property() {
    let (exec, doc) = executor(FORM);

    let filled = exec
        .execute_action(&action(json!({
            "action": "fill",
            "target": { "selector": "#email" },
            "params": { "value": "ada@example.com" }
        })))
        .await;
    assert!(filled.success, "{}", filled.message);

    let read = exec
        .execute_action(&action(json!({ "action": "read", "target": { "selector": "#email" } })))
        .await;
    assert_eq!(read.data_str(), Some("ada@example.com"));

    let property = exec
        .execute_action(&action(json!({
            "action": "getProperty",
            "target": { "selector": "#email" },
            "params": { "property": "value" }
        })))
        .await;
    assert_eq!(property.data, Some(json!("ada@example.com")));

    let doc = doc.lock();
    let email = doc.get_element_by_id("email").expect("email input");
    let events = doc.event_kinds_for(email);
    assert!(events.contains(&"input".to_string()));
    assert!(events.contains(&"change".to_string()));
}

#[tokio::test]
async fn fill_hides_password_and_requires_value() {
    let (exec, _doc) = executor(FORM);

    let filled = exec
        .execute_action(&action(json!({
            "action": "fill",
            "target": { "selector": "#pw" },
            "params": { "value": "hunter2" }
        })))
        .await;
    assert!(filled.success);
    assert!(!filled.message.contains("hunter2"));

    let missing = exec
        .execute_action(&action(json!({ "action": "fill", "target": { "selector": "#email" } })))
        .await;
    assert_eq!(missing.error, Some(ErrorCode::NoValue));

    let wrong_kind = exec
        .execute_action(&action(json!({
            "action": "fill",
            "target": { "selector": "#intro" },
            "params": { "value": "x" }
        })))
        .await;
    assert_eq!(wrong_kind.error, Some(ErrorCode::InvalidElement));
}

#[tokio::test]
async fn select_matches_value_then_label() {
    let (exec, _doc) = executor(FORM);
    let select = |value: &str| {
        action(json!({
            "action": "select",
            "target": { "selector": "#country" },
            "params": { "value": value }
        }))
    };

    let exact = exec.execute_action(&select("uk")).await;
    assert_eq!(exact.data, Some(json!({ "value": "uk", "text": "United Kingdom" })));

    let fuzzy = exec.execute_action(&select("kingdom")).await;
    assert!(fuzzy.success);
    assert_eq!(fuzzy.data.as_ref().and_then(|d| d.get("value")), Some(&json!("uk")));

    let missing = exec.execute_action(&select("zz")).await;
    assert_eq!(missing.error, Some(ErrorCode::OptionNotFound));

    let not_a_dropdown = exec
        .execute_action(&action(json!({
            "action": "select",
            "target": { "selector": "#email" },
            "params": { "value": "uk" }
        })))
        .await;
    assert_eq!(not_a_dropdown.error, Some(ErrorCode::InvalidElement));
}

#[tokio::test(start_paused = true)]
async fn batch_runs_every_action_in_order() {
    let (exec, doc) = executor(FORM);
    let actions = vec![
        action(json!({ "action": "click", "target": { "selector": "#agree" } })),
        action(json!({ "action": "select", "target": { "selector": "#country" } })),
        action(json!({ "action": "read", "target": { "selector": "#intro" } })),
    ];

    let batch = exec.execute_batch(&actions).await;
    assert!(!batch.success);
    assert_eq!(batch.results.len(), 3);
    assert!(batch.results[0].success);
    assert_eq!(batch.results[1].error, Some(ErrorCode::NoValue));
    assert_eq!(batch.results[2].data_str(), Some("Hello brave world"));
    assert_eq!(batch.summary, "executed 3 actions: 2 succeeded, 1 failed");

    let doc = doc.lock();
    let agree = doc.get_element_by_id("agree").expect("checkbox");
    assert!(doc.is_checked(agree));
}

#[tokio::test]
async fn unknown_action_is_unsupported() {
    let (exec, _doc) = executor(FORM);
    let result = exec
        .execute_action(&action(json!({ "action": "teleport", "target": { "selector": "#email" } })))
        .await;
    assert!(!result.success);
    assert_eq!(result.error, Some(ErrorCode::UnsupportedAction));
}

#[tokio::test]
async fn missing_element_reports_not_found() {
    let (exec, _doc) = executor(FORM);
    let result = exec
        .execute_action(&action(json!({ "action": "click", "target": { "selector": "#nope" } })))
        .await;
    assert_eq!(result.error, Some(ErrorCode::ElementNotFound));
}

#[tokio::test]
async fn highlighted_selection_is_wrapped_and_cleared() {
    let (exec, doc) = executor(FORM);

    let selected = exec
        .execute_action(&action(json!({
            "action": "selectText",
            "target": { "selector": "#intro" },
            "params": { "searchText": "brave" }
        })))
        .await;
    assert_eq!(selected.data_str(), Some("brave"));

    let highlighted = exec.execute_action(&action(json!({ "action": "highlight" }))).await;
    assert_eq!(highlighted.data_str(), Some("brave"));
    {
        let doc = doc.lock();
        let span = doc
            .query_selector("#intro span.ai-highlight")
            .expect("valid selector")
            .expect("highlight span");
        assert_eq!(doc.text_content(span), "brave");
    }

    assert_eq!(exec.clear_all_styles(), 1);
    let doc = doc.lock();
    assert!(doc.query_selector("span.ai-highlight").expect("valid selector").is_none());
    let intro = doc.get_element_by_id("intro").expect("intro");
    assert_eq!(doc.text_content(intro), "Hello brave world");
}

#[tokio::test]
async fn annotation_without_selection_or_target_fails() {
    let (exec, _doc) = executor(FORM);
    let result = exec.execute_action(&action(json!({ "action": "underline" }))).await;
    assert_eq!(result.error, Some(ErrorCode::NoTarget));
}

#[tokio::test(start_paused = true)]
async fn wait_for_missing_element_times_out() {
    let (exec, _doc) = executor(FORM);

    let timed_out = exec
        .execute_action(&action(json!({
            "action": "wait",
            "target": { "selector": "#later" },
            "params": { "condition": "exists", "timeout": 300 }
        })))
        .await;
    assert_eq!(timed_out.error, Some(ErrorCode::Timeout));

    let visible = exec
        .execute_action(&action(json!({ "action": "wait", "target": { "selector": "#email" } })))
        .await;
    assert!(visible.success, "{}", visible.message);
}

#[tokio::test(start_paused = true)]
async fn drag_moves_pointer_to_destination() {
    let (exec, doc) = executor(
        r#"<div id="src" style="left:0px;top:0px;width:50px;height:50px">card</div>
           <div id="dst" style="left:200px;top:100px;width:50px;height:50px">lane</div>"#,
    );

    let result = exec
        .execute_action(&action(json!({
            "action": "drag",
            "target": { "selector": "#src" },
            "params": { "destination": { "selector": "#dst" } }
        })))
        .await;
    assert!(result.success, "{}", result.message);
    assert_eq!(result.data, Some(json!({ "x": 225.0, "y": 125.0 })));

    let doc = doc.lock();
    let src = doc.get_element_by_id("src").expect("source");
    let dst = doc.get_element_by_id("dst").expect("destination");
    let source_events = doc.event_kinds_for(src);
    assert_eq!(source_events.first().map(String::as_str), Some("mousedown"));
    assert_eq!(source_events.iter().filter(|k| *k == "mousemove").count(), 10);
    assert_eq!(doc.event_kinds_for(dst), vec!["mouseup", "drop"]);
}

#[tokio::test]
async fn drag_errors_are_specific() {
    let (exec, _doc) = executor(FORM);

    let no_destination = exec
        .execute_action(&action(json!({ "action": "drag", "target": { "selector": "#intro" } })))
        .await;
    assert_eq!(no_destination.error, Some(ErrorCode::NoDestination));

    let bad_destination = exec
        .execute_action(&action(json!({
            "action": "drag",
            "target": { "selector": "#intro" },
            "params": { "destination": { "selector": "#void" } }
        })))
        .await;
    assert_eq!(bad_destination.error, Some(ErrorCode::DestinationNotFound));

    let bad_source = exec
        .execute_action(&action(json!({
            "action": "drag",
            "target": { "selector": "#ghost" },
            "params": { "destination": { "selector": "#intro" } }
        })))
        .await;
    assert_eq!(bad_source.error, Some(ErrorCode::SourceNotFound));
}

#[tokio::test]
async fn upload_decodes_base64_payloads() {
    let (exec, doc) = executor(FORM);

    let result = exec
        .execute_action(&action(json!({
            "action": "upload",
            "target": { "selector": "#avatar" },
            "params": { "files": [{ "name": "hello.txt", "content": "aGVsbG8=" }] }
        })))
        .await;
    assert_eq!(result.data, Some(json!(["hello.txt"])));
    {
        let doc = doc.lock();
        let input = doc.get_element_by_id("avatar").expect("file input");
        let files = doc.files(input);
        assert_eq!(files[0].bytes, b"hello".to_vec());
        assert_eq!(files[0].mime_type, "application/octet-stream");
    }

    let broken = exec
        .execute_action(&action(json!({
            "action": "upload",
            "target": { "selector": "#avatar" },
            "params": { "files": [{ "name": "x.bin", "content": "***" }] }
        })))
        .await;
    assert_eq!(broken.error, Some(ErrorCode::UploadError));

    let none = exec
        .execute_action(&action(json!({ "action": "upload", "target": { "selector": "#avatar" } })))
        .await;
    assert_eq!(none.error, Some(ErrorCode::NoFiles));
}

#[tokio::test]
async fn evaluate_respects_policy_switch() {
    let (exec, _doc) = executor("<title>Docs</title><p>x</p>");
    let title = exec
        .execute_action(&action(json!({
            "action": "evaluate",
            "params": { "script": "return document.title" }
        })))
        .await;
    assert_eq!(title.data_str(), Some("Docs"));

    let mut policy = default_policy();
    policy.executor.allow_evaluate = false;
    let (locked, _doc) = executor_with("<title>Docs</title>", &policy);
    let refused = locked
        .execute_action(&action(json!({
            "action": "evaluate",
            "params": { "script": "return document.title" }
        })))
        .await;
    assert_eq!(refused.error, Some(ErrorCode::ScriptError));
}

#[tokio::test]
async fn list_items_can_be_added_removed_and_edited() {
    let (exec, doc) = executor(r#"<ul id="todo"><li>one</li><li>two</li></ul>"#);

    let added = exec
        .execute_action(&action(json!({
            "action": "addListItem",
            "params": { "listSelector": "#todo", "itemContent": "zero", "position": "first" }
        })))
        .await;
    assert_eq!(added.data, Some(json!(0)));

    let removed = exec
        .execute_action(&action(json!({
            "action": "removeListItem",
            "params": { "listSelector": "#todo", "itemIndex": 2 }
        })))
        .await;
    assert_eq!(removed.data_str(), Some("two"));

    let edited = exec
        .execute_action(&action(json!({
            "action": "editListItem",
            "target": { "selector": "#todo li" },
            "params": { "itemContent": "ZERO" }
        })))
        .await;
    assert!(edited.success, "{}", edited.message);

    let doc = doc.lock();
    let list = doc.get_element_by_id("todo").expect("list");
    let texts: Vec<String> = doc
        .element_children(list)
        .into_iter()
        .map(|li| doc.text_content(li))
        .collect();
    assert_eq!(texts, vec!["ZERO", "one"]);
}

#[tokio::test]
async fn storage_cookies_and_navigation_update_the_window() {
    let (exec, doc) = executor(FORM);
    let run = |value: Value| {
        let exec = &exec;
        async move { exec.execute_action(&action(value)).await }
    };

    assert!(run(json!({ "action": "setLocalStorage", "params": { "key": "theme", "value": "dark" } })).await.success);
    let stored = run(json!({ "action": "getLocalStorage", "params": { "key": "theme" } })).await;
    assert_eq!(stored.data_str(), Some("dark"));

    assert!(run(json!({ "action": "setCookie", "params": { "name": "sid", "value": "abc" } })).await.success);
    let cookie = run(json!({ "action": "getCookie", "params": { "name": "sid" } })).await;
    assert_eq!(cookie.data_str(), Some("abc"));
    let cleared = run(json!({ "action": "clearCookies" })).await;
    assert_eq!(cleared.data, Some(json!(1)));

    let missing_key = run(json!({ "action": "setLocalStorage", "params": { "value": "x" } })).await;
    assert_eq!(missing_key.error, Some(ErrorCode::NoKey));

    let navigated = run(json!({ "action": "navigate", "params": { "url": "https://example.com/a" } })).await;
    assert_eq!(navigated.data, Some(json!({ "url": "https://example.com/a" })));
    let no_url = run(json!({ "action": "navigate" })).await;
    assert_eq!(no_url.error, Some(ErrorCode::NoUrl));

    let doc = doc.lock();
    assert_eq!(doc.window().storage_get("theme"), Some("dark"));
    assert_eq!(doc.window().location().as_str(), "https://example.com/a");
}

#[tokio::test]
async fn paste_appends_clipboard_text_to_focused_input() {
    let (exec, doc) = executor(FORM);
    let exec = exec.with_clipboard(Arc::new(MemoryClipboard::with_text(" world")));

    exec.execute_action(&action(json!({
        "action": "fill",
        "target": { "selector": "#email" },
        "params": { "value": "hello" }
    })))
    .await;
    let pasted = exec.execute_action(&action(json!({ "action": "pasteFromClipboard" }))).await;
    assert_eq!(pasted.data_str(), Some(" world"));

    let doc = doc.lock();
    let email = doc.get_element_by_id("email").expect("email input");
    assert_eq!(doc.value(email), "hello world");
}

#[tokio::test]
async fn insert_html_and_content_edits() {
    let (exec, doc) = executor(r#"<div id="box"><p>first</p></div><p id="note">note</p>"#);

    let inserted = exec
        .execute_action(&action(json!({
            "action": "insertHTML",
            "target": { "selector": "#box" },
            "params": { "html": "<p>second</p><p>third</p>" }
        })))
        .await;
    assert_eq!(inserted.data, Some(json!(2)));

    exec.execute_action(&action(json!({
        "action": "appendContent",
        "target": { "selector": "#note" },
        "params": { "content": "!" }
    })))
    .await;
    exec.execute_action(&action(json!({
        "action": "prependContent",
        "target": { "selector": "#note" },
        "params": { "content": "> " }
    })))
    .await;

    let no_html = exec
        .execute_action(&action(json!({ "action": "insertHTML", "target": { "selector": "#box" } })))
        .await;
    assert_eq!(no_html.error, Some(ErrorCode::NoHtml));

    let doc = doc.lock();
    let boxed = doc.get_element_by_id("box").expect("box");
    assert_eq!(doc.element_children(boxed).len(), 3);
    let note = doc.get_element_by_id("note").expect("note");
    assert_eq!(doc.text_content(note), "> note!");
}

#[tokio::test]
async fn stale_id_is_not_redirected_to_a_similar_button() {
    let doc = Arc::new(Mutex::new(
        Document::parse(r#"<div id="app"><button>Save</button><button>Save draft</button></div>"#)
            .expect("parse page"),
    ));
    let registry = Arc::new(ElementRegistry::new());
    let policy = default_policy();
    let exec = DefaultActionExecutor::new(Arc::clone(&doc), Arc::clone(&registry), &policy);

    let save_id = {
        let mut page = doc.lock();
        let save = page.query_selector("button").expect("selector").expect("save button");
        let id = registry
            .collect(&page, &policy.collection)
            .into_iter()
            .find(|c| c.node == save)
            .expect("save collected")
            .element
            .id;
        let app = page.get_element_by_id("app").expect("app");
        page.set_inner_html(app, "<button>Save draft</button>").expect("re-render");
        id
    };

    let result = exec
        .execute_action(&action(json!({
            "action": "click",
            "target": { "elementId": save_id.as_str() }
        })))
        .await;
    assert!(!result.success, "{}", result.message);
    assert_eq!(result.error, Some(ErrorCode::ElementNotFound));

    let page = doc.lock();
    assert!(page
        .events()
        .iter()
        .all(|event| event.kind != "click"));
}
