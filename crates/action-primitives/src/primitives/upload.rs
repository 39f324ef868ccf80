//! Upload primitive - attach base64 payloads to a file input

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pagepilot_core_types::{ActionResult, ErrorCode, PageAction, UploadFile};
use pagepilot_dom_adapter::{AttachedFile, EventDetail};
use serde_json::json;
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::types::ExecCtx;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Decode a payload given as plain base64 or as a `data:` URL.
fn decode_payload(file: &UploadFile) -> Result<AttachedFile, ActionError> {
    let (data_url_mime, encoded) = match file.content.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest.split_once(',').ok_or_else(|| {
                ActionError::Upload(format!("{}: malformed data URL", file.name))
            })?;
            let mime = header.split(';').next().filter(|m| !m.is_empty());
            (mime.map(str::to_string), body)
        }
        None => (None, file.content.as_str()),
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ActionError::Upload(format!("{}: {}", file.name, e)))?;
    let mime_type = file
        .mime_type
        .clone()
        .filter(|m| !m.is_empty())
        .or(data_url_mime)
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    Ok(AttachedFile {
        name: file.name.clone(),
        mime_type,
        bytes,
    })
}

/// Execute upload primitive
pub fn execute_upload(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let files = action
        .params
        .files
        .as_deref()
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ActionError::missing("files", ErrorCode::NoFiles))?;

    let mut doc = exec.document().lock();
    let input = exec.resolve(&doc, ctx, &action.target)?;
    if doc.input_type(input).as_deref() != Some("file") {
        return Err(ActionError::InvalidElement(format!(
            "<{}> is not a file input",
            doc.tag(input).unwrap_or("?")
        )));
    }
    if files.len() > 1 && !doc.has_attr(input, "multiple") {
        return Err(ActionError::Upload(format!(
            "input accepts one file, got {}",
            files.len()
        )));
    }

    let attached = files
        .iter()
        .map(decode_payload)
        .collect::<Result<Vec<_>, _>>()?;
    let names: Vec<String> = attached.iter().map(|f| f.name.clone()).collect();
    let total_bytes: usize = attached.iter().map(|f| f.bytes.len()).sum();

    doc.set_files(input, attached)?;
    for kind in ["input", "change"] {
        doc.dispatch_with(
            Some(input),
            kind,
            EventDetail::Files {
                names: names.clone(),
            },
        );
    }
    debug!(action_id = %ctx.action_id, files = names.len(), total_bytes, "files attached");
    Ok(ActionResult::ok_with_data(
        format!("uploaded {} file(s)", names.len()),
        json!(names),
    ))
}
