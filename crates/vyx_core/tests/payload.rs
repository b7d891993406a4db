use serde_json::json;
use vyx_core::{parse_body_text, ResultPayload, DEFAULT_FAILURE_MESSAGE};

#[test]
fn text_that_is_json_is_parsed() {
    assert_eq!(
        parse_body_text(r#"{"success":true,"n":1}"#),
        json!({ "success": true, "n": 1 })
    );
}

#[test]
fn plain_text_is_wrapped() {
    assert_eq!(
        parse_body_text("internal error"),
        json!({ "message": "internal error" })
    );
    assert_eq!(parse_body_text(""), json!({ "message": "" }));
}

#[test]
fn success_requires_true_discriminant() {
    let body = json!({ "success": true, "video": { "id": "dQw4w9WgXcQ" } });
    assert_eq!(
        ResultPayload::from_json(body.clone()),
        ResultPayload::Success(body)
    );
}

#[test]
fn explicit_failure_carries_server_message() {
    assert_eq!(
        ResultPayload::from_json(json!({ "success": false, "message": "video is private" })),
        ResultPayload::ApplicationError {
            message: "video is private".into()
        }
    );
    assert_eq!(
        ResultPayload::from_json(json!({ "success": true, "error": true, "message": "no clips" })),
        ResultPayload::ApplicationError {
            message: "no clips".into()
        }
    );
    assert_eq!(
        ResultPayload::from_json(json!({ "success": false, "error": "Internal Proxy Error" })),
        ResultPayload::ApplicationError {
            message: "Internal Proxy Error".into()
        }
    );
}

#[test]
fn unexpected_shapes_fail_closed() {
    for body in [
        json!(null),
        json!([1, 2, 3]),
        json!("done"),
        json!({}),
        json!({ "success": "yes" }),
    ] {
        assert_eq!(
            ResultPayload::from_json(body),
            ResultPayload::ApplicationError {
                message: DEFAULT_FAILURE_MESSAGE.into()
            }
        );
    }
}
