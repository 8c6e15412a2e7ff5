// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn accepts_every_closed_protocol_value() {
    for protocol in VALID_PROTOCOLS {
        assert!(validate_protocol(protocol).is_ok());
    }
}

#[test]
fn rejects_an_unknown_protocol_with_the_valid_set_listed() {
    let err = validate_protocol("protein-everything").unwrap_err();
    assert!(err.contains("Invalid protocol"));
    assert!(err.contains("protein-anything"));
}

#[test]
fn submit_request_defaults_num_designs_and_budget_when_omitted() {
    let req: SubmitRequest = serde_json::from_str(
        r#"{"config":"run.yaml","output":"/tmp/out","protocol":"protein-anything"}"#,
    )
    .unwrap();
    assert_eq!(req.num_designs, 10);
    assert_eq!(req.budget, 2);
}

#[test]
fn submit_response_omits_absent_optional_fields() {
    let response = SubmitResponse {
        status: "error".to_string(),
        job_id: None,
        queue_position: None,
        queue_length: None,
        message: String::new(),
        output_dir: None,
        config: None,
        protocol: None,
        num_designs: None,
        budget: None,
        error_message: Some("boom".to_string()),
    };
    let value = serde_json::to_value(&response).unwrap();
    assert!(!value.as_object().unwrap().contains_key("job_id"));
    assert_eq!(value["error_message"], "boom");
}
