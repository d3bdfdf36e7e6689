use super::*;

fn sample_doc() -> String {
    r#"
workflow:
  name: demo

services:
  - name: burstbuf
    type: SBB
    attributes:
      flavor: gold
      targets: "nid001:nid002"

steps:
  - name: compute
    command: "run-something {{ STEP }}"
    services:
      - name: burstbuf
"#
    .to_string()
}

#[test]
fn validates_a_well_formed_workflow() {
    let validated = validate(&sample_doc(), "demo.yaml").unwrap();
    assert_eq!(validated.description.workflow.name, "demo");
    assert_eq!(validated.description.services.len(), 1);
    assert_eq!(validated.description.steps.len(), 1);
    assert_eq!(validated.description.steps[0].services[0].name, "burstbuf");
}

#[test]
fn rejects_unexpected_top_level_keys() {
    let doc = r#"
workflow:
  name: demo
services: []
steps: []
extra: true
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert!(matches!(err, ValidationError::UnexpectedTopLevelKeys(_)));
}

#[test]
fn rejects_malformed_workflow_header() {
    let doc = r#"
workflow:
  name: demo
  description: nope
services: []
steps: []
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert_eq!(err, ValidationError::MalformedWorkflowHeader);
}

#[test]
fn rejects_service_with_wrong_keys() {
    let doc = r#"
workflow:
  name: demo
services:
  - name: burstbuf
    type: SBB
steps: []
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert!(matches!(err, ValidationError::MalformedServiceDecl(ref n) if n == "burstbuf"));
}

#[test]
fn rejects_unknown_service_kind() {
    let doc = r#"
workflow:
  name: demo
services:
  - name: burstbuf
    type: MAGIC
    attributes: {}
steps: []
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert_eq!(err, ValidationError::UnknownServiceKind("MAGIC".to_string()));
}

#[test]
fn rejects_missing_mandatory_attribute() {
    let doc = r#"
workflow:
  name: demo
services:
  - name: burstbuf
    type: SBB
    attributes:
      flavor: gold
steps: []
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert!(matches!(err, ValidationError::ServiceAttributeInvalid(ref n, _) if n == "burstbuf"));
}

#[test]
fn rejects_step_referencing_undeclared_service() {
    let doc = r#"
workflow:
  name: demo
services: []
steps:
  - name: compute
    command: "run"
    services:
      - name: ghost
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert_eq!(
        err,
        ValidationError::UndeclaredServiceReference { step: "compute".to_string(), service: "ghost".to_string() }
    );
}

#[test]
fn rejects_step_with_more_than_one_service() {
    let doc = r#"
workflow:
  name: demo
services:
  - name: a
    type: NONE
    attributes: {}
  - name: b
    type: NONE
    attributes: {}
steps:
  - name: compute
    command: "run"
    services:
      - name: a
      - name: b
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert_eq!(err, ValidationError::TooManyServicesPerStep("compute".to_string()));
}

#[test]
fn rejects_duplicate_step_names() {
    let doc = r#"
workflow:
  name: demo
services: []
steps:
  - name: compute
    command: "run"
    services: []
  - name: compute
    command: "run again"
    services: []
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert_eq!(err, ValidationError::DuplicateStepName("compute".to_string()));
}

#[test]
fn rejects_two_gbf_services_sharing_a_mountpoint() {
    let doc = r#"
workflow:
  name: demo
services:
  - name: gbf1
    type: GBF
    attributes:
      mountpoint: "/mnt/shared"
      namespace: "/ns/a"
      storagesize: "10GB"
  - name: gbf2
    type: GBF
    attributes:
      mountpoint: "/mnt/shared"
      namespace: "/ns/b"
      storagesize: "10GB"
steps: []
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert!(matches!(err, ValidationError::ServiceSetInvalid(_)));
}

#[test]
fn reports_residual_variables_after_substitution() {
    let doc = r#"
workflow:
  name: "{{ MISSING }}"
services: []
steps: []
"#;
    let err = validate(doc, "demo.yaml").unwrap_err();
    assert!(matches!(err, ValidationError::UndefinedVariables { .. }));
}
