use super::*;

#[test]
fn substitutes_known_identifiers() {
    let vars = predefined_vars("sess1", "alice");
    let out = substitute("namespace: /tmp/{{ SESSION }}/{{ USER }}", &vars);
    assert_eq!(out, "namespace: /tmp/sess1/alice");
}

#[test]
fn tolerates_surrounding_whitespace_inside_braces() {
    let vars = predefined_vars("sess1", "alice");
    assert_eq!(substitute("{{SESSION}}", &vars), "sess1");
    assert_eq!(substitute("{{  SESSION  }}", &vars), "sess1");
}

#[test]
fn leaves_unknown_identifiers_untouched() {
    let vars = predefined_vars("sess1", "alice");
    let out = substitute("command: run --step {{ STEP }}", &vars);
    assert_eq!(out, "command: run --step {{ STEP }}");
}

#[test]
fn merge_rejects_predefined_redefinition() {
    let predefined = predefined_vars("sess1", "alice");
    let mut cmdline = HashMap::new();
    cmdline.insert("SESSION".to_string(), "other".to_string());
    let err = merge_cmdline_vars(&predefined, &cmdline).unwrap_err();
    assert!(matches!(err, ValidationError::PredefinedVariableRedefined(ref k) if k == "SESSION"));
}

#[test]
fn merge_combines_disjoint_dictionaries() {
    let predefined = predefined_vars("sess1", "alice");
    let mut cmdline = HashMap::new();
    cmdline.insert("FLAVOR".to_string(), "gold".to_string());
    let merged = merge_cmdline_vars(&predefined, &cmdline).unwrap();
    assert_eq!(merged.get("SESSION").map(String::as_str), Some("sess1"));
    assert_eq!(merged.get("FLAVOR").map(String::as_str), Some("gold"));
}

#[test]
fn residual_variables_reports_every_unresolved_name() {
    let names = residual_variables("{{ A }} and {{ B }} and {{ A }}");
    assert_eq!(names, vec!["A", "B", "A"]);
}

#[test]
fn ensure_no_residual_ok_when_fully_substituted() {
    assert!(ensure_no_residual("no variables here", "ctx").is_ok());
}

#[test]
fn ensure_no_residual_errors_with_context() {
    let err = ensure_no_residual("{{ MISSING }}", "service 'x' attribute 'y'").unwrap_err();
    match err {
        ValidationError::UndefinedVariables { context, names } => {
            assert_eq!(context, "service 'x' attribute 'y'");
            assert_eq!(names, vec!["MISSING"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
