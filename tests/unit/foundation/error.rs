use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VidscriptError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        VidscriptError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        VidscriptError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn syntax_error_is_transparent() {
    let err: VidscriptError = crate::parse("video {}").unwrap_err().into();
    assert!(matches!(err, VidscriptError::Syntax(_)));
    assert!(err.to_string().starts_with("syntax error at 1:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VidscriptError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
