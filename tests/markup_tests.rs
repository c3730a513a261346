//! # Markup Translation Tests
//!
//! Exercises the bracket markup translator through the public API with the
//! inputs users actually send.

use publicity_forwarder::errors::AppError;
use publicity_forwarder::markup::{translate, validate_fragment};

#[test]
fn test_bold_translation() {
    assert_eq!(translate("(b)Hi(/b)").unwrap(), "<b>Hi</b>");
}

#[test]
fn test_all_styles() {
    assert_eq!(
        translate("(b)bold(/b) (i)italic(/i) (u)under(/u) (s)strike(/s)").unwrap(),
        "<b>bold</b> <i>italic</i> <u>under</u> <s>strike</s>"
    );
}

#[test]
fn test_crossing_tags_are_rejected() {
    let err = translate("(b)(i)Hi(/b)(/i)").unwrap_err();
    assert!(err.to_string().contains("Unbalanced or invalid tags"));
}

#[test]
fn test_unmatched_opening_tag_passes_through() {
    assert_eq!(translate("(b)Hi").unwrap(), "(b)Hi");
    assert_eq!(translate("Hi(/i)").unwrap(), "Hi(/i)");
}

#[test]
fn test_hyperlink() {
    assert_eq!(
        translate("[site](http://example.com)").unwrap(),
        r#"<a href="http://example.com">site</a>"#
    );
    assert_eq!(
        translate("See [the (b)docs(/b)](https://example.com/docs?page=2)").unwrap(),
        r#"See <a href="https://example.com/docs?page=2">the <b>docs</b></a>"#
    );
}

#[test]
fn test_clean_html_passes_through_unchanged() {
    let clean = "<b>Hi</b> &amp; <i>welcome</i> to <a href=\"https://example.com\">us</a>";
    assert_eq!(translate(clean).unwrap(), clean);
    assert_eq!(translate(&translate(clean).unwrap()).unwrap(), clean);
}

#[test]
fn test_plain_text_passes_through() {
    let text = "Concert on Friday, 8pm.\nEveryone welcome!";
    assert_eq!(translate(text).unwrap(), text);
}

#[test]
fn test_characters_the_html_mode_cannot_take_are_rejected() {
    assert!(translate("Fish & chips").is_err());
    assert!(translate("1 < 2").is_err());
    assert!(translate("Fish &amp; chips, 2 &gt; 1").is_ok());
}

#[test]
fn test_raw_html_from_users_is_validated_too() {
    assert!(translate("<b>open").is_err());
    assert!(translate("</i>").is_err());
    assert!(validate_fragment("<b><i>x</i></b>").is_ok());
}

#[test]
fn test_format_error_converts_to_app_error() {
    let err: AppError = translate("(b)(i)x(/b)(/i)").unwrap_err().into();
    assert!(matches!(err, AppError::Format(_)));
    assert!(err.to_string().starts_with("[FORMAT]"));
}
