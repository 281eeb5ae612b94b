//! Integration tests for the JSON writer.

use jsontext::{
    FloatFormatHandling, Formatting, JsonDate, JsonStringWriter, JsonWriter, StringEscapeHandling,
    WriterOptions,
};
use rstest::rstest;

fn string_writer() -> JsonStringWriter {
    JsonWriter::string_writer()
}

fn with_options(options: WriterOptions) -> JsonStringWriter {
    JsonWriter::new(Vec::new(), options).unwrap()
}

#[test]
fn array_of_one_integer() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    writer.write_i64(-5).unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.take_output(), "[-5]");
}

#[test]
fn object_with_mixed_values() {
    let mut writer = string_writer();
    writer.write_start_object().unwrap();
    writer.write_property_name("name").unwrap();
    writer.write_string("value").unwrap();
    writer.write_property_name("n").unwrap();
    writer.write_f64(1.5).unwrap();
    writer.write_property_name("ok").unwrap();
    writer.write_bool(true).unwrap();
    writer.write_property_name("none").unwrap();
    writer.write_null().unwrap();
    writer.write_end().unwrap();
    assert_eq!(
        writer.take_output(),
        r#"{"name":"value","n":1.5,"ok":true,"none":null}"#
    );
}

#[test]
fn indented_formatting_exact_output() {
    let options = WriterOptions { formatting: Formatting::Indented, ..WriterOptions::default() };
    let mut writer = with_options(options);
    writer.write_start_object().unwrap();
    writer.write_property_name("a").unwrap();
    writer.write_i64(1).unwrap();
    writer.write_property_name("b").unwrap();
    writer.write_start_array().unwrap();
    writer.write_i64(1).unwrap();
    writer.write_i64(2).unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();
    assert_eq!(
        writer.take_output(),
        "{\n  \"a\": 1,\n  \"b\": [\n    1,\n    2\n  ]\n}"
    );
}

#[test]
fn close_auto_completes_open_scopes() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    writer.write_start_object().unwrap();
    writer.write_property_name("a").unwrap();
    writer.close().unwrap();
    assert_eq!(writer.take_output(), "[{\"a\":null}]");
}

#[test]
fn write_end_closes_one_scope() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    writer.write_start_array().unwrap();
    writer.write_i64(1).unwrap();
    writer.write_end().unwrap();
    writer.write_i64(2).unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.take_output(), "[[1],2]");
}

#[test]
fn explicit_end_tokens_close_matching_scopes() {
    let mut writer = string_writer();
    writer.write_start_object().unwrap();
    writer.write_property_name("a").unwrap();
    writer.write_start_array().unwrap();
    // Closing the object unwinds through the open array.
    writer.write_end_object().unwrap();
    assert_eq!(writer.take_output(), "{\"a\":[]}");
}

#[test]
fn single_quote_output() {
    let options = WriterOptions { quote_char: '\'', ..WriterOptions::default() };
    let mut writer = with_options(options);
    writer.write_start_object().unwrap();
    writer.write_property_name("a").unwrap();
    writer.write_string("it's \"fine\"").unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.take_output(), r#"{'a':'it\'s "fine"'}"#);
}

#[test]
fn invalid_quote_char_is_rejected() {
    let options = WriterOptions { quote_char: '`', ..WriterOptions::default() };
    assert!(JsonWriter::new(Vec::new(), options).is_err());
}

#[rstest]
#[case(FloatFormatHandling::String, r#"["NaN","Infinity","-Infinity"]"#)]
#[case(FloatFormatHandling::Symbol, "[NaN,Infinity,-Infinity]")]
#[case(FloatFormatHandling::DefaultValue, "[0.0,0.0,0.0]")]
fn float_specials_follow_the_format_policy(
    #[case] policy: FloatFormatHandling,
    #[case] expected: &str,
) {
    let options = WriterOptions { float_format_handling: policy, ..WriterOptions::default() };
    let mut writer = with_options(options);
    writer.write_start_array().unwrap();
    writer.write_f64(f64::NAN).unwrap();
    writer.write_f64(f64::INFINITY).unwrap();
    writer.write_f64(f64::NEG_INFINITY).unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.take_output(), expected);
}

#[test]
fn finite_floats_keep_a_fraction_marker() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    writer.write_f64(1.0).unwrap();
    writer.write_f64(2.5).unwrap();
    writer.write_f32(0.25).unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.take_output(), "[1.0,2.5,0.25]");
}

#[test]
fn comments_do_not_take_a_delimiter() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    writer.write_i64(1).unwrap();
    writer.write_comment("c").unwrap();
    writer.write_i64(2).unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.take_output(), "[1/*c*/,2]");
}

#[test]
fn whitespace_must_be_whitespace() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    writer.write_whitespace("  \n").unwrap();
    let err = writer.write_whitespace("x").unwrap_err();
    assert!(err.to_string().contains("Only white space characters"), "{err}");
}

#[test]
fn big_integer_text_is_validated() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    writer.write_big_integer("-170141183460469231731687303715884105728").unwrap();
    writer.write_end().unwrap();
    assert_eq!(
        writer.take_output(),
        "[-170141183460469231731687303715884105728]"
    );

    let mut writer = string_writer();
    let err = writer.write_big_integer("12x").unwrap_err();
    assert!(err.to_string().contains("not a valid integer"), "{err}");
}

#[test]
fn unsigned_values_above_i64_max() {
    let mut writer = string_writer();
    writer.write_u64(u64::MAX).unwrap();
    assert_eq!(writer.take_output(), "18446744073709551615");
}

#[test]
fn bytes_write_as_base64_strings() {
    let mut writer = string_writer();
    writer.write_bytes(&[1, 2, 3]).unwrap();
    assert_eq!(writer.take_output(), "\"AQID\"");
}

#[test]
fn dates_write_as_iso_strings() {
    let date = JsonDate { epoch_millis: 1_787_998_530_250, offset_minutes: Some(0) };
    let mut writer = string_writer();
    writer.write_date(date).unwrap();
    assert_eq!(writer.take_output(), "\"2026-08-29T10:15:30.250Z\"");
}

#[test]
fn constructors_render_with_call_syntax() {
    let mut writer = string_writer();
    writer.write_start_constructor("Date").unwrap();
    writer.write_i64(123).unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.take_output(), "new Date(123)");
}

#[test]
fn raw_text_bypasses_the_grammar() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    writer.write_raw_value("0xFF").unwrap();
    writer.write_raw(" /* tail */").unwrap();
    writer.write_i64(1).unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.take_output(), "[0xFF /* tail */,1]");
}

#[test]
fn grammar_violation_poisons_the_writer() {
    let mut writer = string_writer();
    writer.write_start_object().unwrap();
    let err = writer.write_i64(1).unwrap_err();
    assert!(err.is_grammar());
    // Every later token keeps failing.
    assert!(writer.write_i64(2).is_err());
    assert!(writer.write_end().is_err());
}

#[test]
fn property_name_outside_an_object_is_invalid() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    assert!(writer.write_property_name("a").is_err());
}

#[test]
fn close_without_tokens_errors() {
    let mut writer = string_writer();
    let err = writer.write_end().unwrap_err();
    assert!(err.to_string().contains("No token to close"), "{err}");
}

#[test]
fn writer_depth_bound() {
    let options = WriterOptions { max_depth: Some(2), ..WriterOptions::default() };
    let mut writer = with_options(options);
    writer.write_start_array().unwrap();
    writer.write_start_array().unwrap();
    let err = writer.write_start_array().unwrap_err();
    assert!(err.to_string().contains("MaxDepth of 2 has been exceeded"), "{err}");
}

#[test]
fn string_escape_handling_non_ascii() {
    let options = WriterOptions {
        string_escape_handling: StringEscapeHandling::EscapeNonAscii,
        ..WriterOptions::default()
    };
    let mut writer = with_options(options);
    writer.write_string("héllo\n").unwrap();
    assert_eq!(writer.take_output(), r#""h\u00e9llo\n""#);
}

#[test]
fn string_escape_handling_html() {
    let options = WriterOptions {
        string_escape_handling: StringEscapeHandling::EscapeHtml,
        ..WriterOptions::default()
    };
    let mut writer = with_options(options);
    writer.write_string("<a href='x'>&</a>").unwrap();
    assert_eq!(
        writer.take_output(),
        r#""\u003ca href=\u0027x\u0027\u003e\u0026\u003c/a\u003e""#
    );
}

#[test]
fn undefined_values() {
    let mut writer = string_writer();
    writer.write_start_array().unwrap();
    writer.write_undefined().unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.take_output(), "[undefined]");
}

#[test]
fn path_tracks_the_write_position() {
    let mut writer = string_writer();
    writer.write_start_object().unwrap();
    writer.write_property_name("a").unwrap();
    writer.write_start_array().unwrap();
    writer.write_i64(1).unwrap();
    writer.write_i64(2).unwrap();
    assert_eq!(writer.path(), "a[1]");
    assert_eq!(writer.depth(), 2);
}
