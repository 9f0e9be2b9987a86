use rstest::rstest;

use crate::{Error, GrammarError, JsonWriter};

fn render(build: impl FnOnce(&mut JsonWriter<&mut Vec<u8>>) -> crate::Result<()>) -> String {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    build(&mut w).unwrap();
    w.flush().unwrap();
    w.close().unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn separators_are_emitted_automatically() {
    let text = render(|w| {
        w.write_object_start()?;
        w.write_string("a")?;
        w.write_i32(1)?;
        w.write_string("b")?;
        w.write_array_start()?;
        w.write_bool(true)?;
        w.write_null()?;
        w.write_array_end()?;
        w.write_string("c")?;
        w.write_object_start()?;
        w.write_object_end()?;
        w.write_object_end()
    });
    assert_eq!(text, r#"{"a":1,"b":[true,null],"c":{}}"#);
}

#[test]
fn no_separator_precedes_container_ends() {
    let text = render(|w| {
        w.write_array_start()?;
        w.write_array_start()?;
        w.write_array_end()?;
        w.write_array_end()
    });
    assert_eq!(text, "[[]]");
}

#[rstest]
#[case("plain", r#""plain""#)]
#[case("say \"hi\"", r#""say \"hi\"""#)]
#[case("back\\slash", r#""back\\slash""#)]
#[case("tab\there", r#""tab\there""#)]
#[case("line\nbreak\r", r#""line\nbreak\r""#)]
#[case("\u{0008}\u{000C}", r#""\b\f""#)]
#[case("slash/kept", r#""slash/kept""#)]
#[case("caf\u{00E9} \u{20AC} \u{1F600}", "\"caf\u{00E9} \u{20AC} \u{1F600}\"")]
fn strings_escape_only_what_must_be_escaped(#[case] input: &str, #[case] expected: &str) {
    let text = render(|w| {
        w.write_array_start()?;
        w.write_string(input)?;
        w.write_array_end()
    });
    assert_eq!(text, format!("[{expected}]"));
}

#[test]
fn bare_controls_escape_as_uppercase_hex() {
    let text = render(|w| {
        w.write_array_start()?;
        w.write_string("\u{0000}\u{001F}\u{007F}\u{009F}")?;
        w.write_array_end()
    });
    assert_eq!(text, "[\"\\u0000\\u001F\\u007F\\u009F\"]");
}

#[test]
fn integer_writers_cover_the_extremes() {
    let text = render(|w| {
        w.write_array_start()?;
        w.write_i8(i8::MIN)?;
        w.write_u8(u8::MAX)?;
        w.write_i64(i64::MIN)?;
        w.write_u64(u64::MAX)?;
        w.write_i128(i128::MIN)?;
        w.write_u128(u128::MAX)?;
        w.write_array_end()
    });
    assert_eq!(
        text,
        format!(
            "[{},{},{},{},{},{}]",
            i8::MIN,
            u8::MAX,
            i64::MIN,
            u64::MAX,
            i128::MIN,
            u128::MAX
        )
    );
}

#[test]
fn floats_render_shortest_round_trip_text() {
    let text = render(|w| {
        w.write_array_start()?;
        w.write_f64(1.5)?;
        w.write_f64(3.0)?;
        w.write_f64(-0.0001)?;
        w.write_f32(0.25)?;
        w.write_array_end()
    });
    assert_eq!(text, "[1.5,3.0,-0.0001,0.25]");
}

#[rstest]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
#[case(f64::NEG_INFINITY)]
fn non_finite_floats_are_rejected(#[case] value: f64) {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_array_start().unwrap();
    assert!(matches!(w.write_f64(value), Err(Error::Usage(_))));
}

#[test]
fn number_lexemes_pass_through_verbatim() {
    let big = "123456789012345678901234567890.000000000000001e-9999";
    let text = render(|w| {
        w.write_array_start()?;
        w.write_number_str(big)?;
        w.write_array_end()
    });
    assert_eq!(text, format!("[{big}]"));
}

#[rstest]
#[case("01")]
#[case("1.")]
#[case("+1")]
#[case("NaN")]
fn malformed_number_lexemes_are_rejected(#[case] lexeme: &str) {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_array_start().unwrap();
    assert!(matches!(
        w.write_number_str(lexeme),
        Err(Error::InvalidNumberLiteral(_))
    ));
}

#[test]
fn structural_violations_fail_before_any_bytes_are_emitted() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_object_start().unwrap();
    // A number cannot stand where a key is required.
    assert!(matches!(w.write_i32(1), Err(Error::Grammar(_))));
    w.flush().unwrap();
    drop(w);
    assert_eq!(out, b"{");
}

#[test]
fn second_top_level_value_is_rejected() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_array_start().unwrap();
    w.write_array_end().unwrap();
    assert!(matches!(w.write_object_start(), Err(Error::Grammar(_))));
}

#[test]
fn rejections_after_the_document_closes_name_the_written_token() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_array_start().unwrap();
    w.write_array_end().unwrap();
    match w.write_null().unwrap_err() {
        Error::Grammar(GrammarError::UnexpectedToken { found, .. }) => {
            assert_eq!(found, "'null'");
        }
        other => panic!("expected grammar error, got {other}"),
    }
}

#[test]
fn top_level_scalar_is_rejected() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    assert!(matches!(w.write_i32(7), Err(Error::Grammar(_))));
}

#[test]
fn duplicate_keys_are_rejected_at_the_second_write() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_object_start().unwrap();
    w.write_string("k").unwrap();
    w.write_bool(true).unwrap();
    let err = w.write_string("k").unwrap_err();
    assert!(matches!(err, Error::Grammar(_)));
}

#[test]
fn close_requires_a_flush_first() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_array_start().unwrap();
    w.write_array_end().unwrap();
    assert!(matches!(w.close(), Err(Error::Usage(_))));
    w.flush().unwrap();
    w.close().unwrap();
}

#[test]
fn close_rejects_an_incomplete_document() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_object_start().unwrap();
    w.write_string("k").unwrap();
    w.flush().unwrap();
    assert!(matches!(w.close(), Err(Error::Usage(_))));
}

#[test]
fn close_is_idempotent_and_poisons_later_writes() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_array_start().unwrap();
    w.write_array_end().unwrap();
    w.flush().unwrap();
    w.close().unwrap();
    w.close().unwrap();
    assert!(matches!(w.write_null(), Err(Error::Usage(_))));
    assert!(matches!(w.flush(), Err(Error::Usage(_))));
}

#[test]
fn closing_never_touches_the_sink() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.write_array_start().unwrap();
    w.write_array_end().unwrap();
    w.flush().unwrap();
    w.close().unwrap();
    let sink = w.into_inner();
    assert_eq!(sink.as_slice(), b"[]");
}

#[test]
fn output_drains_in_blocks_once_the_threshold_is_crossed() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    let long = "x".repeat(10_000);
    w.write_array_start().unwrap();
    w.write_string(&long).unwrap();
    w.write_array_end().unwrap();
    w.flush().unwrap();
    w.close().unwrap();
    assert_eq!(out, format!(r#"["{long}"]"#).as_bytes());
}

#[test]
fn empty_writer_closes_cleanly() {
    let mut out = Vec::new();
    let mut w = JsonWriter::new(&mut out);
    w.close().unwrap();
    assert!(out.is_empty());
}
