use super::*;

#[test]
fn single_sequence() {
    let text = "s0 {\n  (TOP.a[1:0] == 2'b00)\n  (TOP.u1.inter[3:0] > 4'b0010)\n}\n";
    let list = parse(text).expect("parse failed");
    assert_eq!(list.sequences.len(),1);
    let seq = &list.sequences[0];
    assert_eq!(seq.name,"s0");
    assert_eq!(seq.patterns.len(),2);
    assert_eq!(seq.patterns[0].lhs.name,"TOP.a");
    assert_eq!(seq.patterns[0].op,Comparison::Eq);
    assert_eq!(seq.patterns[0].rhs.bits,"00");
    assert_eq!(seq.patterns[1].op,Comparison::Gt);
    assert_eq!(seq.patterns[1].lhs.width(),4);
}

#[test]
fn multiple_sequences() {
    let text = "s0 {\n(a[0:0] == 1'b1)\n}\ns1 {\n(b[1:0] < 2'b10)\n}\n";
    let list = parse(text).expect("parse failed");
    assert_eq!(list.sequences.len(),2);
    assert_eq!(list.sequences[1].name,"s1");
    assert_eq!(list.sequences[1].patterns[0].op,Comparison::Lt);
}

#[test]
fn empty_sequence_is_allowed() {
    let list = parse("idle {\n}\n").expect("parse failed");
    assert!(list.sequences[0].patterns.is_empty());
}

#[test]
fn display_round_trips() {
    let text = "s0 {\n  (TOP.a[1:0] == 2'b00)\n}\n";
    let list = parse(text).expect("parse failed");
    let printed = list.to_string();
    let again = parse(&printed).expect("printed form failed to reparse");
    assert_eq!(list,again);
}

#[test]
fn width_mismatch_is_fatal() {
    let err = parse("s0 {\n(a[3:0] == 2'b00)\n}\n").expect_err("should fail");
    match err {
        Error::WidthMismatch { var_width, const_width, .. } => {
            assert_eq!(var_width,4);
            assert_eq!(const_width,2);
        },
        _ => panic!("wrong error kind")
    }
}

#[test]
fn missing_part_select_is_fatal() {
    assert!(parse("s0 {\n(a == 1'b0)\n}\n").is_err());
}

#[test]
fn unsized_constant_is_fatal() {
    assert!(parse("s0 {\n(a[0:0] == 1)\n}\n").is_err());
}

#[test]
fn width_digit_count_must_agree() {
    assert!(parse("s0 {\n(a[2:0] == 3'b01)\n}\n").is_err());
}

#[test]
fn unclosed_sequence_is_fatal() {
    let err = parse("s0 {\n(a[0:0] == 1'b0)\n").expect_err("should fail");
    assert!(matches!(err,Error::SequenceSyntax {..}));
}

#[test]
fn error_carries_line_number() {
    let err = parse("s0 {\n(a[0:0] ? 1'b0)\n}\n").expect_err("should fail");
    match err {
        Error::SequenceSyntax { line, .. } => assert_eq!(line,2),
        _ => panic!("wrong error kind")
    }
}
