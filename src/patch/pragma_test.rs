use super::pragma::scan_text;
use super::Error;

#[test]
fn observe_only() {
    let map = scan_text("t.v","wire [3:0] a; // #pragma observe 3:0\n").expect("scan failed");
    let line = map.get(&1).expect("line 1 missing");
    let obs = line.observe.expect("observe missing");
    assert_eq!(obs.msb,3);
    assert_eq!(obs.lsb,0);
    assert!(line.control.is_none());
}

#[test]
fn control_only() {
    let map = scan_text("t.v","reg [7:0] q; // #pragma control mask 7:0\n").expect("scan failed");
    let line = map.get(&1).expect("line 1 missing");
    let ctl = line.control.as_ref().expect("control missing");
    assert_eq!(ctl.kind,"mask");
    assert_eq!(ctl.range.msb,7);
    assert!(line.observe.is_none());
}

#[test]
fn both_directives_either_order() {
    let text = "a // #pragma observe 1:0 control force 1:0\n\
                b // #pragma control force 2:1 observe 2:1\n";
    let map = scan_text("t.v",text).expect("scan failed");
    for lineno in [1,2] {
        let line = map.get(&lineno).expect("line missing");
        assert!(line.observe.is_some());
        assert!(line.control.is_some());
    }
    assert_eq!(map.get(&2).unwrap().control.as_ref().unwrap().range.lsb,1);
}

#[test]
fn lines_without_marker_are_absent() {
    let map = scan_text("t.v","wire a;\nwire b;\n// #pragma observe 0:0\n").expect("scan failed");
    assert_eq!(map.len(),1);
    assert!(map.contains_key(&3));
}

#[test]
fn line_numbers_are_one_based() {
    let map = scan_text("t.v","\n\nx // #pragma observe 0:0\n").expect("scan failed");
    assert!(map.contains_key(&3));
}

#[test]
fn missing_lsb_is_fatal() {
    let err = scan_text("t.v","// #pragma observe 3\n").expect_err("should fail");
    match err {
        Error::MalformedPragma { line, token, .. } => {
            assert_eq!(line,1);
            assert_eq!(token,"3");
        },
        _ => panic!("wrong error kind")
    }
}

#[test]
fn control_without_kind_is_fatal() {
    assert!(scan_text("t.v","// #pragma control 3:0\n").is_err());
}

#[test]
fn reversed_range_is_fatal() {
    assert!(scan_text("t.v","// #pragma observe 0:3\n").is_err());
}

#[test]
fn bare_marker_is_fatal() {
    assert!(scan_text("t.v","// #pragma\n").is_err());
}

#[test]
fn unknown_directive_is_fatal() {
    let err = scan_text("t.v","// #pragma watch 3:0\n").expect_err("should fail");
    match err {
        Error::MalformedPragma { token, .. } => assert_eq!(token,"watch"),
        _ => panic!("wrong error kind")
    }
}

#[test]
fn duplicate_directive_is_fatal() {
    assert!(scan_text("t.v","// #pragma observe 1:0 observe 3:2\n").is_err());
}
