use std::collections::HashMap;
use std::path::PathBuf;
use super::{classify,index,pragma,Design,InsertOptions,PragmaMap,SignalMaps};

fn setup(src: &str) -> (Design,HashMap<PathBuf,PragmaMap>) {
    let path = PathBuf::from("test.v");
    let design = index::build_from_text(&[(path.clone(),src.to_string())]).expect("index failed");
    let mut pragmas = HashMap::new();
    pragmas.insert(path,pragma::scan_text("test.v",src).expect("scan failed"));
    (design,pragmas)
}

fn classified(src: &str,module: &str) -> SignalMaps {
    let (design,pragmas) = setup(src);
    let maps = classify::classify(&design,&pragmas).expect("classify failed");
    maps.get(module).expect("module missing").clone()
}

#[test]
fn observe_on_internal_reg() {
    let src = "module m;\nreg [1:0] s; // #pragma observe 1:0\nendmodule\n";
    let m = classified(src,"m");
    assert_eq!(m.observe.len(),1);
    assert_eq!(m.observe[0].0,"s");
    assert_eq!(m.observe[0].1.width(),2);
    assert!(m.control.is_empty());
}

#[test]
fn control_on_ansi_port() {
    let src = "module m(input wire [3:0] a); // #pragma control force 3:0\nendmodule\n";
    let m = classified(src,"m");
    assert_eq!(m.control.len(),1);
    assert_eq!(m.control[0].0,"a");
    assert_eq!(m.control[0].1.kind,"force");
}

#[test]
fn both_pragmas_enter_both_maps() {
    let src = "module m;\nreg x; // #pragma observe 0:0 control force 0:0\nendmodule\n";
    let m = classified(src,"m");
    assert_eq!(m.observe.len(),1);
    assert_eq!(m.control.len(),1);
    assert_eq!(m.observe[0].0,"x");
    assert_eq!(m.control[0].0,"x");
}

#[test]
fn every_declarator_on_the_line_is_taken() {
    let src = "module m;\nwire [1:0] a, b; // #pragma observe 1:0\nendmodule\n";
    let m = classified(src,"m");
    assert_eq!(m.observe.len(),2);
    assert_eq!(m.observe[0].0,"a");
    assert_eq!(m.observe[1].0,"b");
}

#[test]
fn classification_order_is_stable() {
    let src = "module m;\n\
               reg a; // #pragma observe 0:0\n\
               reg b; // #pragma observe 0:0\n\
               reg c; // #pragma observe 0:0\n\
               endmodule\n";
    let m1 = classified(src,"m");
    let m2 = classified(src,"m");
    let names1: Vec<&String> = m1.observe.iter().map(|(n,_)| n).collect();
    assert_eq!(names1,vec!["a","b","c"]);
    let names2: Vec<&String> = m2.observe.iter().map(|(n,_)| n).collect();
    assert_eq!(names1,names2);
}

#[test]
fn modules_without_pragmas_get_empty_maps() {
    let src = "module m;\nreg x; // #pragma observe 0:0\nendmodule\n\
               module n;\nreg y;\nendmodule\n";
    let (design,pragmas) = setup(src);
    let maps = classify::classify(&design,&pragmas).expect("classify failed");
    assert!(maps.get("n").expect("module n missing").is_empty());
}

#[test]
fn inout_pragma_is_unsupported() {
    let src = "module m(inout [1:0] io); // #pragma observe 1:0\nendmodule\n";
    let (design,pragmas) = setup(src);
    assert!(classify::classify(&design,&pragmas).is_err());
}

#[test]
fn pragma_off_any_declaration_is_ignored() {
    // the pragma sits on an assign, a warning, not an error
    let src = "module m;\nwire a;\nassign a = 1'b0; // #pragma observe 0:0\nendmodule\n";
    let (design,pragmas) = setup(src);
    let maps = classify::classify(&design,&pragmas).expect("classify failed");
    assert!(maps.get("m").expect("module missing").is_empty());
}

#[test]
fn reserved_names_are_rejected() {
    let src = "module m;\nreg x_controlled; // #pragma observe 0:0\nendmodule\n";
    let (design,pragmas) = setup(src);
    let maps = classify::classify(&design,&pragmas).expect("classify failed");
    let opts = InsertOptions::new("m");
    assert!(classify::check_reserved(&maps,&opts).is_err());
}

#[test]
fn configured_port_prefix_is_rejected() {
    let src = "module m;\nreg observe_port_x; // #pragma observe 0:0\nendmodule\n";
    let (design,pragmas) = setup(src);
    let maps = classify::classify(&design,&pragmas).expect("classify failed");
    let opts = InsertOptions::new("m");
    assert!(classify::check_reserved(&maps,&opts).is_err());
}
