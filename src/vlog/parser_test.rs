use super::*;

fn parse_one(src: &str) -> ModuleDef {
    let ast = parser::parse(src).expect("parse failed");
    assert_eq!(ast.modules.len(),1);
    ast.modules[0].clone()
}

mod modules {
    use super::*;

    #[test]
    fn ansi_ports() {
        let m = parse_one("module m(input wire [3:0] a, output reg [7:0] q);\nendmodule\n");
        assert_eq!(m.name,"m");
        assert_eq!(m.ports.len(),2);
        match &m.ports[0] {
            Port::Decl(net) => {
                assert_eq!(net.name,"a");
                assert_eq!(net.dir,Some(Direction::Input));
                assert_eq!(net.kind,Some(NetKind::Wire));
                assert!(net.width.is_some());
            },
            _ => panic!("expected ANSI port")
        }
        match &m.ports[1] {
            Port::Decl(net) => {
                assert_eq!(net.dir,Some(Direction::Output));
                assert_eq!(net.kind,Some(NetKind::Reg));
            },
            _ => panic!("expected ANSI port")
        }
    }

    #[test]
    fn classic_ports() {
        let m = parse_one("module m(a, q);\ninput [3:0] a;\noutput q;\nendmodule\n");
        assert_eq!(m.ports.len(),2);
        assert!(matches!(m.ports[0],Port::Named(_)));
        assert_eq!(m.port_direction("a"),Some(Direction::Input));
        assert_eq!(m.port_direction("q"),Some(Direction::Output));
    }

    #[test]
    fn decl_lineno_tracks_name() {
        let m = parse_one("module m;\nwire a;\n\nreg [1:0] s;\nendmodule\n");
        match &m.items[1] {
            Item::Decl(d) => assert_eq!(d.nets[0].lineno,4),
            _ => panic!("expected decl")
        }
    }

    #[test]
    fn multiple_declarators() {
        let m = parse_one("module m;\nwire [3:0] a, b, c;\nendmodule\n");
        match &m.items[0] {
            Item::Decl(d) => {
                assert_eq!(d.nets.len(),3);
                assert_eq!(d.nets[2].name,"c");
                assert!(d.nets[2].width.is_some());
            },
            _ => panic!("expected decl")
        }
    }

    #[test]
    fn unclosed_module_fails() {
        assert!(parser::parse("module m;\nwire a;\n").is_err());
    }
}

mod statements {
    use super::*;

    #[test]
    fn always_ff() {
        let src = "module m(input clk, input d, output reg q);\n\
                   always @(posedge clk) begin\n q <= d;\n end\nendmodule\n";
        let m = parse_one(src);
        match &m.items[0] {
            Item::Always(a) => {
                let sens = a.sens.as_ref().expect("expected explicit list");
                assert_eq!(sens.len(),1);
                assert_eq!(sens[0].edge,Edge::Pos);
                match &a.body {
                    Stmt::Block(stmts) => assert!(matches!(stmts[0],Stmt::Nonblocking(_))),
                    _ => panic!("expected block")
                }
            },
            _ => panic!("expected always")
        }
    }

    #[test]
    fn star_sensitivity() {
        let m = parse_one("module m;\nreg y;\nalways @(*) y = 1'b0;\nendmodule\n");
        match &m.items[1] {
            Item::Always(a) => assert!(a.sens.is_none()),
            _ => panic!("expected always")
        }
    }

    #[test]
    fn if_else_and_case() {
        let src = "module m(input [1:0] s, input a, output reg y);\n\
                   always @(*)\n\
                   if (s == 2'b00) y = a; else\n\
                   case (s)\n 2'b01: y = 1'b1;\n default: y = 1'b0;\n endcase\n\
                   endmodule\n";
        let m = parse_one(src);
        match &m.items[0] {
            Item::Always(a) => match &a.body {
                Stmt::If { else_s, .. } => {
                    match else_s.as_deref() {
                        Some(Stmt::Case { arms, .. }) => {
                            assert_eq!(arms.len(),2);
                            assert!(arms[1].labels.is_empty());
                        },
                        _ => panic!("expected case in else branch")
                    }
                },
                _ => panic!("expected if")
            },
            _ => panic!("expected always")
        }
    }
}

mod expressions {
    use super::*;

    #[test]
    fn precedence() {
        let m = parse_one("module m;\nwire y, a, b, c;\nassign y = a | b & c;\nendmodule\n");
        match &m.items[1] {
            Item::Assign(asn) => match &asn.rhs {
                Expr::Binary { op, .. } => assert_eq!(*op,"|"),
                _ => panic!("expected binary or at top")
            },
            _ => panic!("expected assign")
        }
    }

    #[test]
    fn selects_and_concat() {
        let m = parse_one("module m;\nwire [7:0] y, a;\nassign y = {a[7:4], a[0], 3'b000};\nendmodule\n");
        match &m.items[1] {
            Item::Assign(asn) => match &asn.rhs {
                Expr::Concat(parts) => {
                    assert_eq!(parts.len(),3);
                    assert!(matches!(parts[0],Expr::Partselect {..}));
                    assert!(matches!(parts[1],Expr::BitSelect {..}));
                    assert!(matches!(parts[2],Expr::IntConst(_)));
                },
                _ => panic!("expected concat")
            },
            _ => panic!("expected assign")
        }
    }

    #[test]
    fn conditional() {
        let m = parse_one("module m;\nwire y, s, a, b;\nassign y = s ? a : b;\nendmodule\n");
        match &m.items[1] {
            Item::Assign(asn) => assert!(matches!(asn.rhs,Expr::Cond {..})),
            _ => panic!("expected assign")
        }
    }
}

mod instances {
    use super::*;

    #[test]
    fn named_connections() {
        let src = "module top(input clk);\n\
                   child u0 (.clk(clk), .d(1'b0));\n\
                   endmodule\n";
        let m = parse_one(src);
        match &m.items[0] {
            Item::Instances(list) => {
                assert_eq!(list.module,"child");
                assert_eq!(list.instances[0].name,"u0");
                assert_eq!(list.instances[0].ports.len(),2);
                assert_eq!(list.instances[0].ports[0].formal.as_deref(),Some("clk"));
            },
            _ => panic!("expected instance list")
        }
    }

    #[test]
    fn multiple_instances_one_list() {
        let src = "module top;\nchild u0 (), u1 ();\nendmodule\n";
        let m = parse_one(src);
        match &m.items[0] {
            Item::Instances(list) => assert_eq!(list.instances.len(),2),
            _ => panic!("expected instance list")
        }
    }

    #[test]
    fn unconnected_port() {
        let m = parse_one("module top;\nchild u0 (.y());\nendmodule\n");
        match &m.items[0] {
            Item::Instances(list) => assert!(list.instances[0].ports[0].actual.is_none()),
            _ => panic!("expected instance list")
        }
    }
}

mod comments {
    use super::*;

    #[test]
    fn pragma_comment_is_skipped() {
        let m = parse_one("module m;\nwire [3:0] a; // #pragma observe 3:0\nendmodule\n");
        match &m.items[0] {
            Item::Decl(d) => assert_eq!(d.nets[0].lineno,2),
            _ => panic!("expected decl")
        }
    }

    #[test]
    fn block_comment_advances_lines() {
        let m = parse_one("module m;\n/* two\nlines */\nwire a;\nendmodule\n");
        match &m.items[0] {
            Item::Decl(d) => assert_eq!(d.nets[0].lineno,4),
            _ => panic!("expected decl")
        }
    }
}
