use clap::{arg,crate_version,Command,ValueHint};

const PORT_HELP: &str = "side-channel identifiers must not collide with any design signal;
classified names that begin with a port name or end with
`_controlled`, `_int`, or `_inst` abort the run";

pub fn build_cli() -> Command {
    let long_help = "veritap inserts observation and control taps into annotated Verilog.
Annotate a declaration with a trailing comment such as
  `// #pragma observe 3:0` or `// #pragma control force 7:0`
then run `insert` against a filelist naming every source file.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
audit annotations:     `veritap scan -f filelist.f`
patch a design:        `veritap insert -f filelist.f --top soc_top`
custom port names:     `veritap insert -f filelist.f --top soc_top --observe-port obs_bus`
check a patch program: `veritap check-seq -s patch.seq`";

    let shells = ["bash","elv","fish","ps1","zsh"];

    let mut main_cmd = Command::new("veritap")
        .about("Inserts observe/control taps into Verilog designs and plumbs them to the top.")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("insert")
            .arg(arg!(-f --filelist <PATH> "file naming one Verilog source per line")
                .value_hint(ValueHint::FilePath)
                .required(true))
            .arg(arg!(-t --top <MODULE> "top module of the instance hierarchy")
                .required(true))
            .arg(arg!(--"observe-port" <NAME> "name of the observation output port")
                .required(false)
                .default_value("observe_port")
                .long_help(PORT_HELP))
            .arg(arg!(--"control-in" <NAME> "name of the control sample output port")
                .required(false)
                .default_value("control_in"))
            .arg(arg!(--"control-out" <NAME> "name of the control substitute input port")
                .required(false)
                .default_value("control_out"))
            .arg(arg!(--suffix <SUFFIX> "suffix appended to output file stems")
                .required(false)
                .default_value("_patch"))
            .about("patch a design, writing <stem>_patch.<ext> next to each input")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("scan")
            .arg(arg!(-f --filelist <PATH> "file naming one Verilog source per line")
                .value_hint(ValueHint::FilePath)
                .required(true))
            .about("list every tap the annotations request, without patching")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("check-seq")
            .arg(arg!(-s --file <PATH> "sequence patch file")
                .value_hint(ValueHint::FilePath)
                .required(true))
            .about("verify a sequence patch file and print its tree")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("completions")
            .arg(arg!(-s --shell <SHELL> "shell to generate completions for")
                .value_parser(shells)
                .required(true))
            .about("write completions script to stdout")
    );
    return main_cmd;
}
