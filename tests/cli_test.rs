use assert_cmd::cargo; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::path::{Path,PathBuf};
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Copy fixtures into a scratch directory and write a filelist of
/// absolute paths, so outputs land in the scratch area.
fn stage(dir: &Path,fixtures: &[&str]) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let mut listing = String::new();
    for name in fixtures {
        let src = Path::new("tests").join("verilog").join(name);
        let dst = dir.join(name);
        std::fs::copy(src,&dst)?;
        listing += &format!("{}\n",dst.display());
    }
    let filelist = dir.join("filelist.f");
    std::fs::write(&filelist,listing)?;
    Ok(filelist)
}

#[test]
fn scan_lists_requested_taps() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let filelist = stage(dir.path(),&["alu.v","soc.v"])?;
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("scan")
        .arg("-f").arg(&filelist)
        .assert()
        .success()
        .stdout(predicate::str::contains("alu"))
        .stdout(predicate::str::contains("acc [3:0]"))
        .stdout(predicate::str::contains("kind force"));
    Ok(())
}

#[test]
fn insert_patches_two_level_design() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let filelist = stage(dir.path(),&["alu.v","soc.v"])?;
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("insert")
        .arg("-f").arg(&filelist)
        .arg("-t").arg("soc")
        .assert()
        .success()
        .stderr(predicate::str::contains("2"));
    let alu = std::fs::read_to_string(dir.path().join("alu_patch.v"))?;
    assert!(alu.contains("wire [3:0] a_controlled;"));
    assert!(alu.contains("assign control_in_int[3:0] = a[3:0];"));
    assert!(alu.contains("assign a_controlled[3:0] = control_out_int[3:0];"));
    assert!(alu.contains("assign observe_port_int[3:0] = acc[3:0];"));
    let soc = std::fs::read_to_string(dir.path().join("soc_patch.v"))?;
    assert!(soc.contains(".observe_port(observe_port_inst[3:0])"));
    assert!(soc.contains(".observe_port(observe_port_inst[7:4])"));
    assert!(soc.contains(".control_in(control_in_inst[3:0])"));
    assert!(soc.contains(".control_out(control_out_inst[7:4])"));
    assert!(soc.contains("output [7:0] observe_port"));
    assert!(soc.contains("output [7:0] control_in"));
    assert!(soc.contains("input [7:0] control_out"));
    Ok(())
}

#[test]
fn renamed_ports_carry_through() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let filelist = stage(dir.path(),&["alu.v","soc.v"])?;
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("insert")
        .arg("-f").arg(&filelist)
        .arg("-t").arg("soc")
        .arg("--observe-port").arg("obs_bus")
        .assert()
        .success();
    let soc = std::fs::read_to_string(dir.path().join("soc_patch.v"))?;
    assert!(soc.contains("output [7:0] obs_bus"));
    assert!(!soc.contains("observe_port"));
    Ok(())
}

#[test]
fn malformed_pragma_writes_nothing() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let filelist = stage(dir.path(),&["bad_pragma.v","plain.v"])?;
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("insert")
        .arg("-f").arg(&filelist)
        .arg("-t").arg("bad")
        .assert()
        .failure();
    assert!(!dir.path().join("bad_pragma_patch.v").exists());
    assert!(!dir.path().join("plain_patch.v").exists());
    Ok(())
}

#[test]
fn run_without_pragmas_modifies_nothing() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let filelist = stage(dir.path(),&["plain.v"])?;
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("insert")
        .arg("-f").arg(&filelist)
        .arg("-t").arg("plain")
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to do"));
    assert!(!dir.path().join("plain_patch.v").exists());
    Ok(())
}

#[test]
fn missing_filelist_entry_fails() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let filelist = dir.path().join("filelist.f");
    std::fs::write(&filelist,"no_such_file.v\n")?;
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("insert")
        .arg("-f").arg(&filelist)
        .arg("-t").arg("soc")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn duplicate_module_fails() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    std::fs::copy(Path::new("tests").join("verilog").join("plain.v"),dir.path().join("plain.v"))?;
    std::fs::copy(Path::new("tests").join("verilog").join("plain.v"),dir.path().join("again.v"))?;
    let filelist = dir.path().join("filelist.f");
    std::fs::write(&filelist,format!("{}\n{}\n",
        dir.path().join("plain.v").display(),
        dir.path().join("again.v").display()))?;
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("insert")
        .arg("-f").arg(&filelist)
        .arg("-t").arg("plain")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn patched_output_reparses() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let filelist = stage(dir.path(),&["alu.v","soc.v"])?;
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("insert")
        .arg("-f").arg(&filelist)
        .arg("-t").arg("soc")
        .assert()
        .success();
    // the patched files themselves scan cleanly
    let patched_list = dir.path().join("patched.f");
    std::fs::write(&patched_list,format!("{}\n{}\n",
        dir.path().join("alu_patch.v").display(),
        dir.path().join("soc_patch.v").display()))?;
    let mut scan = cargo::cargo_bin_cmd!("veritap");
    scan.arg("scan")
        .arg("-f").arg(&patched_list)
        .assert()
        .success();
    Ok(())
}

#[test]
fn check_seq_passes_good_file() -> STDRESULT {
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("check-seq")
        .arg("-s").arg(Path::new("tests").join("seq").join("good.seq"))
        .assert()
        .success()
        .stdout(predicate::str::contains("soc.u0.acc[3:0] == 4'b1111"))
        .stderr(predicate::str::contains("Passing"));
    Ok(())
}

#[test]
fn check_seq_rejects_width_mismatch() -> STDRESULT {
    let mut cmd = cargo::cargo_bin_cmd!("veritap");
    cmd.arg("check-seq")
        .arg("-s").arg(Path::new("tests").join("seq").join("bad.seq"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("width mismatch"));
    Ok(())
}
