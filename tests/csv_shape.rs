use std::fs;
use std::process::Command;

fn run(args: &[&str]) -> bool {
    Command::new(env!("CARGO_BIN_EXE_dustext"))
        .args(args)
        .status()
        .expect("run dustext")
        .success()
}

fn data_lines(s: &str) -> Vec<&str> {
    s.lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("x,"))
        .collect()
}

#[test]
fn curve_has_one_header_and_99_rows() {
    let out = "out_shape_test";
    assert!(run(&["--law", "cardelli", "--rv", "3.1", "--out-dir", out, "--no-draw"]));

    let s = fs::read_to_string(format!("{out}/extinction.csv")).unwrap();
    let header_count = s.lines().filter(|l| l.starts_with("x,")).count();
    assert_eq!(header_count, 1, "CSV must have exactly one header row");
    assert_eq!(s.lines().find(|l| l.starts_with("x,")).unwrap(), "x,lambda_aa,value");
    assert!(s.starts_with("# Law: Cardelli"));

    let rows = data_lines(&s);
    assert_eq!(rows.len(), 99);
    // x = 0.1 is outside the CCM support
    let first: Vec<&str> = rows[0].split(',').collect();
    assert_eq!(first[2].parse::<f64>().unwrap(), 0.0);

    let _ = fs::remove_dir_all(out);
}

#[test]
fn mixture_values_are_finite() {
    let out = "out_mixture_test";
    assert!(run(&[
        "--law", "mixture", "--rv", "3.1", "--f-a", "0.5", "--out-dir", out, "--no-draw",
    ]));

    let s = fs::read_to_string(format!("{out}/extinction.csv")).unwrap();
    assert!(s.contains("# Law: (Fitzpatrick99, Gordon et al. 2003 SMCBar)"));
    let rows = data_lines(&s);
    assert_eq!(rows.len(), 99);
    for row in rows {
        let v: f64 = row.split(',').nth(2).unwrap().parse().unwrap();
        assert!(v.is_finite(), "non-finite value in row {row}");
    }

    let _ = fs::remove_dir_all(out);
}

#[test]
fn params_file_is_read() {
    let out = "out_params_test";
    fs::create_dir_all(out).unwrap();
    let path = format!("{out}/params.json");
    fs::write(&path, r#"{ "rv": 3.1, "rv_b": 2.74, "f_a": 0.25, "output": "tau" }"#).unwrap();
    assert!(run(&["--law", "mixture", "--params", &path, "--out-dir", out, "--no-draw"]));

    let s = fs::read_to_string(format!("{out}/extinction.csv")).unwrap();
    assert!(s.contains("f_A=0.25"));
    assert!(s.contains("# Output: Tau"));

    let _ = fs::remove_dir_all(out);
}

#[test]
fn insufficient_rv_fails() {
    let out = "out_fail_test";
    assert!(!run(&["--law", "mixture", "--out-dir", out, "--no-draw"]));
    let _ = fs::remove_dir_all(out);
}

fn table(path: &str) -> (Vec<String>, Vec<Vec<f64>>) {
    let s = fs::read_to_string(path).unwrap();
    let mut lines = s.lines();
    let head = lines.next().unwrap().split(',').map(str::to_string).collect();
    let rows = lines
        .map(|l| l.split(',').map(|v| v.parse().unwrap()).collect())
        .collect();
    (head, rows)
}

#[test]
fn rv_sweep_writes_one_column_per_value() {
    let out = "out_rv_sweep_test";
    assert!(run(&["--law", "f99", "--rv-sweep", "2,3.1,5", "--out-dir", out, "--no-draw"]));

    let (head, rows) = table(&format!("{out}/rv_sweep.csv"));
    assert_eq!(head, ["x", "lambda_aa", "Rv=2.00", "Rv=3.10", "Rv=5.00"]);
    assert_eq!(rows.len(), 99);
    // the optical anchors of F99 shift with R(V), so the curves differ
    let last = &rows[rows.len() - 1];
    assert!(last[2..].iter().all(|v| v.is_finite()));
    assert!(last[2] != last[4]);

    let _ = fs::remove_dir_all(out);
}

#[test]
fn f_a_sweep_writes_one_column_per_value() {
    let out = "out_f_a_sweep_test";
    assert!(run(&[
        "--law",
        "mixture",
        "--rv",
        "3.1",
        "--f-a-sweep",
        "0.25,0.5,0.75",
        "--out-dir",
        out,
        "--no-draw",
    ]));

    let (head, rows) = table(&format!("{out}/f_a_sweep.csv"));
    assert_eq!(head, ["x", "lambda_aa", "f_A=0.25", "f_A=0.50", "f_A=0.75"]);
    assert_eq!(rows.len(), 99);
    for row in &rows {
        assert!(row[2..].iter().all(|v| v.is_finite()), "row {row:?}");
    }

    let _ = fs::remove_dir_all(out);
}
