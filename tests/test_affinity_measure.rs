use workdir::Workdir;

// The seven-term fixture: t=0,u=1,v=2,w=3,x=4,y=5,z=6.
fn seven_term_fixture_lines() -> Vec<String> {
    svec![
        "( 0 1 0.04 )",
        "( 3 1 0.05 )",
        "( 6 1 0.05 )",
        "( 1 4 0.03 )",
        "( 1 5 0.03 )",
        "( 0 2 0.05 )",
        "( 3 2 0.02 )",
        "( 2 4 0.06 )",
        "( 2 5 0.03 )",
        "( 2 6 0.04 )",
        "[ 7 7 ]"
    ]
}

#[test]
fn full_matrix_matches_the_worked_fixture() {
    let wrk = Workdir::new("affinity_full");
    wrk.create("waf.mat", seven_term_fixture_lines());

    let mut cmd = wrk.command("affinity-measure");
    cmd.arg(wrk.path("waf.mat"));
    let got = wrk.stdout(&mut cmd);

    let value: f64 = got
        .lines()
        .find_map(|line| {
            let f: Vec<&str> = line.split_whitespace().collect();
            (f[1] == "1" && f[2] == "2").then(|| f[3].parse().unwrap())
        })
        .expect("aff(1, 2) should be present");
    assert!((value - 0.4472135955).abs() < 1e-6, "aff(1,2) was {value}");
}

#[test]
fn min_affinity_floor_prunes_everything_but_the_diagonal() {
    let wrk = Workdir::new("affinity_floor");
    wrk.create("waf.mat", seven_term_fixture_lines());

    let mut cmd = wrk.command("affinity-measure");
    cmd.arg("--min-affinity").arg("0.9").arg(wrk.path("waf.mat"));
    let got = wrk.stdout(&mut cmd);

    assert!(got
        .lines()
        .all(|line| {
            let f: Vec<&str> = line.split_whitespace().collect();
            f[1] == f[2]
        }));
}

#[test]
fn diagonal_mode_reports_a_profile_shift_between_two_corpora() {
    let wrk = Workdir::new("affinity_diagonal");
    wrk.create("a.mat", seven_term_fixture_lines());

    let mut shifted = seven_term_fixture_lines();
    let idx = shifted.iter().position(|l| l == "( 3 1 0.05 )").unwrap();
    shifted[idx] = "( 3 1 0.5 )".to_string();
    wrk.create("b.mat", shifted);

    let mut cmd = wrk.command("affinity-measure");
    cmd.arg("--diagonal")
        .arg("--care")
        .arg("1")
        .arg(wrk.path("a.mat"))
        .arg(wrk.path("b.mat"));
    let got = wrk.stdout(&mut cmd);

    let lines: Vec<&str> = got.lines().collect();
    assert_eq!(lines.len(), 1);
    let f: Vec<&str> = lines[0].split_whitespace().collect();
    let id: u64 = f[1].parse().unwrap();
    let value: f64 = f[2].parse().unwrap();
    assert_eq!(id, 1);
    assert!(value < 1.0, "shifted diagonal affinity was {value}");
}

#[test]
fn diagonal_mode_without_a_background_matrix_is_an_error() {
    let wrk = Workdir::new("affinity_diagonal_missing_arg");
    wrk.create("waf.mat", seven_term_fixture_lines());

    let mut cmd = wrk.command("affinity-measure");
    cmd.arg("--diagonal").arg(wrk.path("waf.mat"));
    let output = cmd.output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("background-waf-matrix"));
}
