use workdir::Workdir;

fn row_values(got: &str) -> Vec<(usize, f64, u64)> {
    got.lines()
        .map(|line| {
            let f: Vec<&str> = line.split_whitespace().collect();
            (
                f[1].parse().unwrap(),
                f[2].parse().unwrap(),
                f[3].parse().unwrap(),
            )
        })
        .collect()
}

#[test]
fn sentinel_isolation_matches_the_worked_fixture() {
    let wrk = Workdir::new("co_occurrence_sentinel");
    wrk.create("stream.txt", svec!["0 1 2 2 3 5", "0 3 1"]);

    let mut cmd = wrk.command("co-occurrence");
    cmd.arg("--window")
        .arg("5")
        .arg("stream.txt")
        .arg("-o")
        .arg(wrk.path("cooc.mat"));
    wrk.stdout(&mut cmd);

    let mut analyze = wrk.command("analyze-matrix");
    analyze
        .arg("--kind")
        .arg("co-occurrence")
        .arg("--row")
        .arg("0")
        .arg(wrk.path("cooc.mat"));
    let got = wrk.stdout(&mut analyze);

    let row = row_values(&got);
    let (_, sum01, n01) = *row.iter().find(|(col, _, _)| *col == 1).unwrap();
    let (_, sum02, n02) = *row.iter().find(|(col, _, _)| *col == 2).unwrap();

    assert!((sum01 / n01 as f64 - 1.5).abs() < 1e-9);
    assert!((sum02 / n02 as f64 - 2.0).abs() < 1e-9);
}

#[test]
fn delimiter_blocks_pairs_across_the_paragraph_boundary() {
    let wrk = Workdir::new("co_occurrence_delim");
    wrk.create("stream.txt", svec!["0 1 2 2 3 5", "0 3 1"]);

    let mut cmd = wrk.command("co-occurrence");
    cmd.arg("--window")
        .arg("5")
        .arg("stream.txt")
        .arg("-o")
        .arg(wrk.path("cooc.mat"));
    wrk.stdout(&mut cmd);

    let mut analyze = wrk.command("analyze-matrix");
    analyze
        .arg("--kind")
        .arg("co-occurrence")
        .arg("--row")
        .arg("5")
        .arg(wrk.path("cooc.mat"));
    let got = wrk.stdout(&mut analyze);

    assert!(row_values(&got).iter().all(|(col, _, _)| *col != 0));
}

#[test]
fn care_predicate_restricts_counted_pairs() {
    let wrk = Workdir::new("co_occurrence_care");
    wrk.create("stream.txt", svec!["0 1"]);

    let mut cmd = wrk.command("co-occurrence");
    cmd.arg("--window")
        .arg("2")
        .arg("--care")
        .arg("0")
        .arg("--care")
        .arg("2")
        .arg("stream.txt")
        .arg("-o")
        .arg(wrk.path("cooc.mat"));
    wrk.stdout(&mut cmd);

    let mut analyze = wrk.command("analyze-matrix");
    analyze
        .arg("--kind")
        .arg("co-occurrence")
        .arg(wrk.path("cooc.mat"));
    let got = wrk.stdout(&mut analyze);
    assert!(got.contains("populated cells: 0"));
}
