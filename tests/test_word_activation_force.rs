use workdir::Workdir;

#[test]
fn matches_the_scalar_formula_end_to_end() {
    let wrk = Workdir::new("waf_basic");
    // Two paragraphs, each pairing term 0 with term 1 at distance 2 via an
    // intervening term 9: n=2, d_sum=4, d_mean=2.
    wrk.create("stream.txt", svec!["0 9 1", "0 9 1"]);
    wrk.create("freq.vec", svec!["( 0 3 )", "( 1 5 )"]);

    let mut cooc = wrk.command("co-occurrence");
    cooc.arg("--window")
        .arg("3")
        .arg("stream.txt")
        .arg("-o")
        .arg(wrk.path("cooc.mat"));
    wrk.stdout(&mut cooc);

    let mut force = wrk.command("word-activation-force");
    force
        .arg(wrk.path("cooc.mat"))
        .arg(wrk.path("freq.vec"))
        .arg("-o")
        .arg(wrk.path("waf.mat"));
    wrk.stdout(&mut force);

    let mut analyze = wrk.command("analyze-matrix");
    analyze.arg("--row").arg("0").arg(wrk.path("waf.mat"));
    let got = wrk.stdout(&mut analyze);

    let value: f64 = got
        .lines()
        .find_map(|line| {
            let f: Vec<&str> = line.split_whitespace().collect();
            (f[1] == "1").then(|| f[2].parse().unwrap())
        })
        .expect("waf(0, 1) should be present");

    // n=2, d_mean=2, f_0=3, f_1=5 -> 4 / (3*5*4) = 1/15
    assert!((value - 1.0 / 15.0).abs() < 1e-9, "waf(0,1) was {value}");
}

#[test]
fn precision_floor_drops_every_edge() {
    let wrk = Workdir::new("waf_precision");
    wrk.create("stream.txt", svec!["0 9 1", "0 9 1"]);
    wrk.create("freq.vec", svec!["( 0 3 )", "( 1 5 )"]);

    let mut cooc = wrk.command("co-occurrence");
    cooc.arg("--window")
        .arg("3")
        .arg("stream.txt")
        .arg("-o")
        .arg(wrk.path("cooc.mat"));
    wrk.stdout(&mut cooc);

    let mut force = wrk.command("word-activation-force");
    force
        .arg("--precision")
        .arg("1.0")
        .arg(wrk.path("cooc.mat"))
        .arg(wrk.path("freq.vec"))
        .arg("-o")
        .arg(wrk.path("waf.mat"));
    wrk.stdout(&mut force);

    let mut analyze = wrk.command("analyze-matrix");
    analyze.arg(wrk.path("waf.mat"));
    let got = wrk.stdout(&mut analyze);
    assert!(got.contains("populated cells: 0"));
}
