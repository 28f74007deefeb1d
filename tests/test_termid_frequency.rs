use std::collections::HashMap;

use workdir::Workdir;

fn parse_pairs(s: &str) -> HashMap<u64, u64> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        // ( id freq )
        let id: u64 = tokens[1].parse().unwrap();
        let freq: u64 = tokens[2].parse().unwrap();
        map.insert(id, freq);
    }
    map
}

#[test]
fn accumulates_counts_across_every_line() {
    let wrk = Workdir::new("termid_frequency_basic");
    wrk.create("stream.txt", svec!["0 1 0", "1 1"]);

    let mut cmd = wrk.command("termid-frequency");
    cmd.arg("stream.txt");

    let got = wrk.stdout(&mut cmd);
    let counts = parse_pairs(&got);
    assert_eq!(counts.get(&0), Some(&2));
    assert_eq!(counts.get(&1), Some(&3));
}

#[test]
fn empty_stream_yields_an_empty_vector() {
    let wrk = Workdir::new("termid_frequency_empty");
    wrk.create("stream.txt", Vec::<String>::new());

    let mut cmd = wrk.command("termid-frequency");
    cmd.arg("stream.txt");

    let got = wrk.stdout(&mut cmd);
    assert!(got.trim().is_empty());
}
