use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

#[test]
fn unknown_methods_and_bad_json_keep_the_sidecar_alive() {
    let exe = env!("CARGO_BIN_EXE_attendanced");
    let mut child = Command::new(exe)
        .env_remove("ATTENDANCED_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn attendanced");
    let mut stdin = child.stdin.take().expect("child stdin");
    let mut reader = BufReader::new(child.stdout.take().expect("child stdout"));
    let mut read_json = || {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read response line");
        serde_json::from_str::<serde_json::Value>(line.trim()).expect("parse response json")
    };

    writeln!(stdin, "{{not json").expect("write");
    stdin.flush().expect("flush");
    let bad = read_json();
    assert_eq!(bad["ok"], json!(false));
    assert_eq!(bad["error"]["code"], json!("bad_json"));

    writeln!(stdin, "{}", json!({ "id": "1", "method": "grades.open" })).expect("write");
    stdin.flush().expect("flush");
    let unknown = read_json();
    assert_eq!(unknown["id"], json!("1"));
    assert_eq!(unknown["error"]["code"], json!("not_implemented"));

    writeln!(stdin, "{}", json!({ "id": "2", "method": "health" })).expect("write");
    stdin.flush().expect("flush");
    let health = read_json();
    assert_eq!(health["ok"], json!(true));
    assert_eq!(health["result"]["version"], json!(env!("CARGO_PKG_VERSION")));
    assert_eq!(health["result"]["studentCount"], json!(0));
    assert_eq!(health["result"]["workspacePath"], json!(null));

    drop(stdin);
    let _ = child.wait();
}
