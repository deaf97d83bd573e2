use assert_cmd::Command;
use predicates::prelude::*;

fn runner() -> Command {
    let mut command = Command::cargo_bin("logic-runner").expect("binary must build");
    command.env_remove("RUST_LOG");
    command
}

#[test]
fn eval_prints_result() {
    runner()
        .args(["eval", "--expr", "2 + 3 * x", "--var", "x=4"])
        .assert()
        .success()
        .stdout("14\n");
}

#[test]
fn eval_error_exits_with_status_one() {
    runner()
        .args(["eval", "--expr", "1/0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: division by zero"));
}

#[test]
fn transform_filter_prints_kept_values() {
    runner()
        .args(["transform", "--op", "filter", "--data", "[1,2,3,4]", "--expr", "x % 2 == 0"])
        .assert()
        .success()
        .stdout("[2.0,4.0]\n");
}

#[test]
fn plan_json_lists_tasks() {
    runner()
        .args(["plan", "--goal", "grpc service", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Update proto\"").and(predicate::str::contains("Keywords detected: grpc")));
}

#[test]
fn serve_answers_each_stdin_line() {
    let input = concat!(
        r#"{"schema":"logic-rpc/0.0.1","id":"1","method":"hello","params":{}}"#,
        "\n",
        r#"{"schema":"logic-rpc/0.0.1","id":"2","method":"transform","params":{"data":[1,2,3],"expr":"x","op":"SUM"}}"#,
        "\n",
    );
    runner()
        .args(["serve", "--workers", "2"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""id":"1","reply":{"message":"Hello, there from LogicService!"}"#)
                .and(predicate::str::contains(r#""id":"2","reply":{"result":6.0}"#)),
        );
}

#[test]
fn missing_config_file_is_reported() {
    runner()
        .args(["--config", "/nonexistent/logic-runner.yaml", "hello"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("read runner config failed"));
}
