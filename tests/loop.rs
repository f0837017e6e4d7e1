mod common;

use common::run_lines;
use pretty_assertions::assert_eq;

#[test]
fn while_loop_counts_up() {
    let lines = run_lines(
        "var [i] = int[0]\nwhile [i < int[3]]\n    print(i)\n    i = i + int[1]\n",
    );
    assert_eq!(lines, ["0", "1", "2"]);
}

#[test]
fn while_loop_break_stops_immediately() {
    let lines = run_lines(
        "var [i] = int[0]\nwhile [i < int[10]]\n    if [i == int[2]]\n        break\n    print(i)\n    i = i + int[1]\n",
    );
    assert_eq!(lines, ["0", "1"]);
}

#[test]
fn for_loop_runs_init_test_update() {
    let lines = run_lines("for [var [i] = int[0], i < int[3], i = i + int[1]]\n    print(i)\n");
    assert_eq!(lines, ["0", "1", "2"]);
}

#[test]
fn for_loop_continue_still_runs_update() {
    let lines = run_lines(
        "for [var [i] = int[0], i < int[4], i = i + int[1]]\n    if [i == int[1]]\n        continue\n    print(i)\n",
    );
    assert_eq!(lines, ["0", "2", "3"]);
}

#[test]
fn for_loop_variable_outlives_the_loop() {
    let lines = run_lines(
        "for [var [i] = int[0], i < int[3], i = i + int[1]]\n    print(i)\nprint(i)\n",
    );
    assert_eq!(lines, ["0", "1", "2", "3"]);
}

#[test]
fn nested_loop_break_affects_only_the_inner_loop() {
    let lines = run_lines(
        "var [i] = int[0]\nwhile [i < int[2]]\n    var [j] = int[0]\n    while [j < int[3]]\n        if [j == int[1]]\n            break\n        print(j)\n        j = j + int[1]\n    print(i)\n    i = i + int[1]\n",
    );
    assert_eq!(lines, ["0", "0", "0", "1"]);
}
