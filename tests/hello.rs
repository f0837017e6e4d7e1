mod common;

use common::run_lines;
use pretty_assertions::assert_eq;

#[test]
fn assigns_and_prints_an_integer() {
    let lines = run_lines("var [x] = int[10]\nprint(x)\n");
    assert_eq!(lines, ["10"]);
}

#[test]
fn prints_a_string_literal() {
    let lines = run_lines("print(str[hello world])\n");
    assert_eq!(lines, ["hello world"]);
}

#[test]
fn conditional_picks_the_true_branch() {
    let lines = run_lines(
        "var [x] = int[3]\nif [x > int[1]]\n    print(str[big])\nelse\n    print(str[small])\n",
    );
    assert_eq!(lines, ["big"]);
}

#[test]
fn conditional_picks_the_false_branch() {
    let lines = run_lines(
        "var [x] = int[0]\nif [x > int[1]]\n    print(str[big])\nelse\n    print(str[small])\n",
    );
    assert_eq!(lines, ["small"]);
}
