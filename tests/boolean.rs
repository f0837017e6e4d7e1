mod common;

use common::run_lines;
use pretty_assertions::assert_eq;

#[test]
fn bool_constructor_parses_true_and_false() {
    let lines = run_lines("print(bool[true])\nprint(bool[false])\n");
    assert_eq!(lines, ["true", "false"]);
}

#[test]
fn comparisons_yield_bool_values() {
    let lines = run_lines("print(int[1] == int[1])\nprint(int[1] != int[1])\n");
    assert_eq!(lines, ["true", "false"]);
}

#[test]
fn zero_is_falsy_in_a_condition() {
    let lines = run_lines("if [int[0]]\n    print(str[yes])\nelse\n    print(str[no])\n");
    assert_eq!(lines, ["no"]);
}

#[test]
fn false_is_falsy_in_a_condition() {
    let lines = run_lines("if [bool[false]]\n    print(str[yes])\nelse\n    print(str[no])\n");
    assert_eq!(lines, ["no"]);
}

#[test]
fn nonzero_is_truthy_in_a_condition() {
    let lines = run_lines("if [int[7]]\n    print(str[yes])\nelse\n    print(str[no])\n");
    assert_eq!(lines, ["yes"]);
}
