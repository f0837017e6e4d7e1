mod common;

use common::{run_lines, run_lines_with_modules, single_module};
use pretty_assertions::assert_eq;
use squared::{host::Module, value::Value};

#[test]
fn array_constructor_and_index_access() {
    let lines = run_lines(
        "var [xs] = a[int[1], int[2], int[3]]\nprint(xs.e0)\nprint(xs.e2)\nprint(xs.val)\n",
    );
    assert_eq!(lines, ["1", "3", "[1, 2, 3]"]);
}

#[test]
fn array_out_of_range_index_yields_undefined_string() {
    let lines = run_lines("var [xs] = a[int[1]]\nprint(xs.e5)\n");
    assert_eq!(lines, ["undefined"]);
}

#[test]
fn bare_digit_key_also_indexes_an_array() {
    let lines = run_lines("var [xs] = a[int[9], int[8]]\nprint(xs.1)\n");
    assert_eq!(lines, ["8"]);
}

#[test]
fn template_interpolation_sums_array_elements() {
    let lines = run_lines(
        "var [xs] = a[int[1], int[2], int[3]]\nprint(fstr[sum is {xs.e0 + xs.e2}])\n",
    );
    assert_eq!(lines, ["sum is 4"]);
}

#[test]
fn fint_concatenates_template_segments_with_no_separator() {
    let lines = run_lines("print(fint[{int[1]}{int[2]}])\n");
    assert_eq!(lines, ["12"]);
}

#[test]
fn object_constructor_builds_insertion_ordered_properties() {
    let lines = run_lines(
        "var [o] = obj[prop[name] = str[bot], prop[greet] = f[fstr[hi {str[there]}]]]\nprint(o.name)\nprint(o.greet)\n",
    );
    assert_eq!(lines, ["bot", "hi there"]);
}

#[test]
fn object_method_is_invoked_through_member_call() {
    let lines = run_lines(
        "func [hello()]\n    return str[hi]\nvar [o] = obj[prop[greet] = var[hello]]\nprint(o.greet())\n",
    );
    assert_eq!(lines, ["hi"]);
}

#[test]
fn dynamic_member_access_formats_the_key_expression() {
    let lines = run_lines(
        "var [o] = obj[prop[e0] = str[first]]\nvar [k] = str[e0]\nprint(o.{k})\n",
    );
    assert_eq!(lines, ["first"]);
}

#[test]
fn var_constructor_looks_up_an_existing_binding() {
    let lines = run_lines("var [x] = int[5]\nprint(var[x])\n");
    assert_eq!(lines, ["5"]);
}

#[test]
fn str_constructor_collapses_space_before_comma_and_period() {
    let lines = run_lines("print(str[hello , world .])\n");
    assert_eq!(lines, ["hello,world."]);
}

#[test]
fn eval_stores_and_replays_the_last_value() {
    let lines = run_lines("eval(int[42])\nprint(eval())\n");
    assert_eq!(lines, ["42"]);
}

#[test]
fn random_from_a_single_element_array_is_that_element() {
    let lines = run_lines("var [xs] = a[int[7]]\nprint(random(xs))\n");
    assert_eq!(lines, ["7"]);
}

#[test]
fn random_min_max_is_within_bounds() {
    let lines = run_lines("print(random(int[3], int[3]))\n");
    assert_eq!(lines, ["3"]);
}

#[test]
fn import_binds_the_default_export_and_its_members() {
    let modules = single_module(
        "math",
        Module::new(Value::str("math-module")).with_member("pi", Value::int(3)),
    );
    let lines = run_lines_with_modules("import math\nprint(math)\nprint(pi)\n", modules);
    assert_eq!(lines, ["math-module", "3"]);
}
